use thiserror::Error;
use zonesync_domain::{ConfigError, RecordError};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("attempted to modify an immutable record")]
    ImmutableRecord,

    #[error("not authorized to perform this action")]
    NotAuthorized,

    #[error("failed to create record: {0}")]
    RecordCreation(String),

    #[error("failed to delete record: {0}")]
    RecordDeletion(String),

    #[error("server not reachable")]
    ServerNotReachable,

    #[error("DNS exchange failed: {0}")]
    Exchange(String),

    #[error("zone transfer failed: {0}")]
    Transfer(String),

    #[error("TSIG error: {0}")]
    Tsig(String),

    #[error("failed to encode DNS message: {0}")]
    Encode(String),

    #[error("failed to decode DNS response: {0}")]
    Decode(String),

    #[error("operation failed after reaching the maximum number of retries")]
    MaxRetriesReached,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Record(#[from] RecordError),
}
