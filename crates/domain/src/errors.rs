use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("unsupported record type: {0}")]
    UnsupportedType(String),

    #[error("invalid IPv4 address: {0}")]
    InvalidIpv4(String),

    #[error("not a valid IPv6 address: {0}")]
    InvalidIpv6(String),

    #[error("invalid FQDN: {0}")]
    InvalidFqdn(String),

    #[error("invalid MX value, expected \"priority:mailserver\": {0}")]
    InvalidMx(String),

    #[error("invalid SRV value, expected \"priority:weight:port:target\": {0}")]
    InvalidSrv(String),

    #[error("TXT value must be between 1 and 255 characters")]
    InvalidTxt,

    #[error("invalid TTL: {0}")]
    InvalidTtl(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid host: {0}")]
    InvalidHost(String),

    #[error("invalid port: {0}")]
    InvalidPort(String),

    #[error("zone must be specified")]
    MissingZone,

    #[error("invalid zone: {0}")]
    InvalidZone(String),

    #[error("TSIG key and secret must be specified")]
    MissingTsigCredentials,
}
