//! zonesync domain layer: DNS records, guard policies and configuration.
pub mod config;
pub mod errors;
pub mod fqdn;
pub mod guard;
pub mod record;

pub use config::{GuardLists, ZoneConfig};
pub use errors::{ConfigError, RecordError};
pub use guard::{GuardMap, RecordGuard};
pub use record::{Record, RecordData, RecordType};
