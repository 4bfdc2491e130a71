//! zonesync service layer: the AXFR / RFC 2136 zone synchronization client.
pub mod backoff;
pub mod client;
pub mod dns;
pub mod errors;
pub mod health;
pub mod mock;
pub mod service;

pub use client::ZoneClient;
pub use errors::ServiceError;
pub use health::HealthState;
pub use mock::MockClient;
pub use service::ZoneService;
