use crate::errors::ServiceError;
use crate::health::HealthState;
use async_trait::async_trait;
use std::net::{Ipv4Addr, Ipv6Addr};
use zonesync_domain::{Record, RecordType};

/// Surface consumed by external callers (dashboard handlers, templates).
///
/// All getters return owned copies of cached state, never references into
/// the cache, so callers cannot mutate it out from under the client.
#[async_trait]
pub trait ZoneService: Send + Sync {
    /// Copy of the current health snapshot.
    fn health_check(&self) -> HealthState;

    /// Defensive copy of the cache, with records matching an immutable
    /// guard filtered out. Admin-only records are included: visibility is
    /// not mutability.
    fn get_records(&self) -> Vec<Record>;

    /// Applies a dynamic update against the authoritative server and, on
    /// success, appends to the cache. An existing record with the same
    /// (type, name) is removed first.
    async fn add_record(&self, record: Record) -> Result<(), ServiceError>;

    /// Deletes the record server-side and drops the matching cache entry.
    async fn remove_record(&self, record: &Record) -> Result<(), ServiceError>;

    /// Direct lookup by content hash. Unlike `get_records`, this returns
    /// immutable-guarded records too; the listing/lookup asymmetry is
    /// intentional.
    fn get_record_by_hash(&self, hash: &str) -> Option<Record>;

    /// First cached record matching (name, type), in cache order.
    fn get_record_for_fqdn(&self, fqdn: &str, rtype: RecordType) -> Option<Record>;

    fn get_record_by_fqdn_and_type(&self, fqdn: &str, rtype: RecordType) -> Option<Record>;

    /// Guard classification only; enforcing the elevated capability is the
    /// caller's concern.
    fn is_admin_only(&self, record: &Record) -> bool;

    fn zone(&self) -> &str;

    /// Static address hints for template rendering.
    fn ipv4(&self) -> Option<Ipv4Addr>;

    fn ipv6(&self) -> Option<Ipv6Addr>;

    /// Stops the background loops and waits for both to exit.
    async fn close(&self);
}
