//! In-memory stand-in for the real client, used by tests and demo wiring.

use crate::errors::ServiceError;
use crate::health::HealthState;
use crate::service::ZoneService;
use async_trait::async_trait;
use chrono::Utc;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use zonesync_domain::{Record, RecordData, RecordType};

const MOCK_ZONE: &str = "mock.example.com.";

#[derive(Default)]
pub struct MockClient {
    cache: RwLock<Vec<Record>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_test_records() -> Self {
        let mock = Self::new();
        {
            let mut cache = mock.write_cache();
            cache.push(Record::new(
                "foo.mock.example.com.",
                100,
                RecordData::A(Ipv4Addr::new(192, 0, 2, 1)),
            ));
            cache.push(Record::new(
                "foo.mock.example.com.",
                100,
                RecordData::AAAA(Ipv6Addr::LOCALHOST),
            ));
            cache.push(Record::new(
                "bar.mock.example.com.",
                100,
                RecordData::A(Ipv4Addr::new(192, 0, 2, 2)),
            ));
        }
        mock
    }

    fn read_cache(&self) -> RwLockReadGuard<'_, Vec<Record>> {
        self.cache.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, Vec<Record>> {
        self.cache.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ZoneService for MockClient {
    fn health_check(&self) -> HealthState {
        HealthState {
            server_reachable: true,
            last_checked: Some(Utc::now()),
            last_synced: Some(Utc::now()),
            sync_error: None,
            check_error: None,
        }
    }

    fn get_records(&self) -> Vec<Record> {
        self.read_cache().clone()
    }

    async fn add_record(&self, record: Record) -> Result<(), ServiceError> {
        self.write_cache().push(record);
        Ok(())
    }

    async fn remove_record(&self, record: &Record) -> Result<(), ServiceError> {
        let mut cache = self.write_cache();
        match cache.iter().position(|r| {
            r.record_type() == record.record_type()
                && r.name() == record.name()
                && r.data() == record.data()
        }) {
            Some(idx) => {
                cache.remove(idx);
                Ok(())
            }
            None => Err(ServiceError::RecordDeletion("record not found".into())),
        }
    }

    fn get_record_by_hash(&self, hash: &str) -> Option<Record> {
        self.read_cache().iter().find(|r| r.hash() == hash).cloned()
    }

    fn get_record_for_fqdn(&self, fqdn: &str, rtype: RecordType) -> Option<Record> {
        self.get_record_by_fqdn_and_type(fqdn, rtype)
    }

    fn get_record_by_fqdn_and_type(&self, fqdn: &str, rtype: RecordType) -> Option<Record> {
        self.read_cache()
            .iter()
            .find(|r| r.record_type() == rtype && r.name() == fqdn)
            .cloned()
    }

    fn is_admin_only(&self, _record: &Record) -> bool {
        false
    }

    fn zone(&self) -> &str {
        MOCK_ZONE
    }

    fn ipv4(&self) -> Option<Ipv4Addr> {
        Some(Ipv4Addr::new(192, 0, 2, 10))
    }

    fn ipv6(&self) -> Option<Ipv6Addr> {
        Some(Ipv6Addr::LOCALHOST)
    }

    async fn close(&self) {}
}
