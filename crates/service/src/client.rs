//! The synchronization client: owns the record cache, applies dynamic
//! updates against the authoritative server and keeps the cache fresh with
//! periodic zone transfers and reachability probes.

use crate::backoff::{retry_with_backoff, RetryConfig};
use crate::dns::message_builder::MessageBuilder;
use crate::dns::rcode_str;
use crate::dns::transport::{DnsExchange, NetTransport};
use crate::dns::{axfr, tsig};
use crate::errors::ServiceError;
use crate::health::HealthState;
use crate::service::ZoneService;
use async_trait::async_trait;
use chrono::Utc;
use hickory_proto::dnssec::tsig::TSigner;
use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::Name;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use zonesync_domain::{ConfigError, GuardMap, Record, RecordType, ZoneConfig};

/// Removal attempts before giving up on overwriting an existing record.
const PRE_UPDATE_REMOVE_RETRIES: u32 = 2;

/// Cache and health snapshot, guarded by the client's single lock. Network
/// I/O never happens while this lock is held.
struct ClientState {
    cache: Vec<Record>,
    health: HealthState,
}

struct Shared {
    state: RwLock<ClientState>,
    guards: GuardMap,
    zone: String,
    zone_name: Name,
    signer: TSigner,
    transport: Arc<dyn DnsExchange>,
    query_timeout: Duration,
    ipv4: Option<Ipv4Addr>,
    ipv6: Option<Ipv6Addr>,
}

pub struct ZoneClient {
    shared: Arc<Shared>,
    shutdown: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl ZoneClient {
    /// Resolves the configured server and performs the initial zone
    /// transfer. Construction fails if that transfer cannot complete: the
    /// client never starts serving from an unknown cache.
    pub async fn connect(config: ZoneConfig) -> Result<Self, ServiceError> {
        let config = config.validate()?;
        let server_addr = resolve_addr(&config.server_addr).await?;
        Self::with_exchange(config, Arc::new(NetTransport::new(server_addr))).await
    }

    /// Like [`ZoneClient::connect`] but with a caller-supplied transport.
    pub async fn with_exchange(
        config: ZoneConfig,
        transport: Arc<dyn DnsExchange>,
    ) -> Result<Self, ServiceError> {
        let config = config.validate()?;
        let zone_name = Name::from_str(&config.zone)
            .map_err(|_| ServiceError::Config(ConfigError::InvalidZone(config.zone.clone())))?;
        let guards = GuardMap::parse(&config.guards, &config.zone);
        let signer = tsig::create_signer(&config.tsig_key, &config.tsig_secret)?;

        let shared = Arc::new(Shared {
            state: RwLock::new(ClientState {
                cache: Vec::new(),
                health: HealthState::default(),
            }),
            guards,
            zone: config.zone.clone(),
            zone_name,
            signer,
            transport,
            query_timeout: Duration::from_millis(config.query_timeout_ms),
            ipv4: config.ipv4,
            ipv6: config.ipv6,
        });

        shared.fetch_and_cache_records().await?;
        info!(zone = %shared.zone, "initial zone transfer complete");

        let shutdown = CancellationToken::new();
        let tasks = vec![
            spawn_sync_loop(
                Arc::clone(&shared),
                shutdown.clone(),
                Duration::from_secs(config.sync_interval),
            ),
            spawn_health_loop(
                Arc::clone(&shared),
                shutdown.clone(),
                Duration::from_secs(config.health_check_interval),
            ),
        ];

        Ok(Self {
            shared,
            shutdown,
            tasks: Mutex::new(tasks),
        })
    }
}

impl Shared {
    fn read_state(&self) -> RwLockReadGuard<'_, ClientState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, ClientState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn is_immutable(&self, record: &Record) -> bool {
        self.guards
            .is_immutable(record.record_type().as_str(), record.name())
    }

    fn get_by_fqdn_and_type(&self, fqdn: &str, rtype: RecordType) -> Option<Record> {
        self.read_state()
            .cache
            .iter()
            .find(|r| r.record_type() == rtype && r.name() == fqdn)
            .cloned()
    }

    async fn fetch_zone_records(&self) -> Result<Vec<Record>, ServiceError> {
        let mut message = MessageBuilder::axfr_query(&self.zone_name);
        tsig::sign(&mut message, &self.signer)?;
        let bytes = MessageBuilder::serialize(&message)?;
        let messages = self.transport.transfer(&bytes, self.query_timeout).await?;
        axfr::decode_transfer(&messages)
    }

    /// AXFR with backoff, swapping the cache only on success. A failed
    /// transfer keeps the stale cache: availability over freshness.
    async fn fetch_and_cache_records(&self) -> Result<(), ServiceError> {
        let records =
            retry_with_backoff(|| self.fetch_zone_records(), &RetryConfig::default()).await?;
        let mut state = self.write_state();
        state.cache = records;
        Ok(())
    }

    async fn exchange_update(&self, message: Message) -> Result<ResponseCode, ServiceError> {
        let bytes = MessageBuilder::serialize(&message)?;
        let response = self.transport.exchange(&bytes, self.query_timeout).await?;
        let reply = Message::from_vec(&response).map_err(|e| ServiceError::Decode(e.to_string()))?;
        Ok(reply.response_code())
    }

    async fn add_record(&self, record: Record) -> Result<(), ServiceError> {
        debug!(record = %record, "attempting to add record");

        if self.is_immutable(&record) {
            warn!(record = %record.name(), "attempted to modify an immutable record");
            return Err(ServiceError::ImmutableRecord);
        }

        // A record with the same (type, name) means this is an overwrite:
        // delete the old entry server-side before inserting the new one.
        if let Some(existing) = self.get_by_fqdn_and_type(record.name(), record.record_type()) {
            debug!(record = %existing, "record exists, removing before overwrite");
            let retry = RetryConfig {
                max_retries: PRE_UPDATE_REMOVE_RETRIES,
                ..RetryConfig::default()
            };
            retry_with_backoff(|| self.remove_record(&existing), &retry)
                .await
                .map_err(|_| {
                    ServiceError::RecordDeletion(
                        "could not remove existing record before overwrite".into(),
                    )
                })?;
        }

        let mut message = MessageBuilder::update_insert(&self.zone_name, &record)?;
        tsig::sign(&mut message, &self.signer)?;

        let rcode = self.exchange_update(message).await?;
        if rcode != ResponseCode::NoError {
            error!(rcode = rcode_str(rcode), record = %record.name(), "server rejected record creation");
            return Err(ServiceError::RecordCreation(format!(
                "response code {}",
                rcode_str(rcode)
            )));
        }

        // Only a confirmed server-side insert reaches the cache.
        let mut state = self.write_state();
        state.cache.push(record.clone());
        drop(state);

        info!(record = %record, "record added");
        Ok(())
    }

    async fn remove_record(&self, record: &Record) -> Result<(), ServiceError> {
        if self.is_immutable(record) {
            warn!(record = %record.name(), "attempted to delete an immutable record");
            return Err(ServiceError::ImmutableRecord);
        }

        let mut message = MessageBuilder::update_delete(&self.zone_name, record)?;
        tsig::sign(&mut message, &self.signer)?;

        let rcode = self.exchange_update(message).await?;
        if rcode != ResponseCode::NoError {
            error!(rcode = rcode_str(rcode), record = %record.name(), "server rejected record deletion");
            return Err(ServiceError::RecordDeletion(format!(
                "response code {}",
                rcode_str(rcode)
            )));
        }

        let canonical = record.to_string();
        let mut state = self.write_state();
        match state.cache.iter().position(|r| r.to_string() == canonical) {
            Some(idx) => {
                state.cache.remove(idx);
            }
            // The server-side delete succeeded but the entry was never
            // cached; surfaced as a warning, not an error.
            None => warn!(record = %canonical, "removed record was not present in cache"),
        }
        drop(state);

        info!(record = %record, "record removed");
        Ok(())
    }

    async fn is_server_reachable(&self) -> bool {
        let message = MessageBuilder::soa_query(&self.zone_name);
        let Ok(bytes) = MessageBuilder::serialize(&message) else {
            return false;
        };
        match self.transport.exchange(&bytes, self.query_timeout).await {
            Ok(response) => Message::from_vec(&response)
                .map(|reply| !reply.answers().is_empty())
                .unwrap_or(false),
            Err(_) => false,
        }
    }
}

fn spawn_sync_loop(
    shared: Arc<Shared>,
    shutdown: CancellationToken,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The initial population already ran at construction.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("terminating periodic record synchronization");
                    break;
                }
                _ = ticker.tick() => {
                    match shared.fetch_and_cache_records().await {
                        Ok(()) => {
                            let mut state = shared.write_state();
                            state.health.last_synced = Some(Utc::now());
                            state.health.sync_error = None;
                            drop(state);
                            info!("records synchronized");
                        }
                        Err(e) => {
                            error!(error = %e, "failed to synchronize records");
                            let mut state = shared.write_state();
                            state.health.sync_error = Some(e.to_string());
                        }
                    }
                }
            }
        }
    })
}

fn spawn_health_loop(
    shared: Arc<Shared>,
    shutdown: CancellationToken,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("terminating periodic health check");
                    break;
                }
                _ = ticker.tick() => {
                    let reachable = shared.is_server_reachable().await;
                    let mut state = shared.write_state();
                    state.health.server_reachable = reachable;
                    state.health.last_checked = Some(Utc::now());
                    state.health.check_error = if reachable {
                        None
                    } else {
                        Some(ServiceError::ServerNotReachable.to_string())
                    };
                    drop(state);
                    if !reachable {
                        error!("DNS server not reachable");
                    }
                }
            }
        }
    })
}

async fn resolve_addr(server_addr: &str) -> Result<SocketAddr, ServiceError> {
    tokio::net::lookup_host(server_addr)
        .await
        .map_err(|e| ServiceError::Exchange(format!("failed to resolve {server_addr}: {e}")))?
        .next()
        .ok_or_else(|| ServiceError::Exchange(format!("no addresses for {server_addr}")))
}

#[async_trait]
impl ZoneService for ZoneClient {
    fn health_check(&self) -> HealthState {
        self.shared.read_state().health.clone()
    }

    fn get_records(&self) -> Vec<Record> {
        self.shared
            .read_state()
            .cache
            .iter()
            .filter(|r| !self.shared.is_immutable(r))
            .cloned()
            .collect()
    }

    async fn add_record(&self, record: Record) -> Result<(), ServiceError> {
        self.shared.add_record(record).await
    }

    async fn remove_record(&self, record: &Record) -> Result<(), ServiceError> {
        self.shared.remove_record(record).await
    }

    fn get_record_by_hash(&self, hash: &str) -> Option<Record> {
        // Deliberately unfiltered: direct lookups can reach records that
        // get_records hides behind an immutable guard.
        self.shared
            .read_state()
            .cache
            .iter()
            .find(|r| r.hash() == hash)
            .cloned()
    }

    fn get_record_for_fqdn(&self, fqdn: &str, rtype: RecordType) -> Option<Record> {
        self.shared.get_by_fqdn_and_type(fqdn, rtype)
    }

    fn get_record_by_fqdn_and_type(&self, fqdn: &str, rtype: RecordType) -> Option<Record> {
        self.shared.get_by_fqdn_and_type(fqdn, rtype)
    }

    fn is_admin_only(&self, record: &Record) -> bool {
        self.shared
            .guards
            .is_admin_only(record.record_type().as_str(), record.name())
    }

    fn zone(&self) -> &str {
        &self.shared.zone
    }

    fn ipv4(&self) -> Option<Ipv4Addr> {
        self.shared.ipv4
    }

    fn ipv6(&self) -> Option<Ipv6Addr> {
        self.shared.ipv6
    }

    async fn close(&self) {
        self.shutdown.cancel();
        let handles: Vec<JoinHandle<()>> = {
            let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
            tasks.drain(..).collect()
        };
        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "background task did not shut down cleanly");
            }
        }
    }
}
