use chrono::{DateTime, Utc};
use serde::Serialize;

/// Snapshot of the background loops' last outcomes. Mutated only by the
/// sync and health-check tasks; consumers receive copies.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HealthState {
    pub server_reachable: bool,
    pub last_checked: Option<DateTime<Utc>>,
    pub last_synced: Option<DateTime<Utc>>,
    pub sync_error: Option<String>,
    pub check_error: Option<String>,
}
