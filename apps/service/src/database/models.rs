use std::time::{SystemTime, UNIX_EPOCH};

use hostwatch::{HostState, HostStatus};

/// A monitored host with its last persisted status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredStatus {
    pub host: String,
    /// `None` when no transition was ever recorded for the host
    pub status: Option<HostState>,
    pub reason: Option<String>,
}

impl StoredStatus {
    /// Start command restoring the stored state; unknown status counts as up
    pub fn to_command(&self) -> HostStatus {
        HostStatus::seeded(self.host.clone(), self.status.is_some_and(HostState::is_down))
    }
}

/// Current time as a Unix timestamp
pub fn unix_now() -> i64 {
    timestamp_to_i64(SystemTime::now())
}

/// Convert SystemTime to Unix timestamp
pub fn timestamp_to_i64(time: SystemTime) -> i64 {
    time.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs() as i64
}
