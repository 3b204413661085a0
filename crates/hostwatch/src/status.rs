use serde::{Deserialize, Serialize};

use crate::error::ProbeError;

/// Marker appended to a host token to register it as already down,
/// e.g. `"example.com down"`.
pub const DOWN_SUFFIX: &str = " down";

/// Observed state of a monitored host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostState {
    Up,
    Down,
}

impl HostState {
    pub fn from_down(down: bool) -> Self {
        if down { HostState::Down } else { HostState::Up }
    }

    pub fn is_down(self) -> bool {
        self == HostState::Down
    }
}

impl std::fmt::Display for HostState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostState::Up => write!(f, "up"),
            HostState::Down => write!(f, "down"),
        }
    }
}

/// A host together with its up/down status.
///
/// Wrapped in [`Command::Start`](crate::Command) it asks to monitor the host,
/// seeded as `down`; in a stop command only `host` matters; on the notify
/// channel it is a transition event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostStatus {
    /// Canonical host key: bare hostname/IP, `host:port` or a URL
    pub host: String,
    pub down: bool,
    /// Last probe failure, set on Down events
    pub reason: Option<ProbeError>,
}

impl HostStatus {
    /// Start command seeded as up
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into(), down: false, reason: None }
    }

    /// Start command seeded with the given state
    pub fn seeded(host: impl Into<String>, down: bool) -> Self {
        Self { host: host.into(), down, reason: None }
    }

    /// Up transition event
    pub fn up(host: impl Into<String>) -> Self {
        Self::new(host)
    }

    /// Down transition event
    pub fn down(host: impl Into<String>, reason: Option<ProbeError>) -> Self {
        Self { host: host.into(), down: true, reason }
    }

    /// Parse a host token as received from an external command source.
    ///
    /// A trailing [`DOWN_SUFFIX`] seeds the host as down and is stripped
    /// before the token becomes the host key.
    pub fn from_token(token: &str) -> Self {
        let token = token.trim_start();
        match token.strip_suffix(DOWN_SUFFIX) {
            Some(host) => Self::seeded(host.trim(), true),
            None => Self::new(token.trim_end()),
        }
    }

    pub fn state(&self) -> HostState {
        HostState::from_down(self.down)
    }
}

impl std::fmt::Display for HostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.reason, self.down) {
            (Some(reason), true) => write!(f, "DOWN {}: {}", self.host, reason),
            (None, true) => write!(f, "DOWN {}", self.host),
            (_, false) => write!(f, "UP {}", self.host),
        }
    }
}
