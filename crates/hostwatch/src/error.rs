//! Error taxonomy for the monitoring engine.

use std::time::Duration;

use thiserror::Error;

/// Failure of a single probe attempt.
///
/// Never fatal: it feeds the failure counter of the host's monitor and
/// becomes the `reason` of the next Down event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("invalid target {target}: {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to resolve {host}: {reason}")]
    Resolve { host: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("status code is {0}")]
    HttpStatus(u16),

    #[error("TCP connection failed: {0}")]
    Connect(String),

    #[error("ICMP echo failed: {0}")]
    Icmp(String),
}

/// Invalid startup parameters. Only ever surfaced before the pool starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("probe interval must be greater than zero")]
    ZeroInterval,

    #[error("fail limit must be at least 1")]
    ZeroFailLimit,

    #[error("probe timeout ({timeout:?}) must be non-zero and shorter than the interval ({interval:?})")]
    Timeout { timeout: Duration, interval: Duration },

    #[error("channel capacity must be greater than zero")]
    ZeroCapacity,

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Failure inside an external collaborator (loader, receiver, notifier).
///
/// The pool logs these when an adapter task exits; traffic on that adapter's
/// channel simply stops.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("command channel closed")]
    ChannelClosed,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for AdapterError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        AdapterError::ChannelClosed
    }
}
