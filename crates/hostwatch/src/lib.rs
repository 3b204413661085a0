//! Hostwatch - host availability monitoring engine
//!
//! Probes a dynamic set of targets (hostnames, IPs, `host:port` pairs or
//! URLs) at a fixed interval and emits edge-triggered up/down events once a
//! consecutive-failure threshold is crossed.
//!
//! The [`Pool`] owns one [`Monitor`] per host and is driven by pluggable
//! adapters: a [`Loader`] seeds hosts at boot, a [`Receiver`] delivers
//! runtime start/stop commands and a [`Notifier`] consumes transitions.

pub mod adapters;
pub mod error;
pub mod monitor;
pub mod pool;
pub mod probe;
pub mod status;

// Re-export main types
pub use adapters::{
    Command, Loader, Notifier, NotifyReceiver, Receiver, StartSender, StaticLoader, StopSender,
};
pub use error::{AdapterError, ConfigError, ProbeError};
pub use monitor::{Monitor, MonitorSettings};
pub use pool::{Pool, PoolConfig, PoolHandle};
pub use probe::{CheckType, ProbeDispatcher, Prober, Target};
pub use status::{HostState, HostStatus};
