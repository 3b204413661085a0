//! Orchestrator: owns the host registry and serializes every lifecycle
//! transition over it.
//!
//! The registry is a plain `HashMap` owned by a single control-loop task.
//! Start and stop commands arrive over one bounded queue and are handled one
//! at a time in arrival order, so no lock is ever taken. Monitors write their
//! transitions straight onto the shared notify channel.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::adapters::{Command, Loader, Notifier, Receiver, StartSender, StopSender};
use crate::error::{AdapterError, ConfigError};
use crate::monitor::{Monitor, MonitorSettings};
use crate::probe::Prober;
use crate::status::HostStatus;

/// Default capacity of the command queue and the notify channel
pub const DEFAULT_CHANNEL_CAPACITY: usize = 10;

/// Monitoring parameters of a pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Time between two probes of the same host
    pub interval: Duration,
    /// Consecutive failed probes before a host is declared down
    pub fail_limit: u32,
    /// Budget of a single probe attempt, must be below `interval`
    pub timeout: Duration,
    pub channel_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            fail_limit: 6,
            timeout: Duration::from_secs(5),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl PoolConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        if self.fail_limit == 0 {
            return Err(ConfigError::ZeroFailLimit);
        }
        if self.timeout.is_zero() || self.timeout >= self.interval {
            return Err(ConfigError::Timeout { timeout: self.timeout, interval: self.interval });
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }

    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings { interval: self.interval, fail_limit: self.fail_limit }
    }
}

/// The monitoring engine with its configured adapters
pub struct Pool {
    config: PoolConfig,
    prober: Arc<dyn Prober>,
    loader: Option<Box<dyn Loader>>,
    receiver: Option<Box<dyn Receiver>>,
    notifier: Option<Box<dyn Notifier>>,
}

impl Pool {
    pub fn new(config: PoolConfig, prober: Arc<dyn Prober>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, prober, loader: None, receiver: None, notifier: None })
    }

    pub fn with_loader(mut self, loader: impl Loader + 'static) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }

    pub fn with_receiver(mut self, receiver: impl Receiver + 'static) -> Self {
        self.receiver = Some(Box::new(receiver));
        self
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Some(Box::new(notifier));
        self
    }

    /// Create the channels, launch the adapters and the control loop.
    ///
    /// Must be called from within a tokio runtime. The pool runs until
    /// [`PoolHandle::shutdown`] is called or the handle is dropped.
    pub fn start(self) -> PoolHandle {
        let capacity = self.config.channel_capacity;
        let (command_tx, command_rx) = mpsc::channel::<Command>(capacity);
        let (notify_tx, mut notify_rx) = mpsc::channel::<HostStatus>(capacity);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let mut adapters = Vec::new();

        if let Some(loader) = self.loader {
            let start = StartSender::new(command_tx.clone());
            adapters.push(spawn_adapter("loader", async move { loader.load(start).await }));
        }

        match self.notifier {
            Some(notifier) => {
                adapters.push(spawn_adapter("notifier", async move { notifier.notify(notify_rx).await }));
            }
            None => {
                // Nobody consumes events: drain so monitors never block on a full channel
                adapters.push(tokio::spawn(async move {
                    while let Some(event) = notify_rx.recv().await {
                        debug!("unconsumed transition: {event}");
                    }
                }));
            }
        }

        if let Some(receiver) = self.receiver {
            let start = StartSender::new(command_tx.clone());
            let stop = StopSender::new(command_tx.clone());
            adapters.push(spawn_adapter("receiver", async move { receiver.receive(start, stop).await }));
        }
        // The queue closes once every adapter holding a handle is gone
        drop(command_tx);

        let registry = Registry::new(self.config.monitor_settings(), self.prober, notify_tx);
        let control = tokio::spawn(registry.run(command_rx, shutdown_rx));

        info!(
            interval = ?self.config.interval,
            fail_limit = self.config.fail_limit,
            timeout = ?self.config.timeout,
            "monitoring pool started"
        );

        PoolHandle { shutdown_tx, control, adapters }
    }
}

fn spawn_adapter<F>(name: &'static str, adapter: F) -> JoinHandle<()>
where
    F: Future<Output = Result<(), AdapterError>> + Send + 'static,
{
    tokio::spawn(async move {
        match adapter.await {
            Ok(()) => info!(adapter = name, "adapter finished"),
            Err(e) => error!(adapter = name, "adapter exited with error: {e}"),
        }
    })
}

/// Handle on a running pool
pub struct PoolHandle {
    shutdown_tx: oneshot::Sender<()>,
    control: JoinHandle<()>,
    adapters: Vec<JoinHandle<()>>,
}

impl PoolHandle {
    /// Stop every monitor, wait for the control loop to exit and abort the
    /// adapter tasks.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());

        if let Err(e) = self.control.await {
            error!("control loop terminated abnormally: {e}");
        }

        for adapter in self.adapters {
            adapter.abort();
        }
        info!("monitoring pool stopped");
    }
}

/// Host key to monitor mapping, touched only by the control loop
struct Registry {
    settings: MonitorSettings,
    prober: Arc<dyn Prober>,
    notify_tx: mpsc::Sender<HostStatus>,
    monitors: HashMap<String, Monitor>,
}

impl Registry {
    fn new(settings: MonitorSettings, prober: Arc<dyn Prober>, notify_tx: mpsc::Sender<HostStatus>) -> Self {
        Self { settings, prober, notify_tx, monitors: HashMap::new() }
    }

    async fn run(mut self, mut commands: mpsc::Receiver<Command>, mut shutdown_rx: oneshot::Receiver<()>) {
        let mut commands_open = true;

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown_rx => break,

                command = commands.recv(), if commands_open => match command {
                    Some(Command::Start(status)) => self.start(status).await,
                    Some(Command::Stop(status)) => self.stop(&status.host).await,
                    None => {
                        debug!("command queue closed");
                        commands_open = false;
                    }
                },
            }
        }

        self.stop_all().await;
    }

    /// Start a new monitor, or restart an existing one with `status` as seed
    async fn start(&mut self, status: HostStatus) {
        match self.monitors.get_mut(&status.host) {
            Some(monitor) => {
                info!(host = %status.host, down = status.down, "RESTART monitoring");
                monitor.start(self.settings, &status).await;
            }
            None => {
                info!(host = %status.host, down = status.down, "NEW host");
                let mut monitor =
                    Monitor::new(status.host.clone(), self.prober.clone(), self.notify_tx.clone());
                monitor.start(self.settings, &status).await;
                self.monitors.insert(status.host, monitor);
            }
        }
    }

    /// Deactivate a monitor. The record stays in the registry.
    async fn stop(&mut self, host: &str) {
        match self.monitors.get_mut(host) {
            Some(monitor) => {
                info!(host, "STOP monitoring");
                monitor.stop().await;
            }
            None => warn!(host, "cannot stop, host not found"),
        }
    }

    async fn stop_all(&mut self) {
        let mut stopped = 0usize;
        for monitor in self.monitors.values_mut() {
            if monitor.stop().await.is_some() {
                stopped += 1;
            }
        }
        info!(stopped, registered = self.monitors.len(), "control loop exited");
    }

    #[cfg(test)]
    fn active(&self) -> usize {
        self.monitors.values().filter(|m| m.is_running()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProbeError;
    use async_trait::async_trait;

    struct AlwaysUp;

    #[async_trait]
    impl Prober for AlwaysUp {
        async fn probe(&self, _host: &str) -> Result<Duration, ProbeError> {
            Ok(Duration::ZERO)
        }
    }

    fn registry() -> (Registry, mpsc::Receiver<HostStatus>) {
        let (tx, rx) = mpsc::channel(10);
        let settings = MonitorSettings { interval: Duration::from_secs(10), fail_limit: 3 };
        (Registry::new(settings, Arc::new(AlwaysUp), tx), rx)
    }

    #[test]
    fn test_config_defaults_are_valid() {
        assert!(PoolConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_rejects_timeout_not_below_interval() {
        let config = PoolConfig { timeout: Duration::from_secs(10), ..PoolConfig::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Timeout { .. })));
    }

    #[test]
    fn test_config_rejects_zero_values() {
        let zero_limit = PoolConfig { fail_limit: 0, ..PoolConfig::default() };
        assert!(matches!(zero_limit.validate(), Err(ConfigError::ZeroFailLimit)));

        let zero_interval = PoolConfig { interval: Duration::ZERO, ..PoolConfig::default() };
        assert!(matches!(zero_interval.validate(), Err(ConfigError::ZeroInterval)));

        let zero_capacity = PoolConfig { channel_capacity: 0, ..PoolConfig::default() };
        assert!(matches!(zero_capacity.validate(), Err(ConfigError::ZeroCapacity)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_unknown_host_is_noop() {
        let (mut registry, _rx) = registry();
        registry.stop("nowhere.example").await;
        assert!(registry.monitors.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_record_is_kept_and_reused() {
        let (mut registry, _rx) = registry();

        registry.start(HostStatus::new("a")).await;
        assert_eq!(registry.active(), 1);

        registry.stop("a").await;
        assert_eq!(registry.monitors.len(), 1);
        assert_eq!(registry.active(), 0);

        registry.start(HostStatus::new("a")).await;
        assert_eq!(registry.monitors.len(), 1);
        assert_eq!(registry.active(), 1);

        registry.stop_all().await;
        assert_eq!(registry.active(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_keeps_single_record() {
        let (mut registry, _rx) = registry();

        registry.start(HostStatus::new("a")).await;
        registry.start(HostStatus::seeded("a", true)).await;
        registry.start(HostStatus::new("b")).await;

        assert_eq!(registry.monitors.len(), 2);
        assert_eq!(registry.active(), 2);
        registry.stop_all().await;
    }
}
