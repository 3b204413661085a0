//! Contracts for the collaborators that feed and consume the pool.
//!
//! Each adapter runs as its own task. Returning (with or without an error)
//! simply ends that adapter's traffic; the pool logs the outcome and keeps
//! monitoring.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::AdapterError;
use crate::status::HostStatus;

/// Lifecycle command consumed by the pool's control loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start(HostStatus),
    Stop(HostStatus),
}

/// Start handle given to loaders and receivers.
///
/// Start and stop handles feed the same queue, so the control loop handles
/// the commands of one producer in the order they were sent.
#[derive(Debug, Clone)]
pub struct StartSender(mpsc::Sender<Command>);

/// Stop handle given to receivers
#[derive(Debug, Clone)]
pub struct StopSender(mpsc::Sender<Command>);

impl StartSender {
    pub fn new(commands: mpsc::Sender<Command>) -> Self {
        Self(commands)
    }

    /// Queue a start command, waiting for room in the queue
    pub async fn send(&self, status: HostStatus) -> Result<(), AdapterError> {
        Ok(self.0.send(Command::Start(status)).await?)
    }
}

impl StopSender {
    pub fn new(commands: mpsc::Sender<Command>) -> Self {
        Self(commands)
    }

    /// Queue a stop command, only `status.host` is used
    pub async fn send(&self, status: HostStatus) -> Result<(), AdapterError> {
        Ok(self.0.send(Command::Stop(status)).await?)
    }
}

/// Receiving half of the notify channel
pub type NotifyReceiver = mpsc::Receiver<HostStatus>;

/// Seeds the initial host set at boot. Runs once to completion.
///
/// A command may carry `down: true` to restore a previously observed
/// down state.
#[async_trait]
pub trait Loader: Send + Sync {
    async fn load(&self, start: StartSender) -> Result<(), AdapterError>;
}

/// Delivers runtime start/stop commands for the lifetime of the process.
#[async_trait]
pub trait Receiver: Send + Sync {
    async fn receive(&self, start: StartSender, stop: StopSender) -> Result<(), AdapterError>;
}

/// Consumes every up/down transition for the lifetime of the process.
///
/// Events of one host arrive in order; events of different hosts are
/// interleaved arbitrarily.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, events: NotifyReceiver) -> Result<(), AdapterError>;
}

/// Loader over a fixed list of host tokens (see [`HostStatus::from_token`])
pub struct StaticLoader {
    hosts: Vec<String>,
}

impl StaticLoader {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { hosts: hosts.into_iter().map(Into::into).collect() }
    }
}

#[async_trait]
impl Loader for StaticLoader {
    async fn load(&self, start: StartSender) -> Result<(), AdapterError> {
        for token in &self.hosts {
            start.send(HostStatus::from_token(token)).await?;
        }
        Ok(())
    }
}
