//! Shared test adapters and probers

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use hostwatch::{
    AdapterError, Command, HostStatus, Notifier, NotifyReceiver, ProbeError, Prober, Receiver, StartSender,
    StopSender,
};
use tokio::sync::mpsc;

/// Per-host scripted outcomes; once a script runs out the host's default applies
#[derive(Default)]
pub struct ScriptedProber {
    scripts: Mutex<HashMap<String, Vec<bool>>>,
    defaults: Mutex<HashMap<String, bool>>,
}

impl ScriptedProber {
    pub fn always(self, host: &str, up: bool) -> Self {
        self.defaults.lock().unwrap().insert(host.to_string(), up);
        self
    }

    pub fn script(self, host: &str, outcomes: &[bool]) -> Self {
        self.scripts.lock().unwrap().insert(host.to_string(), outcomes.to_vec());
        self
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, host: &str) -> Result<Duration, ProbeError> {
        let scripted = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(host)
            .filter(|script| !script.is_empty())
            .map(|script| script.remove(0));
        let up = scripted
            .or_else(|| self.defaults.lock().unwrap().get(host).copied())
            .unwrap_or(true);

        if up {
            Ok(Duration::from_millis(1))
        } else {
            Err(ProbeError::Connect(format!("{host} refused connection")))
        }
    }
}

/// Receiver forwarding commands pushed by the test
pub struct ChannelReceiver {
    commands: Mutex<Option<mpsc::UnboundedReceiver<Command>>>,
}

impl ChannelReceiver {
    pub fn new() -> (Self, mpsc::UnboundedSender<Command>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { commands: Mutex::new(Some(rx)) }, tx)
    }
}

#[async_trait]
impl Receiver for ChannelReceiver {
    async fn receive(&self, start: StartSender, stop: StopSender) -> Result<(), AdapterError> {
        let commands = self.commands.lock().unwrap().take();
        let Some(mut commands) = commands else {
            return Ok(());
        };

        while let Some(command) = commands.recv().await {
            match command {
                Command::Start(status) => start.send(status).await?,
                Command::Stop(status) => stop.send(status).await?,
            }
        }
        Ok(())
    }
}

/// Notifier forwarding every event to the test
pub struct ChannelNotifier(pub mpsc::UnboundedSender<HostStatus>);

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<HostStatus>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self(tx), rx)
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify(&self, mut events: NotifyReceiver) -> Result<(), AdapterError> {
        while let Some(event) = events.recv().await {
            if self.0.send(event).is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// Collect every event that arrives within `window` of (paused) time
pub async fn drain_for(
    rx: &mut mpsc::UnboundedReceiver<HostStatus>,
    window: Duration,
) -> Vec<HostStatus> {
    let deadline = tokio::time::Instant::now() + window;
    let mut events = Vec::new();
    while let Ok(Some(event)) = tokio::time::timeout_at(deadline, rx.recv()).await {
        events.push(event);
    }
    events
}
