/// Per-host monitor - runs one periodic probe loop and emits transitions
///
/// This module is responsible for:
/// - Scheduling probes at a fixed interval (first probe fires immediately)
/// - Applying the consecutive-failure threshold
/// - Stopping the loop synchronously so a restart never overlaps
pub mod tracker;

pub use tracker::StateTracker;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior, interval};
use tracing::{debug, error, warn};

use crate::probe::Prober;
use crate::status::HostStatus;

/// Probe scheduling parameters shared by every monitor of a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    pub interval: Duration,
    pub fail_limit: u32,
}

/// Handle on a running probe loop
struct ProbeLoop {
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<StateTracker>,
}

/// Registry entry for one host.
///
/// The probe state ([`StateTracker`]) lives inside the loop task; the
/// monitor only keeps the cancellation handle. A stopped monitor stays
/// inert until started again.
pub struct Monitor {
    host: String,
    prober: Arc<dyn Prober>,
    notify_tx: mpsc::Sender<HostStatus>,
    running: Option<ProbeLoop>,
}

impl Monitor {
    pub fn new(
        host: impl Into<String>,
        prober: Arc<dyn Prober>,
        notify_tx: mpsc::Sender<HostStatus>,
    ) -> Self {
        Self { host: host.into(), prober, notify_tx, running: None }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Start probing with a fresh failure counter, seeded from `seed.down`.
    ///
    /// A loop that is still running is stopped first and awaited, so two
    /// loops never run for the same host.
    pub async fn start(&mut self, settings: MonitorSettings, seed: &HostStatus) {
        self.stop().await;

        let tracker = StateTracker::new(seed, settings.fail_limit);
        let (stop_tx, stop_rx) = oneshot::channel();

        let task = tokio::spawn(run_probe_loop(
            self.host.clone(),
            self.prober.clone(),
            self.notify_tx.clone(),
            settings.interval,
            tracker,
            stop_rx,
        ));

        self.running = Some(ProbeLoop { stop_tx, task });
    }

    /// Stop the probe loop and wait until its task has exited.
    ///
    /// Returns the final probe state of the loop, or `None` when the monitor
    /// was not running. Never emits an event.
    pub async fn stop(&mut self) -> Option<StateTracker> {
        let ProbeLoop { stop_tx, task } = self.running.take()?;

        // The loop may already be gone if it panicked; the join below reports it
        let _ = stop_tx.send(());

        match task.await {
            Ok(tracker) => {
                debug!(
                    host = %self.host,
                    state = %tracker.state(),
                    failures = tracker.consecutive_failures(),
                    "probe loop stopped"
                );
                Some(tracker)
            }
            Err(e) => {
                error!(host = %self.host, "probe loop terminated abnormally: {e}");
                None
            }
        }
    }
}

async fn run_probe_loop(
    host: String,
    prober: Arc<dyn Prober>,
    notify_tx: mpsc::Sender<HostStatus>,
    period: Duration,
    mut tracker: StateTracker,
    mut stop_rx: oneshot::Receiver<()>,
) -> StateTracker {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            // Fires on an explicit stop and when the monitor is dropped
            _ = &mut stop_rx => break,

            _ = tick(&host, prober.as_ref(), &notify_tx, &mut ticker, &mut tracker) => {}
        }
    }

    tracker
}

/// Wait for the next tick, probe once and forward any transition.
///
/// Cancelled as a whole on stop, including a pending probe or a send
/// blocked on a full notify channel.
async fn tick(
    host: &str,
    prober: &dyn Prober,
    notify_tx: &mpsc::Sender<HostStatus>,
    ticker: &mut Interval,
    tracker: &mut StateTracker,
) {
    ticker.tick().await;

    let outcome = prober.probe(host).await;

    if let Some(event) = tracker.record(outcome) {
        if notify_tx.send(event).await.is_err() {
            warn!(host, "notify channel closed, dropping transition");
        }
    }
}
