use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::ProbeError;
use crate::status::{HostState, HostStatus};

/// Failure-threshold hysteresis for one host.
///
/// Owned by the host's probe loop and nothing else. Emits an event only when
/// the state flips: Down after `fail_limit` consecutive failures, Up on the
/// first success after Down.
#[derive(Debug)]
pub struct StateTracker {
    host: String,
    state: HostState,
    consecutive_failures: u32,
    fail_limit: u32,
    pending_reason: Option<ProbeError>,
}

impl StateTracker {
    /// Seed the tracker from a start command. Seeding never emits.
    pub fn new(seed: &HostStatus, fail_limit: u32) -> Self {
        Self {
            host: seed.host.clone(),
            state: seed.state(),
            consecutive_failures: 0,
            fail_limit: fail_limit.max(1),
            pending_reason: None,
        }
    }

    /// Apply one probe outcome and return the transition event, if any.
    pub fn record(&mut self, outcome: Result<Duration, ProbeError>) -> Option<HostStatus> {
        match outcome {
            Ok(_) => {
                self.consecutive_failures = 0;
                self.pending_reason = None;

                if self.state != HostState::Up {
                    self.state = HostState::Up;
                    info!(host = %self.host, "host is up");
                    return Some(HostStatus::up(self.host.clone()));
                }
                None
            }
            Err(e) => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                debug!(
                    host = %self.host,
                    failures = self.consecutive_failures,
                    limit = self.fail_limit,
                    error = %e,
                    "probe failed"
                );
                self.pending_reason = Some(e);

                if self.consecutive_failures >= self.fail_limit && self.state != HostState::Down {
                    self.state = HostState::Down;
                    let reason = self.pending_reason.clone();
                    warn!(
                        host = %self.host,
                        failures = self.consecutive_failures,
                        reason = ?reason.as_ref().map(ToString::to_string),
                        "host is down"
                    );
                    return Some(HostStatus::down(self.host.clone(), reason));
                }
                None
            }
        }
    }

    pub fn state(&self) -> HostState {
        self.state
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn last_error(&self) -> Option<&ProbeError> {
        self.pending_reason.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok() -> Result<Duration, ProbeError> {
        Ok(Duration::from_millis(3))
    }

    fn fail(n: u16) -> Result<Duration, ProbeError> {
        Err(ProbeError::HttpStatus(500 + n))
    }

    #[test]
    fn test_down_fires_once_at_fail_limit() {
        let mut tracker = StateTracker::new(&HostStatus::new("a"), 3);

        assert_eq!(tracker.record(fail(0)), None);
        assert_eq!(tracker.record(fail(1)), None);
        let event = tracker.record(fail(2)).expect("third failure should emit");
        assert!(event.down);
        assert_eq!(event.reason, Some(ProbeError::HttpStatus(502)));

        for n in 3..10 {
            assert_eq!(tracker.record(fail(n)), None);
        }
        assert_eq!(tracker.state(), HostState::Down);
        assert_eq!(tracker.consecutive_failures(), 10);
    }

    #[test]
    fn test_up_fires_once_after_down() {
        let mut tracker = StateTracker::new(&HostStatus::new("a"), 1);
        assert!(tracker.record(fail(0)).is_some());

        let event = tracker.record(ok()).expect("first success after down should emit");
        assert_eq!(event, HostStatus::up("a"));
        assert_eq!(tracker.record(ok()), None);
        assert_eq!(tracker.record(ok()), None);
    }

    #[test]
    fn test_success_resets_counter() {
        let mut tracker = StateTracker::new(&HostStatus::new("a"), 3);
        tracker.record(fail(0));
        tracker.record(fail(1));
        assert_eq!(tracker.record(ok()), None);
        assert_eq!(tracker.consecutive_failures(), 0);
        assert!(tracker.last_error().is_none());

        assert_eq!(tracker.record(fail(2)), None);
        assert_eq!(tracker.record(fail(3)), None);
        assert!(tracker.record(fail(4)).is_some());
    }

    #[test]
    fn test_seeded_down_then_success_emits_single_up() {
        let mut tracker = StateTracker::new(&HostStatus::seeded("a", true), 3);
        assert_eq!(tracker.state(), HostState::Down);

        let events: Vec<_> = [ok(), ok(), ok()].into_iter().filter_map(|o| tracker.record(o)).collect();
        assert_eq!(events, vec![HostStatus::up("a")]);
    }

    #[test]
    fn test_seeded_down_stays_silent_on_failures() {
        let mut tracker = StateTracker::new(&HostStatus::seeded("a", true), 2);
        for n in 0..5 {
            assert_eq!(tracker.record(fail(n)), None);
        }
    }

    #[test]
    fn test_counter_saturates() {
        let mut tracker = StateTracker::new(&HostStatus::new("a"), 1);
        tracker.consecutive_failures = u32::MAX - 1;
        tracker.record(fail(0));
        tracker.record(fail(1));
        assert_eq!(tracker.consecutive_failures(), u32::MAX);
    }
}
