//! Running statistics over completed sends.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::sender::SendOutcome;

/// A consistent point-in-time copy of the collected statistics.
///
/// Also the wire shape of the monitor's `GET /statistics` response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_messages: u64,
    pub success_messages: u64,
    /// Arithmetic mean of every delay folded in so far, in seconds.
    pub average_delay: f64,
}

/// Collects outcome reports from all senders concurrently.
///
/// One mutex guards all three counters: a [`record`](Self::record) must be
/// atomic as a whole, otherwise a concurrent reader could see
/// `total_messages` advanced without the matching `average_delay` update and
/// the running mean would be corrupted. Report volume is bounded by sender
/// count and per-message delay, so the single critical section is nowhere
/// near contention.
///
/// The running average keeps full `f64` precision; rounding is left to
/// presentation.
#[derive(Debug, Default)]
pub struct StatsCollector {
    inner: Mutex<StatsSnapshot>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one outcome into the counters.
    pub fn record(&self, outcome: &SendOutcome) {
        let mut stats = self
            .inner
            .lock()
            .expect("should not panic while holding lock");

        stats.average_delay = (stats.average_delay * stats.total_messages as f64
            + outcome.delay)
            / (stats.total_messages as f64 + 1.0);
        if outcome.success {
            stats.success_messages += 1;
        }
        stats.total_messages += 1;
    }

    /// Take a consistent snapshot of all three counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        *self
            .inner
            .lock()
            .expect("should not panic while holding lock")
    }

    /// Zero every counter. For tests and runbook use, not steady state.
    pub fn reset(&self) {
        *self
            .inner
            .lock()
            .expect("should not panic while holding lock") = StatsSnapshot::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;

    fn outcome(success: bool, delay: f64) -> SendOutcome {
        SendOutcome {
            message: Message::new("not random", "5555555555"),
            success,
            delay,
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn sequential_fold_tracks_the_running_mean() {
        let stats = StatsCollector::new();

        let reports = [(true, 0.5), (true, 1.2), (false, 0.4), (false, 1.1)];
        let expected_averages = [0.5, 0.85, 0.7, 0.8];
        let expected_successes = [1, 2, 2, 2];

        for (i, (success, delay)) in reports.into_iter().enumerate() {
            stats.record(&outcome(success, delay));

            let snapshot = stats.snapshot();
            assert_eq!(snapshot.total_messages, i as u64 + 1);
            assert_eq!(snapshot.success_messages, expected_successes[i]);
            assert_close(snapshot.average_delay, expected_averages[i]);
        }
    }

    #[test]
    fn reset_zeroes_everything() {
        let stats = StatsCollector::new();
        stats.record(&outcome(true, 2.5));
        stats.record(&outcome(false, 0.5));

        stats.reset();

        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn snapshot_of_an_empty_collector_is_zeroed() {
        let stats = StatsCollector::new();
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_messages, 0);
        assert_eq!(snapshot.success_messages, 0);
        assert_close(snapshot.average_delay, 0.0);
    }
}
