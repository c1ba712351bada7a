//! Pacing metrics for a run.
//!
//! [`PacingMetrics`] accumulates how the loop spent its step budget:
//! time doing work, time sleeping, and how often the work alone
//! exceeded the step interval.

/// Timing totals collected by the pacing controller.
///
/// All durations are in microseconds. Only single-slot mode sleeps, so
/// in streaming mode `sleep_us` stays zero and `wait_us` records time
/// blocked on the inbound queue instead.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PacingMetrics {
    /// Paced ticks observed.
    pub ticks: u64,
    /// Ticks whose processing time exceeded the step interval.
    pub overruns: u64,
    /// Largest amount by which a tick exceeded the interval.
    pub worst_overrun_us: u64,
    /// Total time spent sleeping to hold the rate.
    pub sleep_us: u64,
    /// Total time spent waiting for an action (streaming mode).
    pub wait_us: u64,
    /// Largest processing time of a single tick.
    pub max_busy_us: u64,
}

impl PacingMetrics {
    /// Record one paced tick that took `busy_us` against `interval_us`.
    ///
    /// Returns `true` if the tick overran.
    pub(crate) fn record_tick(&mut self, busy_us: u64, interval_us: u64) -> bool {
        self.ticks += 1;
        self.max_busy_us = self.max_busy_us.max(busy_us);
        if busy_us > interval_us {
            self.overruns += 1;
            self.worst_overrun_us = self.worst_overrun_us.max(busy_us - interval_us);
            true
        } else {
            self.sleep_us += interval_us - busy_us;
            false
        }
    }

    /// Record time spent blocked on the inbound queue.
    pub(crate) fn record_wait(&mut self, wait_us: u64) {
        self.ticks += 1;
        self.wait_us += wait_us;
    }
}
