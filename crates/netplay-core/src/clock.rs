//! Wall-clock timestamps shared with the remote side.
//!
//! Frame timestamps travel to the remote decision-maker and come back on
//! the action, so they must be wall-clock values rather than `Instant`s.
//! Local pacing uses `Instant` and never these values.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in seconds since the UNIX epoch.
///
/// A clock set before 1970 reads as 0.0 rather than failing.
pub fn wall_clock_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
