//! Serialized shapes of the two output files.
//!
//! Field declaration order is alphabetical so that the serialized JSON
//! objects come out with sorted keys, which downstream tooling diffs.

use netplay_core::StepOutcome;
use serde::{Deserialize, Serialize};

/// End-of-run totals, persisted as `results.json`.
///
/// # Examples
///
/// ```
/// use netplay_record::RunSummary;
///
/// let summary = RunSummary {
///     lives_remaining: Some(3),
///     n_skipped_actions: 4,
///     n_steps: 20,
///     total_games: 1,
///     total_score: 12.0,
/// };
/// assert_eq!(summary.fresh_actions(), 16);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Lives reported by the environment after the final step.
    pub lives_remaining: Option<u32>,
    /// Steps resolved with a fallback action.
    pub n_skipped_actions: u64,
    /// Steps executed.
    pub n_steps: u64,
    /// Episodes that reached a terminal state during the run.
    pub total_games: u64,
    /// Reward summed over every step of the run.
    pub total_score: f64,
}

impl RunSummary {
    /// Steps resolved with a fresh remote action.
    pub fn fresh_actions(&self) -> u64 {
        self.n_steps.saturating_sub(self.n_skipped_actions)
    }

    /// Fraction of steps that fell back, or 0.0 for an empty run.
    pub fn skip_rate(&self) -> f64 {
        if self.n_steps == 0 {
            0.0
        } else {
            self.n_skipped_actions as f64 / self.n_steps as f64
        }
    }
}

/// One step's outcome as persisted in `game_stats.json`.
///
/// Uses the field names of the analysis scripts that consume the file,
/// which differ from [`StepOutcome`]'s.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Encoded size of the answered frame, `null` for a skip.
    pub frame_size: Option<usize>,
    /// Whether a fallback action was applied.
    pub is_skip_action: bool,
    /// Step lag of the applied action, `null` for a skip.
    pub lag_n_frames: Option<i64>,
    /// Round-trip seconds of the applied action, `null` for a skip.
    pub lag_time: Option<f64>,
}

impl From<&StepOutcome> for StepRecord {
    fn from(o: &StepOutcome) -> Self {
        Self {
            frame_size: o.frame_size,
            is_skip_action: o.is_skip,
            lag_n_frames: o.lag_steps,
            lag_time: o.lag_time,
        }
    }
}

impl From<StepRecord> for StepOutcome {
    fn from(r: StepRecord) -> Self {
        Self {
            is_skip: r.is_skip_action,
            lag_steps: r.lag_n_frames,
            lag_time: r.lag_time,
            frame_size: r.frame_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_keys_serialize_sorted() {
        let summary = RunSummary {
            lives_remaining: None,
            n_skipped_actions: 2,
            n_steps: 10,
            total_games: 0,
            total_score: 1.5,
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert_eq!(
            json,
            r#"{"lives_remaining":null,"n_skipped_actions":2,"n_steps":10,"total_games":0,"total_score":1.5}"#
        );
    }

    #[test]
    fn skip_record_uses_downstream_names_and_nulls() {
        let record = StepRecord::from(&StepOutcome::skipped());
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"frame_size":null,"is_skip_action":true,"lag_n_frames":null,"lag_time":null}"#
        );
    }

    #[test]
    fn fresh_record_converts_back_to_outcome() {
        let outcome = StepOutcome::fresh(1, 0.04, 2048);
        let record = StepRecord::from(&outcome);
        assert_eq!(record.lag_n_frames, Some(1));
        assert_eq!(record.frame_size, Some(2048));
        assert_eq!(StepOutcome::from(record), outcome);
    }

    #[test]
    fn skip_rate_handles_empty_run() {
        assert_eq!(RunSummary::default().skip_rate(), 0.0);
        let s = RunSummary {
            n_steps: 8,
            n_skipped_actions: 2,
            ..RunSummary::default()
        };
        assert_eq!(s.skip_rate(), 0.25);
        assert_eq!(s.fresh_actions(), 6);
    }
}
