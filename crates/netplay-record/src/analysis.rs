//! Offline lag analysis over a run's per-step outcomes.

use indexmap::IndexMap;
use netplay_core::StepOutcome;

/// Aggregate timing statistics for the fresh actions of a run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LagProfile {
    /// Steps inspected.
    pub steps: usize,
    /// Steps resolved with a fallback action.
    pub skipped: usize,
    /// Mean round-trip seconds over fresh actions.
    pub mean_lag_time: Option<f64>,
    /// Median round-trip seconds over fresh actions.
    pub median_lag_time: Option<f64>,
    /// Largest round-trip seconds over fresh actions.
    pub max_lag_time: Option<f64>,
    /// Mean encoded frame size over fresh actions.
    pub mean_frame_size: Option<f64>,
    /// Number of fresh actions per step lag, in first-seen order.
    pub lag_steps_histogram: IndexMap<i64, usize>,
}

impl LagProfile {
    /// Build a profile from outcomes in step order.
    pub fn from_outcomes(outcomes: &[StepOutcome]) -> Self {
        let mut lag_times = Vec::new();
        let mut frame_bytes = 0usize;
        let mut frames = 0usize;
        let mut histogram = IndexMap::new();
        let mut skipped = 0;

        for o in outcomes {
            if o.is_skip {
                skipped += 1;
                continue;
            }
            if let Some(t) = o.lag_time {
                lag_times.push(t);
            }
            if let Some(n) = o.frame_size {
                frame_bytes += n;
                frames += 1;
            }
            if let Some(lag) = o.lag_steps {
                *histogram.entry(lag).or_insert(0) += 1;
            }
        }

        lag_times.sort_by(f64::total_cmp);
        let mean_lag_time = (!lag_times.is_empty())
            .then(|| lag_times.iter().sum::<f64>() / lag_times.len() as f64);
        let median_lag_time = median(&lag_times);
        let max_lag_time = lag_times.last().copied();
        let mean_frame_size = (frames > 0).then(|| frame_bytes as f64 / frames as f64);

        Self {
            steps: outcomes.len(),
            skipped,
            mean_lag_time,
            median_lag_time,
            max_lag_time,
            mean_frame_size,
            lag_steps_histogram: histogram,
        }
    }

    /// Steps resolved with a fresh remote action.
    pub fn fresh(&self) -> usize {
        self.steps - self.skipped
    }
}

fn median(sorted: &[f64]) -> Option<f64> {
    let n = sorted.len();
    match n {
        0 => None,
        _ if n % 2 == 1 => Some(sorted[n / 2]),
        _ => Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0),
    }
}
