//! Per-step classification of the action that was applied.

/// What happened to the action slot on one simulation step.
///
/// Exactly one `StepOutcome` is produced per step, in step order. The
/// optional fields are populated only for fresh actions; a skipped step
/// carries no lag or size information.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepOutcome {
    /// `true` if a fallback action was applied.
    pub is_skip: bool,
    /// Steps elapsed between the frame the action answered and this step.
    pub lag_steps: Option<i64>,
    /// Seconds between packaging that frame and receiving the action.
    pub lag_time: Option<f64>,
    /// Encoded size of the frame the action answered.
    pub frame_size: Option<usize>,
}

impl StepOutcome {
    /// Outcome for a step resolved with a fallback action.
    pub fn skipped() -> Self {
        Self {
            is_skip: true,
            lag_steps: None,
            lag_time: None,
            frame_size: None,
        }
    }

    /// Outcome for a step resolved with a fresh remote action.
    pub fn fresh(lag_steps: i64, lag_time: f64, frame_size: usize) -> Self {
        Self {
            is_skip: false,
            lag_steps: Some(lag_steps),
            lag_time: Some(lag_time),
            frame_size: Some(frame_size),
        }
    }
}
