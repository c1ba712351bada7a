//! Skip/fallback policy.
//!
//! Given whatever the inbound adapter yielded for this step, the
//! [`ActionResolver`] decides which action is applied and classifies the
//! step as fresh or skipped:
//!
//! 1. An envelope from an earlier episode is discarded as if absent.
//! 2. With no usable envelope the skip count grows; within the tolerance
//!    the previous action repeats, beyond it the no-op is applied.
//! 3. A usable envelope resets the skip count, becomes the new previous
//!    action, and its lag is measured.
//!
//! An envelope whose episode id equals the current one is usable even if
//! it was computed for a frame packaged in the same tick as the reset.

use netplay_core::{ActionEnvelope, StepId, StepOutcome};
use tracing::debug;

use crate::episode::Episode;

/// The decision for one step.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution<A> {
    /// Action to apply.
    pub action: A,
    /// Classification recorded for the step.
    pub outcome: StepOutcome,
    /// Whether an envelope was dropped for belonging to an older episode.
    pub discarded_stale: bool,
}

/// Applies the skip/fallback policy against an [`Episode`].
#[derive(Clone, Debug)]
pub struct ActionResolver<A> {
    tolerance: u32,
    noop: A,
}

impl<A: Clone> ActionResolver<A> {
    /// Create a resolver that repeats the previous action for up to
    /// `tolerance` consecutive misses before applying `noop`.
    pub fn new(tolerance: u32, noop: A) -> Self {
        Self { tolerance, noop }
    }

    /// Repeat budget.
    pub fn tolerance(&self) -> u32 {
        self.tolerance
    }

    /// Decide the action for `step_id`, updating `episode`.
    pub fn resolve(
        &self,
        candidate: Option<ActionEnvelope<A>>,
        step_id: StepId,
        episode: &mut Episode<A>,
    ) -> Resolution<A> {
        let mut discarded_stale = false;
        let usable = candidate.filter(|envelope| {
            if envelope.episode_id < episode.id {
                debug!(
                    step = %step_id,
                    envelope_episode = %envelope.episode_id,
                    current_episode = %episode.id,
                    "discarding stale action"
                );
                discarded_stale = true;
                false
            } else {
                true
            }
        });

        match usable {
            None => {
                episode.skip_count = episode.skip_count.saturating_add(1);
                let action = if episode.skip_count <= self.tolerance {
                    episode.previous_action.clone()
                } else {
                    self.noop.clone()
                };
                Resolution {
                    action,
                    outcome: StepOutcome::skipped(),
                    discarded_stale,
                }
            }
            Some(envelope) => {
                episode.skip_count = 0;
                let outcome = StepOutcome::fresh(
                    step_id.steps_since(envelope.step_id),
                    envelope.lag_time(),
                    envelope.byte_size,
                );
                episode.previous_action = envelope.action.clone();
                Resolution {
                    action: envelope.action,
                    outcome,
                    discarded_stale,
                }
            }
        }
    }
}
