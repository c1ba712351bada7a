//! Collaborator traits: the simulated environment and the observation
//! codec.
//!
//! Neither is implemented by this workspace outside of test fixtures. The
//! control loop only needs `reset`/`step` from the environment and
//! `encode` from the codec; `decode` exists for the remote side and for
//! tests.

use crate::error::{CodecError, EnvError};
use crate::frame::EncodedObservation;

/// Extra per-step information reported by the environment.
///
/// Only the liveness indicator is consumed, and only for the end-of-run
/// report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepInfo {
    /// Lives remaining in the current game, if the environment has lives.
    pub lives: Option<u32>,
}

/// Result of advancing the environment by one step.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition<O> {
    /// Observation after the step.
    pub observation: O,
    /// Reward collected by the step.
    pub reward: f64,
    /// Whether the episode ended with this step.
    pub done: bool,
    /// Liveness and other reporting data.
    pub info: StepInfo,
}

/// A locally simulated, step-driven environment.
///
/// Implementations are assumed locally reliable: any error is fatal to
/// the run.
pub trait Environment: Send {
    /// Observation type produced by `reset` and `step`.
    type Observation;
    /// Action type accepted by `step`.
    type Action: Clone + Send + 'static;

    /// Start a new episode and return its first observation.
    fn reset(&mut self) -> Result<Self::Observation, EnvError>;

    /// Apply `action` and advance one step.
    fn step(&mut self, action: Self::Action) -> Result<Transition<Self::Observation>, EnvError>;

    /// The action applied when no usable remote action exists.
    fn noop_action(&self) -> Self::Action;

    /// Draw the current state to a display, if the environment has one.
    fn render(&mut self) {}
}

/// Compresses observations for transmission.
pub trait ObservationCodec<O>: Send {
    /// Encode an observation into one or more byte planes.
    fn encode(&self, observation: &O) -> Result<EncodedObservation, CodecError>;

    /// Decode planes produced by [`encode`](ObservationCodec::encode).
    fn decode(&self, planes: &EncodedObservation) -> Result<O, CodecError>;
}
