//! Strongly-typed identifiers for simulation steps and episodes.

use std::fmt;

/// Monotonically increasing simulation step counter.
///
/// Assigned by the pacing loop, starting at 0 for the first step of the
/// run. Step ids keep increasing across episode boundaries; they index the
/// run, not the episode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepId(pub u64);

impl StepId {
    /// The step that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Number of steps between `earlier` and `self`.
    ///
    /// Signed because a misbehaving remote can echo a step id from the
    /// future; callers record whatever the arithmetic says.
    pub fn steps_since(self, earlier: StepId) -> i64 {
        self.0 as i64 - earlier.0 as i64
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for StepId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Identifies one episode (game) of the simulated environment.
///
/// Starts at 0 on the first reset and is incremented by exactly one at
/// every episode boundary. Carried on every frame and echoed back on every
/// action so that actions computed for a finished episode can be detected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EpisodeId(pub u64);

impl EpisodeId {
    /// The episode that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EpisodeId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
