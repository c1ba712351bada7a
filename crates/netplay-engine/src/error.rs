//! Run-level error type.

use std::error::Error;
use std::fmt;
use std::io;

use netplay_core::{CodecError, EnvError};
use netplay_record::RecordError;

use crate::config::ConfigError;

/// Errors that end a run.
///
/// Transport failures are not represented: they end the affected
/// transport thread and are reported in the
/// [`SessionReport`](crate::session::SessionReport), while the pacing loop
/// carries on with fallback actions.
#[derive(Debug)]
pub enum PlayError {
    /// The configuration failed validation.
    Config(ConfigError),
    /// The environment failed to reset or step.
    Environment(EnvError),
    /// An observation could not be encoded.
    Codec(CodecError),
    /// Results could not be persisted.
    Record(RecordError),
    /// The latency probe could not be started.
    Probe(io::Error),
    /// A transport thread could not be spawned.
    ThreadSpawn {
        /// Which thread failed, and why.
        reason: String,
    },
}

impl fmt::Display for PlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Environment(e) => write!(f, "environment: {e}"),
            Self::Codec(e) => write!(f, "codec: {e}"),
            Self::Record(e) => write!(f, "record: {e}"),
            Self::Probe(e) => write!(f, "latency probe: {e}"),
            Self::ThreadSpawn { reason } => write!(f, "thread spawn failed: {reason}"),
        }
    }
}

impl Error for PlayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Environment(e) => Some(e),
            Self::Codec(e) => Some(e),
            Self::Record(e) => Some(e),
            Self::Probe(e) => Some(e),
            Self::ThreadSpawn { .. } => None,
        }
    }
}

impl From<ConfigError> for PlayError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<EnvError> for PlayError {
    fn from(e: EnvError) -> Self {
        Self::Environment(e)
    }
}

impl From<CodecError> for PlayError {
    fn from(e: CodecError) -> Self {
        Self::Codec(e)
    }
}

impl From<RecordError> for PlayError {
    fn from(e: RecordError) -> Self {
        Self::Record(e)
    }
}
