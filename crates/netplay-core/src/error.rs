//! Error types for the collaborators at the edge of the control loop.
//!
//! Organized by collaborator: environment, observation codec, and
//! transport. Environment and codec errors are fatal to a run; transport
//! errors end the affected transport loop but not the run.

use std::error::Error;
use std::fmt;

/// Errors raised by an [`Environment`](crate::traits::Environment).
///
/// The control loop has no retry policy for simulation failures: any
/// `EnvError` aborts the run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnvError {
    /// `reset()` failed.
    ResetFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// `step()` failed.
    StepFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// The action is not valid for this environment's action space.
    InvalidAction {
        /// Description of the rejected action.
        reason: String,
    },
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResetFailed { reason } => write!(f, "environment reset failed: {reason}"),
            Self::StepFailed { reason } => write!(f, "environment step failed: {reason}"),
            Self::InvalidAction { reason } => write!(f, "invalid action: {reason}"),
        }
    }
}

impl Error for EnvError {}

/// Errors from the observation codec.
///
/// Encoding failure is fatal: a frame with a missing or corrupt
/// observation would make the stream position meaningless to the remote
/// side, so no partial frame is ever sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CodecError {
    /// One plane of the observation could not be encoded.
    EncodeFailed {
        /// Index of the failing plane, if the codec is plane-based.
        plane: Option<usize>,
        /// Human-readable description of the failure.
        reason: String,
    },
    /// Encoded data could not be decoded.
    DecodeFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// The number of encoded planes does not match what the codec expects.
    PlaneCountMismatch {
        /// Planes the codec expects.
        expected: usize,
        /// Planes actually present.
        found: usize,
    },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EncodeFailed { plane, reason } => {
                write!(f, "encode failed")?;
                if let Some(idx) = plane {
                    write!(f, " on plane {idx}")?;
                }
                write!(f, ": {reason}")
            }
            Self::DecodeFailed { reason } => write!(f, "decode failed: {reason}"),
            Self::PlaneCountMismatch { expected, found } => {
                write!(f, "expected {expected} encoded planes, found {found}")
            }
        }
    }
}

impl Error for CodecError {}

/// Errors reported by a transport loop.
///
/// These never abort the pacing loop: the pacing loop does not depend on
/// the transport for anything but frames out and actions in, and copes
/// with their absence through the skip policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportError {
    /// The underlying connection was lost.
    Disconnected {
        /// Description of the disconnect.
        reason: String,
    },
    /// A message could not be sent or received.
    Io {
        /// Description of the I/O failure.
        reason: String,
    },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected { reason } => write!(f, "transport disconnected: {reason}"),
            Self::Io { reason } => write!(f, "transport I/O error: {reason}"),
        }
    }
}

impl Error for TransportError {}
