//! Core types and traits for the netplay control loop.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the records that cross the transport boundary (frames and action
//! envelopes), the per-step outcome record, typed ids, the collaborator
//! traits (environment and codec), and their error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod clock;
pub mod error;
pub mod frame;
pub mod id;
pub mod outcome;
pub mod traits;

pub use error::{CodecError, EnvError, TransportError};
pub use frame::{ActionEnvelope, EncodedObservation, Frame, RemoteAction};
pub use id::{EpisodeId, StepId};
pub use outcome::StepOutcome;
pub use traits::{Environment, ObservationCodec, StepInfo, Transition};
