//! Netplay: run a locally simulated environment in real time against a
//! remote decision-maker reachable only over a network.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all netplay sub-crates. For most users, adding `netplay` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use netplay::prelude::*;
//! use netplay::engine::loopback;
//! use netplay_test_utils::{PassthroughCodec, ScriptedEnv};
//!
//! let config = PlayConfig {
//!     steps_per_second: 50,
//!     time_limit_secs: 1,
//!     ..PlayConfig::default()
//! };
//! // A remote side that always answers with action 1.
//! let (uplink, downlink) = loopback(|_: &Frame| Some(1u8), LinkProfile::default());
//! let outcome = GameSession::new(config, ScriptedEnv::new(), PassthroughCodec)
//!     .run(uplink, downlink)
//!     .unwrap();
//! assert_eq!(outcome.report.summary().n_steps, 50);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `netplay-core` | Frames, envelopes, ids, outcomes, collaborator traits |
//! | [`engine`] | `netplay-engine` | Pacing loop, queuing adapters, sessions, transports |
//! | [`record`] | `netplay-record` | Results files and offline lag analysis |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and ids (`netplay-core`).
///
/// Contains the wire records ([`types::Frame`], [`types::RemoteAction`],
/// [`types::ActionEnvelope`]), [`types::StepOutcome`], and the
/// collaborator traits ([`types::Environment`], [`types::ObservationCodec`]).
pub use netplay_core as types;

/// The real-time control loop (`netplay-engine`).
///
/// [`engine::PacingController`] for driving the loop directly,
/// [`engine::GameSession`] for running it against a transport.
pub use netplay_engine as engine;

/// Persisted results and lag analysis (`netplay-record`).
///
/// Write runs with [`record::RunRecorder`], read them back with
/// [`record::LoadedRun`], and summarise timing with
/// [`record::LagProfile`].
pub use netplay_record as record;

/// Common imports for typical netplay usage.
///
/// ```rust
/// use netplay::prelude::*;
/// ```
///
/// This imports the session and controller types, configuration, the
/// collaborator traits, the wire records, and the results types.
pub mod prelude {
    // Core records and traits
    pub use netplay_core::{
        ActionEnvelope, EncodedObservation, Environment, EpisodeId, Frame, ObservationCodec,
        RemoteAction, StepId, StepInfo, StepOutcome, Transition,
    };

    // Errors
    pub use netplay_core::{CodecError, EnvError, TransportError};
    pub use netplay_engine::{ConfigError, PlayError};

    // Engine
    pub use netplay_engine::{
        ActionSink, Downlink, FrameSource, GameSession, LinkProfile, PacingController,
        PlayConfig, ProbeConfig, QueueMode, RunReport, SessionOutcome, StopReason, Uplink,
    };

    // Results
    pub use netplay_record::{LagProfile, LoadedRun, RunRecorder, RunSummary};
}
