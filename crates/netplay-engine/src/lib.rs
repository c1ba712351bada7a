//! Real-time control loop for a locally simulated environment driven by a
//! remote decision-maker.
//!
//! The [`PacingController`] advances the environment at a fixed step rate,
//! streaming encoded observations out and applying whatever actions come
//! back, possibly late and possibly never. Two queuing disciplines are
//! supported (see [`QueueMode`]):
//!
//! - **Single-slot**: latest-wins slots on both sides; the loop sleeps to
//!   hold the rate and never waits for the network.
//! - **Streaming**: unbounded FIFO queues; every frame is sent and the loop
//!   waits for one action per step until the run's deadline.
//!
//! [`GameSession`] wires the loop to a transport's send and receive loops
//! on their own threads and persists results at the end.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod episode;
pub mod error;
pub mod inbound;
pub mod loopback;
pub mod metrics;
pub mod outbound;
pub mod pacing;
pub mod packager;
pub mod probe;
pub mod resolver;
pub mod session;
pub mod slot;
pub mod stats;
pub mod transport;

pub use config::{ConfigError, PlayConfig, ProbeCommand, ProbeConfig, QueueMode};
pub use episode::{Episode, EpisodeManager};
pub use error::PlayError;
pub use inbound::{ActionSink, InboundChannel, InboundCloser, SinkClosed, Wait};
pub use loopback::{loopback, LinkProfile, LoopbackDownlink, LoopbackUplink, RemoteAgent};
pub use metrics::PacingMetrics;
pub use outbound::{FrameSource, OutboundChannel, Pull};
pub use pacing::{LoopState, PacingController, RunReport, StopReason, TickRecord};
pub use packager::FramePackager;
pub use probe::{LatencyProbe, ProbeExit};
pub use resolver::{ActionResolver, Resolution};
pub use session::{GameSession, SessionOutcome, SessionReport};
pub use slot::LatestSlot;
pub use stats::{EpisodeTally, RunStats, StatsAggregator};
pub use transport::{Downlink, Uplink};
