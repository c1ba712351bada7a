//! Persisted output for netplay sessions.
//!
//! A finished run leaves two JSON files in its results directory:
//!
//! - `results.json`: the [`RunSummary`] totals, four-space indented with
//!   sorted keys
//! - `game_stats.json`: one [`StepRecord`] per executed step, in step order
//!
//! # Architecture
//!
//! - [`RunRecorder`] writes both files into a directory
//! - [`LoadedRun`] reads them back
//! - [`LagProfile`] summarizes lag and frame size for offline analysis

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod analysis;
pub mod error;
pub mod reader;
pub mod types;
pub mod writer;

pub use analysis::LagProfile;
pub use error::RecordError;
pub use reader::{read_game_stats, read_results, LoadedRun};
pub use types::{RunSummary, StepRecord};
pub use writer::{write_game_stats, write_results, RecordPaths, RunRecorder};

/// File name of the run summary.
pub const RESULTS_FILE: &str = "results.json";

/// File name of the per-step outcome list.
pub const GAME_STATS_FILE: &str = "game_stats.json";

/// File name of the latency probe's output.
pub const PING_FILE: &str = "ping.txt";
