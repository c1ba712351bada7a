//! Reading persisted run output back for offline analysis.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use netplay_core::StepOutcome;

use crate::error::RecordError;
use crate::types::{RunSummary, StepRecord};
use crate::{GAME_STATS_FILE, RESULTS_FILE};

/// Parse a `results.json` stream.
pub fn read_results<R: Read>(reader: R) -> Result<RunSummary, RecordError> {
    Ok(serde_json::from_reader(reader)?)
}

/// Parse a `game_stats.json` stream into outcomes, in step order.
pub fn read_game_stats<R: Read>(reader: R) -> Result<Vec<StepOutcome>, RecordError> {
    let records: Vec<StepRecord> = serde_json::from_reader(reader)?;
    Ok(records.into_iter().map(StepOutcome::from).collect())
}

/// A run loaded from a results directory.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedRun {
    /// Contents of `results.json`.
    pub summary: RunSummary,
    /// Contents of `game_stats.json`.
    pub outcomes: Vec<StepOutcome>,
}

impl LoadedRun {
    /// Load both files from `dir`.
    pub fn load(dir: &Path) -> Result<Self, RecordError> {
        let summary = read_results(BufReader::new(File::open(dir.join(RESULTS_FILE))?))?;
        let outcomes = read_game_stats(BufReader::new(File::open(dir.join(GAME_STATS_FILE))?))?;
        Ok(Self { summary, outcomes })
    }

    /// Whether the summary agrees with the per-step records.
    pub fn is_consistent(&self) -> bool {
        let skipped = self.outcomes.iter().filter(|o| o.is_skip).count() as u64;
        self.outcomes.len() as u64 == self.summary.n_steps
            && skipped == self.summary.n_skipped_actions
    }
}
