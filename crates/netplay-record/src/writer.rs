//! Results writers.
//!
//! The stream-level functions are generic over `W: Write` so tests can
//! target a `Vec<u8>`; [`RunRecorder`] binds them to the two files of a
//! results directory.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use netplay_core::StepOutcome;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::RecordError;
use crate::types::{RunSummary, StepRecord};
use crate::{GAME_STATS_FILE, RESULTS_FILE};

/// Write `summary` as four-space indented JSON with sorted keys.
pub fn write_results<W: Write>(writer: W, summary: &RunSummary) -> Result<(), RecordError> {
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(writer, formatter);
    summary.serialize(&mut ser)?;
    Ok(())
}

/// Write the ordered per-step outcomes as a pretty JSON array.
pub fn write_game_stats<W: Write>(writer: W, outcomes: &[StepOutcome]) -> Result<(), RecordError> {
    let records: Vec<StepRecord> = outcomes.iter().map(StepRecord::from).collect();
    serde_json::to_writer_pretty(writer, &records)?;
    Ok(())
}

/// Paths of the files written for one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordPaths {
    /// Location of `results.json`.
    pub results: PathBuf,
    /// Location of `game_stats.json`.
    pub game_stats: PathBuf,
}

/// Persists a run's output into a results directory.
///
/// The directory is created on first save if it does not exist.
#[derive(Clone, Debug)]
pub struct RunRecorder {
    dir: PathBuf,
}

impl RunRecorder {
    /// Create a recorder rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Results directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths this recorder writes to.
    pub fn paths(&self) -> RecordPaths {
        RecordPaths {
            results: self.dir.join(RESULTS_FILE),
            game_stats: self.dir.join(GAME_STATS_FILE),
        }
    }

    /// Write both output files, replacing any previous contents.
    pub fn save(
        &self,
        summary: &RunSummary,
        outcomes: &[StepOutcome],
    ) -> Result<RecordPaths, RecordError> {
        fs::create_dir_all(&self.dir)?;
        let paths = self.paths();

        let mut results = BufWriter::new(File::create(&paths.results)?);
        write_results(&mut results, summary)?;
        results.flush()?;

        let mut stats = BufWriter::new(File::create(&paths.game_stats)?);
        write_game_stats(&mut stats, outcomes)?;
        stats.flush()?;

        Ok(paths)
    }
}
