//! Per-step outcome collection and end-of-run summaries.

use indexmap::IndexMap;
use netplay_core::{EpisodeId, StepOutcome};
use netplay_record::RunSummary;

/// Per-episode counters, keyed by episode id in play order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EpisodeTally {
    /// Steps played in the episode.
    pub steps: u64,
    /// Steps resolved with a fallback action.
    pub skipped: u64,
    /// Envelopes discarded for belonging to an earlier episode.
    pub stale_discards: u64,
    /// Reward collected.
    pub reward: f64,
    /// Whether the episode reached a terminal state within the run.
    pub completed: bool,
}

/// Everything the aggregator knows at the end of a run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunStats {
    /// Totals for `results.json`.
    pub summary: RunSummary,
    /// One outcome per executed step, in step order.
    pub outcomes: Vec<StepOutcome>,
    /// Per-episode breakdown.
    pub episodes: IndexMap<EpisodeId, EpisodeTally>,
}

impl RunStats {
    /// Envelopes discarded as stale over the whole run.
    pub fn stale_discards(&self) -> u64 {
        self.episodes.values().map(|t| t.stale_discards).sum()
    }
}

/// Append-only record of resolved steps and episode transitions.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    outcomes: Vec<StepOutcome>,
    episodes: IndexMap<EpisodeId, EpisodeTally>,
    skipped: u64,
    total_reward: f64,
    total_games: u64,
}

impl StatsAggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the resolved outcome and reward of one step.
    pub fn record_step(
        &mut self,
        episode_id: EpisodeId,
        outcome: StepOutcome,
        discarded_stale: bool,
        reward: f64,
    ) {
        let tally = self.episodes.entry(episode_id).or_default();
        tally.steps += 1;
        tally.reward += reward;
        if outcome.is_skip {
            tally.skipped += 1;
            self.skipped += 1;
        }
        if discarded_stale {
            tally.stale_discards += 1;
        }
        self.total_reward += reward;
        self.outcomes.push(outcome);
    }

    /// Record that `episode_id` reached a terminal state.
    pub fn record_episode_end(&mut self, episode_id: EpisodeId) {
        let tally = self.episodes.entry(episode_id).or_default();
        if !tally.completed {
            tally.completed = true;
            self.total_games += 1;
        }
    }

    /// Steps recorded so far.
    pub fn n_steps(&self) -> u64 {
        self.outcomes.len() as u64
    }

    /// Skipped steps recorded so far.
    pub fn n_skipped(&self) -> u64 {
        self.skipped
    }

    /// Outcomes recorded so far, in step order.
    pub fn outcomes(&self) -> &[StepOutcome] {
        &self.outcomes
    }

    /// Per-episode breakdown so far.
    pub fn episodes(&self) -> &IndexMap<EpisodeId, EpisodeTally> {
        &self.episodes
    }

    /// Close the record and build the summary.
    pub fn finish(self, lives_remaining: Option<u32>) -> RunStats {
        let summary = RunSummary {
            lives_remaining,
            n_skipped_actions: self.skipped,
            n_steps: self.outcomes.len() as u64,
            total_games: self.total_games,
            total_score: self.total_reward,
        };
        RunStats {
            summary,
            outcomes: self.outcomes,
            episodes: self.episodes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_run_summary() {
        let stats = StatsAggregator::new().finish(None);
        assert_eq!(stats.summary, RunSummary::default());
        assert!(stats.outcomes.is_empty());
    }

    #[test]
    fn tallies_split_by_episode() {
        let mut agg = StatsAggregator::new();
        agg.record_step(EpisodeId(0), StepOutcome::skipped(), false, 1.0);
        agg.record_step(EpisodeId(0), StepOutcome::fresh(0, 0.1, 10), false, 2.0);
        agg.record_episode_end(EpisodeId(0));
        agg.record_step(EpisodeId(1), StepOutcome::skipped(), true, 0.0);
        assert_eq!(agg.n_steps(), 3);
        assert_eq!(agg.n_skipped(), 2);

        let stats = agg.finish(Some(2));
        assert_eq!(stats.summary.n_steps, 3);
        assert_eq!(stats.summary.n_skipped_actions, 2);
        assert_eq!(stats.summary.total_games, 1);
        assert_eq!(stats.summary.total_score, 3.0);
        assert_eq!(stats.summary.lives_remaining, Some(2));
        assert_eq!(stats.stale_discards(), 1);

        let ids: Vec<u64> = stats.episodes.keys().map(|id| id.0).collect();
        assert_eq!(ids, vec![0, 1]);
        assert!(stats.episodes[&EpisodeId(0)].completed);
        assert!(!stats.episodes[&EpisodeId(1)].completed);
        assert_eq!(stats.episodes[&EpisodeId(0)].reward, 3.0);
    }

    #[test]
    fn episode_end_counts_once() {
        let mut agg = StatsAggregator::new();
        agg.record_episode_end(EpisodeId(0));
        agg.record_episode_end(EpisodeId(0));
        assert_eq!(agg.finish(None).summary.total_games, 1);
    }
}
