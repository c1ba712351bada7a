//! Environment lifecycle and per-episode state.
//!
//! [`EpisodeManager`] owns the environment. It assigns episode ids, resets
//! the per-episode [`Episode`] record on every reset, and keeps the
//! run-level tallies that feed the end-of-run summary.

use netplay_core::{EnvError, Environment, EpisodeId, StepInfo, Transition};
use tracing::debug;

/// State of the episode currently being played.
#[derive(Clone, Debug, PartialEq)]
pub struct Episode<A> {
    pub(crate) id: EpisodeId,
    pub(crate) skip_count: u32,
    pub(crate) previous_action: A,
}

impl<A> Episode<A> {
    /// A fresh episode record: no skips, no-op as the previous action.
    pub fn new(id: EpisodeId, noop: A) -> Self {
        Self {
            id,
            skip_count: 0,
            previous_action: noop,
        }
    }

    /// Episode id.
    pub fn id(&self) -> EpisodeId {
        self.id
    }

    /// Consecutive steps resolved without a fresh action.
    pub fn skip_count(&self) -> u32 {
        self.skip_count
    }

    /// The action most recently applied from a fresh envelope, or the
    /// no-op before any arrived.
    pub fn previous_action(&self) -> &A {
        &self.previous_action
    }
}

/// Owns the environment and its episode bookkeeping.
pub struct EpisodeManager<E: Environment> {
    env: E,
    episode: Episode<E::Action>,
    started: bool,
    render: bool,
    total_games: u64,
    total_reward: f64,
    last_info: StepInfo,
}

impl<E: Environment> EpisodeManager<E> {
    /// Wrap `env`. No reset happens until
    /// [`start_new_episode`](Self::start_new_episode).
    pub fn new(env: E, render: bool) -> Self {
        let noop = env.noop_action();
        Self {
            env,
            episode: Episode::new(EpisodeId(0), noop),
            started: false,
            render,
            total_games: 0,
            total_reward: 0.0,
            last_info: StepInfo::default(),
        }
    }

    /// Reset the environment and begin the next episode.
    ///
    /// The first call starts episode 0; every later call increments the
    /// id. Skip count and previous action are reset either way.
    pub fn start_new_episode(&mut self) -> Result<E::Observation, EnvError> {
        let observation = self.env.reset()?;
        let id = if self.started {
            self.episode.id.next()
        } else {
            self.started = true;
            EpisodeId(0)
        };
        self.episode = Episode::new(id, self.env.noop_action());
        debug!(episode = %id, "episode started");
        Ok(observation)
    }

    /// Apply `action` to the environment.
    ///
    /// When the returned transition is `done`, the caller must call
    /// [`start_new_episode`](Self::start_new_episode) before packaging
    /// the next frame.
    pub fn advance(&mut self, action: E::Action) -> Result<Transition<E::Observation>, EnvError> {
        let transition = self.env.step(action)?;
        if self.render {
            self.env.render();
        }
        self.total_reward += transition.reward;
        self.last_info = transition.info;
        if transition.done {
            self.total_games += 1;
            debug!(
                episode = %self.episode.id,
                total_games = self.total_games,
                "episode finished"
            );
        }
        Ok(transition)
    }

    /// Current episode record.
    pub fn episode(&self) -> &Episode<E::Action> {
        &self.episode
    }

    /// Current episode record, mutably, for the action resolver.
    pub fn episode_mut(&mut self) -> &mut Episode<E::Action> {
        &mut self.episode
    }

    /// Episodes that reached a terminal state.
    pub fn total_games(&self) -> u64 {
        self.total_games
    }

    /// Reward summed over every step.
    pub fn total_reward(&self) -> f64 {
        self.total_reward
    }

    /// Info from the most recent step.
    pub fn last_info(&self) -> StepInfo {
        self.last_info
    }

    /// The wrapped environment.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Consume the manager, returning the environment.
    pub fn into_env(self) -> E {
        self.env
    }
}
