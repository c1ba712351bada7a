//! The real-time control loop.
//!
//! [`PacingController`] drives one simulation step per tick:
//!
//! 1. Package the current observation and submit it outbound.
//! 2. Single-slot: sleep the rest of the step interval, then read-and-clear
//!    the inbound slot. Streaming: wait for the next envelope, bounded by
//!    the time left in the run.
//! 3. Resolve the action, advance the environment, record the outcome.
//! 4. On a terminal transition, reset into the next episode before the
//!    next frame is packaged.
//!
//! The loop stops when the step budget is spent or, in streaming mode,
//! when an action wait runs into the end of the run. Stopping pushes the
//! outbound end-of-stream sentinel.

use std::thread;
use std::time::{Duration, Instant};

use netplay_core::{
    ActionEnvelope, Environment, EpisodeId, ObservationCodec, StepId, StepOutcome,
};
use netplay_record::RunSummary;
use tracing::{debug, info, trace, warn};

use crate::config::{ConfigError, PlayConfig, QueueMode};
use crate::episode::EpisodeManager;
use crate::error::PlayError;
use crate::inbound::{self, ActionSink, InboundChannel, InboundCloser, Wait};
use crate::metrics::PacingMetrics;
use crate::outbound::{self, FrameSource, OutboundChannel};
use crate::packager::FramePackager;
use crate::resolver::ActionResolver;
use crate::stats::{RunStats, StatsAggregator};

// ── State ────────────────────────────────────────────────────────

/// Lifecycle state of the control loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// Constructed; the first episode has not been started.
    Ready,
    /// Stepping.
    Running,
    /// The environment reported a terminal state; the next episode is
    /// being started.
    EpisodeBoundary,
    /// The run is over.
    Stopped,
}

/// Why the loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// `steps_per_second × time_limit` steps were executed.
    StepBudgetExhausted,
    /// Streaming mode: no action arrived before the end of the run.
    ActionWaitTimedOut,
    /// Streaming mode: every action sink was dropped.
    InboundDisconnected,
    /// [`PacingController::finish`] was called before the loop stopped.
    Requested,
}

/// What one tick did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickRecord {
    /// Step that was executed.
    pub step_id: StepId,
    /// Episode the step belonged to.
    pub episode_id: EpisodeId,
    /// Classification of the applied action.
    pub outcome: StepOutcome,
    /// Whether the step ended the episode.
    pub episode_ended: bool,
}

/// Result of a completed run.
#[derive(Clone, Debug)]
pub struct RunReport {
    /// Summary, per-step outcomes, and per-episode tallies.
    pub stats: RunStats,
    /// Why the loop stopped.
    pub stop_reason: StopReason,
    /// Pacing totals.
    pub pacing: PacingMetrics,
    /// Frames handed to the outbound adapter.
    pub frames_submitted: u64,
    /// Frames superseded before the transport pulled them.
    pub frames_dropped: u64,
    /// Wall time from the first reset to the stop.
    pub elapsed: Duration,
}

impl RunReport {
    /// End-of-run totals.
    pub fn summary(&self) -> &RunSummary {
        &self.stats.summary
    }

    /// One outcome per executed step, in step order.
    pub fn outcomes(&self) -> &[StepOutcome] {
        &self.stats.outcomes
    }
}

// ── PacingController ─────────────────────────────────────────────

/// Drives the environment at a fixed step rate against remote actions.
pub struct PacingController<E: Environment, C> {
    config: PlayConfig,
    episodes: EpisodeManager<E>,
    packager: FramePackager<C>,
    resolver: ActionResolver<E::Action>,
    outbound: OutboundChannel,
    inbound: InboundChannel<E::Action>,
    stats: StatsAggregator,
    metrics: PacingMetrics,
    state: LoopState,
    stop_reason: Option<StopReason>,
    step: StepId,
    observation: Option<E::Observation>,
    started_at: Option<Instant>,
    run_deadline: Option<Instant>,
    tick_clock: Instant,
}

impl<E, C> PacingController<E, C>
where
    E: Environment,
    C: ObservationCodec<E::Observation>,
{
    /// Validate `config` and build a controller with its adapters.
    ///
    /// Returns the transport-facing halves: a [`FrameSource`] for the
    /// send loop and an [`ActionSink`] for the receive loop.
    #[allow(clippy::type_complexity)]
    pub fn new(
        config: PlayConfig,
        env: E,
        codec: C,
    ) -> Result<(Self, FrameSource, ActionSink<E::Action>), ConfigError> {
        config.validate()?;
        let (outbound, frames) = outbound::channel(config.mode);
        let (inbound, actions) = inbound::channel(config.mode);
        let noop = env.noop_action();
        let controller = Self {
            resolver: ActionResolver::new(config.frame_skip_tolerance, noop),
            episodes: EpisodeManager::new(env, config.render),
            packager: FramePackager::new(codec),
            outbound,
            inbound,
            stats: StatsAggregator::new(),
            metrics: PacingMetrics::default(),
            state: LoopState::Ready,
            stop_reason: None,
            step: StepId(0),
            observation: None,
            started_at: None,
            run_deadline: None,
            tick_clock: Instant::now(),
            config,
        };
        Ok((controller, frames, actions))
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Why the loop stopped, once it has.
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    /// Next step to execute.
    pub fn step_id(&self) -> StepId {
        self.step
    }

    /// Episode currently being played.
    pub fn episode_id(&self) -> EpisodeId {
        self.episodes.episode().id()
    }

    /// Consecutive fallback steps in the current episode.
    pub fn skip_count(&self) -> u32 {
        self.episodes.episode().skip_count()
    }

    /// Statistics recorded so far.
    pub fn stats(&self) -> &StatsAggregator {
        &self.stats
    }

    /// Handle for closing the inbound side after the controller has moved.
    pub fn inbound_closer(&self) -> InboundCloser {
        self.inbound.closer()
    }

    /// Start the first episode and the run clock.
    ///
    /// Called implicitly by the first [`tick`](Self::tick). Does nothing
    /// once started.
    pub fn start(&mut self) -> Result<(), PlayError> {
        if self.state != LoopState::Ready {
            return Ok(());
        }
        let observation = self.episodes.start_new_episode()?;
        let now = Instant::now();
        self.observation = Some(observation);
        self.started_at = Some(now);
        self.run_deadline = Some(now + self.config.time_limit());
        self.tick_clock = now;
        self.state = LoopState::Running;
        info!(
            mode = %self.config.mode,
            steps_per_second = self.config.steps_per_second,
            time_limit_secs = self.config.time_limit_secs,
            frame_skip_tolerance = self.config.frame_skip_tolerance,
            max_steps = self.config.max_steps(),
            "run started"
        );
        Ok(())
    }

    /// Execute one step, or return `None` once the loop has stopped.
    ///
    /// Any error is fatal: the outbound stream is closed and the
    /// controller is left stopped.
    pub fn tick(&mut self) -> Result<Option<TickRecord>, PlayError> {
        match self.tick_inner() {
            Ok(record) => Ok(record),
            Err(e) => {
                self.state = LoopState::Stopped;
                self.outbound.close();
                Err(e)
            }
        }
    }

    fn tick_inner(&mut self) -> Result<Option<TickRecord>, PlayError> {
        match self.state {
            LoopState::Stopped => return Ok(None),
            LoopState::Ready => self.start()?,
            LoopState::Running | LoopState::EpisodeBoundary => {}
        }
        if self.step.0 >= self.config.max_steps() {
            self.stop(StopReason::StepBudgetExhausted);
            return Ok(None);
        }

        let step_id = self.step;
        let episode_id = self.episodes.episode().id();
        // Always present once started.
        let observation = match self.observation.take() {
            Some(observation) => observation,
            None => self.episodes.start_new_episode()?,
        };
        let frame = self.packager.package(step_id, episode_id, &observation)?;
        self.outbound.submit(frame);

        let candidate = match self.config.mode {
            QueueMode::SingleSlot => {
                self.pace(step_id);
                self.inbound.take_latest()
            }
            QueueMode::Streaming => match self.await_action() {
                Ok(envelope) => Some(envelope),
                Err(reason) => {
                    self.observation = Some(observation);
                    self.stop(reason);
                    return Ok(None);
                }
            },
        };

        let resolution = self
            .resolver
            .resolve(candidate, step_id, self.episodes.episode_mut());
        let transition = self.episodes.advance(resolution.action)?;
        self.stats.record_step(
            episode_id,
            resolution.outcome,
            resolution.discarded_stale,
            transition.reward,
        );
        trace!(
            step = %step_id,
            episode = %episode_id,
            skip = resolution.outcome.is_skip,
            lag_steps = ?resolution.outcome.lag_steps,
            "step"
        );

        self.step = step_id.next();
        let episode_ended = transition.done;
        if episode_ended {
            self.state = LoopState::EpisodeBoundary;
            self.stats.record_episode_end(episode_id);
            self.observation = Some(self.episodes.start_new_episode()?);
            self.state = LoopState::Running;
        } else {
            self.observation = Some(transition.observation);
        }

        Ok(Some(TickRecord {
            step_id,
            episode_id,
            outcome: resolution.outcome,
            episode_ended,
        }))
    }

    /// Sleep out the remainder of the step interval, measured from the end
    /// of the previous sleep.
    fn pace(&mut self, step_id: StepId) {
        let interval = self.config.step_interval();
        let busy = self.tick_clock.elapsed();
        let overran = self.metrics.record_tick(micros(busy), micros(interval));
        if !overran {
            thread::sleep(interval.saturating_sub(busy));
        } else if self.metrics.overruns == 1 {
            warn!(
                step = %step_id,
                busy_ms = busy.as_secs_f64() * 1e3,
                interval_ms = interval.as_secs_f64() * 1e3,
                "step processing exceeded the step interval; rate cannot be sustained"
            );
        } else {
            debug!(step = %step_id, busy_ms = busy.as_secs_f64() * 1e3, "pacing overrun");
        }
        self.tick_clock = Instant::now();
    }

    fn await_action(&mut self) -> Result<ActionEnvelope<E::Action>, StopReason> {
        let deadline = self.run_deadline.unwrap_or_else(Instant::now);
        let waited = Instant::now();
        let result = match self.inbound.wait_until(deadline) {
            Wait::Ready(envelope) => Ok(envelope),
            Wait::DeadlineExpired => Err(StopReason::ActionWaitTimedOut),
            Wait::Disconnected => Err(StopReason::InboundDisconnected),
        };
        self.metrics.record_wait(micros(waited.elapsed()));
        result
    }

    fn stop(&mut self, reason: StopReason) {
        if self.state == LoopState::Stopped {
            return;
        }
        self.state = LoopState::Stopped;
        self.stop_reason = Some(reason);
        self.outbound.close();
        debug!(?reason, step = %self.step, "loop stopped");
    }

    /// Run to completion on the calling thread.
    pub fn run(mut self) -> Result<RunReport, PlayError> {
        self.start()?;
        while self.tick()?.is_some() {}
        Ok(self.finish())
    }

    /// Stop (if still running) and build the report.
    pub fn finish(mut self) -> RunReport {
        self.stop(StopReason::Requested);
        let elapsed = self
            .started_at
            .map(|t| t.elapsed())
            .unwrap_or(Duration::ZERO);
        let stop_reason = self.stop_reason.unwrap_or(StopReason::Requested);
        let frames_submitted = self.outbound.frames_submitted();
        let frames_dropped = self.outbound.frames_dropped();
        let lives = self.episodes.last_info().lives;
        let stats = self.stats.finish(lives);

        if self.metrics.overruns > 0 {
            warn!(
                overruns = self.metrics.overruns,
                worst_overrun_ms = self.metrics.worst_overrun_us as f64 / 1e3,
                "pacing overruns during run"
            );
        }
        info!(
            n_steps = stats.summary.n_steps,
            n_skipped_actions = stats.summary.n_skipped_actions,
            total_games = stats.summary.total_games,
            total_score = stats.summary.total_score,
            lives_remaining = ?stats.summary.lives_remaining,
            frames_dropped,
            ?stop_reason,
            elapsed_secs = elapsed.as_secs_f64(),
            "run finished"
        );

        RunReport {
            stats,
            stop_reason,
            pacing: self.metrics,
            frames_submitted,
            frames_dropped,
            elapsed,
        }
    }
}

fn micros(d: Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use netplay_core::RemoteAction;
    use netplay_test_utils::{FailingCodec, PassthroughCodec, ScriptedEnv};

    fn fast_config(mode: QueueMode) -> PlayConfig {
        PlayConfig {
            steps_per_second: 1000,
            time_limit_secs: 1,
            mode,
            ..PlayConfig::default()
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = PlayConfig {
            steps_per_second: 0,
            ..PlayConfig::default()
        };
        assert!(matches!(
            PacingController::new(cfg, ScriptedEnv::new(), PassthroughCodec),
            Err(ConfigError::InvalidStepRate)
        ));
    }

    #[test]
    fn state_moves_ready_running_stopped() {
        let cfg = PlayConfig {
            steps_per_second: 2,
            time_limit_secs: 1,
            ..fast_config(QueueMode::SingleSlot)
        };
        let (mut ctl, _frames, _actions) =
            PacingController::new(cfg, ScriptedEnv::new(), PassthroughCodec).unwrap();
        assert_eq!(ctl.state(), LoopState::Ready);
        ctl.start().unwrap();
        assert_eq!(ctl.state(), LoopState::Running);
        assert!(ctl.tick().unwrap().is_some());
        assert!(ctl.tick().unwrap().is_some());
        assert!(ctl.tick().unwrap().is_none());
        assert_eq!(ctl.state(), LoopState::Stopped);
        assert_eq!(ctl.stop_reason(), Some(StopReason::StepBudgetExhausted));
        assert!(ctl.tick().unwrap().is_none());
    }

    #[test]
    fn fresh_action_in_slot_is_applied() {
        let (mut ctl, mut frames, actions) = PacingController::new(
            fast_config(QueueMode::SingleSlot),
            ScriptedEnv::new(),
            PassthroughCodec,
        )
        .unwrap();
        ctl.start().unwrap();
        actions
            .deliver(RemoteAction {
                episode_id: EpisodeId(0),
                step_id: StepId(0),
                frame_timestamp: netplay_core::clock::wall_clock_secs(),
                byte_size: 4,
                action: 3,
            })
            .unwrap();
        let record = ctl.tick().unwrap().unwrap();
        assert!(!record.outcome.is_skip);
        assert_eq!(record.outcome.lag_steps, Some(0));
        assert_eq!(record.outcome.frame_size, Some(4));
        assert_eq!(frames.next_frame().unwrap().step_id, StepId(0));
    }

    #[test]
    fn boundary_resets_episode_before_next_frame() {
        let env = ScriptedEnv::new().done_at(&[1]);
        let (mut ctl, _frames, _actions) =
            PacingController::new(fast_config(QueueMode::SingleSlot), env, PassthroughCodec)
                .unwrap();
        let first = ctl.tick().unwrap().unwrap();
        let second = ctl.tick().unwrap().unwrap();
        let third = ctl.tick().unwrap().unwrap();
        assert!(!first.episode_ended);
        assert!(second.episode_ended);
        assert_eq!(second.episode_id, EpisodeId(0));
        assert_eq!(third.episode_id, EpisodeId(1));
        assert_eq!(ctl.state(), LoopState::Running);
        assert_eq!(ctl.episode_id(), EpisodeId(1));
    }

    #[test]
    fn codec_failure_aborts_and_closes_outbound() {
        let (mut ctl, mut frames, _actions) = PacingController::new(
            fast_config(QueueMode::SingleSlot),
            ScriptedEnv::new(),
            FailingCodec::after(2),
        )
        .unwrap();
        let err = loop {
            match ctl.tick() {
                Ok(Some(_)) => continue,
                Ok(None) => panic!("loop stopped without the codec failing"),
                Err(e) => break e,
            }
        };
        assert!(matches!(err, PlayError::Codec(_)));
        assert_eq!(ctl.state(), LoopState::Stopped);
        assert_eq!(ctl.stats().n_steps(), 2);
        assert!(frames.next_frame().is_none());
    }

    #[test]
    fn early_finish_reports_requested_stop() {
        let (mut ctl, _frames, _actions) = PacingController::new(
            fast_config(QueueMode::SingleSlot),
            ScriptedEnv::new(),
            PassthroughCodec,
        )
        .unwrap();
        ctl.tick().unwrap();
        let report = ctl.finish();
        assert_eq!(report.stop_reason, StopReason::Requested);
        assert_eq!(report.summary().n_steps, 1);
        assert_eq!(report.outcomes().len(), 1);
    }

    #[test]
    fn environment_failure_is_fatal() {
        let env = ScriptedEnv::new().fail_on_step(3);
        let (ctl, _frames, _actions) =
            PacingController::new(fast_config(QueueMode::SingleSlot), env, PassthroughCodec)
                .unwrap();
        assert!(matches!(ctl.run(), Err(PlayError::Environment(_))));
    }

    #[test]
    fn streaming_stops_when_sinks_are_dropped() {
        let (ctl, _frames, actions) = PacingController::new(
            fast_config(QueueMode::Streaming),
            ScriptedEnv::new(),
            PassthroughCodec,
        )
        .unwrap();
        drop(actions);
        let report = ctl.run().unwrap();
        assert_eq!(report.stop_reason, StopReason::InboundDisconnected);
        assert!(report.outcomes().is_empty());
        assert_eq!(report.frames_submitted, 1);
    }
}
