//! End-to-end pacing scenarios against the bare controller.
//!
//! Each test drives a [`PacingController`] with a scripted environment and
//! plays the remote side by hand through the returned `FrameSource` and
//! `ActionSink`, so the timing of every delivery is under test control.

use std::thread;
use std::time::{Duration, Instant};

use netplay_core::{EpisodeId, RemoteAction, StepId};
use netplay_engine::{LoopState, PacingController, PlayConfig, QueueMode, StopReason};
use netplay_test_utils::{PassthroughCodec, ScriptedEnv};

fn config(steps_per_second: u32, time_limit_secs: u32, mode: QueueMode) -> PlayConfig {
    PlayConfig {
        steps_per_second,
        time_limit_secs,
        mode,
        ..PlayConfig::default()
    }
}

fn reply(step: u64, episode: u64, action: u8) -> RemoteAction<u8> {
    RemoteAction {
        episode_id: EpisodeId(episode),
        step_id: StepId(step),
        frame_timestamp: netplay_core::clock::wall_clock_secs(),
        byte_size: 16,
        action,
    }
}

#[test]
fn silent_remote_yields_budgeted_skips() {
    let env = ScriptedEnv::new();
    let log = env.action_log();
    let (ctl, _frames, _actions) =
        PacingController::new(config(10, 2, QueueMode::SingleSlot), env, PassthroughCodec)
            .unwrap();

    let start = Instant::now();
    let report = ctl.run().unwrap();

    assert_eq!(report.outcomes().len(), 20);
    assert!(report.outcomes().iter().all(|o| o.is_skip));
    assert!(report
        .outcomes()
        .iter()
        .all(|o| o.lag_steps.is_none() && o.lag_time.is_none() && o.frame_size.is_none()));
    assert_eq!(report.summary().n_steps, 20);
    assert_eq!(report.summary().n_skipped_actions, 20);
    assert_eq!(report.stop_reason, StopReason::StepBudgetExhausted);
    assert_eq!(log.snapshot(), vec![ScriptedEnv::NOOP; 20]);
    // Paced at 100 ms per step.
    assert!(start.elapsed() >= Duration::from_millis(1900));
}

#[test]
fn streaming_single_reply_then_deadline() {
    let (ctl, mut frames, actions) =
        PacingController::new(config(10, 1, QueueMode::Streaming), ScriptedEnv::new(), PassthroughCodec)
            .unwrap();

    let remote = thread::spawn(move || {
        let frame = frames.next_frame().expect("first frame");
        thread::sleep(Duration::from_millis(50));
        actions
            .deliver(RemoteAction::reply_to(&frame, 2u8))
            .expect("sink open");
        // Keep the sink alive so the loop ends on its deadline.
        while frames.next_frame().is_some() {}
        drop(actions);
    });

    let report = ctl.run().unwrap();
    remote.join().unwrap();

    assert_eq!(report.stop_reason, StopReason::ActionWaitTimedOut);
    assert_eq!(report.outcomes().len(), 1);
    let first = report.outcomes()[0];
    assert!(!first.is_skip);
    assert_eq!(first.lag_steps, Some(0));
    assert!(first.lag_time.unwrap() >= 0.04);
    assert_eq!(first.frame_size, Some(16));
    assert!(report.elapsed >= Duration::from_millis(900));
}

#[test]
fn episode_boundary_advances_id_once_and_resets_skips() {
    let env = ScriptedEnv::new().done_at(&[5]);
    let (mut ctl, _frames, _actions) =
        PacingController::new(config(50, 1, QueueMode::SingleSlot), env, PassthroughCodec)
            .unwrap();

    let mut episodes = Vec::new();
    while let Some(record) = ctl.tick().unwrap() {
        episodes.push(record.episode_id);
        if record.step_id == StepId(4) {
            assert_eq!(ctl.skip_count(), 5);
        }
        if record.step_id == StepId(5) {
            assert!(record.episode_ended);
            assert_eq!(ctl.skip_count(), 0);
            assert_eq!(ctl.episode_id(), EpisodeId(1));
        }
    }

    assert_eq!(episodes.len(), 50);
    assert!(episodes[..=5].iter().all(|&e| e == EpisodeId(0)));
    assert!(episodes[6..].iter().all(|&e| e == EpisodeId(1)));
    assert!(episodes.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(ctl.state(), LoopState::Stopped);

    let report = ctl.finish();
    assert_eq!(report.summary().total_games, 1);
    assert_eq!(report.stop_reason, StopReason::StepBudgetExhausted);
    assert_eq!(report.stats.episodes.len(), 2);
}

#[test]
fn stale_reply_after_boundary_is_discarded() {
    let env = ScriptedEnv::new().done_at(&[0]);
    let log = env.action_log();
    let (mut ctl, _frames, actions) =
        PacingController::new(config(100, 1, QueueMode::SingleSlot), env, PassthroughCodec)
            .unwrap();

    // Step 0 ends episode 0.
    assert!(ctl.tick().unwrap().unwrap().episode_ended);
    assert_eq!(ctl.episode_id(), EpisodeId(1));

    // A late answer to the episode-0 frame must not be applied.
    actions.deliver(reply(0, 0, 9)).unwrap();
    let stale = ctl.tick().unwrap().unwrap();
    assert!(stale.outcome.is_skip);
    assert_eq!(ctl.stats().episodes()[&EpisodeId(1)].stale_discards, 1);

    // An answer for the current episode is.
    actions.deliver(reply(1, 1, 7)).unwrap();
    let fresh = ctl.tick().unwrap().unwrap();
    assert!(!fresh.outcome.is_skip);
    assert_eq!(fresh.outcome.lag_steps, Some(1));
    assert_eq!(log.snapshot()[2], 7);
    assert!(!log.snapshot().contains(&9));
}

#[test]
fn new_episode_reply_in_boundary_tick_is_accepted() {
    let env = ScriptedEnv::new().done_at(&[0]);
    // A slow rate leaves the remote a full interval to answer.
    let (mut ctl, mut frames, actions) =
        PacingController::new(config(4, 1, QueueMode::SingleSlot), env, PassthroughCodec)
            .unwrap();

    ctl.tick().unwrap();
    assert_eq!(frames.next_frame().unwrap().episode_id, EpisodeId(0));

    // The remote answers the first frame of episode 1 before the loop
    // reads its slot for that same step.
    let remote = thread::spawn(move || {
        let frame = frames.next_frame().unwrap();
        assert_eq!(frame.episode_id, EpisodeId(1));
        actions.deliver(RemoteAction::reply_to(&frame, 3u8)).unwrap();
        actions
    });
    let record = ctl.tick().unwrap().unwrap();
    let _actions = remote.join().unwrap();

    assert_eq!(record.episode_id, EpisodeId(1));
    assert!(!record.outcome.is_skip);
    assert_eq!(record.outcome.lag_steps, Some(0));
}

#[test]
fn tolerance_repeats_then_falls_back() {
    let env = ScriptedEnv::new();
    let log = env.action_log();
    let cfg = PlayConfig {
        frame_skip_tolerance: 2,
        ..config(200, 1, QueueMode::SingleSlot)
    };
    let (mut ctl, _frames, actions) = PacingController::new(cfg, env, PassthroughCodec).unwrap();

    actions.deliver(reply(0, 0, 5)).unwrap();
    for _ in 0..5 {
        ctl.tick().unwrap();
    }
    assert_eq!(log.snapshot(), vec![5, 5, 5, ScriptedEnv::NOOP, ScriptedEnv::NOOP]);
    assert_eq!(ctl.skip_count(), 4);
}
