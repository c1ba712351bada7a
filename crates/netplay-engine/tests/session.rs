//! Full sessions over the in-process loopback transport.
//!
//! These run the pacing loop on the test thread with the uplink and
//! downlink on their own named threads, then check the shutdown report
//! and the files written to the results directory.

use std::fs;
use std::time::Duration;

use netplay_core::{Frame, TransportError};
use netplay_engine::{
    loopback, ActionSink, FrameSource, GameSession, LinkProfile, PlayConfig, PlayError, ProbeCommand,
    ProbeConfig, QueueMode, StopReason,
};
use netplay_record::{LoadedRun, GAME_STATS_FILE, PING_FILE, RESULTS_FILE};
use netplay_test_utils::{PassthroughCodec, ScriptedEnv};

fn config(mode: QueueMode) -> PlayConfig {
    PlayConfig {
        steps_per_second: 20,
        time_limit_secs: 1,
        mode,
        ..PlayConfig::default()
    }
}

/// Answers every frame with its step number's low bits.
fn echo(frame: &Frame) -> Option<u8> {
    Some((frame.step_id.0 % 4) as u8 + 1)
}

#[test]
fn single_slot_echo_writes_consistent_results() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = PlayConfig {
        results_dir: Some(dir.path().join("run")),
        ..config(QueueMode::SingleSlot)
    };
    let env = ScriptedEnv::new().lives(3).reward_per_step(0.5);
    let log = env.action_log();
    let (up, down) = loopback(echo, LinkProfile::default());

    let outcome = GameSession::new(cfg, env, PassthroughCodec)
        .run(up, down)
        .unwrap();

    let summary = outcome.report.summary();
    assert_eq!(summary.n_steps, 20);
    assert_eq!(outcome.report.stop_reason, StopReason::StepBudgetExhausted);
    assert_eq!(summary.lives_remaining, Some(3));
    assert!((summary.total_score - 10.0).abs() < 1e-9);
    // The remote answers within one interval, so most steps are fresh.
    assert!(summary.fresh_actions() > 0);
    assert_eq!(log.len(), 20);

    assert!(outcome.shutdown.uplink_joined);
    assert!(outcome.shutdown.downlink_joined);
    assert!(outcome.shutdown.transport_errors.is_empty());
    assert!(outcome.shutdown.probe.is_none());

    let paths = outcome.record.expect("results_dir was set");
    assert_eq!(paths.results, dir.path().join("run").join(RESULTS_FILE));
    assert_eq!(paths.game_stats, dir.path().join("run").join(GAME_STATS_FILE));

    let loaded = LoadedRun::load(&dir.path().join("run")).unwrap();
    assert!(loaded.is_consistent());
    assert_eq!(&loaded.summary, summary);
    assert_eq!(loaded.outcomes.len(), 20);

    let text = fs::read_to_string(&paths.results).unwrap();
    let keys = [
        "\"lives_remaining\"",
        "\"n_skipped_actions\"",
        "\"n_steps\"",
        "\"total_games\"",
        "\"total_score\"",
    ];
    let positions: Vec<usize> = keys.iter().map(|k| text.find(k).unwrap()).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(text.contains("\n    \"n_steps\": 20"));
}

#[test]
fn streaming_with_latency_reports_lag() {
    let (up, down) = loopback(echo, LinkProfile::fixed(Duration::from_millis(30)));
    let outcome = GameSession::new(config(QueueMode::Streaming), ScriptedEnv::new(), PassthroughCodec)
        .run(up, down)
        .unwrap();

    let report = &outcome.report;
    assert!(!report.outcomes().is_empty());
    assert!(report.outcomes().iter().all(|o| !o.is_skip));
    assert!(report
        .outcomes()
        .iter()
        .all(|o| o.lag_time.unwrap() >= 0.025));
    assert_eq!(report.frames_dropped, 0);
    assert!(matches!(
        report.stop_reason,
        StopReason::StepBudgetExhausted | StopReason::ActionWaitTimedOut
    ));
    assert!(outcome.record.is_none());
    assert!(outcome.shutdown.uplink_joined);
}

#[test]
fn uplink_failure_is_reported_not_fatal() {
    let uplink = |_frames: FrameSource| -> Result<(), TransportError> {
        Err(TransportError::Io {
            reason: "socket closed".into(),
        })
    };
    let downlink = |_actions: ActionSink<u8>| -> Result<(), TransportError> { Ok(()) };

    let outcome = GameSession::new(config(QueueMode::SingleSlot), ScriptedEnv::new(), PassthroughCodec)
        .run(uplink, downlink)
        .unwrap();

    assert_eq!(outcome.report.summary().n_steps, 20);
    assert_eq!(outcome.report.summary().n_skipped_actions, 20);
    assert_eq!(
        outcome.shutdown.transport_errors,
        vec![TransportError::Io {
            reason: "socket closed".into()
        }]
    );
}

#[test]
fn environment_failure_propagates_after_cleanup() {
    let (up, down) = loopback(echo, LinkProfile::default());
    let env = ScriptedEnv::new().fail_on_step(5);
    let err = GameSession::new(config(QueueMode::SingleSlot), env, PassthroughCodec)
        .run(up, down)
        .unwrap_err();
    assert!(matches!(err, PlayError::Environment(_)));
}

#[test]
fn invalid_config_fails_before_threads_start() {
    let cfg = PlayConfig {
        probe: Some(ProbeConfig::ping("localhost")),
        ..config(QueueMode::SingleSlot)
    };
    let (up, down) = loopback(echo, LinkProfile::default());
    let err = GameSession::new(cfg, ScriptedEnv::new(), PassthroughCodec)
        .run(up, down)
        .unwrap_err();
    assert!(matches!(err, PlayError::Config(_)));
}

#[cfg(unix)]
#[test]
fn long_running_probe_is_killed_at_end() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = PlayConfig {
        results_dir: Some(dir.path().to_path_buf()),
        probe: Some(ProbeConfig {
            command: ProbeCommand::Custom {
                program: "sleep".into(),
                args: vec!["30".into()],
            },
            extra_secs: 0,
        }),
        ..config(QueueMode::SingleSlot)
    };
    let (up, down) = loopback(echo, LinkProfile::default());
    let outcome = GameSession::new(cfg, ScriptedEnv::new(), PassthroughCodec)
        .run(up, down)
        .unwrap();

    let probe = outcome.shutdown.probe.expect("probe ran");
    assert!(probe.killed);
    assert!(dir.path().join(PING_FILE).exists());
    assert!(dir.path().join(RESULTS_FILE).exists());
}
