//! Play a scripted environment against a simulated remote link.
//!
//! Every knob of `PlayConfig` and `LinkProfile` is exposed on the command
//! line, which makes this a quick way to see how latency, jitter, and loss
//! turn into skipped steps under each queuing mode.
//!
//! Run with:
//!   cargo run --example loopback_play -- --sps 30 --latency-ms 40 --mode streaming
//!
//! Set `RUST_LOG=netplay_engine=debug` for per-episode logging.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use netplay_core::Frame;
use netplay_engine::{loopback, GameSession, LinkProfile, PlayConfig, ProbeConfig, QueueMode};
use netplay_record::LagProfile;
use netplay_test_utils::{PassthroughCodec, ScriptedEnv};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// Latest-wins slots; the loop sleeps to hold the rate.
    SingleSlot,
    /// FIFO queues; the loop waits for every action.
    Streaming,
}

impl From<Mode> for QueueMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::SingleSlot => QueueMode::SingleSlot,
            Mode::Streaming => QueueMode::Streaming,
        }
    }
}

/// Command-line arguments for the loopback demo.
#[derive(Parser, Debug)]
#[command(name = "loopback_play")]
struct Cli {
    /// Simulation steps per second.
    #[arg(long, default_value_t = 20)]
    sps: u32,

    /// Missing actions answered by repeating the previous one.
    #[arg(long, default_value_t = 1)]
    frame_skip: u32,

    /// Run length in seconds.
    #[arg(long, default_value_t = 5)]
    time: u32,

    /// Queuing discipline.
    #[arg(long, value_enum, default_value_t = Mode::SingleSlot)]
    mode: Mode,

    /// Forward render calls to the environment.
    #[arg(long)]
    render: bool,

    /// Directory for results.json and game_stats.json.
    #[arg(long)]
    results_dir: Option<PathBuf>,

    /// Ping this host alongside the run (requires --results-dir).
    #[arg(long)]
    ping: Option<String>,

    /// One-way link latency in milliseconds.
    #[arg(long, default_value_t = 25)]
    latency_ms: u64,

    /// Extra uniform random delay in milliseconds.
    #[arg(long, default_value_t = 0)]
    jitter_ms: u64,

    /// Probability that a frame is lost.
    #[arg(long, default_value_t = 0.0)]
    loss: f64,

    /// Seed for jitter and loss.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Steps per scripted episode.
    #[arg(long, default_value_t = 100)]
    episode_len: u64,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("netplay_engine=info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_names(true))
        .with(filter)
        .init();
}

/// Cycles through the four non-noop actions.
fn cycling_agent(frame: &Frame) -> Option<u8> {
    Some((frame.step_id.0 % 4) as u8 + 1)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    let config = PlayConfig {
        steps_per_second: cli.sps,
        frame_skip_tolerance: cli.frame_skip,
        time_limit_secs: cli.time,
        mode: cli.mode.into(),
        render: cli.render,
        results_dir: cli.results_dir.clone(),
        probe: cli.ping.as_deref().map(ProbeConfig::ping),
    };
    let link = LinkProfile {
        latency: Duration::from_millis(cli.latency_ms),
        jitter: Duration::from_millis(cli.jitter_ms),
        loss: cli.loss,
        seed: cli.seed,
    };
    let env = ScriptedEnv::new()
        .obs_len(84 * 84)
        .done_every(cli.episode_len)
        .reward_per_step(1.0);
    let (uplink, downlink) = loopback(cycling_agent, link);

    let outcome = GameSession::new(config, env, PassthroughCodec).run(uplink, downlink)?;

    let report = &outcome.report;
    let summary = report.summary();
    let lag = LagProfile::from_outcomes(report.outcomes());
    println!("stop reason      {:?}", report.stop_reason);
    println!("steps            {}", summary.n_steps);
    println!(
        "skipped          {} ({:.1}%)",
        summary.n_skipped_actions,
        summary.skip_rate() * 100.0
    );
    println!("games            {}", summary.total_games);
    println!("score            {}", summary.total_score);
    println!("frames dropped   {}", report.frames_dropped);
    println!("pacing overruns  {}", report.pacing.overruns);
    if let Some(median) = lag.median_lag_time {
        println!("median lag       {:.1} ms", median * 1e3);
    }
    if let Some(paths) = &outcome.record {
        println!("results          {}", paths.results.display());
    }
    Ok(())
}
