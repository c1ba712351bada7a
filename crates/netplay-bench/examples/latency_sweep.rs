//! Skip rate as a function of one-way link latency.
//!
//! Runs a short single-slot session per latency over the loopback
//! transport and prints a table of skip rate, most common step lag, and median
//! round-trip time. Once the round trip exceeds one step interval the
//! fresh actions arrive a step late and the skip rate climbs.
//!
//! Run with:
//!   cargo run --release --example latency_sweep

use std::time::Duration;

use netplay_bench::{reference_config, PLANES, PLANE_SIDE};
use netplay_core::Frame;
use netplay_engine::{loopback, GameSession, LinkProfile, QueueMode};
use netplay_record::LagProfile;
use netplay_test_utils::{PassthroughCodec, ScriptedEnv};

const LATENCIES_MS: [u64; 6] = [0, 5, 10, 20, 40, 80];

fn agent(frame: &Frame) -> Option<u8> {
    Some((frame.step_id.0 % 6) as u8 + 1)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = reference_config(QueueMode::SingleSlot);
    println!(
        "{} steps/s, interval {:.1} ms, tolerance {}\n",
        config.steps_per_second,
        config.step_interval().as_secs_f64() * 1e3,
        config.frame_skip_tolerance
    );
    println!(
        "{:>8} {:>8} {:>10} {:>12}",
        "lat ms", "skip %", "lag steps", "med rtt ms"
    );

    for latency in LATENCIES_MS {
        let env = ScriptedEnv::new()
            .obs_len(PLANES * PLANE_SIDE * PLANE_SIDE)
            .done_every(300);
        let (uplink, downlink) = loopback(agent, LinkProfile::fixed(Duration::from_millis(latency)));
        let outcome = GameSession::new(config.clone(), env, PassthroughCodec).run(uplink, downlink)?;

        let summary = outcome.report.summary();
        let lag = LagProfile::from_outcomes(outcome.report.outcomes());
        let modal_steps = lag
            .lag_steps_histogram
            .iter()
            .max_by_key(|(_, count)| **count)
            .map(|(steps, _)| *steps);
        println!(
            "{:>8} {:>8.1} {:>10} {:>12}",
            latency,
            summary.skip_rate() * 100.0,
            modal_steps.map_or_else(|| "-".to_string(), |s| s.to_string()),
            lag.median_lag_time
                .map_or_else(|| "-".to_string(), |t| format!("{:.1}", t * 1e3)),
        );
    }
    Ok(())
}
