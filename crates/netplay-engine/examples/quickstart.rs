//! Netplay Quickstart: a complete real-time session from scratch.
//!
//! Demonstrates:
//!   1. Implementing `Environment` for a small corridor game
//!   2. Implementing `ObservationCodec` with a one-plane byte encoding
//!   3. Building a `PlayConfig` and a `GameSession`
//!   4. Playing it against a remote agent over the loopback transport
//!   5. Reading the run summary and the lag profile
//!
//! Run with:
//!   cargo run --example quickstart

use std::time::Duration;

use netplay_core::{
    CodecError, EncodedObservation, EnvError, Environment, Frame, ObservationCodec, StepInfo,
    Transition,
};
use netplay_engine::{loopback, GameSession, LinkProfile, PlayConfig, QueueMode};
use netplay_record::LagProfile;
use smallvec::smallvec;

// ─── Corridor parameters ────────────────────────────────────────

const LENGTH: usize = 12;
const NOOP: u8 = 0;
const LEFT: u8 = 1;
const RIGHT: u8 = 2;

// ─── Environment: walk to the end of a corridor ─────────────────
//
// The observation is a one-hot occupancy vector. Reaching the last
// cell scores a point and ends the episode.

struct Corridor {
    position: usize,
}

impl Corridor {
    fn observation(&self) -> Vec<u8> {
        let mut cells = vec![0u8; LENGTH];
        cells[self.position] = 1;
        cells
    }
}

impl Environment for Corridor {
    type Observation = Vec<u8>;
    type Action = u8;

    fn reset(&mut self) -> Result<Vec<u8>, EnvError> {
        self.position = 0;
        Ok(self.observation())
    }

    fn step(&mut self, action: u8) -> Result<Transition<Vec<u8>>, EnvError> {
        match action {
            NOOP => {}
            LEFT => self.position = self.position.saturating_sub(1),
            RIGHT => self.position = (self.position + 1).min(LENGTH - 1),
            other => {
                return Err(EnvError::InvalidAction {
                    reason: format!("unknown action {other}"),
                })
            }
        }
        let done = self.position == LENGTH - 1;
        Ok(Transition {
            observation: self.observation(),
            reward: if done { 1.0 } else { 0.0 },
            done,
            info: StepInfo::default(),
        })
    }

    fn noop_action(&self) -> u8 {
        NOOP
    }
}

// ─── Codec: occupancy bytes as a single plane ───────────────────

struct OccupancyCodec;

impl ObservationCodec<Vec<u8>> for OccupancyCodec {
    fn encode(&self, observation: &Vec<u8>) -> Result<EncodedObservation, CodecError> {
        Ok(smallvec![observation.clone()])
    }

    fn decode(&self, planes: &EncodedObservation) -> Result<Vec<u8>, CodecError> {
        match planes.as_slice() {
            [plane] => Ok(plane.clone()),
            _ => Err(CodecError::PlaneCountMismatch {
                expected: 1,
                found: planes.len(),
            }),
        }
    }
}

// ─── Remote agent: always walk right ────────────────────────────

fn walker(frame: &Frame) -> Option<u8> {
    let cells = OccupancyCodec.decode(&frame.encoded_observation).ok()?;
    let here = cells.iter().position(|&c| c == 1)?;
    Some(if here + 1 < LENGTH { RIGHT } else { NOOP })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Netplay Quickstart ===\n");

    // 1. Configure a 2 second run at 20 steps per second.
    let config = PlayConfig {
        steps_per_second: 20,
        time_limit_secs: 2,
        frame_skip_tolerance: 1,
        mode: QueueMode::SingleSlot,
        ..PlayConfig::default()
    };
    println!(
        "Config: {} steps/s for {} s ({} steps), mode {}",
        config.steps_per_second,
        config.time_limit_secs,
        config.max_steps(),
        config.mode
    );

    // 2. A link with 20 ms one-way delay and a little jitter.
    let link = LinkProfile {
        latency: Duration::from_millis(20),
        jitter: Duration::from_millis(10),
        ..LinkProfile::default()
    };
    let (uplink, downlink) = loopback(walker, link);

    // 3. Play.
    let session = GameSession::new(config, Corridor { position: 0 }, OccupancyCodec);
    let outcome = session.run(uplink, downlink)?;

    // 4. Report.
    let summary = outcome.report.summary();
    println!("\nSteps:          {}", summary.n_steps);
    println!("Skipped:        {}", summary.n_skipped_actions);
    println!("Games finished: {}", summary.total_games);
    println!("Score:          {}", summary.total_score);

    let lag = LagProfile::from_outcomes(outcome.report.outcomes());
    println!("\nLag ({} fresh steps):", lag.fresh());
    if let (Some(mean), Some(max)) = (lag.mean_lag_time, lag.max_lag_time) {
        println!("  mean  {:.1} ms", mean * 1e3);
        println!("  max   {:.1} ms", max * 1e3);
    }
    for (steps, count) in &lag.lag_steps_histogram {
        println!("  {steps} step(s) behind: {count}");
    }

    println!(
        "\nShutdown: {} ms (uplink joined: {}, downlink joined: {})",
        outcome.shutdown.total_ms, outcome.shutdown.uplink_joined, outcome.shutdown.downlink_joined
    );
    Ok(())
}
