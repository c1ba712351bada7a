//! Benchmark profiles and fixtures for the netplay control loop.
//!
//! - [`reference_config`]: a 60 steps/s run with the default tolerance
//! - [`atari_frame`]: a four-plane frame sized like stacked 84×84 screens
//! - [`envelope_stream`]: answers to consecutive frames with a fixed lag

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use netplay_core::{ActionEnvelope, EncodedObservation, EpisodeId, Frame, StepId};
use netplay_engine::{PlayConfig, QueueMode};
use smallvec::SmallVec;

/// Side of one observation plane.
pub const PLANE_SIDE: usize = 84;

/// Planes per observation.
pub const PLANES: usize = 4;

/// A one-second run at 60 steps/s with tolerance 1.
pub fn reference_config(mode: QueueMode) -> PlayConfig {
    PlayConfig {
        steps_per_second: 60,
        frame_skip_tolerance: 1,
        time_limit_secs: 1,
        mode,
        ..PlayConfig::default()
    }
}

/// A frame of [`PLANES`] planes of `PLANE_SIDE²` bytes for `step`.
///
/// Plane contents vary with the step so that no two frames are equal.
pub fn atari_frame(step: u64) -> Frame {
    let planes: EncodedObservation = (0..PLANES)
        .map(|p| vec![(step as usize + p) as u8; PLANE_SIDE * PLANE_SIDE])
        .collect::<SmallVec<_>>();
    Frame::new(StepId(step), EpisodeId(0), step as f64 * 0.016, planes)
}

/// `n` envelopes answering steps `0..n` of `episode`, each received
/// `lag_secs` after its frame was sent.
pub fn envelope_stream(n: u64, episode: u64, lag_secs: f64) -> Vec<ActionEnvelope<u8>> {
    (0..n)
        .map(|step| {
            let sent = step as f64 * 0.016;
            ActionEnvelope {
                received_at: sent + lag_secs,
                episode_id: EpisodeId(episode),
                step_id: StepId(step),
                frame_timestamp: sent,
                byte_size: PLANES * PLANE_SIDE * PLANE_SIDE,
                action: (step % 18) as u8,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_config_validates() {
        assert!(reference_config(QueueMode::SingleSlot).validate().is_ok());
        assert_eq!(reference_config(QueueMode::Streaming).max_steps(), 60);
    }

    #[test]
    fn atari_frame_size() {
        let frame = atari_frame(3);
        assert_eq!(frame.plane_count(), PLANES);
        assert_eq!(frame.byte_size, PLANES * PLANE_SIDE * PLANE_SIDE);
        assert_ne!(frame, atari_frame(4));
    }

    #[test]
    fn envelope_stream_lag_is_constant() {
        let stream = envelope_stream(10, 2, 0.05);
        assert_eq!(stream.len(), 10);
        assert!(stream.iter().all(|e| (e.lag_time() - 0.05).abs() < 1e-9));
        assert!(stream.iter().all(|e| e.episode_id == EpisodeId(2)));
    }
}
