//! Record builders for tests.
//!
//! - [`frame`]: a frame with a fixed-size single plane.
//! - [`remote_action`]: a reply as a transport would hand it over.
//! - [`envelope`]: a received action with explicit timestamps.

use netplay_core::{ActionEnvelope, EpisodeId, Frame, RemoteAction, StepId};
use smallvec::smallvec;

/// A frame for `step`/`episode` with a `size`-byte single plane and a
/// timestamp equal to the step number.
pub fn frame(step: u64, episode: u64, size: usize) -> Frame {
    Frame::new(
        StepId(step),
        EpisodeId(episode),
        step as f64,
        smallvec![vec![0u8; size]],
    )
}

/// A reply to the frame at `step`/`episode`.
pub fn remote_action(step: u64, episode: u64, action: u8) -> RemoteAction<u8> {
    RemoteAction {
        episode_id: EpisodeId(episode),
        step_id: StepId(step),
        frame_timestamp: 0.0,
        byte_size: 64,
        action,
    }
}

/// An envelope answering `step`/`episode`, sent at `sent` and received at
/// `received`.
pub fn envelope(step: u64, episode: u64, action: u8, sent: f64, received: f64) -> ActionEnvelope<u8> {
    ActionEnvelope {
        received_at: received,
        episode_id: EpisodeId(episode),
        step_id: StepId(step),
        frame_timestamp: sent,
        byte_size: 64,
        action,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_lag_matches_timestamps() {
        let e = envelope(3, 0, 1, 1.0, 1.5);
        assert_eq!(e.lag_time(), 0.5);
        assert_eq!(frame(2, 1, 10).byte_size, 10);
        assert_eq!(remote_action(4, 0, 2).step_id, StepId(4));
    }
}
