//! Observation → transmittable [`Frame`].

use netplay_core::clock::wall_clock_secs;
use netplay_core::{CodecError, EpisodeId, Frame, ObservationCodec, StepId};

/// Wraps the codec and stamps frames with step, episode and time.
#[derive(Clone, Debug)]
pub struct FramePackager<C> {
    codec: C,
}

impl<C> FramePackager<C> {
    /// Create a packager around `codec`.
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    /// Encode `observation` into a frame timestamped now.
    ///
    /// Encoding failure yields no frame at all.
    pub fn package<O>(
        &self,
        step_id: StepId,
        episode_id: EpisodeId,
        observation: &O,
    ) -> Result<Frame, CodecError>
    where
        C: ObservationCodec<O>,
    {
        let planes = self.codec.encode(observation)?;
        Ok(Frame::new(step_id, episode_id, wall_clock_secs(), planes))
    }

    /// The wrapped codec.
    pub fn codec(&self) -> &C {
        &self.codec
    }
}
