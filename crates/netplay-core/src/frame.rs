//! Records that cross the transport boundary: outbound frames and
//! inbound action envelopes.

use smallvec::SmallVec;

use crate::id::{EpisodeId, StepId};

/// Codec output for one observation: one byte buffer per plane.
///
/// Uses `SmallVec<[Vec<u8>; 4]>` so the common four-frame history stack
/// keeps its plane list inline. Single-plane codecs simply produce one
/// entry.
pub type EncodedObservation = SmallVec<[Vec<u8>; 4]>;

/// A packaged, encoded observation ready to be sent to the remote side.
///
/// Created once per simulation step by the frame packager and never
/// mutated afterwards. Ownership moves into the outbound adapter, which
/// either forwards or discards it.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Step at which the observation was taken.
    pub step_id: StepId,
    /// Episode the observation belongs to.
    pub episode_id: EpisodeId,
    /// Wall-clock packaging time, seconds since the UNIX epoch.
    pub timestamp: f64,
    /// Encoded observation planes.
    pub encoded_observation: EncodedObservation,
    /// Total encoded size in bytes (sum of plane lengths).
    pub byte_size: usize,
}

impl Frame {
    /// Build a frame, computing `byte_size` from the encoded planes.
    pub fn new(
        step_id: StepId,
        episode_id: EpisodeId,
        timestamp: f64,
        encoded_observation: EncodedObservation,
    ) -> Self {
        let byte_size = encoded_observation.iter().map(Vec::len).sum();
        Self {
            step_id,
            episode_id,
            timestamp,
            encoded_observation,
            byte_size,
        }
    }

    /// Number of encoded planes.
    pub fn plane_count(&self) -> usize {
        self.encoded_observation.len()
    }
}

/// An action as handed over by the inbound transport.
///
/// The remote decision-maker echoes back the metadata of the frame it
/// acted on, which is what makes staleness measurable locally.
#[derive(Clone, Debug, PartialEq)]
pub struct RemoteAction<A> {
    /// Episode of the frame the action was computed for.
    pub episode_id: EpisodeId,
    /// Step of the frame the action was computed for.
    pub step_id: StepId,
    /// Packaging timestamp of that frame, echoed back unchanged.
    pub frame_timestamp: f64,
    /// Encoded size of that frame, echoed back unchanged.
    pub byte_size: usize,
    /// The opaque action payload.
    pub action: A,
}

impl<A> RemoteAction<A> {
    /// Build a reply to `frame` carrying `action`.
    pub fn reply_to(frame: &Frame, action: A) -> Self {
        Self {
            episode_id: frame.episode_id,
            step_id: frame.step_id,
            frame_timestamp: frame.timestamp,
            byte_size: frame.byte_size,
            action,
        }
    }
}

/// A received action stamped with its local arrival time.
///
/// Produced by the inbound adapter and consumed at most once by the
/// action resolver.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionEnvelope<A> {
    /// Wall-clock arrival time, seconds since the UNIX epoch.
    pub received_at: f64,
    /// Episode of the frame the action was computed for.
    pub episode_id: EpisodeId,
    /// Step of the frame the action was computed for.
    pub step_id: StepId,
    /// Packaging timestamp of the originating frame.
    pub frame_timestamp: f64,
    /// Encoded size of the originating frame.
    pub byte_size: usize,
    /// The opaque action payload.
    pub action: A,
}

impl<A> ActionEnvelope<A> {
    /// Stamp a remote action with its arrival time.
    pub fn received(remote: RemoteAction<A>, received_at: f64) -> Self {
        Self {
            received_at,
            episode_id: remote.episode_id,
            step_id: remote.step_id,
            frame_timestamp: remote.frame_timestamp,
            byte_size: remote.byte_size,
            action: remote.action,
        }
    }

    /// Round-trip time from frame packaging to action arrival, in seconds.
    pub fn lag_time(&self) -> f64 {
        self.received_at - self.frame_timestamp
    }
}
