//! Transport seams.
//!
//! A transport is two blocking loops, each run on its own thread by
//! [`GameSession`](crate::session::GameSession): an [`Uplink`] that pulls
//! frames from a [`FrameSource`] and sends them, and a [`Downlink`] that
//! receives actions and hands them to an [`ActionSink`]. There is no
//! acknowledgment and no back-pressure in either direction.
//!
//! Closures implement both traits, which keeps small transports and test
//! doubles short.

use netplay_core::TransportError;

use crate::inbound::ActionSink;
use crate::outbound::FrameSource;

/// The send loop.
pub trait Uplink: Send + 'static {
    /// Pull and send frames until the source reports end-of-stream.
    ///
    /// Returning early with an error ends only this loop; the pacing loop
    /// keeps running and the error is recorded in the session report.
    fn run(&mut self, frames: FrameSource) -> Result<(), TransportError>;
}

/// The receive loop.
pub trait Downlink<A>: Send + 'static {
    /// Receive actions and deliver them until delivery reports the sink
    /// closed or the connection ends.
    fn run(&mut self, actions: ActionSink<A>) -> Result<(), TransportError>;
}

impl<F> Uplink for F
where
    F: FnMut(FrameSource) -> Result<(), TransportError> + Send + 'static,
{
    fn run(&mut self, frames: FrameSource) -> Result<(), TransportError> {
        self(frames)
    }
}

impl<A, F> Downlink<A> for F
where
    F: FnMut(ActionSink<A>) -> Result<(), TransportError> + Send + 'static,
{
    fn run(&mut self, actions: ActionSink<A>) -> Result<(), TransportError> {
        self(actions)
    }
}
