//! In-process transport with a simulated link.
//!
//! [`loopback`] builds an [`Uplink`]/[`Downlink`] pair that hands every
//! frame to a [`RemoteAgent`] on the uplink thread and delivers its reply
//! on the downlink thread after a simulated one-way delay. Replies keep
//! their order. Frames can be lost with a fixed probability.
//!
//! Used by the demo binaries and the integration tests; a real deployment
//! supplies its own network transport.

use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use netplay_core::{Frame, RemoteAction, TransportError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::inbound::ActionSink;
use crate::outbound::FrameSource;
use crate::transport::{Downlink, Uplink};

/// Decides an action for a received frame.
///
/// Returning `None` models a remote side that chose not to answer.
pub trait RemoteAgent<A>: Send + 'static {
    /// Compute the reply to `frame`.
    fn act(&mut self, frame: &Frame) -> Option<A>;
}

impl<A, F> RemoteAgent<A> for F
where
    F: FnMut(&Frame) -> Option<A> + Send + 'static,
{
    fn act(&mut self, frame: &Frame) -> Option<A> {
        self(frame)
    }
}

/// Simulated link characteristics.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkProfile {
    /// Fixed delay between a frame being pulled and its reply arriving.
    pub latency: Duration,
    /// Upper bound of a uniform random delay added to `latency`.
    pub jitter: Duration,
    /// Probability in `[0, 1]` that a frame is lost before reaching the
    /// agent.
    pub loss: f64,
    /// Seed for jitter and loss.
    pub seed: u64,
}

impl Default for LinkProfile {
    fn default() -> Self {
        Self {
            latency: Duration::ZERO,
            jitter: Duration::ZERO,
            loss: 0.0,
            seed: 0,
        }
    }
}

impl LinkProfile {
    /// A lossless link with a fixed `latency`.
    pub fn fixed(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }
}

struct InFlight<A> {
    due: Instant,
    action: RemoteAction<A>,
}

/// Build a connected loopback transport around `agent`.
pub fn loopback<A, G>(agent: G, link: LinkProfile) -> (LoopbackUplink<A, G>, LoopbackDownlink<A>)
where
    A: Send + 'static,
    G: RemoteAgent<A>,
{
    let (tx, rx) = crossbeam_channel::unbounded();
    let rng = ChaCha8Rng::seed_from_u64(link.seed);
    (
        LoopbackUplink {
            agent,
            link,
            rng,
            tx,
            frames_seen: 0,
        },
        LoopbackDownlink { rx },
    )
}

/// Send side: runs the agent on each frame and schedules its reply.
pub struct LoopbackUplink<A, G> {
    agent: G,
    link: LinkProfile,
    rng: ChaCha8Rng,
    tx: Sender<InFlight<A>>,
    frames_seen: u64,
}

impl<A, G> LoopbackUplink<A, G>
where
    A: Send + 'static,
    G: RemoteAgent<A>,
{
    fn delay(&mut self) -> Duration {
        if self.link.jitter.is_zero() {
            return self.link.latency;
        }
        let extra = self.link.jitter.mul_f64(self.rng.gen::<f64>());
        self.link.latency + extra
    }

    fn lost(&mut self) -> bool {
        let p = self.link.loss.clamp(0.0, 1.0);
        p > 0.0 && self.rng.gen_bool(p)
    }
}

impl<A, G> Uplink for LoopbackUplink<A, G>
where
    A: Send + 'static,
    G: RemoteAgent<A>,
{
    fn run(&mut self, frames: FrameSource) -> Result<(), TransportError> {
        for frame in frames {
            self.frames_seen += 1;
            if self.lost() {
                continue;
            }
            let Some(action) = self.agent.act(&frame) else {
                continue;
            };
            let due = Instant::now() + self.delay();
            let reply = InFlight {
                due,
                action: RemoteAction::reply_to(&frame, action),
            };
            if self.tx.send(reply).is_err() {
                return Err(TransportError::Disconnected {
                    reason: "loopback downlink dropped".into(),
                });
            }
        }
        Ok(())
    }
}

/// Receive side: delivers replies once their delay has elapsed.
pub struct LoopbackDownlink<A> {
    rx: Receiver<InFlight<A>>,
}

const POLL: Duration = Duration::from_millis(5);

impl<A: Send + 'static> Downlink<A> for LoopbackDownlink<A> {
    fn run(&mut self, actions: ActionSink<A>) -> Result<(), TransportError> {
        for in_flight in self.rx.iter() {
            loop {
                if actions.is_closed() {
                    return Ok(());
                }
                let now = Instant::now();
                if now >= in_flight.due {
                    break;
                }
                thread::sleep((in_flight.due - now).min(POLL));
            }
            if actions.deliver(in_flight.action).is_err() {
                return Ok(());
            }
        }
        Ok(())
    }
}
