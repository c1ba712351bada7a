//! Inbound adapter: transport → pacing loop.
//!
//! [`channel`] creates a connected pair. The transport's receive loop
//! holds an [`ActionSink`] (cloneable) and delivers every decoded
//! [`RemoteAction`]; the sink stamps the arrival time. The pacing loop owns
//! the [`InboundChannel`] and consumes at most one envelope per step.
//!
//! - Single-slot: delivery overwrites a [`LatestSlot`]; the loop
//!   reads-and-clears it without blocking.
//! - Streaming: delivery enqueues; the loop waits for the next envelope
//!   up to a deadline.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use netplay_core::clock::wall_clock_secs;
use netplay_core::{ActionEnvelope, RemoteAction};

use crate::config::QueueMode;
use crate::slot::LatestSlot;

enum Producer<A> {
    Slot(Arc<LatestSlot<ActionEnvelope<A>>>),
    Stream(Sender<ActionEnvelope<A>>),
}

impl<A> Clone for Producer<A> {
    fn clone(&self) -> Self {
        match self {
            Self::Slot(slot) => Self::Slot(Arc::clone(slot)),
            Self::Stream(tx) => Self::Stream(tx.clone()),
        }
    }
}

enum Consumer<A> {
    Slot(Arc<LatestSlot<ActionEnvelope<A>>>),
    Stream(Receiver<ActionEnvelope<A>>),
}

/// Create a connected inbound pair for `mode`.
pub fn channel<A>(mode: QueueMode) -> (InboundChannel<A>, ActionSink<A>) {
    let closed = Arc::new(AtomicBool::new(false));
    let (producer, consumer) = match mode {
        QueueMode::SingleSlot => {
            let slot = Arc::new(LatestSlot::new());
            (Producer::Slot(Arc::clone(&slot)), Consumer::Slot(slot))
        }
        QueueMode::Streaming => {
            let (tx, rx) = crossbeam_channel::unbounded();
            (Producer::Stream(tx), Consumer::Stream(rx))
        }
    };
    (
        InboundChannel {
            consumer,
            mode,
            closed: Arc::clone(&closed),
        },
        ActionSink { producer, closed },
    )
}

// ── ActionSink ───────────────────────────────────────────────────

/// Returned by [`ActionSink::deliver`] once the pacing loop has stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkClosed;

impl fmt::Display for SinkClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "action sink closed")
    }
}

impl std::error::Error for SinkClosed {}

/// Producer half, held by the transport's receive loop.
pub struct ActionSink<A> {
    producer: Producer<A>,
    closed: Arc<AtomicBool>,
}

impl<A> Clone for ActionSink<A> {
    fn clone(&self) -> Self {
        Self {
            producer: self.producer.clone(),
            closed: Arc::clone(&self.closed),
        }
    }
}

impl<A> ActionSink<A> {
    /// Deliver an action, stamping it with the current wall-clock time.
    pub fn deliver(&self, action: RemoteAction<A>) -> Result<(), SinkClosed> {
        self.deliver_at(action, wall_clock_secs())
    }

    /// Deliver an action with an explicit arrival time.
    pub fn deliver_at(&self, action: RemoteAction<A>, received_at: f64) -> Result<(), SinkClosed> {
        if self.is_closed() {
            return Err(SinkClosed);
        }
        let envelope = ActionEnvelope::received(action, received_at);
        match &self.producer {
            Producer::Slot(slot) => {
                slot.put(envelope);
                Ok(())
            }
            Producer::Stream(tx) => tx.send(envelope).map_err(|_| SinkClosed),
        }
    }

    /// Whether the pacing loop has stopped accepting actions.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

// ── InboundChannel ───────────────────────────────────────────────

/// Result of waiting for an action in streaming mode.
#[derive(Debug)]
pub enum Wait<A> {
    /// The next envelope in arrival order.
    Ready(ActionEnvelope<A>),
    /// The deadline passed with the queue empty.
    DeadlineExpired,
    /// Every sink was dropped; no action can ever arrive.
    Disconnected,
}

/// Consumer half, owned by the pacing loop.
pub struct InboundChannel<A> {
    consumer: Consumer<A>,
    mode: QueueMode,
    closed: Arc<AtomicBool>,
}

impl<A> InboundChannel<A> {
    /// Queuing discipline of this channel.
    pub fn mode(&self) -> QueueMode {
        self.mode
    }

    /// Read-and-clear whatever is available right now. Never blocks.
    ///
    /// In single-slot mode this is the most recent delivery; in streaming
    /// mode it is the oldest queued envelope.
    pub fn take_latest(&self) -> Option<ActionEnvelope<A>> {
        match &self.consumer {
            Consumer::Slot(slot) => slot.take(),
            Consumer::Stream(rx) => rx.try_recv().ok(),
        }
    }

    /// Wait for the next envelope until `deadline`.
    ///
    /// In single-slot mode the slot is polled once and an empty slot
    /// reports [`Wait::DeadlineExpired`] immediately.
    pub fn wait_until(&self, deadline: Instant) -> Wait<A> {
        match &self.consumer {
            Consumer::Slot(slot) => match slot.take() {
                Some(envelope) => Wait::Ready(envelope),
                None => Wait::DeadlineExpired,
            },
            Consumer::Stream(rx) => {
                let timeout = deadline.saturating_duration_since(Instant::now());
                match rx.recv_timeout(timeout) {
                    Ok(envelope) => Wait::Ready(envelope),
                    Err(RecvTimeoutError::Timeout) => Wait::DeadlineExpired,
                    Err(RecvTimeoutError::Disconnected) => Wait::Disconnected,
                }
            }
        }
    }

    /// Stop accepting deliveries. Idempotent.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// A handle that can close this channel after it has been moved.
    pub fn closer(&self) -> InboundCloser {
        InboundCloser {
            closed: Arc::clone(&self.closed),
        }
    }
}

/// Cloneable handle that closes an [`InboundChannel`] from elsewhere.
///
/// Lets a session close the inbound side at its own point in the
/// shutdown sequence after the channel has moved into the pacing loop.
#[derive(Clone, Debug)]
pub struct InboundCloser {
    closed: Arc<AtomicBool>,
}

impl InboundCloser {
    /// Stop accepting deliveries. Idempotent.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Whether the channel has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netplay_core::StepId;
    use netplay_test_utils::fixtures;
    use std::thread;
    use std::time::Duration;

    fn remote(step: u64, action: u8) -> RemoteAction<u8> {
        fixtures::remote_action(step, 0, action)
    }

    #[test]
    fn single_slot_latest_wins() {
        let (inbound, sink) = channel(QueueMode::SingleSlot);
        sink.deliver_at(remote(0, 1), 100.1).unwrap();
        sink.deliver_at(remote(1, 2), 100.2).unwrap();
        let env = inbound.take_latest().unwrap();
        assert_eq!(env.action, 2);
        assert_eq!(env.step_id, StepId(1));
        assert_eq!(env.received_at, 100.2);
        assert!(inbound.take_latest().is_none());
    }

    #[test]
    fn deliver_stamps_wall_clock() {
        let (inbound, sink) = channel(QueueMode::SingleSlot);
        let before = wall_clock_secs();
        sink.deliver(remote(0, 1)).unwrap();
        let env = inbound.take_latest().unwrap();
        assert!(env.received_at >= before);
    }

    #[test]
    fn streaming_keeps_every_envelope_in_order() {
        let (inbound, sink) = channel(QueueMode::Streaming);
        for step in 0..3 {
            sink.deliver_at(remote(step, step as u8), 0.0).unwrap();
        }
        let deadline = Instant::now() + Duration::from_millis(50);
        for step in 0..3 {
            match inbound.wait_until(deadline) {
                Wait::Ready(env) => assert_eq!(env.step_id, StepId(step)),
                other => panic!("expected envelope, got {other:?}"),
            }
        }
        assert!(matches!(inbound.wait_until(deadline), Wait::DeadlineExpired));
    }

    #[test]
    fn streaming_wait_sees_late_delivery() {
        let (inbound, sink) = channel(QueueMode::Streaming);
        let producer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            sink.deliver(remote(0, 5)).unwrap();
        });
        let deadline = Instant::now() + Duration::from_secs(2);
        match inbound.wait_until(deadline) {
            Wait::Ready(env) => assert_eq!(env.action, 5),
            other => panic!("expected envelope, got {other:?}"),
        }
        producer.join().unwrap();
    }

    #[test]
    fn streaming_reports_disconnect() {
        let (inbound, sink) = channel::<u8>(QueueMode::Streaming);
        drop(sink);
        let deadline = Instant::now() + Duration::from_secs(1);
        assert!(matches!(inbound.wait_until(deadline), Wait::Disconnected));
    }

    #[test]
    fn deliver_after_close_fails() {
        let (inbound, sink) = channel(QueueMode::SingleSlot);
        let clone = sink.clone();
        inbound.close();
        assert!(sink.is_closed());
        assert_eq!(clone.deliver(remote(0, 1)), Err(SinkClosed));
    }

    #[test]
    fn closer_closes_moved_channel() {
        let (inbound, sink) = channel::<u8>(QueueMode::SingleSlot);
        let closer = inbound.closer();
        let holder = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            inbound.is_closed()
        });
        closer.close();
        assert!(closer.is_closed());
        assert_eq!(sink.deliver(remote(0, 1)), Err(SinkClosed));
        assert!(holder.join().unwrap());
    }

    #[test]
    fn dropped_streaming_channel_rejects_delivery() {
        let (inbound, sink) = channel::<u8>(QueueMode::Streaming);
        drop(inbound);
        assert_eq!(sink.deliver(remote(0, 1)), Err(SinkClosed));
    }
}
