//! Outbound adapter: pacing loop → transport.
//!
//! [`channel`] creates a connected pair. The pacing loop owns the
//! [`OutboundChannel`] and submits one [`Frame`] per step; the transport's
//! send loop owns the [`FrameSource`] and pulls frames until end-of-stream.
//!
//! - Single-slot: frames go through a [`LatestSlot`]; submitting replaces
//!   an unsent frame and never blocks.
//! - Streaming: frames go through an unbounded crossbeam channel and are
//!   delivered in submission order.
//!
//! Closing (explicitly or on drop) enqueues an end-of-stream sentinel.
//! In single-slot mode the sentinel also replaces any unsent frame.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use netplay_core::Frame;

use crate::config::QueueMode;
use crate::slot::LatestSlot;

enum Item {
    Frame(Frame),
    Close,
}

enum Producer {
    Slot(Arc<LatestSlot<Item>>),
    Stream(Sender<Item>),
}

enum Consumer {
    Slot(Arc<LatestSlot<Item>>),
    Stream(Receiver<Item>),
}

/// Create a connected outbound pair for `mode`.
pub fn channel(mode: QueueMode) -> (OutboundChannel, FrameSource) {
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
        OutboundChannel {
            producer,
            mode,
            submitted: 0,
            dropped: 0,
            closed: false,
        },
        FrameSource {
            consumer,
            finished: false,
        },
    )
}

// ── OutboundChannel ──────────────────────────────────────────────

/// Producer half, owned by the pacing loop.
pub struct OutboundChannel {
    producer: Producer,
    mode: QueueMode,
    submitted: u64,
    dropped: u64,
    closed: bool,
}

impl OutboundChannel {
    /// Queuing discipline of this channel.
    pub fn mode(&self) -> QueueMode {
        self.mode
    }

    /// Hand a frame to the transport. Never blocks.
    ///
    /// Frames submitted after [`close`](Self::close) are discarded.
    pub fn submit(&mut self, frame: Frame) {
        if self.closed {
            self.dropped += 1;
            return;
        }
        self.submitted += 1;
        match &self.producer {
            Producer::Slot(slot) => {
                if let Some(Item::Frame(_)) = slot.put(Item::Frame(frame)) {
                    self.dropped += 1;
                }
            }
            Producer::Stream(tx) => {
                // The transport has gone away; nothing will read the frame.
                if tx.send(Item::Frame(frame)).is_err() {
                    self.dropped += 1;
                }
            }
        }
    }

    /// Signal end-of-stream. Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        match &self.producer {
            Producer::Slot(slot) => {
                if let Some(Item::Frame(_)) = slot.put(Item::Close) {
                    self.dropped += 1;
                }
            }
            Producer::Stream(tx) => {
                let _ = tx.send(Item::Close);
            }
        }
    }

    /// Whether end-of-stream has been signalled.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Frames accepted by [`submit`](Self::submit) before close.
    pub fn frames_submitted(&self) -> u64 {
        self.submitted
    }

    /// Frames superseded before the transport pulled them, or submitted
    /// with nobody left to pull them.
    pub fn frames_dropped(&self) -> u64 {
        self.dropped
    }
}

impl Drop for OutboundChannel {
    fn drop(&mut self) {
        self.close();
    }
}

// ── FrameSource ──────────────────────────────────────────────────

/// Result of a bounded pull.
#[derive(Debug)]
pub enum Pull {
    /// The next frame to send.
    Frame(Frame),
    /// End-of-stream: the pacing loop has stopped.
    Closed,
    /// Nothing arrived within the timeout.
    TimedOut,
}

/// Consumer half, owned by the transport's send loop.
pub struct FrameSource {
    consumer: Consumer,
    finished: bool,
}

impl FrameSource {
    /// Block until the next frame, or `None` at end-of-stream.
    ///
    /// In single-slot mode this is the most recent frame; older unsent
    /// frames are never observed. Once `None` has been returned every
    /// later call returns `None` immediately.
    pub fn next_frame(&mut self) -> Option<Frame> {
        if self.finished {
            return None;
        }
        let item = match &self.consumer {
            Consumer::Slot(slot) => slot.take_blocking(),
            Consumer::Stream(rx) => rx.recv().unwrap_or(Item::Close),
        };
        self.accept(item)
    }

    /// Like [`next_frame`](Self::next_frame), giving up after `timeout`.
    pub fn next_frame_timeout(&mut self, timeout: Duration) -> Pull {
        if self.finished {
            return Pull::Closed;
        }
        let item = match &self.consumer {
            Consumer::Slot(slot) => match slot.take_timeout(timeout) {
                Some(item) => item,
                None => return Pull::TimedOut,
            },
            Consumer::Stream(rx) => match rx.recv_timeout(timeout) {
                Ok(item) => item,
                Err(RecvTimeoutError::Timeout) => return Pull::TimedOut,
                Err(RecvTimeoutError::Disconnected) => Item::Close,
            },
        };
        match self.accept(item) {
            Some(frame) => Pull::Frame(frame),
            None => Pull::Closed,
        }
    }

    /// Whether end-of-stream has been observed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn accept(&mut self, item: Item) -> Option<Frame> {
        match item {
            Item::Frame(frame) => Some(frame),
            Item::Close => {
                self.finished = true;
                None
            }
        }
    }
}

impl Iterator for FrameSource {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        self.next_frame()
    }
}
