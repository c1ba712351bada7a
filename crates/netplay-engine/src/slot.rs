//! Capacity-one, latest-wins hand-off slot.
//!
//! [`LatestSlot`] is the single-slot queuing discipline: a `Mutex`-guarded
//! `Option` where a put replaces whatever is there and a take clears it.
//! A `Condvar` lets a consumer block until something arrives.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// A single-capacity slot with "set replaces, get clears" semantics.
///
/// Any number of producers and consumers may share it through an `Arc`.
/// No operation holds the lock across anything longer than the condvar's
/// own wait.
pub struct LatestSlot<T> {
    slot: Mutex<Option<T>>,
    ready: Condvar,
    puts: AtomicU64,
    overwritten: AtomicU64,
}

// Compile-time assertion: LatestSlot must be Send + Sync for Send payloads.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<LatestSlot<Vec<u8>>>();
};

impl<T> LatestSlot<T> {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            ready: Condvar::new(),
            puts: AtomicU64::new(0),
            overwritten: AtomicU64::new(0),
        }
    }

    // A poisoned slot still holds a well-formed Option.
    fn lock(&self) -> MutexGuard<'_, Option<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `value`, returning the unconsumed item it displaced.
    ///
    /// Never blocks beyond the lock. Wakes one blocked consumer.
    pub fn put(&self, value: T) -> Option<T> {
        let displaced = self.lock().replace(value);
        self.puts.fetch_add(1, Ordering::Relaxed);
        if displaced.is_some() {
            self.overwritten.fetch_add(1, Ordering::Relaxed);
        }
        self.ready.notify_one();
        displaced
    }

    /// Take the current item, leaving the slot empty. Non-blocking.
    pub fn take(&self) -> Option<T> {
        self.lock().take()
    }

    /// Block until an item is present, then take it.
    pub fn take_blocking(&self) -> T {
        let mut guard = self.lock();
        loop {
            if let Some(value) = guard.take() {
                return value;
            }
            guard = self
                .ready
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Block until an item is present or `timeout` elapses.
    pub fn take_timeout(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut guard = self.lock();
        loop {
            if let Some(value) = guard.take() {
                return Some(value);
            }
            let remaining = deadline.checked_duration_since(Instant::now())?;
            if remaining.is_zero() {
                return None;
            }
            guard = self
                .ready
                .wait_timeout(guard, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    /// Whether the slot currently holds nothing.
    pub fn is_empty(&self) -> bool {
        self.lock().is_none()
    }

    /// Total puts since creation.
    pub fn puts(&self) -> u64 {
        self.puts.load(Ordering::Relaxed)
    }

    /// Puts that displaced an unconsumed item.
    pub fn overwritten(&self) -> u64 {
        self.overwritten.load(Ordering::Relaxed)
    }
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for LatestSlot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LatestSlot")
            .field("empty", &self.is_empty())
            .field("puts", &self.puts())
            .field("overwritten", &self.overwritten())
            .finish()
    }
}
