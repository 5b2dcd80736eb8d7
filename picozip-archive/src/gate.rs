//! The append gate serializing writes to the archive stream.
//!
//! Compression runs concurrently on caller threads; only the short section
//! that captures the entry offset, writes the header and payload, and
//! records the entry needs mutual exclusion. The gate is a binary token:
//! acquisition spins (yielding between attempts) until the token is free,
//! with no fairness ordering and no timeout.

use std::cell::UnsafeCell;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

/// A spinning binary mutex owning the state it guards.
#[derive(Debug)]
pub struct AppendGate<T> {
    claimed: AtomicBool,
    state: UnsafeCell<T>,
}

// The guard hands out &mut T only while the token is held.
unsafe impl<T: Send> Sync for AppendGate<T> {}
unsafe impl<T: Send> Send for AppendGate<T> {}

impl<T> AppendGate<T> {
    /// Wrap `state` behind the gate.
    pub fn new(state: T) -> Self {
        Self {
            claimed: AtomicBool::new(false),
            state: UnsafeCell::new(state),
        }
    }

    /// Claim the token, blocking until it is free.
    pub fn enter(&self) -> GateGuard<'_, T> {
        while self
            .claimed
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            thread::yield_now();
        }
        GateGuard { gate: self }
    }

    /// Consume the gate and return the guarded state.
    pub fn into_inner(self) -> T {
        self.state.into_inner()
    }
}

/// Exclusive access to the guarded state; releases the token on drop.
#[derive(Debug)]
pub struct GateGuard<'a, T> {
    gate: &'a AppendGate<T>,
}

impl<T> Deref for GateGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // Safety: the token is held for the guard's lifetime.
        unsafe { &*self.gate.state.get() }
    }
}

impl<T> DerefMut for GateGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // Safety: the token is held and the guard is borrowed uniquely.
        unsafe { &mut *self.gate.state.get() }
    }
}

impl<T> Drop for GateGuard<'_, T> {
    fn drop(&mut self) {
        self.gate.claimed.store(false, Ordering::Release);
    }
}
