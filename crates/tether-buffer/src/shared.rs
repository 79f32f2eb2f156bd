//! Shared-memory transport: one region, an atomic handshake flag.
//!
//! The region is a flat array of `AtomicU32` words. The handshake flag
//! alone carries Acquire/Release ordering; record words use relaxed
//! loads and stores because every record access is bracketed by a flag
//! transition, which establishes the happens-before edge. This grants
//! exclusive write access to exactly one side at a time without a lock
//! and without torn reads.
//!
//! Flag protocol:
//! - [`CONSUMED`]: the host has copied the previous frame; the
//!   simulation side may write records and eventually flip to READY.
//! - [`READY`]: a fresh frame is published; the host may read (and
//!   write host-authored poses) and eventually flips back to CONSUMED.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::layout;

/// Flag value: host finished consuming; simulation side owns the region.
pub const CONSUMED: u32 = 0;

/// Flag value: frame published; host owns the region.
pub const READY: u32 = 1;

/// The shared exchange region.
///
/// Created once at initialization and shared via `Arc` between the
/// [`ExchangeBuffer`](crate::ExchangeBuffer) and
/// [`HostBuffer`](crate::HostBuffer) halves.
#[derive(Debug)]
pub struct SharedRegion {
    state: AtomicU32,
    step_duration: AtomicU32,
    words: Vec<AtomicU32>,
    max_bodies: u32,
}

impl SharedRegion {
    /// Allocate a zero-filled region for `max_bodies` records.
    ///
    /// The flag starts at [`CONSUMED`] so the simulation side owns the
    /// region for the first tick.
    pub fn new(max_bodies: u32) -> Self {
        let len = layout::block_words(max_bodies);
        let mut words = Vec::with_capacity(len);
        words.resize_with(len, || AtomicU32::new(0));
        Self {
            state: AtomicU32::new(CONSUMED),
            step_duration: AtomicU32::new(0f32.to_bits()),
            words,
            max_bodies,
        }
    }

    /// The configured body capacity.
    pub fn max_bodies(&self) -> u32 {
        self.max_bodies
    }

    /// Whether the simulation side currently owns the region.
    pub fn sim_owns(&self) -> bool {
        self.state.load(Ordering::Acquire) != READY
    }

    /// Whether the host currently owns the region.
    pub fn host_owns(&self) -> bool {
        self.state.load(Ordering::Acquire) == READY
    }

    /// Publish the current frame: store the step duration and hand the
    /// region to the host.
    ///
    /// Must only be called by the simulation side while it owns the
    /// region.
    pub fn publish(&self, step_duration_ms: f32) {
        self.step_duration
            .store(step_duration_ms.to_bits(), Ordering::Relaxed);
        self.state.store(READY, Ordering::Release);
    }

    /// Hand the region back to the simulation side.
    ///
    /// Must only be called by the host while it owns the region.
    pub fn consume(&self) {
        self.state.store(CONSUMED, Ordering::Release);
    }

    /// Last published step duration in milliseconds.
    pub fn step_duration_ms(&self) -> f32 {
        f32::from_bits(self.step_duration.load(Ordering::Relaxed))
    }

    /// Load one record word. The caller owns the region per the flag.
    pub fn load(&self, index: usize) -> u32 {
        self.words[index].load(Ordering::Relaxed)
    }

    /// Store one record word. The caller owns the region per the flag.
    pub fn store(&self, index: usize, word: u32) {
        self.words[index].store(word, Ordering::Relaxed);
    }
}
