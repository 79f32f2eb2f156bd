//! Transfer transport: the record block as an owned, round-tripping value.
//!
//! Instead of sharing memory, the whole record block moves between the
//! sides each tick: the simulation fills a [`FrameBuffer`] and sends it
//! to the host; the host reads it and sends it back. There is never
//! more than one owner, so no flag is needed — at the cost of a full
//! ownership round trip per tick instead of in-place mutation.

use crate::layout;

/// One frame of body records plus its step duration.
///
/// The word layout is identical to the shared region's record block.
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    words: Vec<u32>,
    step_duration_ms: f32,
    max_bodies: u32,
}

impl FrameBuffer {
    /// Allocate a zero-filled frame for `max_bodies` records.
    pub fn new(max_bodies: u32) -> Self {
        Self {
            words: vec![0; layout::block_words(max_bodies)],
            step_duration_ms: 0.0,
            max_bodies,
        }
    }

    /// The configured body capacity.
    pub fn max_bodies(&self) -> u32 {
        self.max_bodies
    }

    /// Step duration recorded when this frame was published.
    pub fn step_duration_ms(&self) -> f32 {
        self.step_duration_ms
    }

    /// Record the step duration for this frame.
    pub fn set_step_duration_ms(&mut self, ms: f32) {
        self.step_duration_ms = ms;
    }

    /// Load one record word.
    pub fn load(&self, index: usize) -> u32 {
        self.words[index]
    }

    /// Store one record word.
    pub fn store(&mut self, index: usize, word: u32) {
        self.words[index] = word;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_starts_zeroed() {
        let frame = FrameBuffer::new(2);
        assert_eq!(frame.max_bodies(), 2);
        assert_eq!(frame.load(0), 0);
        assert_eq!(frame.load(layout::block_words(2) - 1), 0);
    }

    #[test]
    fn words_and_duration_round_trip() {
        let mut frame = FrameBuffer::new(1);
        frame.store(16, 9.5f32.to_bits());
        frame.set_step_duration_ms(0.25);
        assert_eq!(f32::from_bits(frame.load(16)), 9.5);
        assert_eq!(frame.step_duration_ms(), 0.25);
    }
}
