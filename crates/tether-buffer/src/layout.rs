//! Word-level layout of the exchange buffer.
//!
//! Every body record is [`RECORD_WORDS`] 32-bit words:
//!
//! ```text
//!  0..16   pose matrix, column-major f32
//! 16       linear speed, f32
//! 17       angular speed, f32
//! 18..26   collision slots, i32: peer slot index or -1
//! ```
//!
//! Floats and ints share the word array through their bit patterns, so
//! the layout is identical regardless of transport. The two header
//! words (state flag, last step duration) precede the record block in
//! the externally visible layout; both transports here keep them out of
//! band, so record offsets are relative to the record block.

use tether_core::Slot;

/// Words in the shared-region header.
pub const HEADER_WORDS: usize = 2;

/// Header word holding the handshake state flag.
pub const STATE_WORD: usize = 0;

/// Header word holding the last step duration (f32 bits, milliseconds).
pub const STEP_DURATION_WORD: usize = 1;

/// Words occupied by the pose matrix at the start of each record.
pub const POSE_WORDS: usize = 16;

/// Record offset of the linear speed float.
pub const LINEAR_SPEED_OFFSET: usize = 16;

/// Record offset of the angular speed float.
pub const ANGULAR_SPEED_OFFSET: usize = 17;

/// Record offset of the first collision slot.
pub const CONTACT_OFFSET: usize = 18;

/// Collision slots per record. Contacts beyond this are truncated.
pub const CONTACT_SLOTS: usize = 8;

/// Total words per body record.
pub const RECORD_WORDS: usize = CONTACT_OFFSET + CONTACT_SLOTS;

/// Sentinel collision-slot value meaning "no contact".
pub const NO_CONTACT: i32 = -1;

/// First word of the record for `slot`, relative to the record block.
pub fn record_base(slot: Slot) -> usize {
    slot.index() * RECORD_WORDS
}

/// Total record-block length in words for a body capacity.
pub fn block_words(max_bodies: u32) -> usize {
    max_bodies as usize * RECORD_WORDS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_26_words() {
        assert_eq!(RECORD_WORDS, 26);
    }

    #[test]
    fn record_bases_do_not_overlap() {
        assert_eq!(record_base(Slot(0)), 0);
        assert_eq!(record_base(Slot(1)), 26);
        assert_eq!(record_base(Slot(7)), 7 * 26);
    }

    #[test]
    fn block_covers_all_slots() {
        assert_eq!(block_words(4), 104);
        assert_eq!(
            record_base(Slot(3)) + RECORD_WORDS,
            block_words(4),
            "last record ends exactly at the block boundary"
        );
    }
}
