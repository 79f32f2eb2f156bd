//! Fixed-capacity slot allocation with generation tagging.
//!
//! Buffer slots are recycled: when a body is removed its slot goes back
//! on the free list and may be handed to the next body. A bare slot
//! index is therefore ambiguous across removals. Every allocation is
//! tagged with the slot's current generation, and the generation bumps
//! on release, so a [`SlotTicket`] from before a recycle fails the
//! [`SlotAllocator::is_current`] check in O(1).

use std::fmt;

use tether_core::Slot;

const FREE_END: i32 = -1;
/// Link value marking a slot as handed out, so a double release is
/// detectable without scanning the free list.
const ALLOCATED: i32 = -2;

/// A slot together with the generation it was allocated under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct SlotTicket {
    slot: Slot,
    generation: u32,
}

impl SlotTicket {
    /// The allocated slot.
    pub fn slot(&self) -> Slot {
        self.slot
    }

    /// The generation this ticket belongs to.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for SlotTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot {}@{}", self.slot, self.generation)
    }
}

/// Free-list allocator over a fixed range of buffer slots.
///
/// Allocation and release are O(1). Slots are handed out lowest-index
/// first on a fresh allocator, then in LIFO recycle order.
pub struct SlotAllocator {
    /// Free-list links: `next[i]` is the next free slot after `i`,
    /// [`FREE_END`] at the tail, or [`ALLOCATED`] while the slot is out.
    next: Vec<i32>,
    /// Head of the free list, or [`FREE_END`] when full.
    head: i32,
    /// Current generation of each slot. Bumped on release.
    generations: Vec<u32>,
    live: u32,
}

impl SlotAllocator {
    /// Create an allocator for `capacity` slots, all free.
    pub fn new(capacity: u32) -> Self {
        let n = capacity as usize;
        let mut next = Vec::with_capacity(n);
        for i in 0..n {
            let link = i as i32 + 1;
            next.push(if link as usize == n { FREE_END } else { link });
        }
        Self {
            next,
            head: if n == 0 { FREE_END } else { 0 },
            generations: vec![0; n],
            live: 0,
        }
    }

    /// Total number of slots.
    pub fn capacity(&self) -> u32 {
        self.next.len() as u32
    }

    /// Number of currently allocated slots.
    pub fn len(&self) -> u32 {
        self.live
    }

    /// Whether no slot is allocated.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Take a free slot, or `None` when the allocator is full.
    pub fn allocate(&mut self) -> Option<SlotTicket> {
        if self.head == FREE_END {
            return None;
        }
        let index = self.head as usize;
        self.head = self.next[index];
        self.next[index] = ALLOCATED;
        self.live += 1;
        Some(SlotTicket {
            slot: Slot(index as u32),
            generation: self.generations[index],
        })
    }

    /// Return a slot to the free list and invalidate outstanding
    /// tickets for it.
    ///
    /// Releasing a slot that is out of range or not currently allocated
    /// is a caller bug, caught by debug assertions.
    pub fn release(&mut self, slot: Slot) {
        let index = slot.index();
        debug_assert!(index < self.next.len(), "{slot} out of range");
        debug_assert_eq!(self.next[index], ALLOCATED, "{slot} is not allocated");
        self.generations[index] = self.generations[index].wrapping_add(1);
        self.next[index] = self.head;
        self.head = index as i32;
        self.live -= 1;
    }

    /// Whether `ticket` still names the current occupant of its slot.
    pub fn is_current(&self, ticket: SlotTicket) -> bool {
        self.generations[ticket.slot.index()] == ticket.generation
    }
}
