//! Fixed-layout exchange buffer between host and simulation.
//!
//! The buffer carries one record per body slot: a 4×4 pose matrix,
//! linear and angular speed, and a fixed number of collision slots.
//! Two interchangeable transports produce bit-identical layouts:
//!
//! - **Shared mode** ([`shared::SharedRegion`]): one region visible to
//!   both sides, coordinated by an atomic consumed/ready flag. Exactly
//!   one side may write at a time; nobody blocks.
//! - **Transfer mode** ([`transfer::FrameBuffer`]): the record block is
//!   an owned value that round-trips between the sides over channels,
//!   so exclusivity is structural.
//!
//! [`ExchangeBuffer`] is the simulation-side handle, [`HostBuffer`] the
//! host-side one; both are created as a pair by [`ExchangeBuffer::shared`]
//! or [`ExchangeBuffer::transfer`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod exchange;
pub mod layout;
pub mod shared;
pub mod transfer;

pub use exchange::{ExchangeBuffer, HostBuffer};
pub use layout::{CONTACT_SLOTS, RECORD_WORDS};
pub use shared::SharedRegion;
pub use transfer::FrameBuffer;
