//! Bookkeeping between host-visible ids and engine-internal state.
//!
//! The host names things by stable ids ([`BodyId`](tether_core::BodyId),
//! [`ShapeSetId`](tether_core::ShapeSetId),
//! [`ConstraintId`](tether_core::ConstraintId)); the engine hands back
//! opaque handles; the exchange buffer is addressed by dense slots.
//! This crate owns the three-way mapping:
//!
//! - [`SlotAllocator`]: a fixed-capacity free list of buffer slots with
//!   per-slot generations, so a slot recycled after removal cannot be
//!   confused with its previous occupant.
//! - [`BodyRegistry`]: id ↔ slot ↔ handle for live bodies, plus each
//!   body's configuration, sync counter, and attached shapes.
//! - [`ShapeRegistry`]: shape sets with exclusive or shared ownership.
//! - [`ConstraintRegistry`]: constraints and the body pair each joins.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bodies;
pub mod constraints;
pub mod shapes;
pub mod slots;

pub use bodies::{BodyEntry, BodyRegistry};
pub use constraints::{ConstraintEntry, ConstraintRegistry};
pub use shapes::{ShapeOwnership, ShapeRegistry, ShapeSet};
pub use slots::{SlotAllocator, SlotTicket};
