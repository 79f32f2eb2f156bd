//! Strongly-typed identifiers shared across the workspace.
//!
//! External ids ([`BodyId`], [`ShapeSetId`], [`ConstraintId`]) are assigned
//! by the host and opaque to the simulation side; the host may derive them
//! from uuids, entity ids, or anything else that is unique for the lifetime
//! of the entity. [`Slot`] is the simulation-assigned position in the
//! exchange buffer and the registries.

use std::fmt;

/// Stable external identifier for a rigid body.
///
/// Assigned by the host on `AddBody` and used in every subsequent command
/// that references the body. The (id ↔ slot) mapping is a bijection for
/// the lifetime of the body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u64);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for BodyId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Stable external identifier for a set of collision shapes.
///
/// A shape set is either exclusively owned by one body (created through
/// `AddShapes`) or shared across bodies (created through `CreateShapes`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeSetId(pub u64);

impl fmt::Display for ShapeSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ShapeSetId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Stable external identifier for an inter-body constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintId(pub u64);

impl fmt::Display for ConstraintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ConstraintId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// A fixed position in the exchange buffer and the registries.
///
/// Slots are stable while the owning body is alive and returned to the
/// free list on removal, after which the index may be reissued to a new
/// body. Code that may hold a slot across a removal should carry the
/// allocator's generation ticket alongside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot(pub u32);

impl Slot {
    /// The slot as a buffer/array index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Slot {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Monotonically increasing tick counter.
///
/// Incremented each time the simulation advances one step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickId(pub u64);

impl fmt::Display for TickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TickId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
