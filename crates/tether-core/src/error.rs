//! Error types for the Tether synchronization layer.
//!
//! The taxonomy distinguishes registry failures (capacity, unknown or
//! stale identifiers) from engine-collaborator failures (rejected
//! operations). Dependent commands that reference a missing entity are
//! not errors at all — they stay pending in the dispatcher.

use std::error::Error;
use std::fmt;

use crate::id::{BodyId, ConstraintId, ShapeSetId, Slot};

/// Errors from registry operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// Slot allocation requested beyond the configured maximum.
    ///
    /// Surfaced as a hard error: the body is not added and the caller
    /// must know (never silently swallowed).
    CapacityExceeded {
        /// The configured maximum body count.
        max_bodies: u32,
    },
    /// A command referenced a body id that is not registered.
    UnknownBody {
        /// The unrecognized id.
        body: BodyId,
    },
    /// A command referenced a shape set id that is not registered.
    UnknownShapeSet {
        /// The unrecognized id.
        shapes: ShapeSetId,
    },
    /// A command referenced a constraint id that is not registered.
    UnknownConstraint {
        /// The unrecognized id.
        constraint: ConstraintId,
    },
    /// A slot ticket's generation no longer matches the allocator.
    ///
    /// The slot was released (and possibly reissued) after the ticket
    /// was taken.
    StaleSlot {
        /// The slot whose generation mismatched.
        slot: Slot,
    },
    /// `AddBody` used an id that is already alive.
    DuplicateBody {
        /// The conflicting id.
        body: BodyId,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded { max_bodies } => {
                write!(f, "body capacity exceeded (max {max_bodies})")
            }
            Self::UnknownBody { body } => write!(f, "unknown body {body}"),
            Self::UnknownShapeSet { shapes } => write!(f, "unknown shape set {shapes}"),
            Self::UnknownConstraint { constraint } => {
                write!(f, "unknown constraint {constraint}")
            }
            Self::StaleSlot { slot } => write!(f, "stale slot ticket for slot {slot}"),
            Self::DuplicateBody { body } => write!(f, "body {body} already registered"),
        }
    }
}

impl Error for RegistryError {}

/// Errors from the external physics engine collaborator.
///
/// Fatal for the operation that triggered them; never retried.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineError {
    /// The collaborator rejected the supplied geometry.
    InvalidGeometry {
        /// Human-readable description from the collaborator.
        reason: String,
    },
    /// The collaborator does not support the requested operation
    /// (e.g. a mesh shape on a dynamic body).
    Unsupported {
        /// Human-readable description.
        reason: String,
    },
    /// Any other collaborator failure.
    Failed {
        /// Human-readable description.
        reason: String,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGeometry { reason } => write!(f, "invalid geometry: {reason}"),
            Self::Unsupported { reason } => write!(f, "unsupported operation: {reason}"),
            Self::Failed { reason } => write!(f, "engine failure: {reason}"),
        }
    }
}

impl Error for EngineError {}
