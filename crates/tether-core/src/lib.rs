//! Core types and traits for the Tether synchronization layer.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the Tether workspace:
//! identifiers, body and shape configuration, the command protocol,
//! error types, and the [`PhysicsEngine`] capability trait behind which
//! the external physics collaborator lives.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod body;
pub mod command;
pub mod engine;
pub mod error;
pub mod id;
pub mod shape;

pub use body::{ActivationState, BodyConfig, BodyKind, BodyUpdate};
pub use command::{Command, SeqCommand};
pub use engine::{BodyHandle, ConstraintHandle, PhysicsEngine, PoseAuthority, ShapeHandle};
pub use error::{EngineError, RegistryError};
pub use id::{BodyId, ConstraintId, ShapeSetId, Slot, TickId};
pub use shape::{ConstraintKind, FitMode, Geometry, GeometryPart, ShapeConfig, ShapeKind};
