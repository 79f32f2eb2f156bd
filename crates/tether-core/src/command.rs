//! The asynchronous command protocol between host and simulation.
//!
//! Each variant corresponds to one host-posted operation. Commands are
//! stamped with a monotonic arrival sequence on receipt ([`SeqCommand`]);
//! the dispatcher applies them in arrival order at tick boundaries,
//! deferring those whose referenced entities do not exist yet.

use glam::{Mat4, Vec3};

use crate::body::{BodyConfig, BodyUpdate};
use crate::id::{BodyId, ConstraintId, ShapeSetId};
use crate::shape::{ConstraintKind, FitMode, Geometry, ShapeConfig};

/// A host-posted operation.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Register a body and allocate its buffer slot.
    AddBody {
        /// Host-assigned id.
        body: BodyId,
        /// Initial pose.
        pose: Mat4,
        /// Full body configuration.
        config: BodyConfig,
    },
    /// Apply a configuration delta to a live body.
    UpdateBody {
        /// The body to reconfigure.
        body: BodyId,
        /// The delta.
        update: BodyUpdate,
    },
    /// Destroy a body, its slot, and (if exclusively owned) its shapes.
    RemoveBody {
        /// The body to remove.
        body: BodyId,
    },
    /// Create shapes from geometry and attach them to one body
    /// exclusively. The shape set dies with the body.
    AddShapes {
        /// The owning body.
        body: BodyId,
        /// Id for the created shape set.
        shapes: ShapeSetId,
        /// Collision geometry.
        geometry: Geometry,
        /// Shape derivation parameters.
        config: ShapeConfig,
    },
    /// Create a standalone shape set for sharing across bodies.
    /// Destroyed only by [`Command::DestroyShapes`].
    CreateShapes {
        /// Id for the created shape set.
        shapes: ShapeSetId,
        /// Collision geometry.
        geometry: Geometry,
        /// Shape derivation parameters.
        config: ShapeConfig,
    },
    /// Assign an existing shared shape set to one or more bodies by
    /// reference.
    SetShapes {
        /// The bodies to receive the shapes.
        bodies: Vec<BodyId>,
        /// The shared shape set.
        shapes: ShapeSetId,
    },
    /// Detach a shape set from one body. Redirected to full destruction
    /// when the set is exclusively owned by that body.
    RemoveShapes {
        /// The body to detach from.
        body: BodyId,
        /// The shape set.
        shapes: ShapeSetId,
    },
    /// Destroy a shape set, detaching it from every referencing body
    /// first.
    DestroyShapes {
        /// The shape set to destroy.
        shapes: ShapeSetId,
    },
    /// Re-derive a uniform scale from a world matrix and apply it to
    /// every shape in the set.
    UpdateShapesScale {
        /// The shape set to rescale.
        shapes: ShapeSetId,
        /// The world transform to derive scale from.
        world_transform: Mat4,
        /// The fit policy in effect.
        fit: FitMode,
    },
    /// Create a constraint between two live bodies.
    AddConstraint {
        /// Host-assigned constraint id.
        constraint: ConstraintId,
        /// First body.
        body: BodyId,
        /// Second body.
        target: BodyId,
        /// The joint kind.
        kind: ConstraintKind,
    },
    /// Remove a constraint. No-op when unknown.
    RemoveConstraint {
        /// The constraint to remove.
        constraint: ConstraintId,
    },
    /// Zero a dynamic body's velocities and restart its initial-sync
    /// window, letting the host re-author its pose.
    ResetDynamicBody {
        /// The body to reset.
        body: BodyId,
    },
    /// Wake a body up.
    ActivateBody {
        /// The body to activate.
        body: BodyId,
    },
    /// Apply a linear and angular impulse.
    ApplyImpulse {
        /// The target body.
        body: BodyId,
        /// Linear impulse.
        linear: Vec3,
        /// Angular impulse.
        angular: Vec3,
    },
    /// Toggle engine debug-draw output.
    EnableDebug {
        /// Whether debug drawing should be on.
        enable: bool,
    },
}

impl Command {
    /// The body ids this command depends on existing, if any.
    ///
    /// Used by the dispatcher for deferral and for purge-on-remove.
    /// `AddBody` depends on nothing (it creates the body); `SetShapes`
    /// additionally depends on its shape set, which is reported by
    /// [`Command::required_shapes`].
    pub fn required_bodies(&self) -> &[BodyId] {
        match self {
            Self::UpdateBody { body, .. }
            | Self::RemoveBody { body }
            | Self::AddShapes { body, .. }
            | Self::RemoveShapes { body, .. }
            | Self::ResetDynamicBody { body }
            | Self::ActivateBody { body }
            | Self::ApplyImpulse { body, .. } => std::slice::from_ref(body),
            Self::SetShapes { bodies, .. } => bodies,
            // AddConstraint's pair is reported by required_body_pair.
            _ => &[],
        }
    }

    /// The body-id pair an `AddConstraint` depends on, if this is one.
    pub fn required_body_pair(&self) -> Option<(BodyId, BodyId)> {
        match self {
            Self::AddConstraint { body, target, .. } => Some((*body, *target)),
            _ => None,
        }
    }

    /// The shape set this command depends on existing, if any.
    pub fn required_shapes(&self) -> Option<ShapeSetId> {
        match self {
            Self::SetShapes { shapes, .. }
            | Self::RemoveShapes { shapes, .. }
            | Self::UpdateShapesScale { shapes, .. } => Some(*shapes),
            _ => None,
        }
    }

    /// Whether this command references `body` as a dependency.
    pub fn depends_on_body(&self, body: BodyId) -> bool {
        if self.required_bodies().contains(&body) {
            return true;
        }
        matches!(self.required_body_pair(), Some((a, b)) if a == body || b == body)
    }

    /// Short operation name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddBody { .. } => "add_body",
            Self::UpdateBody { .. } => "update_body",
            Self::RemoveBody { .. } => "remove_body",
            Self::AddShapes { .. } => "add_shapes",
            Self::CreateShapes { .. } => "create_shapes",
            Self::SetShapes { .. } => "set_shapes",
            Self::RemoveShapes { .. } => "remove_shapes",
            Self::DestroyShapes { .. } => "destroy_shapes",
            Self::UpdateShapesScale { .. } => "update_shapes_scale",
            Self::AddConstraint { .. } => "add_constraint",
            Self::RemoveConstraint { .. } => "remove_constraint",
            Self::ResetDynamicBody { .. } => "reset_dynamic_body",
            Self::ActivateBody { .. } => "activate_body",
            Self::ApplyImpulse { .. } => "apply_impulse",
            Self::EnableDebug { .. } => "enable_debug",
        }
    }
}

/// A command stamped with its monotonic arrival sequence number.
///
/// The sequence is assigned by the dispatcher on receipt and defines
/// the total order in which commands apply, including across deferral.
#[derive(Clone, Debug, PartialEq)]
pub struct SeqCommand {
    /// The operation.
    pub command: Command,
    /// Monotonic arrival sequence number.
    pub arrival_seq: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependency_extraction() {
        let cmd = Command::RemoveBody { body: BodyId(3) };
        assert_eq!(cmd.required_bodies(), &[BodyId(3)]);
        assert!(cmd.depends_on_body(BodyId(3)));
        assert!(!cmd.depends_on_body(BodyId(4)));

        let cmd = Command::AddConstraint {
            constraint: ConstraintId(1),
            body: BodyId(1),
            target: BodyId(2),
            kind: ConstraintKind::Lock,
        };
        assert_eq!(cmd.required_body_pair(), Some((BodyId(1), BodyId(2))));
        assert!(cmd.depends_on_body(BodyId(1)));
        assert!(cmd.depends_on_body(BodyId(2)));
        assert!(!cmd.depends_on_body(BodyId(3)));

        let cmd = Command::SetShapes {
            bodies: vec![BodyId(5), BodyId(6)],
            shapes: ShapeSetId(9),
        };
        assert_eq!(cmd.required_bodies(), &[BodyId(5), BodyId(6)]);
        assert_eq!(cmd.required_shapes(), Some(ShapeSetId(9)));
    }

    #[test]
    fn add_body_has_no_dependencies() {
        let cmd = Command::AddBody {
            body: BodyId(1),
            pose: Mat4::IDENTITY,
            config: BodyConfig::default(),
        };
        assert!(cmd.required_bodies().is_empty());
        assert!(cmd.required_shapes().is_none());
        assert!(cmd.required_body_pair().is_none());
    }
}
