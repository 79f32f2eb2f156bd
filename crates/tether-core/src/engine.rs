//! The capability trait behind which the external physics engine lives.
//!
//! The synchronization layer never touches the engine's concrete API:
//! it creates bodies, shapes, and constraints through [`PhysicsEngine`]
//! and receives opaque handles back. Handles are engine-scoped and have
//! no meaning outside the engine instance that issued them.

use glam::{Mat4, Vec3};

use crate::body::{BodyConfig, BodyUpdate};
use crate::error::EngineError;
use crate::shape::{ConstraintKind, Geometry, ShapeConfig};

/// Opaque engine handle for a rigid body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub u64);

/// Opaque engine handle for a single collision shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeHandle(pub u64);

/// Opaque engine handle for a constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintHandle(pub u64);

/// How a host-authored pose is pushed into the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoseAuthority {
    /// Incremental drive: move the motion state, letting the solver
    /// treat the change as motion (kinematic bodies every tick).
    Drive,
    /// Authoritative reset: also overwrite the center-of-mass transform
    /// so no interpolated motion is synthesized (static bodies, and the
    /// one-time adoption of a dynamic body's spawn pose).
    Teleport,
}

/// Narrow capability surface of the external physics engine.
///
/// One instance owns one world. All methods take handles previously
/// issued by the same instance; passing a handle from a removed entity
/// is a no-op for `&mut self` methods and returns identity/zero values
/// for accessors, mirroring how the layer treats unknown ids.
pub trait PhysicsEngine: Send {
    /// Advance the world by `dt` seconds.
    fn step(&mut self, dt: f32);

    /// Create a rigid body at `pose` with the given configuration.
    fn add_body(&mut self, pose: Mat4, config: &BodyConfig) -> Result<BodyHandle, EngineError>;

    /// Remove a body and release its engine resources.
    fn remove_body(&mut self, body: BodyHandle);

    /// Apply a configuration delta to a live body.
    fn update_body(&mut self, body: BodyHandle, update: &BodyUpdate) -> Result<(), EngineError>;

    /// Current engine-side pose of a body.
    fn body_pose(&self, body: BodyHandle) -> Mat4;

    /// Push a host-authored pose into the engine.
    fn set_body_pose(&mut self, body: BodyHandle, pose: Mat4, authority: PoseAuthority);

    /// Current linear velocity.
    fn linear_velocity(&self, body: BodyHandle) -> Vec3;

    /// Current angular velocity.
    fn angular_velocity(&self, body: BodyHandle) -> Vec3;

    /// Zero both velocities (dynamic-body reset).
    fn zero_velocities(&mut self, body: BodyHandle);

    /// Wake the body up.
    fn activate(&mut self, body: BodyHandle);

    /// Whether the body is currently awake. A sleeping dynamic body
    /// does not advance its initial-sync window.
    fn is_active(&self, body: BodyHandle) -> bool;

    /// Apply a linear and angular impulse, waking the body.
    fn apply_impulse(&mut self, body: BodyHandle, linear: Vec3, angular: Vec3);

    /// Derive collision shapes from geometry.
    ///
    /// Returns one handle per derived shape, in a stable order. Fails
    /// with [`EngineError::InvalidGeometry`] on malformed input.
    fn create_shapes(
        &mut self,
        geometry: &Geometry,
        config: &ShapeConfig,
    ) -> Result<Vec<ShapeHandle>, EngineError>;

    /// Release a shape's engine resources. The caller guarantees the
    /// shape is detached from every body first.
    fn destroy_shape(&mut self, shape: ShapeHandle);

    /// Attach a shape to a body's compound.
    fn attach_shape(&mut self, body: BodyHandle, shape: ShapeHandle) -> Result<(), EngineError>;

    /// Detach a shape from a body's compound.
    fn detach_shape(&mut self, body: BodyHandle, shape: ShapeHandle);

    /// Set the local scaling of a shape.
    fn set_shape_scale(&mut self, shape: ShapeHandle, scale: Vec3);

    /// Create a constraint between two bodies.
    fn add_constraint(
        &mut self,
        body: BodyHandle,
        target: BodyHandle,
        kind: &ConstraintKind,
    ) -> Result<ConstraintHandle, EngineError>;

    /// Remove a constraint.
    fn remove_constraint(&mut self, constraint: ConstraintHandle);

    /// Bodies currently in contact with `body`, in the order the
    /// engine's narrowphase reports them.
    fn contacts(&self, body: BodyHandle) -> Vec<BodyHandle>;

    /// Toggle the engine's debug-draw output.
    fn set_debug_enabled(&mut self, enable: bool);
}
