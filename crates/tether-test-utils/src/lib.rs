//! Test utilities for tether development.
//!
//! Provides [`MockEngine`], a deterministic in-memory implementation of
//! [`PhysicsEngine`]: dynamic bodies integrate straight-line gravity
//! with no collision response, and contacts are whatever the test sets
//! with [`set_contacts`](MockEngine::set_contacts). Good enough to
//! exercise the synchronization layer end to end without a real solver.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::{Arc, Mutex, MutexGuard};

use glam::{Mat4, Vec3};
use indexmap::IndexMap;

use tether_core::{
    ActivationState, BodyConfig, BodyHandle, BodyKind, BodyUpdate, ConstraintHandle,
    ConstraintKind, EngineError, Geometry, PhysicsEngine, PoseAuthority, ShapeConfig, ShapeHandle,
    ShapeKind,
};

/// Per-body state tracked by the mock.
#[derive(Clone, Debug)]
pub struct MockBody {
    pub pose: Mat4,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub config: BodyConfig,
    pub active: bool,
    pub shapes: Vec<ShapeHandle>,
}

/// Deterministic [`PhysicsEngine`] for tests.
///
/// Stepping applies `v += g * dt; p += v * dt` to awake dynamic bodies
/// (per-body gravity overrides respected) and nothing else. Handles are
/// issued from a shared counter and never reused.
pub struct MockEngine {
    gravity: Vec3,
    next_handle: u64,
    bodies: IndexMap<BodyHandle, MockBody>,
    shapes: IndexMap<ShapeHandle, Vec3>,
    constraints: IndexMap<ConstraintHandle, (BodyHandle, BodyHandle)>,
    contacts: IndexMap<BodyHandle, Vec<BodyHandle>>,
    debug_enabled: bool,
    steps: u64,
}

impl MockEngine {
    /// A mock with standard downward gravity.
    pub fn new() -> Self {
        Self::with_gravity(Vec3::new(0.0, -9.8, 0.0))
    }

    /// A mock with explicit world gravity (use `Vec3::ZERO` for tests
    /// that want poses to hold still).
    pub fn with_gravity(gravity: Vec3) -> Self {
        Self {
            gravity,
            next_handle: 1,
            bodies: IndexMap::new(),
            shapes: IndexMap::new(),
            constraints: IndexMap::new(),
            contacts: IndexMap::new(),
            debug_enabled: false,
            steps: 0,
        }
    }

    fn issue(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    /// Script the contacts reported for `body` from the next step on.
    /// Symmetry is the test's responsibility.
    pub fn set_contacts(&mut self, body: BodyHandle, peers: Vec<BodyHandle>) {
        self.contacts.insert(body, peers);
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&MockBody> {
        self.bodies.get(&handle)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Scale last applied via `set_shape_scale`, if the shape is alive.
    pub fn shape_scale(&self, shape: ShapeHandle) -> Option<Vec3> {
        self.shapes.get(&shape).copied()
    }

    pub fn attached_shapes(&self, body: BodyHandle) -> Vec<ShapeHandle> {
        self.bodies
            .get(&body)
            .map(|b| b.shapes.clone())
            .unwrap_or_default()
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug_enabled
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsEngine for MockEngine {
    fn step(&mut self, dt: f32) {
        self.steps += 1;
        for body in self.bodies.values_mut() {
            if body.config.kind != BodyKind::Dynamic || !body.active {
                continue;
            }
            let gravity = body.config.gravity.unwrap_or(self.gravity);
            body.linear_velocity += gravity * dt;
            let translation = body.pose.w_axis.truncate() + body.linear_velocity * dt;
            body.pose.w_axis = translation.extend(1.0);
        }
    }

    fn add_body(&mut self, pose: Mat4, config: &BodyConfig) -> Result<BodyHandle, EngineError> {
        if config.mass < 0.0 {
            return Err(EngineError::Failed {
                reason: format!("negative mass {}", config.mass),
            });
        }
        let handle = BodyHandle(self.issue());
        let active = !matches!(
            config.activation_state,
            ActivationState::IslandSleeping | ActivationState::DisableSimulation
        );
        self.bodies.insert(
            handle,
            MockBody {
                pose,
                linear_velocity: Vec3::ZERO,
                angular_velocity: Vec3::ZERO,
                config: config.clone(),
                active,
                shapes: Vec::new(),
            },
        );
        Ok(handle)
    }

    fn remove_body(&mut self, body: BodyHandle) {
        self.bodies.swap_remove(&body);
        self.contacts.swap_remove(&body);
    }

    fn update_body(&mut self, body: BodyHandle, update: &BodyUpdate) -> Result<(), EngineError> {
        if let Some(mock) = self.bodies.get_mut(&body) {
            update.apply_to(&mut mock.config);
            if let Some(state) = update.activation_state {
                mock.active = !matches!(
                    state,
                    ActivationState::IslandSleeping | ActivationState::DisableSimulation
                );
            }
        }
        Ok(())
    }

    fn body_pose(&self, body: BodyHandle) -> Mat4 {
        self.bodies
            .get(&body)
            .map(|b| b.pose)
            .unwrap_or(Mat4::IDENTITY)
    }

    fn set_body_pose(&mut self, body: BodyHandle, pose: Mat4, _authority: PoseAuthority) {
        if let Some(mock) = self.bodies.get_mut(&body) {
            mock.pose = pose;
        }
    }

    fn linear_velocity(&self, body: BodyHandle) -> Vec3 {
        self.bodies
            .get(&body)
            .map(|b| b.linear_velocity)
            .unwrap_or(Vec3::ZERO)
    }

    fn angular_velocity(&self, body: BodyHandle) -> Vec3 {
        self.bodies
            .get(&body)
            .map(|b| b.angular_velocity)
            .unwrap_or(Vec3::ZERO)
    }

    fn zero_velocities(&mut self, body: BodyHandle) {
        if let Some(mock) = self.bodies.get_mut(&body) {
            mock.linear_velocity = Vec3::ZERO;
            mock.angular_velocity = Vec3::ZERO;
        }
    }

    fn activate(&mut self, body: BodyHandle) {
        if let Some(mock) = self.bodies.get_mut(&body) {
            mock.active = true;
        }
    }

    fn is_active(&self, body: BodyHandle) -> bool {
        self.bodies.get(&body).map(|b| b.active).unwrap_or(false)
    }

    fn apply_impulse(&mut self, body: BodyHandle, linear: Vec3, angular: Vec3) {
        if let Some(mock) = self.bodies.get_mut(&body) {
            let mass = mock.config.mass.max(f32::EPSILON);
            mock.linear_velocity += linear / mass;
            mock.angular_velocity += angular / mass;
            mock.active = true;
        }
    }

    fn create_shapes(
        &mut self,
        geometry: &Geometry,
        config: &ShapeConfig,
    ) -> Result<Vec<ShapeHandle>, EngineError> {
        let needs_vertices = matches!(config.kind, ShapeKind::Hull | ShapeKind::Mesh);
        if needs_vertices && geometry.is_empty() {
            return Err(EngineError::InvalidGeometry {
                reason: format!("{:?} shape with no vertices", config.kind),
            });
        }
        let count = geometry.parts.len().max(1);
        let handles: Vec<ShapeHandle> = (0..count).map(|_| ShapeHandle(self.issue())).collect();
        for handle in &handles {
            self.shapes.insert(*handle, Vec3::ONE);
        }
        Ok(handles)
    }

    fn destroy_shape(&mut self, shape: ShapeHandle) {
        self.shapes.swap_remove(&shape);
    }

    fn attach_shape(&mut self, body: BodyHandle, shape: ShapeHandle) -> Result<(), EngineError> {
        if !self.shapes.contains_key(&shape) {
            return Err(EngineError::Failed {
                reason: format!("attach of dead shape {shape:?}"),
            });
        }
        if let Some(mock) = self.bodies.get_mut(&body) {
            if !mock.shapes.contains(&shape) {
                mock.shapes.push(shape);
            }
        }
        Ok(())
    }

    fn detach_shape(&mut self, body: BodyHandle, shape: ShapeHandle) {
        if let Some(mock) = self.bodies.get_mut(&body) {
            mock.shapes.retain(|s| *s != shape);
        }
    }

    fn set_shape_scale(&mut self, shape: ShapeHandle, scale: Vec3) {
        if let Some(existing) = self.shapes.get_mut(&shape) {
            *existing = scale;
        }
    }

    fn add_constraint(
        &mut self,
        body: BodyHandle,
        target: BodyHandle,
        _kind: &ConstraintKind,
    ) -> Result<ConstraintHandle, EngineError> {
        if !self.bodies.contains_key(&body) || !self.bodies.contains_key(&target) {
            return Err(EngineError::Failed {
                reason: "constraint on dead body".into(),
            });
        }
        let handle = ConstraintHandle(self.issue());
        self.constraints.insert(handle, (body, target));
        Ok(handle)
    }

    fn remove_constraint(&mut self, constraint: ConstraintHandle) {
        self.constraints.swap_remove(&constraint);
    }

    fn contacts(&self, body: BodyHandle) -> Vec<BodyHandle> {
        self.contacts.get(&body).cloned().unwrap_or_default()
    }

    fn set_debug_enabled(&mut self, enable: bool) {
        self.debug_enabled = enable;
    }
}

/// A [`MockEngine`] behind `Arc<Mutex>`, cloneable so a test can keep
/// scripting contacts and inspecting state after the engine has moved
/// into the code under test.
#[derive(Clone, Default)]
pub struct SharedMockEngine(Arc<Mutex<MockEngine>>);

impl SharedMockEngine {
    pub fn new(engine: MockEngine) -> Self {
        Self(Arc::new(Mutex::new(engine)))
    }

    /// Lock the inner mock for scripting or inspection.
    pub fn lock(&self) -> MutexGuard<'_, MockEngine> {
        self.0.lock().expect("mock engine lock poisoned")
    }
}

impl PhysicsEngine for SharedMockEngine {
    fn step(&mut self, dt: f32) {
        self.lock().step(dt);
    }

    fn add_body(&mut self, pose: Mat4, config: &BodyConfig) -> Result<BodyHandle, EngineError> {
        self.lock().add_body(pose, config)
    }

    fn remove_body(&mut self, body: BodyHandle) {
        self.lock().remove_body(body);
    }

    fn update_body(&mut self, body: BodyHandle, update: &BodyUpdate) -> Result<(), EngineError> {
        self.lock().update_body(body, update)
    }

    fn body_pose(&self, body: BodyHandle) -> Mat4 {
        self.lock().body_pose(body)
    }

    fn set_body_pose(&mut self, body: BodyHandle, pose: Mat4, authority: PoseAuthority) {
        self.lock().set_body_pose(body, pose, authority);
    }

    fn linear_velocity(&self, body: BodyHandle) -> Vec3 {
        self.lock().linear_velocity(body)
    }

    fn angular_velocity(&self, body: BodyHandle) -> Vec3 {
        self.lock().angular_velocity(body)
    }

    fn zero_velocities(&mut self, body: BodyHandle) {
        self.lock().zero_velocities(body);
    }

    fn activate(&mut self, body: BodyHandle) {
        self.lock().activate(body);
    }

    fn is_active(&self, body: BodyHandle) -> bool {
        self.lock().is_active(body)
    }

    fn apply_impulse(&mut self, body: BodyHandle, linear: Vec3, angular: Vec3) {
        self.lock().apply_impulse(body, linear, angular);
    }

    fn create_shapes(
        &mut self,
        geometry: &Geometry,
        config: &ShapeConfig,
    ) -> Result<Vec<ShapeHandle>, EngineError> {
        self.lock().create_shapes(geometry, config)
    }

    fn destroy_shape(&mut self, shape: ShapeHandle) {
        self.lock().destroy_shape(shape);
    }

    fn attach_shape(&mut self, body: BodyHandle, shape: ShapeHandle) -> Result<(), EngineError> {
        self.lock().attach_shape(body, shape)
    }

    fn detach_shape(&mut self, body: BodyHandle, shape: ShapeHandle) {
        self.lock().detach_shape(body, shape);
    }

    fn set_shape_scale(&mut self, shape: ShapeHandle, scale: Vec3) {
        self.lock().set_shape_scale(shape, scale);
    }

    fn add_constraint(
        &mut self,
        body: BodyHandle,
        target: BodyHandle,
        kind: &ConstraintKind,
    ) -> Result<ConstraintHandle, EngineError> {
        self.lock().add_constraint(body, target, kind)
    }

    fn remove_constraint(&mut self, constraint: ConstraintHandle) {
        self.lock().remove_constraint(constraint);
    }

    fn contacts(&self, body: BodyHandle) -> Vec<BodyHandle> {
        self.lock().contacts(body)
    }

    fn set_debug_enabled(&mut self, enable: bool) {
        self.lock().set_debug_enabled(enable);
    }
}
