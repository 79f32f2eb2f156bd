//! The single-threaded tick core.
//!
//! [`TickEngine`] owns the engine collaborator, the registries, and the
//! simulation side of the exchange buffer. One call to
//! [`execute_tick`](TickEngine::execute_tick) is one full cycle:
//!
//! 1. If the host still holds the frame, skip entirely (never wait).
//! 2. Apply pending commands in arrival order, deferring those whose
//!    dependencies are missing.
//! 3. Pre-step: push host-authored record poses into the engine
//!    (static and kinematic bodies, every tick).
//! 4. Step the engine.
//! 5. Post-step: teleport freshly spawned dynamic bodies onto their
//!    host pose, write poses, speeds, and slot-resolved contacts into
//!    the records, then advance the sync counters.
//! 6. Publish the frame with the measured step duration.
//!
//! Commands therefore always apply before the step they first affect.

use std::collections::VecDeque;
use std::time::Instant;

use log::{debug, warn};
use smallvec::SmallVec;

use glam::Vec3;
use tether_buffer::layout::NO_CONTACT;
use tether_buffer::{ExchangeBuffer, CONTACT_SLOTS};
use tether_core::shape::uniform_scale_of;
use tether_core::{
    BodyKind, Command, FitMode, PhysicsEngine, PoseAuthority, ShapeSetId, TickId,
};
use tether_registry::{BodyRegistry, ConstraintRegistry, ShapeOwnership, ShapeRegistry};

use crate::dispatch::{purge_for_body, CommandDispatcher, Disposition};
use crate::sync::{self, sync_action, SyncAction};
use crate::world::HostEvent;

/// What one [`TickEngine::execute_tick`] call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The host still holds the frame; nothing ran.
    Skipped,
    /// The world advanced one step and published a frame.
    Stepped {
        /// The tick that was completed.
        tick: TickId,
    },
}

/// The simulation core, advanced one tick at a time.
///
/// Not a thread: [`SimulationWorld`](crate::world::SimulationWorld)
/// provides the background loop. Driving a `TickEngine` directly is the
/// deterministic path used by tests.
pub struct TickEngine {
    engine: Box<dyn PhysicsEngine>,
    bodies: BodyRegistry,
    shapes: ShapeRegistry,
    constraints: ConstraintRegistry,
    dispatcher: CommandDispatcher,
    buffer: ExchangeBuffer,
    tick: TickId,
    events: Vec<HostEvent>,
}

impl TickEngine {
    /// Create a tick engine over an engine collaborator and the
    /// simulation side of an exchange buffer. Body capacity comes from
    /// the buffer.
    pub fn new(engine: Box<dyn PhysicsEngine>, buffer: ExchangeBuffer) -> Self {
        let max_bodies = buffer.max_bodies();
        Self {
            engine,
            bodies: BodyRegistry::new(max_bodies),
            shapes: ShapeRegistry::new(),
            constraints: ConstraintRegistry::new(),
            dispatcher: CommandDispatcher::new(),
            buffer,
            tick: TickId(0),
            events: Vec::new(),
        }
    }

    /// Queue a command for the next tick boundary.
    pub fn submit(&mut self, command: Command) {
        self.dispatcher.enqueue(command);
    }

    /// Number of commands waiting (new arrivals plus deferred).
    pub fn pending_commands(&self) -> usize {
        self.dispatcher.pending_len()
    }

    /// The last completed tick.
    pub fn tick(&self) -> TickId {
        self.tick
    }

    /// Live-body registry (read-only).
    pub fn bodies(&self) -> &BodyRegistry {
        &self.bodies
    }

    /// Shape-set registry (read-only).
    pub fn shapes(&self) -> &ShapeRegistry {
        &self.shapes
    }

    /// Constraint registry (read-only).
    pub fn constraints(&self) -> &ConstraintRegistry {
        &self.constraints
    }

    /// Events produced since the last call (BodyReady etc.).
    pub fn take_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }

    /// Run one tick cycle with the given step size in seconds.
    pub fn execute_tick(&mut self, dt: f32) -> TickOutcome {
        if !self.buffer.is_consumed() {
            return TickOutcome::Skipped;
        }
        let started = Instant::now();

        self.apply_pending();
        self.reconcile_pre_step();
        self.engine.step(dt);
        self.adopt_spawn_poses();
        self.write_records();
        self.advance_sync_counters();

        self.tick = TickId(self.tick.0 + 1);
        let step_ms = started.elapsed().as_secs_f64() as f32 * 1000.0;
        self.buffer.publish(step_ms);
        TickOutcome::Stepped { tick: self.tick }
    }

    /// Walk the pending queue once, in arrival order.
    fn apply_pending(&mut self) {
        let mut queue = self.dispatcher.take_pending();
        let mut blocked = VecDeque::new();
        while let Some(cmd) = queue.pop_front() {
            let removed = match &cmd.command {
                Command::RemoveBody { body } => Some(*body),
                _ => None,
            };
            match self.apply(&cmd.command) {
                Disposition::Applied => {
                    if let Some(body) = removed {
                        let purged =
                            purge_for_body(&mut queue, body) + purge_for_body(&mut blocked, body);
                        if purged > 0 {
                            debug!("purged {purged} pending commands for removed body {body}");
                        }
                    }
                }
                Disposition::Blocked => blocked.push_back(cmd),
                Disposition::Rejected => {}
            }
        }
        self.dispatcher.restore(blocked);
    }

    fn apply(&mut self, command: &Command) -> Disposition {
        match command {
            Command::AddBody { body, pose, config } => {
                if self.bodies.contains(*body) {
                    warn!("add_body {body}: already registered");
                    return Disposition::Rejected;
                }
                let handle = match self.engine.add_body(*pose, config) {
                    Ok(handle) => handle,
                    Err(e) => {
                        warn!("add_body {body}: {e}");
                        return Disposition::Rejected;
                    }
                };
                match self.bodies.insert(*body, handle, config.clone()) {
                    Ok(slot) => {
                        // Seed the record: the slot may hold stale words
                        // from a previous occupant.
                        self.buffer.write_pose(slot, pose);
                        self.buffer.write_speeds(slot, 0.0, 0.0);
                        self.buffer.clear_contacts(slot);
                        self.events.push(HostEvent::BodyReady { body: *body, slot });
                        Disposition::Applied
                    }
                    Err(e) => {
                        // Capacity exceeded: roll the engine body back.
                        self.engine.remove_body(handle);
                        warn!("add_body {body}: {e}");
                        Disposition::Rejected
                    }
                }
            }

            Command::UpdateBody { body, update } => {
                // A delta for a body that does not exist is dropped, not
                // deferred: kept pending it would apply to a later body
                // reusing the id.
                let Ok(entry) = self.bodies.get_mut(*body) else {
                    debug!("update_body {body}: unknown body, dropped");
                    return Disposition::Rejected;
                };
                let handle = entry.handle;
                update.apply_to(&mut entry.config);
                if let Err(e) = self.engine.update_body(handle, update) {
                    warn!("update_body {body}: {e}");
                }
                // An update without an explicit activation state wakes
                // the body so the new properties take effect.
                if update.activation_state.is_none() {
                    self.engine.activate(handle);
                }
                Disposition::Applied
            }

            Command::RemoveBody { body } => {
                // Removes never defer: a stale remove kept pending would
                // destroy a later body reusing the id.
                if !self.bodies.contains(*body) {
                    debug!("remove_body {body}: unknown body, dropped");
                    return Disposition::Rejected;
                }
                for constraint in self.constraints.remove_for_body(*body) {
                    self.engine.remove_constraint(constraint.handle);
                }
                let Ok(entry) = self.bodies.remove(*body) else {
                    return Disposition::Rejected;
                };
                // Shared sets: detach only.
                for set_id in entry.shape_sets.iter().copied() {
                    if let Ok(set) = self.shapes.get(set_id) {
                        for shape in set.handles.clone() {
                            self.engine.detach_shape(entry.handle, shape);
                        }
                    }
                    let _ = self.shapes.detach(set_id, *body);
                }
                // Exclusive sets die with the body.
                for shape in self.shapes.remove_owned_by(*body) {
                    self.engine.detach_shape(entry.handle, shape);
                    self.engine.destroy_shape(shape);
                }
                self.engine.remove_body(entry.handle);
                Disposition::Applied
            }

            Command::AddShapes {
                body,
                shapes,
                geometry,
                config,
            } => {
                let Ok(entry) = self.bodies.get(*body) else {
                    return Disposition::Blocked;
                };
                let handle = entry.handle;
                let created = match self.engine.create_shapes(geometry, config) {
                    Ok(created) => created,
                    Err(e) => {
                        warn!("add_shapes {shapes} for body {body}: {e}");
                        return Disposition::Rejected;
                    }
                };
                for shape in &created {
                    if let Err(e) = self.engine.attach_shape(handle, *shape) {
                        warn!("add_shapes {shapes}: attach failed: {e}");
                    }
                }
                self.shapes.insert(
                    *shapes,
                    created.clone(),
                    ShapeOwnership::Exclusive(*body),
                    config.clone(),
                );
                let _ = self.shapes.attach(*shapes, *body);
                if let Ok(entry) = self.bodies.get_mut(*body) {
                    entry.shapes.extend(created);
                }
                Disposition::Applied
            }

            Command::CreateShapes {
                shapes,
                geometry,
                config,
            } => {
                let created = match self.engine.create_shapes(geometry, config) {
                    Ok(created) => created,
                    Err(e) => {
                        warn!("create_shapes {shapes}: {e}");
                        return Disposition::Rejected;
                    }
                };
                self.shapes
                    .insert(*shapes, created, ShapeOwnership::Shared, config.clone());
                Disposition::Applied
            }

            Command::SetShapes { bodies, shapes } => {
                if !self.shapes.contains(*shapes)
                    || bodies.iter().any(|b| !self.bodies.contains(*b))
                {
                    return Disposition::Blocked;
                }
                let handles = match self.shapes.get(*shapes) {
                    Ok(set) => set.handles.clone(),
                    Err(_) => return Disposition::Blocked,
                };
                for body in bodies {
                    let Ok(entry) = self.bodies.get_mut(*body) else {
                        continue;
                    };
                    if entry.shape_sets.contains(shapes) {
                        continue;
                    }
                    let body_handle = entry.handle;
                    entry.shape_sets.push(*shapes);
                    for shape in &handles {
                        if let Err(e) = self.engine.attach_shape(body_handle, *shape) {
                            warn!("set_shapes {shapes} on body {body}: {e}");
                        }
                    }
                    let _ = self.shapes.attach(*shapes, *body);
                }
                Disposition::Applied
            }

            Command::RemoveShapes { body, shapes } => {
                if !self.bodies.contains(*body) || !self.shapes.contains(*shapes) {
                    return Disposition::Blocked;
                }
                let exclusive = self
                    .shapes
                    .get(*shapes)
                    .map(|set| set.owned_by(*body))
                    .unwrap_or(false);
                if exclusive {
                    // Removing a body's own shapes destroys the set.
                    if let Err(e) = self.destroy_shape_set(*shapes) {
                        debug!("remove_shapes {shapes}: {e}");
                    }
                    return Disposition::Applied;
                }
                let handles = match self.shapes.get(*shapes) {
                    Ok(set) => set.handles.clone(),
                    Err(_) => return Disposition::Blocked,
                };
                if let Ok(entry) = self.bodies.get_mut(*body) {
                    let body_handle = entry.handle;
                    entry.shape_sets.retain(|s| *s != *shapes);
                    for shape in &handles {
                        self.engine.detach_shape(body_handle, *shape);
                    }
                }
                let _ = self.shapes.detach(*shapes, *body);
                Disposition::Applied
            }

            Command::DestroyShapes { shapes } => match self.destroy_shape_set(*shapes) {
                Ok(()) => Disposition::Applied,
                Err(e) => {
                    debug!("destroy_shapes: {e}");
                    Disposition::Rejected
                }
            },

            Command::UpdateShapesScale {
                shapes,
                world_transform,
                fit,
            } => {
                let Ok(set) = self.shapes.get(*shapes) else {
                    return Disposition::Blocked;
                };
                match fit {
                    FitMode::All => {
                        let scale = uniform_scale_of(world_transform);
                        for shape in set.handles.clone() {
                            self.engine.set_shape_scale(shape, Vec3::splat(scale));
                        }
                    }
                    FitMode::Manual => {
                        debug!("update_shapes_scale {shapes}: manual fit, nothing derived");
                    }
                }
                Disposition::Applied
            }

            Command::AddConstraint {
                constraint,
                body,
                target,
                kind,
            } => {
                let (body_handle, target_handle) =
                    match (self.bodies.get(*body), self.bodies.get(*target)) {
                        (Ok(b), Ok(t)) => (b.handle, t.handle),
                        _ => return Disposition::Blocked,
                    };
                match self.engine.add_constraint(body_handle, target_handle, kind) {
                    Ok(handle) => {
                        self.constraints.insert(*constraint, handle, *body, *target);
                        Disposition::Applied
                    }
                    Err(e) => {
                        warn!("add_constraint {constraint}: {e}");
                        Disposition::Rejected
                    }
                }
            }

            Command::RemoveConstraint { constraint } => match self.constraints.remove(*constraint)
            {
                Ok(entry) => {
                    self.engine.remove_constraint(entry.handle);
                    Disposition::Applied
                }
                Err(e) => {
                    debug!("remove_constraint: {e}");
                    Disposition::Rejected
                }
            },

            Command::ResetDynamicBody { body } => {
                let Ok(entry) = self.bodies.get_mut(*body) else {
                    return Disposition::Blocked;
                };
                let handle = entry.handle;
                entry.sync_count = 0;
                self.engine.zero_velocities(handle);
                Disposition::Applied
            }

            Command::ActivateBody { body } => {
                let Ok(entry) = self.bodies.get(*body) else {
                    return Disposition::Blocked;
                };
                self.engine.activate(entry.handle);
                Disposition::Applied
            }

            Command::ApplyImpulse {
                body,
                linear,
                angular,
            } => {
                let Ok(entry) = self.bodies.get(*body) else {
                    return Disposition::Blocked;
                };
                self.engine.apply_impulse(entry.handle, *linear, *angular);
                Disposition::Applied
            }

            Command::EnableDebug { enable } => {
                self.engine.set_debug_enabled(*enable);
                Disposition::Applied
            }
        }
    }

    /// Destroy a shape set: detach from every referencing body, then
    /// release the engine shapes.
    fn destroy_shape_set(&mut self, shapes: ShapeSetId) -> Result<(), tether_core::RegistryError> {
        let set = self.shapes.remove(shapes)?;
        for body in set.attached.iter().copied() {
            if let Ok(entry) = self.bodies.get_mut(body) {
                let body_handle = entry.handle;
                entry.shape_sets.retain(|s| *s != shapes);
                entry.shapes.retain(|h| !set.handles.contains(h));
                for shape in &set.handles {
                    self.engine.detach_shape(body_handle, *shape);
                }
            }
        }
        for shape in set.handles {
            self.engine.destroy_shape(shape);
        }
        Ok(())
    }

    /// Push host-authored record poses into the engine.
    fn reconcile_pre_step(&mut self) {
        for (_, entry) in self.bodies.iter() {
            let kind = entry.config.kind;
            if sync_action(kind, entry.sync_count) == SyncAction::HostDriven {
                let pose = self.buffer.read_pose(entry.ticket.slot());
                let authority = if kind == BodyKind::Static {
                    PoseAuthority::Teleport
                } else {
                    PoseAuthority::Drive
                };
                self.engine.set_body_pose(entry.handle, pose, authority);
            }
        }
    }

    /// Teleport adopting dynamic bodies onto their host-authored pose.
    ///
    /// Runs after the step: the adopt tick republishes the host matrix
    /// unchanged, and the next step starts exactly from it, at rest.
    fn adopt_spawn_poses(&mut self) {
        for (_, entry) in self.bodies.iter() {
            if sync_action(entry.config.kind, entry.sync_count) == SyncAction::AdoptHostPose {
                let pose = self.buffer.read_pose(entry.ticket.slot());
                self.engine
                    .set_body_pose(entry.handle, pose, PoseAuthority::Teleport);
                self.engine.zero_velocities(entry.handle);
            }
        }
    }

    /// Write poses, speeds, and contacts for every live body.
    fn write_records(&mut self) {
        for (id, entry) in self.bodies.iter() {
            let slot = entry.ticket.slot();
            let kind = entry.config.kind;
            let count = entry.sync_count;

            // Pose: engine-authored only once a dynamic body is fully
            // synced. Until then the record is host territory, so the
            // spawn matrix comes back to the host untouched on both the
            // authoring tick and the adopt tick.
            if kind == BodyKind::Dynamic && count >= sync::SYNCED {
                let pose = self.engine.body_pose(entry.handle);
                self.buffer.write_pose(slot, &pose);
            }

            if kind == BodyKind::Dynamic && count < sync::SYNCED {
                self.buffer.write_speeds(slot, 0.0, 0.0);
            } else {
                let linear = self.engine.linear_velocity(entry.handle).length();
                let angular = self.engine.angular_velocity(entry.handle).length();
                self.buffer.write_speeds(slot, linear, angular);
            }

            if sync::publishes_contacts(kind, count) {
                let mut peers: SmallVec<[i32; CONTACT_SLOTS]> = SmallVec::new();
                let mut truncated = 0usize;
                for peer in self.engine.contacts(entry.handle) {
                    let Some(peer_id) = self.bodies.body_for_handle(peer) else {
                        continue;
                    };
                    let Ok(peer_entry) = self.bodies.get(peer_id) else {
                        continue;
                    };
                    if peers.len() < CONTACT_SLOTS {
                        peers.push(peer_entry.ticket.slot().0 as i32);
                    } else {
                        truncated += 1;
                    }
                }
                if truncated > 0 {
                    debug!("body {id}: dropped {truncated} contacts beyond the record's {CONTACT_SLOTS} slots");
                }
                for lane in 0..CONTACT_SLOTS {
                    let peer = peers.get(lane).copied().unwrap_or(NO_CONTACT);
                    self.buffer.write_contact(slot, lane, peer);
                }
            } else {
                self.buffer.clear_contacts(slot);
            }
        }
    }

    /// Advance dynamic bodies through the sync handover.
    fn advance_sync_counters(&mut self) {
        for (_, entry) in self.bodies.iter_mut() {
            if entry.config.kind == BodyKind::Dynamic {
                let awake = self.engine.is_active(entry.handle);
                entry.sync_count = sync::advance(entry.sync_count, awake);
            }
        }
    }
}
