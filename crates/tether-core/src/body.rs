//! Body classification and configuration types.

use glam::Vec3;

/// How a body participates in the simulation.
///
/// Static and kinematic bodies are driven by the host pose every tick;
/// dynamic bodies are driven by the engine once their initial sync
/// window has elapsed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BodyKind {
    /// Immovable; never integrated, always at the host-authored pose.
    Static,
    /// Fully simulated; pose authored by the engine in steady state.
    #[default]
    Dynamic,
    /// Moved by the host but pushes dynamic bodies around.
    Kinematic,
}

/// Engine activation state for a body.
///
/// Mirrors the conventional rigid-body activation ladder. Only
/// [`ActivationState::Active`] bodies advance the initial-sync counter
/// out of state 0 (a sleeping dynamic body keeps waiting for its host
/// pose).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ActivationState {
    /// Normal simulation.
    #[default]
    Active,
    /// Asleep as part of a resting island.
    IslandSleeping,
    /// Below sleeping thresholds, about to sleep.
    WantsDeactivation,
    /// Never allowed to sleep.
    DisableDeactivation,
    /// Excluded from simulation entirely.
    DisableSimulation,
}

/// Full configuration for a body, supplied with `AddBody`.
///
/// Field defaults match the conventional rigid-body defaults used by the
/// engine collaborator (unit mass, light damping, filter group/mask 1).
#[derive(Clone, Debug, PartialEq)]
pub struct BodyConfig {
    /// Simulation role of the body.
    pub kind: BodyKind,
    /// Mass in kilograms. Ignored for static bodies (treated as 0).
    pub mass: f32,
    /// Per-body gravity override. `None` inherits world gravity.
    pub gravity: Option<Vec3>,
    /// Linear velocity damping per second.
    pub linear_damping: f32,
    /// Angular velocity damping per second.
    pub angular_damping: f32,
    /// Linear speed below which the body may sleep.
    pub linear_sleeping_threshold: f32,
    /// Angular speed below which the body may sleep.
    pub angular_sleeping_threshold: f32,
    /// Per-axis angular motion scale (zero an axis to lock rotation).
    pub angular_factor: Vec3,
    /// Initial activation state.
    pub activation_state: ActivationState,
    /// Whether contacts involving this body are published every tick.
    pub emit_collision_events: bool,
    /// Collision response disabled (body becomes a sensor).
    pub disable_collision: bool,
    /// Broadphase filter group bitmask.
    pub collision_filter_group: u32,
    /// Broadphase filter mask bitmask.
    pub collision_filter_mask: u32,
    /// Re-derive shape scale from the host pose when it changes.
    pub scale_auto_update: bool,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            kind: BodyKind::Dynamic,
            mass: 1.0,
            gravity: None,
            linear_damping: 0.01,
            angular_damping: 0.01,
            linear_sleeping_threshold: 1.6,
            angular_sleeping_threshold: 2.5,
            angular_factor: Vec3::ONE,
            activation_state: ActivationState::Active,
            emit_collision_events: false,
            disable_collision: false,
            collision_filter_group: 1,
            collision_filter_mask: 1,
            scale_auto_update: true,
        }
    }
}

/// Partial body reconfiguration, supplied with `UpdateBody`.
///
/// `None` fields leave the current value untouched. [`BodyUpdate::apply_to`]
/// folds the delta into a [`BodyConfig`]; the engine collaborator receives
/// the same delta so it can skip untouched properties.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BodyUpdate {
    /// New simulation role.
    pub kind: Option<BodyKind>,
    /// New mass.
    pub mass: Option<f32>,
    /// New gravity override (`Some(None)` is not expressible; overriding
    /// back to world gravity is done by passing the world gravity vector).
    pub gravity: Option<Vec3>,
    /// New linear damping.
    pub linear_damping: Option<f32>,
    /// New angular damping.
    pub angular_damping: Option<f32>,
    /// New linear sleeping threshold.
    pub linear_sleeping_threshold: Option<f32>,
    /// New angular sleeping threshold.
    pub angular_sleeping_threshold: Option<f32>,
    /// New angular factor.
    pub angular_factor: Option<Vec3>,
    /// New activation state. When absent, an update re-activates the body.
    pub activation_state: Option<ActivationState>,
    /// Toggle collision response.
    pub disable_collision: Option<bool>,
    /// New broadphase filter group.
    pub collision_filter_group: Option<u32>,
    /// New broadphase filter mask.
    pub collision_filter_mask: Option<u32>,
}

impl BodyUpdate {
    /// Fold this delta into `config`, leaving `None` fields untouched.
    pub fn apply_to(&self, config: &mut BodyConfig) {
        if let Some(kind) = self.kind {
            config.kind = kind;
        }
        if let Some(mass) = self.mass {
            config.mass = mass;
        }
        if let Some(gravity) = self.gravity {
            config.gravity = Some(gravity);
        }
        if let Some(v) = self.linear_damping {
            config.linear_damping = v;
        }
        if let Some(v) = self.angular_damping {
            config.angular_damping = v;
        }
        if let Some(v) = self.linear_sleeping_threshold {
            config.linear_sleeping_threshold = v;
        }
        if let Some(v) = self.angular_sleeping_threshold {
            config.angular_sleeping_threshold = v;
        }
        if let Some(v) = self.angular_factor {
            config.angular_factor = v;
        }
        if let Some(v) = self.activation_state {
            config.activation_state = v;
        }
        if let Some(v) = self.disable_collision {
            config.disable_collision = v;
        }
        if let Some(v) = self.collision_filter_group {
            config.collision_filter_group = v;
        }
        if let Some(v) = self.collision_filter_mask {
            config.collision_filter_mask = v;
        }
    }

    /// Whether every field is `None`.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
