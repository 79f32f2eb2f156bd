//! Collision geometry descriptions, shape fitting, and constraint kinds.
//!
//! Geometry travels from the host as raw vertex/index data plus per-part
//! transforms; the engine collaborator turns it into collision shapes
//! according to a [`ShapeKind`] and [`FitMode`]. Shape polymorphism is a
//! closed sum type so every consumer matches exhaustively.

use glam::{Mat4, Vec3};

/// The kind of collision shape to derive from geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// Axis-aligned box fitted to the geometry bounds.
    #[default]
    Box,
    /// Sphere fitted to the geometry bounds.
    Sphere,
    /// Cylinder fitted to the geometry bounds.
    Cylinder,
    /// Capsule fitted to the geometry bounds.
    Capsule,
    /// Cone fitted to the geometry bounds.
    Cone,
    /// Convex hull of the vertices.
    Hull,
    /// Exact triangle mesh. Only valid on static bodies.
    Mesh,
}

impl ShapeKind {
    /// Whether the shape is convex.
    ///
    /// Shared shape sets (`SetShapes`) require convex shapes because they
    /// are rescaled per body; mesh shapes are excluded.
    pub fn is_convex(self) -> bool {
        !matches!(self, ShapeKind::Mesh)
    }
}

/// How geometry is mapped onto the requested shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FitMode {
    /// Fit the shape to all geometry parts, deriving scale from the
    /// world transform.
    #[default]
    All,
    /// Use the dimensions given in [`ShapeConfig`] verbatim.
    Manual,
}

/// One renderable part flattened into collision input.
#[derive(Clone, Debug, PartialEq)]
pub struct GeometryPart {
    /// Vertex positions, one triple per vertex.
    pub vertices: Vec<[f32; 3]>,
    /// Triangle indices into `vertices`. Empty for point clouds.
    pub indices: Vec<u32>,
    /// Part-local transform relative to the body origin.
    pub transform: Mat4,
}

/// Collision geometry extracted from a renderable object.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    /// The flattened parts.
    pub parts: Vec<GeometryPart>,
    /// World transform of the source object at extraction time.
    /// Identity when the host did not supply one.
    pub world_transform: Mat4,
}

impl Geometry {
    /// Total vertex count across all parts.
    pub fn vertex_count(&self) -> usize {
        self.parts.iter().map(|p| p.vertices.len()).sum()
    }

    /// Whether the geometry carries no vertices at all.
    pub fn is_empty(&self) -> bool {
        self.vertex_count() == 0
    }
}

/// Shape derivation parameters supplied with `AddShapes`/`CreateShapes`.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeConfig {
    /// The shape kind to derive.
    pub kind: ShapeKind,
    /// The fit policy.
    pub fit: FitMode,
    /// Manual half extents, used when `fit` is [`FitMode::Manual`] for
    /// box-like kinds.
    pub half_extents: Option<Vec3>,
    /// Manual radius, used when `fit` is [`FitMode::Manual`] for
    /// sphere/capsule/cone kinds.
    pub radius: Option<f32>,
    /// Collision margin added around the shape surface.
    pub margin: f32,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            kind: ShapeKind::Box,
            fit: FitMode::All,
            half_extents: None,
            radius: None,
            margin: 0.01,
        }
    }
}

/// Uniform scale factor derived from a world matrix.
///
/// `UpdateShapesScale` re-scales every shape in a set by the largest
/// axis scale of the supplied world transform; uniform scaling is the
/// only rescale the shared-shape path supports.
pub fn uniform_scale_of(world_transform: &Mat4) -> f32 {
    let (scale, _, _) = world_transform.to_scale_rotation_translation();
    scale.x.max(scale.y).max(scale.z)
}

/// The kind of constraint joining two bodies.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ConstraintKind {
    /// All six degrees of freedom locked.
    #[default]
    Lock,
    /// Rigid weld at the current relative transform.
    Fixed,
    /// Ball joint around per-body pivots.
    PointToPoint {
        /// Pivot in the first body's local frame.
        pivot: Vec3,
        /// Pivot in the target body's local frame.
        target_pivot: Vec3,
    },
    /// Rotation around a shared axis.
    Hinge {
        /// Pivot in the first body's local frame.
        pivot: Vec3,
        /// Pivot in the target body's local frame.
        target_pivot: Vec3,
        /// Hinge axis in the first body's local frame.
        axis: Vec3,
        /// Hinge axis in the target body's local frame.
        target_axis: Vec3,
    },
    /// Translation along one axis, rotation locked.
    Slider,
    /// Damped spring between per-body pivots.
    Spring {
        /// Pivot in the first body's local frame.
        pivot: Vec3,
        /// Pivot in the target body's local frame.
        target_pivot: Vec3,
        /// Spring stiffness.
        stiffness: f32,
        /// Spring damping.
        damping: f32,
    },
    /// Shoulder-style swing/twist joint.
    ConeTwist {
        /// Pivot in the first body's local frame.
        pivot: Vec3,
        /// Pivot in the target body's local frame.
        target_pivot: Vec3,
    },
}
