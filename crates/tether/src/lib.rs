//! Tether: off-thread rigid-body simulation synchronized over a
//! fixed-layout exchange buffer.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all tether sub-crates. For most users, adding `tether` as a
//! single dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use std::time::Duration;
//! use tether::prelude::*;
//! use tether_test_utils::MockEngine;
//!
//! // Any `PhysicsEngine` works; the mock integrates plain gravity.
//! let engine = Box::new(MockEngine::new());
//! let config = SimConfig {
//!     max_bodies: 8,
//!     ..Default::default()
//! };
//! let (world, mut host) = SimulationWorld::spawn(engine, config).unwrap();
//! assert_eq!(
//!     world.recv_event_timeout(Duration::from_secs(1)),
//!     Some(HostEvent::Ready)
//! );
//!
//! // Register a body; the world replies with its buffer slot. Commands
//! // apply on owned ticks, so keep handing frames back while waiting.
//! world
//!     .submit(Command::AddBody {
//!         body: BodyId(1),
//!         pose: Mat4::IDENTITY,
//!         config: BodyConfig::default(),
//!     })
//!     .unwrap();
//! let slot = loop {
//!     if host.try_acquire() {
//!         host.release();
//!     }
//!     match world.poll_event() {
//!         Some(HostEvent::BodyReady { slot, .. }) => break slot,
//!         _ => std::thread::sleep(Duration::from_millis(1)),
//!     }
//! };
//!
//! // Author the spawn pose into the body's record on the next frame.
//! loop {
//!     if host.try_acquire() {
//!         host.write_pose(slot, &Mat4::from_translation(Vec3::new(0.0, 10.0, 0.0)));
//!         host.release();
//!         break;
//!     }
//!     std::thread::sleep(Duration::from_millis(1));
//! }
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in
//! the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `tether-core` | IDs, body/shape/constraint configs, the command protocol, the `PhysicsEngine` trait |
//! | [`buffer`] | `tether-buffer` | Exchange-buffer layout and both transports |
//! | [`registry`] | `tether-registry` | Slot allocation and body/shape/constraint bookkeeping |
//! | [`engine`] | `tether-engine` | Command dispatch, body sync, tick loop, the background world |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, the command protocol, and the engine capability trait
/// (`tether-core`).
pub use tether_core as types;

/// Exchange-buffer layout and transports (`tether-buffer`).
///
/// [`buffer::ExchangeBuffer`] is the simulation-side handle,
/// [`buffer::HostBuffer`] the host-side one.
pub use tether_buffer as buffer;

/// Slot allocation and entity bookkeeping (`tether-registry`).
pub use tether_registry as registry;

/// Command dispatch, body sync, and the tick loop (`tether-engine`).
///
/// [`engine::SimulationWorld`] runs the whole stack on a background
/// thread; [`engine::TickEngine`] is the synchronous core.
pub use tether_engine as engine;

/// Common imports for typical tether usage.
///
/// ```rust
/// use tether::prelude::*;
/// ```
pub mod prelude {
    // Math, re-exported so hosts need no direct glam dependency.
    pub use glam::{Mat4, Quat, Vec3};

    // Core types and the command protocol.
    pub use tether_core::{
        ActivationState, BodyConfig, BodyId, BodyKind, BodyUpdate, Command, ConstraintId,
        ConstraintKind, FitMode, Geometry, GeometryPart, PhysicsEngine, ShapeConfig, ShapeKind,
        ShapeSetId, Slot,
    };

    // Errors.
    pub use tether_core::{EngineError, RegistryError};
    pub use tether_engine::{ConfigError, SubmitError};

    // Buffer.
    pub use tether_buffer::{ExchangeBuffer, HostBuffer};

    // Engine.
    pub use tether_engine::{HostEvent, SimConfig, SimulationWorld, TickEngine, TransportMode};
}
