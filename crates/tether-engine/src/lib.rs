//! The simulation side: command dispatch, body sync, and the tick loop.
//!
//! # Architecture
//!
//! ```text
//! Host Thread                    Tick Thread
//!     |                              |
//!     |--submit(Command)------------>| drain cmd_rx, stamp arrival seq
//!     |   [cmd_tx: bounded]          | apply pending (defer on missing deps)
//!     |                              | pre-step: push host poses into engine
//!     |                              | engine.step(dt)
//!     |                              | post-step: write records, contacts
//!     |                              | buffer.publish(step_ms)
//!     |<--HostEvent via event_tx-----| sleep(period - elapsed)
//!     |                              |
//!     |--HostBuffer::try_acquire --- reads records, authors poses
//!     |--HostBuffer::release ------- hands the frame back
//! ```
//!
//! [`TickEngine`] is the single-threaded core: it owns the registries,
//! the engine collaborator, and the simulation side of the exchange
//! buffer, and advances one tick at a time. [`SimulationWorld`] wraps it
//! in a dedicated background thread re-armed at a fixed rate.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod dispatch;
pub mod sync;
pub mod tick;
pub mod world;

pub use config::{ConfigError, SimConfig, TransportMode};
pub use dispatch::{CommandDispatcher, Disposition};
pub use sync::SyncAction;
pub use tick::{TickEngine, TickOutcome};
pub use world::{HostEvent, SimulationWorld, SubmitError};
