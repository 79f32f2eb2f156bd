//! Simulation configuration, validation, and error types.
//!
//! [`SimConfig`] is the input to [`SimulationWorld`](crate::world::SimulationWorld)
//! and to a standalone [`TickEngine`](crate::tick::TickEngine).
//! [`validate()`](SimConfig::validate) checks structural invariants at
//! startup; nothing is re-validated on the hot path.

use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Which exchange-buffer transport the world runs on.
///
/// Both carry the identical record layout; the choice only affects how
/// exclusivity is enforced (atomic handshake vs. structural ownership).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransportMode {
    /// One shared region, coordinated by the consumed/ready flag.
    #[default]
    Shared,
    /// An owned frame round-tripping between the sides.
    Transfer,
}

/// Configuration for a simulation world.
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Body capacity: the number of exchange-buffer slots. Default: 512.
    pub max_bodies: u32,
    /// Target tick rate in Hz. Default: 60.
    pub tick_rate_hz: f64,
    /// Exchange-buffer transport. Default: shared.
    pub transport: TransportMode,
    /// Command channel capacity (back-pressure bound). Default: 64.
    pub command_queue: usize,
    /// Host event channel capacity. Events beyond this are dropped with
    /// a warning rather than blocking the tick thread. Default: 256.
    pub event_queue: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_bodies: 512,
            tick_rate_hz: 60.0,
            transport: TransportMode::Shared,
            command_queue: 64,
            event_queue: 256,
        }
    }
}

impl SimConfig {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bodies == 0 {
            return Err(ConfigError::ZeroMaxBodies);
        }
        if !self.tick_rate_hz.is_finite() || self.tick_rate_hz <= 0.0 {
            return Err(ConfigError::InvalidTickRate {
                value: self.tick_rate_hz,
            });
        }
        if self.command_queue == 0 {
            return Err(ConfigError::CommandQueueZero);
        }
        if self.event_queue == 0 {
            return Err(ConfigError::EventQueueZero);
        }
        Ok(())
    }

    /// The tick period implied by the configured rate.
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate_hz)
    }
}

/// Errors detected during [`SimConfig::validate()`].
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// `max_bodies` is zero; no body could ever be added.
    ZeroMaxBodies,
    /// `tick_rate_hz` is NaN, infinite, zero, or negative.
    InvalidTickRate {
        /// The invalid value.
        value: f64,
    },
    /// Command channel capacity is zero.
    CommandQueueZero,
    /// Event channel capacity is zero.
    EventQueueZero,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroMaxBodies => write!(f, "max_bodies must be at least 1"),
            Self::InvalidTickRate { value } => {
                write!(f, "tick_rate_hz must be finite and positive, got {value}")
            }
            Self::CommandQueueZero => write!(f, "command_queue capacity must be at least 1"),
            Self::EventQueueZero => write!(f, "event_queue capacity must be at least 1"),
        }
    }
}

impl Error for ConfigError {}
