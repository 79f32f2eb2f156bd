//! The background simulation world and its host-facing surface.
//!
//! [`SimulationWorld::spawn`] validates the configuration, builds the
//! exchange-buffer pair, and moves a [`TickEngine`] onto a dedicated
//! thread re-armed at the configured rate. The host keeps the
//! [`HostBuffer`] half plus a command sender and an event receiver;
//! nothing on the host side ever blocks the tick thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use log::warn;

use tether_buffer::{ExchangeBuffer, HostBuffer};
use tether_core::{BodyId, Command, PhysicsEngine, Slot};

use crate::config::{ConfigError, SimConfig, TransportMode};
use crate::tick::{TickEngine, TickOutcome};

/// Notifications from the simulation thread to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostEvent {
    /// The tick thread is up and the world accepts commands.
    Ready,
    /// A body was registered and assigned its buffer slot. The host
    /// may now author the spawn pose into that slot's record.
    BodyReady {
        /// The body's host-assigned id.
        body: BodyId,
        /// The slot its records live at.
        slot: Slot,
    },
}

/// Error submitting a command to the tick thread.
#[derive(Debug, PartialEq, Eq)]
pub enum SubmitError {
    /// The tick thread has shut down.
    Shutdown,
    /// The command channel is full (back-pressure).
    ChannelFull,
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shutdown => write!(f, "tick thread has shut down"),
            Self::ChannelFull => write!(f, "command channel full"),
        }
    }
}

impl std::error::Error for SubmitError {}

/// A running simulation on its own thread.
///
/// Dropping the world shuts the tick thread down and joins it.
#[derive(Debug)]
pub struct SimulationWorld {
    cmd_tx: Option<Sender<Command>>,
    event_rx: Receiver<HostEvent>,
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl SimulationWorld {
    /// Spawn a simulation world around an engine collaborator.
    ///
    /// Returns the world handle and the host side of the exchange
    /// buffer. The engine is consumed: it moves onto the tick thread.
    pub fn spawn(
        engine: Box<dyn PhysicsEngine>,
        config: SimConfig,
    ) -> Result<(Self, HostBuffer), ConfigError> {
        config.validate()?;

        let (sim_buffer, host_buffer) = match config.transport {
            TransportMode::Shared => ExchangeBuffer::shared(config.max_bodies),
            TransportMode::Transfer => ExchangeBuffer::transfer(config.max_bodies),
        };

        let (cmd_tx, cmd_rx) = crossbeam_channel::bounded(config.command_queue);
        let (event_tx, event_rx) = crossbeam_channel::bounded(config.event_queue);
        let shutdown = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&shutdown);
        let period = config.tick_period();
        let thread = thread::Builder::new()
            .name("tether-tick".into())
            .spawn(move || {
                let engine = TickEngine::new(engine, sim_buffer);
                run_tick_loop(engine, cmd_rx, event_tx, flag, period);
            })
            .expect("failed to spawn tick thread");

        Ok((
            Self {
                cmd_tx: Some(cmd_tx),
                event_rx,
                shutdown,
                thread: Some(thread),
            },
            host_buffer,
        ))
    }

    /// Queue a command for the next tick boundary. Non-blocking.
    pub fn submit(&self, command: Command) -> Result<(), SubmitError> {
        let cmd_tx = self.cmd_tx.as_ref().ok_or(SubmitError::Shutdown)?;
        cmd_tx.try_send(command).map_err(|e| match e {
            crossbeam_channel::TrySendError::Full(_) => SubmitError::ChannelFull,
            crossbeam_channel::TrySendError::Disconnected(_) => SubmitError::Shutdown,
        })
    }

    /// Take the next pending event, if any. Non-blocking.
    pub fn poll_event(&self) -> Option<HostEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next event.
    pub fn recv_event_timeout(&self, timeout: Duration) -> Option<HostEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Stop the tick thread and join it. Idempotent.
    pub fn shutdown(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        self.cmd_tx = None;
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("tick thread panicked during shutdown");
            }
        }
    }
}

impl Drop for SimulationWorld {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// The tick thread body: drain commands, tick, forward events, sleep
/// out the remainder of the period.
fn run_tick_loop(
    mut engine: TickEngine,
    cmd_rx: Receiver<Command>,
    event_tx: Sender<HostEvent>,
    shutdown: Arc<AtomicBool>,
    period: Duration,
) {
    let _ = event_tx.try_send(HostEvent::Ready);

    let mut last_step = Instant::now();
    // Stall guard: after a long host pause, step at most this far.
    let max_dt = 4.0 * period.as_secs_f32();

    while !shutdown.load(Ordering::Acquire) {
        let tick_start = Instant::now();

        let mut disconnected = false;
        loop {
            match cmd_rx.try_recv() {
                Ok(command) => engine.submit(command),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }

        let dt = last_step.elapsed().as_secs_f32().min(max_dt);
        if let TickOutcome::Stepped { .. } = engine.execute_tick(dt) {
            last_step = tick_start;
            for event in engine.take_events() {
                if event_tx.try_send(event).is_err() {
                    warn!("host event dropped: event channel full or closed");
                }
            }
        }

        if disconnected {
            break;
        }
        let elapsed = tick_start.elapsed();
        if elapsed < period {
            thread::sleep(period - elapsed);
        }
    }
}
