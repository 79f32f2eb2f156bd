//! Simulation-side and host-side buffer handles.
//!
//! [`ExchangeBuffer`] is held by the tick loop; [`HostBuffer`] by the
//! host thread. Both are created as a connected pair and speak the same
//! record layout over either transport.
//!
//! The write contract: the simulation side checks
//! [`ExchangeBuffer::is_consumed`] before touching records and calls
//! [`ExchangeBuffer::publish`] when the frame is complete; the host
//! checks [`HostBuffer::try_acquire`], reads (and writes host-authored
//! poses), then calls [`HostBuffer::release`]. Record accessors outside
//! the caller's ownership window are no-ops (writes) or return zeroes
//! (reads) in transfer mode; the tick loop never reaches them because
//! an unconsumed buffer skips the tick.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use glam::Mat4;

use tether_core::Slot;

use crate::layout::{
    self, ANGULAR_SPEED_OFFSET, CONTACT_OFFSET, CONTACT_SLOTS, LINEAR_SPEED_OFFSET, NO_CONTACT,
};
use crate::shared::SharedRegion;
use crate::transfer::FrameBuffer;

enum SimTransport {
    Shared(Arc<SharedRegion>),
    Transfer {
        inbound: Receiver<FrameBuffer>,
        outbound: Sender<FrameBuffer>,
        current: Option<FrameBuffer>,
    },
}

#[derive(Debug)]
enum HostTransport {
    Shared(Arc<SharedRegion>),
    Transfer {
        inbound: Receiver<FrameBuffer>,
        outbound: Sender<FrameBuffer>,
        current: Option<FrameBuffer>,
    },
}

/// Simulation-side handle to the exchange buffer.
pub struct ExchangeBuffer {
    transport: SimTransport,
    max_bodies: u32,
}

/// Host-side handle to the exchange buffer.
#[derive(Debug)]
pub struct HostBuffer {
    transport: HostTransport,
    max_bodies: u32,
}

impl ExchangeBuffer {
    /// Create a connected pair over the shared-memory transport.
    pub fn shared(max_bodies: u32) -> (ExchangeBuffer, HostBuffer) {
        let region = Arc::new(SharedRegion::new(max_bodies));
        (
            ExchangeBuffer {
                transport: SimTransport::Shared(Arc::clone(&region)),
                max_bodies,
            },
            HostBuffer {
                transport: HostTransport::Shared(region),
                max_bodies,
            },
        )
    }

    /// Create a connected pair over the ownership-transfer transport.
    ///
    /// The simulation side starts holding the (single) frame.
    pub fn transfer(max_bodies: u32) -> (ExchangeBuffer, HostBuffer) {
        let (to_host, from_sim) = crossbeam_channel::bounded(1);
        let (to_sim, from_host) = crossbeam_channel::bounded(1);
        (
            ExchangeBuffer {
                transport: SimTransport::Transfer {
                    inbound: from_host,
                    outbound: to_host,
                    current: Some(FrameBuffer::new(max_bodies)),
                },
                max_bodies,
            },
            HostBuffer {
                transport: HostTransport::Transfer {
                    inbound: from_sim,
                    outbound: to_sim,
                    current: None,
                },
                max_bodies,
            },
        )
    }

    /// The configured body capacity.
    pub fn max_bodies(&self) -> u32 {
        self.max_bodies
    }

    /// Whether it is the simulation side's turn to write.
    ///
    /// In transfer mode this also polls for a frame returned by the
    /// host since the last tick.
    pub fn is_consumed(&mut self) -> bool {
        match &mut self.transport {
            SimTransport::Shared(region) => region.sim_owns(),
            SimTransport::Transfer {
                inbound, current, ..
            } => {
                if current.is_none() {
                    if let Ok(frame) = inbound.try_recv() {
                        *current = Some(frame);
                    }
                }
                current.is_some()
            }
        }
    }

    /// Finalize the current frame for the host.
    pub fn publish(&mut self, step_duration_ms: f32) {
        match &mut self.transport {
            SimTransport::Shared(region) => region.publish(step_duration_ms),
            SimTransport::Transfer {
                outbound, current, ..
            } => {
                if let Some(mut frame) = current.take() {
                    frame.set_step_duration_ms(step_duration_ms);
                    // Best-effort: the host side may already be gone.
                    let _ = outbound.send(frame);
                }
            }
        }
    }

    fn load(&self, index: usize) -> u32 {
        match &self.transport {
            SimTransport::Shared(region) => region.load(index),
            SimTransport::Transfer { current, .. } => {
                current.as_ref().map(|f| f.load(index)).unwrap_or(0)
            }
        }
    }

    fn store(&mut self, index: usize, word: u32) {
        match &mut self.transport {
            SimTransport::Shared(region) => region.store(index, word),
            SimTransport::Transfer { current, .. } => {
                if let Some(frame) = current.as_mut() {
                    frame.store(index, word);
                }
            }
        }
    }

    /// Write a pose matrix into a slot record.
    pub fn write_pose(&mut self, slot: Slot, pose: &Mat4) {
        let base = layout::record_base(slot);
        for (i, value) in pose.to_cols_array().iter().enumerate() {
            self.store(base + i, value.to_bits());
        }
    }

    /// Read the (possibly host-authored) pose matrix from a slot record.
    pub fn read_pose(&self, slot: Slot) -> Mat4 {
        let base = layout::record_base(slot);
        let mut cols = [0.0f32; 16];
        for (i, value) in cols.iter_mut().enumerate() {
            *value = f32::from_bits(self.load(base + i));
        }
        Mat4::from_cols_array(&cols)
    }

    /// Write the linear and angular speed floats for a slot.
    pub fn write_speeds(&mut self, slot: Slot, linear: f32, angular: f32) {
        let base = layout::record_base(slot);
        self.store(base + LINEAR_SPEED_OFFSET, linear.to_bits());
        self.store(base + ANGULAR_SPEED_OFFSET, angular.to_bits());
    }

    /// Write one collision slot (`lane` < [`CONTACT_SLOTS`]).
    pub fn write_contact(&mut self, slot: Slot, lane: usize, peer: i32) {
        debug_assert!(lane < CONTACT_SLOTS);
        let base = layout::record_base(slot);
        self.store(base + CONTACT_OFFSET + lane, peer as u32);
    }

    /// Fill every collision slot of a record with the no-contact sentinel.
    pub fn clear_contacts(&mut self, slot: Slot) {
        for lane in 0..CONTACT_SLOTS {
            self.write_contact(slot, lane, NO_CONTACT);
        }
    }
}

impl HostBuffer {
    /// The configured body capacity.
    pub fn max_bodies(&self) -> u32 {
        self.max_bodies
    }

    /// Whether a published frame is available to this side.
    ///
    /// In transfer mode this polls for the frame sent by the simulation.
    pub fn try_acquire(&mut self) -> bool {
        match &mut self.transport {
            HostTransport::Shared(region) => region.host_owns(),
            HostTransport::Transfer {
                inbound, current, ..
            } => {
                if current.is_none() {
                    if let Ok(frame) = inbound.try_recv() {
                        *current = Some(frame);
                    }
                }
                current.is_some()
            }
        }
    }

    /// Hand the buffer back to the simulation side.
    pub fn release(&mut self) {
        match &mut self.transport {
            HostTransport::Shared(region) => region.consume(),
            HostTransport::Transfer {
                outbound, current, ..
            } => {
                if let Some(frame) = current.take() {
                    let _ = outbound.send(frame);
                }
            }
        }
    }

    /// Duration of the last published step in milliseconds.
    pub fn step_duration_ms(&self) -> f32 {
        match &self.transport {
            HostTransport::Shared(region) => region.step_duration_ms(),
            HostTransport::Transfer { current, .. } => {
                current.as_ref().map(|f| f.step_duration_ms()).unwrap_or(0.0)
            }
        }
    }

    fn load(&self, index: usize) -> u32 {
        match &self.transport {
            HostTransport::Shared(region) => region.load(index),
            HostTransport::Transfer { current, .. } => {
                current.as_ref().map(|f| f.load(index)).unwrap_or(0)
            }
        }
    }

    fn store(&mut self, index: usize, word: u32) {
        match &mut self.transport {
            HostTransport::Shared(region) => region.store(index, word),
            HostTransport::Transfer { current, .. } => {
                if let Some(frame) = current.as_mut() {
                    frame.store(index, word);
                }
            }
        }
    }

    /// Read the published pose matrix for a slot.
    pub fn read_pose(&self, slot: Slot) -> Mat4 {
        let base = layout::record_base(slot);
        let mut cols = [0.0f32; 16];
        for (i, value) in cols.iter_mut().enumerate() {
            *value = f32::from_bits(self.load(base + i));
        }
        Mat4::from_cols_array(&cols)
    }

    /// Author a pose for a slot (static/kinematic drive, or the spawn
    /// pose of a freshly added dynamic body).
    pub fn write_pose(&mut self, slot: Slot, pose: &Mat4) {
        let base = layout::record_base(slot);
        for (i, value) in pose.to_cols_array().iter().enumerate() {
            self.store(base + i, value.to_bits());
        }
    }

    /// Read the linear and angular speed floats for a slot.
    pub fn read_speeds(&self, slot: Slot) -> (f32, f32) {
        let base = layout::record_base(slot);
        (
            f32::from_bits(self.load(base + LINEAR_SPEED_OFFSET)),
            f32::from_bits(self.load(base + ANGULAR_SPEED_OFFSET)),
        )
    }

    /// Read all collision slots for a slot record.
    pub fn read_contacts(&self, slot: Slot) -> [i32; CONTACT_SLOTS] {
        let base = layout::record_base(slot);
        let mut out = [NO_CONTACT; CONTACT_SLOTS];
        for (lane, value) in out.iter_mut().enumerate() {
            *value = self.load(base + CONTACT_OFFSET + lane) as i32;
        }
        out
    }
}
