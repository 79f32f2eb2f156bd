//! The per-body sync state machine.
//!
//! Static and kinematic bodies are host-driven every tick: their record
//! pose is pushed into the engine before the step and never overwritten
//! after it. Dynamic bodies go through a two-tick handover keyed on the
//! body's sync counter:
//!
//! - counter 0: the body was just created; the host has one tick to
//!   author the spawn pose into the record. The record pose is left
//!   untouched at publish so the host sees its own matrix echoed back.
//! - counter 1: the record still publishes the host's matrix unchanged,
//!   echoing it for one full frame. After the step the body is
//!   teleported onto that matrix at rest, so the next step starts
//!   exactly there.
//! - counter 2 and up: steady state, engine-driven. The first
//!   engine-authored frame is exactly one step from the spawn pose.
//!
//! The counter advances once per tick while below 2, and only while the
//! body is awake, so a host that is slow to author the spawn pose is
//! never raced. `ResetDynamicBody` restarts the handover by zeroing the
//! counter. While the counter is below 2 the body's collision slots
//! publish the no-contact sentinel; engine contacts for a body that has
//! not adopted its pose yet are meaningless.

use tether_core::BodyKind;

/// Sync-counter value at which a dynamic body becomes engine-driven.
pub const SYNCED: u32 = 2;

/// How one body is reconciled on one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncAction {
    /// Leave the record pose untouched; the host is still authoring it.
    AwaitHostPose,
    /// Echo the record pose one last time; after the step, teleport the
    /// body onto it at rest so the engine drives from the next tick.
    AdoptHostPose,
    /// Copy the record pose into the engine every tick (static and
    /// kinematic bodies).
    HostDriven,
    /// Copy the engine pose into the record.
    EngineDriven,
}

/// The action for a body given its kind and pre-tick sync counter.
pub fn sync_action(kind: BodyKind, sync_count: u32) -> SyncAction {
    match kind {
        BodyKind::Static | BodyKind::Kinematic => SyncAction::HostDriven,
        BodyKind::Dynamic => match sync_count {
            0 => SyncAction::AwaitHostPose,
            1 => SyncAction::AdoptHostPose,
            _ => SyncAction::EngineDriven,
        },
    }
}

/// Advance a dynamic body's sync counter for one tick. Sleeping bodies
/// hold their counter so the host pose window never closes under them.
pub fn advance(sync_count: u32, awake: bool) -> u32 {
    if sync_count < SYNCED && awake {
        sync_count + 1
    } else {
        sync_count
    }
}

/// Whether engine-reported contacts for this body are published, as
/// opposed to the no-contact sentinel.
pub fn publishes_contacts(kind: BodyKind, sync_count: u32) -> bool {
    match kind {
        BodyKind::Static | BodyKind::Kinematic => true,
        BodyKind::Dynamic => sync_count >= SYNCED,
    }
}
