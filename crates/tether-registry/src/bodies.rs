//! Live-body bookkeeping: id ↔ slot ↔ engine handle.

use indexmap::IndexMap;
use smallvec::SmallVec;

use tether_core::{BodyConfig, BodyHandle, BodyId, RegistryError, ShapeHandle, ShapeSetId, Slot};

use crate::slots::{SlotAllocator, SlotTicket};

/// Everything the registry knows about one live body.
#[derive(Debug)]
pub struct BodyEntry {
    /// Engine handle for this body.
    pub handle: BodyHandle,
    /// Buffer slot, generation-tagged.
    pub ticket: SlotTicket,
    /// Configuration as last applied to the engine.
    pub config: BodyConfig,
    /// Ticks this body has been through the sync cycle. 0 means the
    /// host has not yet authored a spawn pose; 1 means the pose is
    /// adopted this tick; 2 and up means steady state.
    pub sync_count: u32,
    /// Shape handles attached directly to this body.
    pub shapes: SmallVec<[ShapeHandle; 4]>,
    /// Shared shape sets this body currently uses.
    pub shape_sets: SmallVec<[ShapeSetId; 2]>,
}

/// Registry of live bodies, iterable in insertion order.
pub struct BodyRegistry {
    entries: IndexMap<BodyId, BodyEntry>,
    by_slot: Vec<Option<BodyId>>,
    by_handle: IndexMap<BodyHandle, BodyId>,
    slots: SlotAllocator,
}

impl BodyRegistry {
    /// Create a registry backed by `max_bodies` buffer slots.
    pub fn new(max_bodies: u32) -> Self {
        Self {
            entries: IndexMap::new(),
            by_slot: vec![None; max_bodies as usize],
            by_handle: IndexMap::new(),
            slots: SlotAllocator::new(max_bodies),
        }
    }

    /// Number of live bodies.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no body is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The slot capacity this registry was created with.
    pub fn capacity(&self) -> u32 {
        self.slots.capacity()
    }

    /// Whether `body` is registered.
    pub fn contains(&self, body: BodyId) -> bool {
        self.entries.contains_key(&body)
    }

    /// Register a body, allocating it a buffer slot.
    pub fn insert(
        &mut self,
        body: BodyId,
        handle: BodyHandle,
        config: BodyConfig,
    ) -> Result<Slot, RegistryError> {
        if self.entries.contains_key(&body) {
            return Err(RegistryError::DuplicateBody { body });
        }
        let ticket = self
            .slots
            .allocate()
            .ok_or(RegistryError::CapacityExceeded {
                max_bodies: self.slots.capacity(),
            })?;
        let slot = ticket.slot();
        self.by_slot[slot.index()] = Some(body);
        self.by_handle.insert(handle, body);
        self.entries.insert(
            body,
            BodyEntry {
                handle,
                ticket,
                config,
                sync_count: 0,
                shapes: SmallVec::new(),
                shape_sets: SmallVec::new(),
            },
        );
        Ok(slot)
    }

    /// Remove a body, releasing its slot for reuse.
    pub fn remove(&mut self, body: BodyId) -> Result<BodyEntry, RegistryError> {
        let entry = self
            .entries
            .swap_remove(&body)
            .ok_or(RegistryError::UnknownBody { body })?;
        let slot = entry.ticket.slot();
        self.by_slot[slot.index()] = None;
        self.by_handle.swap_remove(&entry.handle);
        self.slots.release(slot);
        Ok(entry)
    }

    /// Look up a body.
    pub fn get(&self, body: BodyId) -> Result<&BodyEntry, RegistryError> {
        self.entries
            .get(&body)
            .ok_or(RegistryError::UnknownBody { body })
    }

    /// Look up a body for mutation.
    pub fn get_mut(&mut self, body: BodyId) -> Result<&mut BodyEntry, RegistryError> {
        self.entries
            .get_mut(&body)
            .ok_or(RegistryError::UnknownBody { body })
    }

    /// The body behind an engine handle, if any. Used to cross-reference
    /// engine-reported contacts back to buffer slots.
    pub fn body_for_handle(&self, handle: BodyHandle) -> Option<BodyId> {
        self.by_handle.get(&handle).copied()
    }

    /// The body currently occupying `slot`, if any.
    pub fn body_at(&self, slot: Slot) -> Option<BodyId> {
        self.by_slot.get(slot.index()).copied().flatten()
    }

    /// Resolve a generation-tagged slot to its body, rejecting tickets
    /// from before a recycle.
    pub fn body_for_ticket(&self, ticket: SlotTicket) -> Result<BodyId, RegistryError> {
        if !self.slots.is_current(ticket) {
            return Err(RegistryError::StaleSlot {
                slot: ticket.slot(),
            });
        }
        self.by_slot[ticket.slot().index()]
            .ok_or(RegistryError::StaleSlot {
                slot: ticket.slot(),
            })
    }

    /// Iterate live bodies in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &BodyEntry)> {
        self.entries.iter().map(|(id, entry)| (*id, entry))
    }

    /// Iterate live bodies mutably, in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (BodyId, &mut BodyEntry)> {
        self.entries.iter_mut().map(|(id, entry)| (*id, entry))
    }

    /// Ids of all live bodies, in insertion order.
    pub fn ids(&self) -> Vec<BodyId> {
        self.entries.keys().copied().collect()
    }
}
