//! Shape-set bookkeeping and ownership.
//!
//! A shape set is the unit of shape lifetime. Sets created for a single
//! body die with it; sets created standalone are shared across bodies
//! and live until explicitly destroyed.

use indexmap::IndexMap;
use smallvec::SmallVec;

use tether_core::{BodyId, RegistryError, ShapeConfig, ShapeHandle, ShapeSetId};

/// Who controls a shape set's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeOwnership {
    /// Created for one body; destroyed when that body goes away or the
    /// shapes are removed from it.
    Exclusive(BodyId),
    /// Created standalone; bodies borrow it and only an explicit
    /// destroy ends it.
    Shared,
}

/// One registered shape set.
#[derive(Debug)]
pub struct ShapeSet {
    /// Engine handles for each shape in the set.
    pub handles: Vec<ShapeHandle>,
    /// Lifetime rule for this set.
    pub ownership: ShapeOwnership,
    /// Bodies the set is currently attached to.
    pub attached: SmallVec<[BodyId; 2]>,
    /// Configuration the set was built with.
    pub config: ShapeConfig,
}

impl ShapeSet {
    /// Whether `body` exclusively owns this set.
    pub fn owned_by(&self, body: BodyId) -> bool {
        self.ownership == ShapeOwnership::Exclusive(body)
    }
}

/// Registry of shape sets, iterable in insertion order.
#[derive(Default)]
pub struct ShapeRegistry {
    sets: IndexMap<ShapeSetId, ShapeSet>,
}

impl ShapeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered sets.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Whether no set is registered.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Whether `shapes` is registered.
    pub fn contains(&self, shapes: ShapeSetId) -> bool {
        self.sets.contains_key(&shapes)
    }

    /// Register a set. A set id is never reused, so a duplicate id
    /// replaces the stale entry.
    pub fn insert(
        &mut self,
        shapes: ShapeSetId,
        handles: Vec<ShapeHandle>,
        ownership: ShapeOwnership,
        config: ShapeConfig,
    ) {
        self.sets.insert(
            shapes,
            ShapeSet {
                handles,
                ownership,
                attached: SmallVec::new(),
                config,
            },
        );
    }

    /// Remove a set, returning it for engine-side teardown.
    pub fn remove(&mut self, shapes: ShapeSetId) -> Result<ShapeSet, RegistryError> {
        self.sets
            .swap_remove(&shapes)
            .ok_or(RegistryError::UnknownShapeSet { shapes })
    }

    /// Look up a set.
    pub fn get(&self, shapes: ShapeSetId) -> Result<&ShapeSet, RegistryError> {
        self.sets
            .get(&shapes)
            .ok_or(RegistryError::UnknownShapeSet { shapes })
    }

    /// Look up a set for mutation.
    pub fn get_mut(&mut self, shapes: ShapeSetId) -> Result<&mut ShapeSet, RegistryError> {
        self.sets
            .get_mut(&shapes)
            .ok_or(RegistryError::UnknownShapeSet { shapes })
    }

    /// Record that `body` now uses `shapes`.
    pub fn attach(&mut self, shapes: ShapeSetId, body: BodyId) -> Result<(), RegistryError> {
        let set = self.get_mut(shapes)?;
        if !set.attached.contains(&body) {
            set.attached.push(body);
        }
        Ok(())
    }

    /// Record that `body` no longer uses `shapes`.
    pub fn detach(&mut self, shapes: ShapeSetId, body: BodyId) -> Result<(), RegistryError> {
        let set = self.get_mut(shapes)?;
        set.attached.retain(|b| *b != body);
        Ok(())
    }

    /// Drop every set exclusively owned by `body`, returning the freed
    /// engine handles.
    pub fn remove_owned_by(&mut self, body: BodyId) -> Vec<ShapeHandle> {
        let doomed: Vec<ShapeSetId> = self
            .sets
            .iter()
            .filter(|(_, set)| set.owned_by(body))
            .map(|(id, _)| *id)
            .collect();
        let mut handles = Vec::new();
        for id in doomed {
            if let Some(set) = self.sets.swap_remove(&id) {
                handles.extend(set.handles);
            }
        }
        handles
    }

    /// Iterate registered sets in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ShapeSetId, &ShapeSet)> {
        self.sets.iter().map(|(id, set)| (*id, set))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(shapes: &mut ShapeRegistry, id: u64, ownership: ShapeOwnership) {
        shapes.insert(
            ShapeSetId(id),
            vec![ShapeHandle(id * 100)],
            ownership,
            ShapeConfig::default(),
        );
    }

    #[test]
    fn attach_detach_tracks_users() {
        let mut shapes = ShapeRegistry::new();
        set(&mut shapes, 1, ShapeOwnership::Shared);

        shapes.attach(ShapeSetId(1), BodyId(7)).unwrap();
        shapes.attach(ShapeSetId(1), BodyId(8)).unwrap();
        shapes.attach(ShapeSetId(1), BodyId(7)).unwrap();
        assert_eq!(shapes.get(ShapeSetId(1)).unwrap().attached.len(), 2);

        shapes.detach(ShapeSetId(1), BodyId(7)).unwrap();
        assert_eq!(
            shapes.get(ShapeSetId(1)).unwrap().attached.as_slice(),
            &[BodyId(8)]
        );
    }

    #[test]
    fn exclusive_sets_die_with_their_body() {
        let mut shapes = ShapeRegistry::new();
        set(&mut shapes, 1, ShapeOwnership::Exclusive(BodyId(7)));
        set(&mut shapes, 2, ShapeOwnership::Exclusive(BodyId(8)));
        set(&mut shapes, 3, ShapeOwnership::Shared);

        let freed = shapes.remove_owned_by(BodyId(7));
        assert_eq!(freed, vec![ShapeHandle(100)]);
        assert!(!shapes.contains(ShapeSetId(1)));
        assert!(shapes.contains(ShapeSetId(2)));
        assert!(shapes.contains(ShapeSetId(3)));
    }

    #[test]
    fn unknown_set_errors_name_the_id() {
        let mut shapes = ShapeRegistry::new();
        assert!(matches!(
            shapes.remove(ShapeSetId(5)).unwrap_err(),
            RegistryError::UnknownShapeSet { shapes } if shapes == ShapeSetId(5)
        ));
        assert!(shapes.attach(ShapeSetId(5), BodyId(1)).is_err());
    }
}
