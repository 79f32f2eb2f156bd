//! Constraint bookkeeping: which engine constraint joins which bodies.

use indexmap::IndexMap;

use tether_core::{BodyId, ConstraintHandle, ConstraintId, RegistryError};

/// One registered constraint.
#[derive(Clone, Copy, Debug)]
pub struct ConstraintEntry {
    /// Engine handle for this constraint.
    pub handle: ConstraintHandle,
    /// The constrained body.
    pub body: BodyId,
    /// The body it is constrained to.
    pub target: BodyId,
}

/// Registry of live constraints, iterable in insertion order.
#[derive(Default)]
pub struct ConstraintRegistry {
    entries: IndexMap<ConstraintId, ConstraintEntry>,
}

impl ConstraintRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live constraints.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no constraint is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `constraint` is registered.
    pub fn contains(&self, constraint: ConstraintId) -> bool {
        self.entries.contains_key(&constraint)
    }

    /// Register a constraint between `body` and `target`.
    pub fn insert(
        &mut self,
        constraint: ConstraintId,
        handle: ConstraintHandle,
        body: BodyId,
        target: BodyId,
    ) {
        self.entries.insert(
            constraint,
            ConstraintEntry {
                handle,
                body,
                target,
            },
        );
    }

    /// Remove a constraint, returning it for engine-side teardown.
    pub fn remove(&mut self, constraint: ConstraintId) -> Result<ConstraintEntry, RegistryError> {
        self.entries
            .swap_remove(&constraint)
            .ok_or(RegistryError::UnknownConstraint { constraint })
    }

    /// Drop every constraint touching `body`, returning the freed
    /// entries.
    pub fn remove_for_body(&mut self, body: BodyId) -> Vec<ConstraintEntry> {
        let doomed: Vec<ConstraintId> = self
            .entries
            .iter()
            .filter(|(_, e)| e.body == body || e.target == body)
            .map(|(id, _)| *id)
            .collect();
        doomed
            .into_iter()
            .filter_map(|id| self.entries.swap_remove(&id))
            .collect()
    }

    /// Iterate live constraints in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ConstraintId, &ConstraintEntry)> {
        self.entries.iter().map(|(id, entry)| (*id, entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_remove_round_trip() {
        let mut constraints = ConstraintRegistry::new();
        constraints.insert(ConstraintId(1), ConstraintHandle(50), BodyId(1), BodyId(2));
        assert!(constraints.contains(ConstraintId(1)));

        let entry = constraints.remove(ConstraintId(1)).unwrap();
        assert_eq!(entry.handle, ConstraintHandle(50));
        assert_eq!((entry.body, entry.target), (BodyId(1), BodyId(2)));
        assert!(constraints.is_empty());
    }

    #[test]
    fn removing_a_body_drops_both_directions() {
        let mut constraints = ConstraintRegistry::new();
        constraints.insert(ConstraintId(1), ConstraintHandle(50), BodyId(1), BodyId(2));
        constraints.insert(ConstraintId(2), ConstraintHandle(51), BodyId(3), BodyId(1));
        constraints.insert(ConstraintId(3), ConstraintHandle(52), BodyId(2), BodyId(3));

        let freed = constraints.remove_for_body(BodyId(1));
        assert_eq!(freed.len(), 2);
        assert!(constraints.contains(ConstraintId(3)));
        assert_eq!(constraints.len(), 1);
    }

    #[test]
    fn unknown_constraint_errors_name_the_id() {
        let mut constraints = ConstraintRegistry::new();
        assert!(matches!(
            constraints.remove(ConstraintId(4)).unwrap_err(),
            RegistryError::UnknownConstraint { constraint } if constraint == ConstraintId(4)
        ));
    }
}
