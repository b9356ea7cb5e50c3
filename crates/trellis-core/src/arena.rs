//! Object arena
//!
//! Objects are plain records referenced by stable identifiers. Ancestry is
//! resolved by walking parent references in the arena rather than by
//! traversing a live object graph, so the evaluator works from a snapshot
//! it cannot mutate.

use crate::{ObjectId, ObjectKind, Result, TrellisError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A domain object record in the arena
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// Stable identifier of the object
    pub id: ObjectId,
    /// Kind of the object
    pub kind: ObjectKind,
    /// Parent in the workflow hierarchy, if the kind has a parent edge
    pub parent: Option<ObjectId>,
}

impl ObjectRecord {
    /// Create a root record (a kind with no parent edge)
    pub fn root(id: ObjectId, kind: ObjectKind) -> Self {
        Self {
            id,
            kind,
            parent: None,
        }
    }

    /// Create a child record under `parent`
    pub fn child(id: ObjectId, kind: ObjectKind, parent: ObjectId) -> Self {
        Self {
            id,
            kind,
            parent: Some(parent),
        }
    }
}

/// Arena of object records with ancestry resolution
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectArena {
    objects: IndexMap<ObjectId, ObjectRecord>,
}

impl ObjectArena {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, validating its parent edge against the fixed
    /// propagation graph
    ///
    /// The parent must already be present so a finished arena never holds a
    /// dangling ancestry chain.
    pub fn insert(&mut self, record: ObjectRecord) -> Result<()> {
        match (record.parent, record.kind.parent_kind()) {
            (None, None) => {}
            (None, Some(expected)) => {
                return Err(TrellisError::configuration(format!(
                    "{} record {} requires a {} parent",
                    record.kind, record.id, expected
                )));
            }
            (Some(parent_id), expected) => {
                let parent = self.objects.get(&parent_id).ok_or_else(|| {
                    TrellisError::configuration(format!(
                        "parent {} of {} is not in the arena",
                        parent_id, record.id
                    ))
                })?;
                if expected != Some(parent.kind) {
                    return Err(TrellisError::configuration(format!(
                        "{} cannot be a child of {}",
                        record.kind, parent.kind
                    )));
                }
            }
        }
        self.objects.insert(record.id, record);
        Ok(())
    }

    /// Look up a record by id
    pub fn get(&self, id: ObjectId) -> Option<&ObjectRecord> {
        self.objects.get(&id)
    }

    /// Remove a record by id, returning it if present
    pub fn remove(&mut self, id: ObjectId) -> Option<ObjectRecord> {
        self.objects.shift_remove(&id)
    }

    /// Number of records in the arena
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the arena is empty
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterate over all records in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &ObjectRecord> {
        self.objects.values()
    }

    /// First record of the given kind, in insertion order
    pub fn first_of_kind(&self, kind: ObjectKind) -> Option<&ObjectRecord> {
        self.objects.values().find(|record| record.kind == kind)
    }

    /// The ancestry chain of an object: the object itself, then each parent
    /// up to the hierarchy root
    ///
    /// A dangling parent reference is a configuration error: insertion
    /// validates edges, so a broken chain means the arena was corrupted.
    pub fn ancestry(&self, id: ObjectId) -> Result<Vec<&ObjectRecord>> {
        let mut chain = Vec::new();
        let mut current = Some(
            self.objects
                .get(&id)
                .ok_or_else(|| TrellisError::not_found(format!("object {id}")))?,
        );
        while let Some(record) = current {
            chain.push(record);
            current = match record.parent {
                Some(parent_id) => Some(self.objects.get(&parent_id).ok_or_else(|| {
                    TrellisError::configuration(format!(
                        "ancestry of {} broken at missing parent {}",
                        id, parent_id
                    ))
                })?),
                None => None,
            };
        }
        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_chain(arena: &mut ObjectArena) -> (ObjectId, ObjectId, ObjectId) {
        let workflow = ObjectId::new();
        let cycle = ObjectId::new();
        let cycle_tg = ObjectId::new();
        arena
            .insert(ObjectRecord::root(workflow, ObjectKind::Workflow))
            .unwrap();
        arena
            .insert(ObjectRecord::child(cycle, ObjectKind::Cycle, workflow))
            .unwrap();
        arena
            .insert(ObjectRecord::child(
                cycle_tg,
                ObjectKind::CycleTaskGroup,
                cycle,
            ))
            .unwrap();
        (workflow, cycle, cycle_tg)
    }

    #[test]
    fn test_ancestry_resolution() {
        let mut arena = ObjectArena::new();
        let (workflow, cycle, cycle_tg) = sample_chain(&mut arena);

        let chain = arena.ancestry(cycle_tg).unwrap();
        let ids: Vec<ObjectId> = chain.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![cycle_tg, cycle, workflow]);
    }

    #[test]
    fn test_invalid_parent_edge_rejected() {
        let mut arena = ObjectArena::new();
        let workflow = ObjectId::new();
        arena
            .insert(ObjectRecord::root(workflow, ObjectKind::Workflow))
            .unwrap();

        // CycleTask must hang off a CycleTaskGroup, not a Workflow.
        let err = arena
            .insert(ObjectRecord::child(
                ObjectId::new(),
                ObjectKind::CycleTask,
                workflow,
            ))
            .unwrap_err();
        assert!(matches!(err, TrellisError::Configuration { .. }));
    }

    #[test]
    fn test_missing_parent_rejected() {
        let mut arena = ObjectArena::new();
        let err = arena
            .insert(ObjectRecord::child(
                ObjectId::new(),
                ObjectKind::TaskGroup,
                ObjectId::new(),
            ))
            .unwrap_err();
        assert!(matches!(err, TrellisError::Configuration { .. }));
    }

    #[test]
    fn test_child_kind_requires_parent() {
        let mut arena = ObjectArena::new();
        let record = ObjectRecord::root(ObjectId::new(), ObjectKind::TaskGroup);
        assert!(arena.insert(record).is_err());
    }

    #[test]
    fn test_unknown_object_is_not_found() {
        let arena = ObjectArena::new();
        let err = arena.ancestry(ObjectId::new()).unwrap_err();
        assert!(matches!(err, TrellisError::NotFound { .. }));
    }
}
