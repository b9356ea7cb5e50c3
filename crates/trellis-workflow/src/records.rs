//! Workflow domain records and the workflow store
//!
//! Records are typed payloads keyed by arena identifiers. The store keeps
//! the arena (ancestry) and the record tables consistent: every typed
//! insert also inserts the arena record, so ancestry resolution never sees
//! an object the record tables do not know.

use crate::state::CycleTaskState;
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use trellis_core::{ObjectArena, ObjectId, ObjectKind, ObjectRecord, PersonId, Result, TrellisError};

/// Workflow lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowStatus {
    /// Being authored; has no cycles yet
    Draft,
    /// Activated; spawns cycles
    Active,
}

/// A workflow definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRecord {
    /// Arena identifier
    pub id: ObjectId,
    /// Display title
    pub title: String,
    /// Lifecycle status
    pub status: WorkflowStatus,
    /// Whether activation sets up recurring cycles
    pub recurring: bool,
}

/// A group of task templates inside a workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskGroupRecord {
    /// Arena identifier
    pub id: ObjectId,
    /// Display title
    pub title: String,
    /// Contact person, if assigned
    pub contact: Option<PersonId>,
}

/// A task template inside a task group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskGroupTaskRecord {
    /// Arena identifier
    pub id: ObjectId,
    /// Display title
    pub title: String,
    /// Planned start date
    pub start_date: NaiveDate,
    /// Planned end date
    pub end_date: NaiveDate,
    /// Contact person, if assigned
    pub contact: Option<PersonId>,
}

/// An activation instance of a workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleRecord {
    /// Arena identifier
    pub id: ObjectId,
    /// Display title, derived from the workflow
    pub title: String,
    /// Whether the cycle is still running; ending a cycle clears this
    pub current: bool,
}

/// The working copy of a task group inside a cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleTaskGroupRecord {
    /// Arena identifier
    pub id: ObjectId,
    /// Display title, derived from the task group
    pub title: String,
}

/// The working copy of a task inside a cycle task group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleTaskRecord {
    /// Arena identifier
    pub id: ObjectId,
    /// Display title
    pub title: String,
    /// Current lifecycle state
    pub state: CycleTaskState,
    /// Planned start date
    pub start_date: NaiveDate,
    /// Planned end date
    pub end_date: NaiveDate,
    /// Assignee, if any
    pub assignee: Option<PersonId>,
}

/// A free-standing comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    /// Arena identifier
    pub id: ObjectId,
    /// Comment body
    pub description: String,
}

/// A control object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlRecord {
    /// Arena identifier
    pub id: ObjectId,
    /// Display title
    pub title: String,
    /// Person administering the control, if any
    pub admin: Option<PersonId>,
}

/// A directed association edge between two arbitrary objects
///
/// Relationships live independently of their endpoints: deleting an
/// endpoint does not remove the edge unless a caller chooses to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// Source object
    pub source: ObjectId,
    /// Destination object
    pub destination: ObjectId,
}

/// Store of workflow domain records plus the object arena
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowStore {
    arena: ObjectArena,
    workflows: IndexMap<ObjectId, WorkflowRecord>,
    task_groups: IndexMap<ObjectId, TaskGroupRecord>,
    task_group_tasks: IndexMap<ObjectId, TaskGroupTaskRecord>,
    cycles: IndexMap<ObjectId, CycleRecord>,
    cycle_task_groups: IndexMap<ObjectId, CycleTaskGroupRecord>,
    cycle_tasks: IndexMap<ObjectId, CycleTaskRecord>,
    comments: IndexMap<ObjectId, CommentRecord>,
    controls: IndexMap<ObjectId, ControlRecord>,
    relationships: Vec<Relationship>,
}

impl WorkflowStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// The object arena backing ancestry resolution
    pub fn arena(&self) -> &ObjectArena {
        &self.arena
    }

    /// Add a workflow in Draft status
    pub fn add_workflow(&mut self, title: impl Into<String>) -> Result<ObjectId> {
        let id = ObjectId::new();
        self.arena.insert(ObjectRecord::root(id, ObjectKind::Workflow))?;
        self.workflows.insert(
            id,
            WorkflowRecord {
                id,
                title: title.into(),
                status: WorkflowStatus::Draft,
                recurring: false,
            },
        );
        Ok(id)
    }

    /// Add a task group under a workflow
    pub fn add_task_group(
        &mut self,
        workflow: ObjectId,
        title: impl Into<String>,
    ) -> Result<ObjectId> {
        let id = ObjectId::new();
        self.arena
            .insert(ObjectRecord::child(id, ObjectKind::TaskGroup, workflow))?;
        self.task_groups.insert(
            id,
            TaskGroupRecord {
                id,
                title: title.into(),
                contact: None,
            },
        );
        Ok(id)
    }

    /// Add a task template under a task group
    pub fn add_task_group_task(
        &mut self,
        task_group: ObjectId,
        title: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<ObjectId> {
        let id = ObjectId::new();
        self.arena
            .insert(ObjectRecord::child(id, ObjectKind::TaskGroupTask, task_group))?;
        self.task_group_tasks.insert(
            id,
            TaskGroupTaskRecord {
                id,
                title: title.into(),
                start_date,
                end_date,
                contact: None,
            },
        );
        Ok(id)
    }

    /// Add a cycle under a workflow
    pub fn add_cycle(&mut self, workflow: ObjectId, title: impl Into<String>) -> Result<ObjectId> {
        let id = ObjectId::new();
        self.arena
            .insert(ObjectRecord::child(id, ObjectKind::Cycle, workflow))?;
        self.cycles.insert(
            id,
            CycleRecord {
                id,
                title: title.into(),
                current: true,
            },
        );
        Ok(id)
    }

    /// Add a cycle task group under a cycle
    pub fn add_cycle_task_group(
        &mut self,
        cycle: ObjectId,
        title: impl Into<String>,
    ) -> Result<ObjectId> {
        let id = ObjectId::new();
        self.arena
            .insert(ObjectRecord::child(id, ObjectKind::CycleTaskGroup, cycle))?;
        self.cycle_task_groups.insert(
            id,
            CycleTaskGroupRecord {
                id,
                title: title.into(),
            },
        );
        Ok(id)
    }

    /// Add a cycle task under a cycle task group, starting in Assigned
    pub fn add_cycle_task(
        &mut self,
        cycle_task_group: ObjectId,
        title: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<ObjectId> {
        let id = ObjectId::new();
        self.arena.insert(ObjectRecord::child(
            id,
            ObjectKind::CycleTask,
            cycle_task_group,
        ))?;
        self.cycle_tasks.insert(
            id,
            CycleTaskRecord {
                id,
                title: title.into(),
                state: CycleTaskState::Assigned,
                start_date,
                end_date,
                assignee: None,
            },
        );
        Ok(id)
    }

    /// Add a free-standing comment
    pub fn add_comment(&mut self, description: impl Into<String>) -> Result<ObjectId> {
        let id = ObjectId::new();
        self.arena.insert(ObjectRecord::root(id, ObjectKind::Comment))?;
        self.comments.insert(
            id,
            CommentRecord {
                id,
                description: description.into(),
            },
        );
        Ok(id)
    }

    /// Add a control
    pub fn add_control(
        &mut self,
        title: impl Into<String>,
        admin: Option<PersonId>,
    ) -> Result<ObjectId> {
        let id = ObjectId::new();
        self.arena.insert(ObjectRecord::root(id, ObjectKind::Control))?;
        self.controls.insert(
            id,
            ControlRecord {
                id,
                title: title.into(),
                admin,
            },
        );
        Ok(id)
    }

    /// Add a relationship edge
    pub fn add_relationship(&mut self, source: ObjectId, destination: ObjectId) {
        self.relationships.push(Relationship {
            source,
            destination,
        });
    }

    /// Remove the first relationship matching the edge, if present
    pub fn remove_relationship(&mut self, source: ObjectId, destination: ObjectId) -> bool {
        if let Some(index) = self
            .relationships
            .iter()
            .position(|rel| rel.source == source && rel.destination == destination)
        {
            self.relationships.remove(index);
            true
        } else {
            false
        }
    }

    /// All relationship edges
    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// Destinations of the given kind related to `source`
    pub fn related_of_kind(&self, source: ObjectId, kind: ObjectKind) -> Vec<ObjectId> {
        self.relationships
            .iter()
            .filter(|rel| rel.source == source)
            .filter(|rel| {
                self.arena
                    .get(rel.destination)
                    .is_some_and(|record| record.kind == kind)
            })
            .map(|rel| rel.destination)
            .collect()
    }

    /// Kind of an object, if it exists
    pub fn kind_of(&self, id: ObjectId) -> Option<ObjectKind> {
        self.arena.get(id).map(|record| record.kind)
    }

    /// Workflow record accessor
    pub fn workflow(&self, id: ObjectId) -> Option<&WorkflowRecord> {
        self.workflows.get(&id)
    }

    /// Mutable workflow record accessor
    pub fn workflow_mut(&mut self, id: ObjectId) -> Option<&mut WorkflowRecord> {
        self.workflows.get_mut(&id)
    }

    /// Task group record accessor
    pub fn task_group(&self, id: ObjectId) -> Option<&TaskGroupRecord> {
        self.task_groups.get(&id)
    }

    /// Mutable task group record accessor
    pub fn task_group_mut(&mut self, id: ObjectId) -> Option<&mut TaskGroupRecord> {
        self.task_groups.get_mut(&id)
    }

    /// Task template record accessor
    pub fn task_group_task(&self, id: ObjectId) -> Option<&TaskGroupTaskRecord> {
        self.task_group_tasks.get(&id)
    }

    /// Mutable task template record accessor
    pub fn task_group_task_mut(&mut self, id: ObjectId) -> Option<&mut TaskGroupTaskRecord> {
        self.task_group_tasks.get_mut(&id)
    }

    /// Cycle record accessor
    pub fn cycle(&self, id: ObjectId) -> Option<&CycleRecord> {
        self.cycles.get(&id)
    }

    /// Mutable cycle record accessor
    pub fn cycle_mut(&mut self, id: ObjectId) -> Option<&mut CycleRecord> {
        self.cycles.get_mut(&id)
    }

    /// Cycle task group record accessor
    pub fn cycle_task_group(&self, id: ObjectId) -> Option<&CycleTaskGroupRecord> {
        self.cycle_task_groups.get(&id)
    }

    /// Mutable cycle task group record accessor
    pub fn cycle_task_group_mut(&mut self, id: ObjectId) -> Option<&mut CycleTaskGroupRecord> {
        self.cycle_task_groups.get_mut(&id)
    }

    /// Cycle task record accessor
    pub fn cycle_task(&self, id: ObjectId) -> Option<&CycleTaskRecord> {
        self.cycle_tasks.get(&id)
    }

    /// Mutable cycle task record accessor
    pub fn cycle_task_mut(&mut self, id: ObjectId) -> Option<&mut CycleTaskRecord> {
        self.cycle_tasks.get_mut(&id)
    }

    /// Comment record accessor
    pub fn comment(&self, id: ObjectId) -> Option<&CommentRecord> {
        self.comments.get(&id)
    }

    /// Control record accessor
    pub fn control(&self, id: ObjectId) -> Option<&ControlRecord> {
        self.controls.get(&id)
    }

    /// Children of `parent` of the given kind, in insertion order
    pub fn children_of(&self, parent: ObjectId, kind: ObjectKind) -> Vec<ObjectId> {
        self.arena
            .iter()
            .filter(|record| record.kind == kind && record.parent == Some(parent))
            .map(|record| record.id)
            .collect()
    }

    /// Remove an object together with its descendant subtree
    ///
    /// Children go with their parent, so the arena never holds a dangling
    /// ancestry chain after a delete. Relationships are left alone.
    pub fn remove_object(&mut self, id: ObjectId) -> Result<()> {
        if self.arena.get(id).is_none() {
            return Err(TrellisError::not_found(format!("object {id}")));
        }
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            pending.extend(
                self.arena
                    .iter()
                    .filter(|record| record.parent == Some(current))
                    .map(|record| record.id),
            );
            if let Some(record) = self.arena.remove(current) {
                self.remove_record(record.kind, current);
            }
        }
        Ok(())
    }

    fn remove_record(&mut self, kind: ObjectKind, id: ObjectId) {
        match kind {
            ObjectKind::Workflow => {
                self.workflows.shift_remove(&id);
            }
            ObjectKind::TaskGroup => {
                self.task_groups.shift_remove(&id);
            }
            ObjectKind::TaskGroupTask => {
                self.task_group_tasks.shift_remove(&id);
            }
            ObjectKind::Cycle => {
                self.cycles.shift_remove(&id);
            }
            ObjectKind::CycleTaskGroup => {
                self.cycle_task_groups.shift_remove(&id);
            }
            ObjectKind::CycleTask => {
                self.cycle_tasks.shift_remove(&id);
            }
            ObjectKind::Comment => {
                self.comments.shift_remove(&id);
            }
            ObjectKind::Control => {
                self.controls.shift_remove(&id);
            }
        }
    }
}
