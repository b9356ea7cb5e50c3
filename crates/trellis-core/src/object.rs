//! Object kinds and the propagation graph
//!
//! The workflow hierarchy is fixed: a workflow owns task groups and cycles,
//! task groups own tasks, cycles own cycle task groups, which own cycle
//! tasks. Role propagation follows these edges strictly downward.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a domain object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectKind {
    /// A workflow definition
    Workflow,
    /// A group of task templates inside a workflow
    TaskGroup,
    /// A task template inside a task group
    TaskGroupTask,
    /// An activation instance of a workflow
    Cycle,
    /// The working copy of a task group inside a cycle
    CycleTaskGroup,
    /// The working copy of a task inside a cycle task group
    CycleTask,
    /// A free-standing comment, attached to objects via relationships
    Comment,
    /// A control object, attached to objects via relationships
    Control,
}

impl ObjectKind {
    /// The six kinds that participate in the workflow hierarchy
    pub const WORKFLOW_KINDS: [ObjectKind; 6] = [
        ObjectKind::Workflow,
        ObjectKind::TaskGroup,
        ObjectKind::TaskGroupTask,
        ObjectKind::Cycle,
        ObjectKind::CycleTaskGroup,
        ObjectKind::CycleTask,
    ];

    /// Parent kind in the propagation graph, if the kind has one
    ///
    /// Comments and controls are relationship endpoints, not hierarchy
    /// members, so they have no parent edge.
    pub fn parent_kind(&self) -> Option<ObjectKind> {
        match self {
            ObjectKind::Workflow => None,
            ObjectKind::TaskGroup => Some(ObjectKind::Workflow),
            ObjectKind::TaskGroupTask => Some(ObjectKind::TaskGroup),
            ObjectKind::Cycle => Some(ObjectKind::Workflow),
            ObjectKind::CycleTaskGroup => Some(ObjectKind::Cycle),
            ObjectKind::CycleTask => Some(ObjectKind::CycleTaskGroup),
            ObjectKind::Comment => None,
            ObjectKind::Control => None,
        }
    }

    /// Whether this kind sits below `ancestor` in the propagation graph
    pub fn descends_from(&self, ancestor: ObjectKind) -> bool {
        let mut current = self.parent_kind();
        while let Some(kind) = current {
            if kind == ancestor {
                return true;
            }
            current = kind.parent_kind();
        }
        false
    }

    /// Canonical kind name as used in logs and matrix dumps
    pub fn name(&self) -> &'static str {
        match self {
            ObjectKind::Workflow => "Workflow",
            ObjectKind::TaskGroup => "TaskGroup",
            ObjectKind::TaskGroupTask => "TaskGroupTask",
            ObjectKind::Cycle => "Cycle",
            ObjectKind::CycleTaskGroup => "CycleTaskGroup",
            ObjectKind::CycleTask => "CycleTask",
            ObjectKind::Comment => "Comment",
            ObjectKind::Control => "Control",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
