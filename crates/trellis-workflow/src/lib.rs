//! Workflow domain model and the guarded action boundary
//!
//! Holds the typed records behind the object arena (workflows, task groups,
//! cycles and their working copies), the cycle task state machine, and
//! `WorkflowService`, the single entry point through which actions reach
//! the store. The service checks permission first and state legality
//! second, so denial and state errors are never conflated.

/// Domain records and the workflow store
pub mod records;
/// The guarded action boundary
pub mod service;
/// Cycle task state machine
pub mod state;

pub use records::{
    CommentRecord, ControlRecord, CycleRecord, CycleTaskGroupRecord, CycleTaskRecord,
    Relationship, TaskGroupRecord, TaskGroupTaskRecord, WorkflowRecord, WorkflowStatus,
    WorkflowStore,
};
pub use service::{ActionOutcome, WorkflowService};
pub use state::CycleTaskState;
