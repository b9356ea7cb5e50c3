//! Matrix runner
//!
//! Executes every row of the capability matrix against a fresh scope and
//! collects the rows whose observed outcome disagrees with the expectation.
//! Each row gets its own scope so a mutating action in one row can never
//! leak into the next.

use trellis_core::{Action, ObjectKind, Result};
use trellis_workflow::CycleTaskState;

use crate::matrix::{capability_matrix, MatrixEntry};
use crate::scope::WorkflowScopeBuilder;

/// One observed disagreement between the matrix and the running system
#[derive(Debug, Clone)]
pub struct MatrixFailure {
    /// The row that disagreed
    pub entry: MatrixEntry,
    /// What actually happened
    pub observed: bool,
}

impl std::fmt::Display for MatrixFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {}: expected allowed={}, observed allowed={}",
            self.entry.role,
            self.entry.object_kind,
            self.entry.action,
            self.entry.expected.allowed,
            self.observed
        )
    }
}

/// Runs capability matrix rows against freshly built scopes
#[derive(Debug, Default)]
pub struct MatrixRunner;

impl MatrixRunner {
    /// Build the runner
    pub fn new() -> Self {
        Self
    }

    /// Run the full matrix, returning every row that disagreed
    pub fn run_all(&self) -> Result<Vec<MatrixFailure>> {
        self.run(capability_matrix())
    }

    /// Run the given rows, returning every row that disagreed
    pub fn run(&self, rows: &[MatrixEntry]) -> Result<Vec<MatrixFailure>> {
        let mut failures = Vec::new();
        for row in rows {
            let observed = self.run_row(row)?;
            if observed != row.expected.allowed {
                tracing::debug!(
                    role = %row.role,
                    kind = %row.object_kind,
                    action = %row.action,
                    expected = row.expected.allowed,
                    observed,
                    "matrix row disagreed"
                );
                failures.push(MatrixFailure {
                    entry: *row,
                    observed,
                });
            }
        }
        Ok(failures)
    }

    /// Run one row in a fresh scope, returning whether the action succeeded
    pub fn run_row(&self, row: &MatrixEntry) -> Result<bool> {
        let mut scope = WorkflowScopeBuilder::new(row.role).build()?;
        prepare_cycle_task_state(&mut scope, row);
        let outcome = if row.action == Action::Create {
            let parent = scope.create_parent(row.object_kind);
            scope.service.create(scope.actor, row.object_kind, parent)?
        } else {
            let target = scope.object_of_kind(row.object_kind);
            scope.service.perform(scope.actor, row.action, target)?
        };
        Ok(outcome.is_allowed())
    }
}

/// Put the scope's cycle task in a state from which `row.action` is legal
///
/// The matrix asserts permission outcomes, so an allowed transition must
/// not trip over the state machine instead.
fn prepare_cycle_task_state(scope: &mut crate::scope::WorkflowScope, row: &MatrixEntry) {
    if row.object_kind != ObjectKind::CycleTask {
        return;
    }
    let state = match row.action {
        Action::Start => CycleTaskState::Assigned,
        Action::End => CycleTaskState::InProgress,
        Action::Verify | Action::Decline => CycleTaskState::Finished,
        Action::Restore => CycleTaskState::Declined,
        Action::Deprecate => CycleTaskState::Assigned,
        _ => return,
    };
    let cycle_task = scope.cycle_task;
    if let Some(record) = scope.service.store_mut().cycle_task_mut(cycle_task) {
        record.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::Role;

    #[test]
    fn test_allowed_row_reports_true() {
        let runner = MatrixRunner::new();
        let row = capability_matrix()
            .iter()
            .find(|row| {
                row.role == Role::Editor
                    && row.object_kind == ObjectKind::CycleTask
                    && row.action == Action::Verify
            })
            .unwrap();
        assert!(runner.run_row(row).unwrap());
    }

    #[test]
    fn test_forbidden_row_reports_false() {
        let runner = MatrixRunner::new();
        let row = capability_matrix()
            .iter()
            .find(|row| {
                row.role == Role::Reader
                    && row.object_kind == ObjectKind::Workflow
                    && row.action == Action::Delete
            })
            .unwrap();
        assert!(!runner.run_row(row).unwrap());
    }

    #[test]
    fn test_fresh_scope_per_row() {
        // Running a delete twice must succeed both times.
        let runner = MatrixRunner::new();
        let row = capability_matrix()
            .iter()
            .find(|row| {
                row.role == Role::Administrator
                    && row.object_kind == ObjectKind::Workflow
                    && row.action == Action::Delete
            })
            .unwrap();
        assert!(runner.run_row(row).unwrap());
        assert!(runner.run_row(row).unwrap());
    }
}
