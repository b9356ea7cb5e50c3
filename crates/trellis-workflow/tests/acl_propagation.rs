//! Downward propagation of the workflow Admin access control role
//!
//! A Creator who holds the Admin ACR on a workflow gets the full action
//! set on everything under that workflow, while their global baseline
//! alone grants none of it.

use trellis_core::{Action, ObjectKind, Role};
use trellis_testkit::{capability_matrix, WorkflowScopeBuilder};
use trellis_workflow::CycleTaskState;

/// CycleTask actions the matrix marks true for Administrator
fn admin_cycle_task_actions() -> Vec<Action> {
    capability_matrix()
        .iter()
        .filter(|row| {
            row.role == Role::Administrator
                && row.object_kind == ObjectKind::CycleTask
                && row.expected.allowed
                && row.action != Action::Create
        })
        .map(|row| row.action)
        .collect()
}

fn state_for(action: Action) -> Option<CycleTaskState> {
    match action {
        Action::Start => Some(CycleTaskState::Assigned),
        Action::End => Some(CycleTaskState::InProgress),
        Action::Verify | Action::Decline => Some(CycleTaskState::Finished),
        Action::Restore => Some(CycleTaskState::Declined),
        Action::Deprecate => Some(CycleTaskState::Assigned),
        _ => None,
    }
}

#[test]
fn test_workflow_admin_acr_grants_full_cycle_task_set_to_creator() {
    for action in admin_cycle_task_actions() {
        let mut scope = WorkflowScopeBuilder::new(Role::Creator)
            .with_workflow_admin()
            .build()
            .unwrap();
        if let Some(state) = state_for(action) {
            let cycle_task = scope.cycle_task;
            scope
                .service
                .store_mut()
                .cycle_task_mut(cycle_task)
                .unwrap()
                .state = state;
        }
        let target = scope.cycle_task;
        let outcome = scope.service.perform(scope.actor, action, target).unwrap();
        assert!(outcome.is_allowed(), "{action} denied despite workflow Admin ACR");
    }
}

#[test]
fn test_creator_baseline_alone_grants_none_of_it() {
    for action in admin_cycle_task_actions() {
        let mut scope = WorkflowScopeBuilder::new(Role::Creator).build().unwrap();
        let target = scope.cycle_task;
        let outcome = scope.service.perform(scope.actor, action, target).unwrap();
        assert!(!outcome.is_allowed(), "{action} permitted without the ACR");
    }
}

#[test]
fn test_creator_with_acr_can_create_under_the_workflow() {
    let mut scope = WorkflowScopeBuilder::new(Role::Creator)
        .with_workflow_admin()
        .build()
        .unwrap();
    let (actor, workflow) = (scope.actor, scope.workflow);
    let outcome = scope
        .service
        .create(actor, ObjectKind::TaskGroup, Some(workflow))
        .unwrap();
    assert!(outcome.is_allowed());
}

#[test]
fn test_assign_then_act_path() {
    // An Editor hands out the workflow Admin ACR; the assignee, whose
    // global role is only Reader, can then update the task group.
    let mut scope = WorkflowScopeBuilder::new(Role::Editor).build().unwrap();
    let (actor, workflow) = (scope.actor, scope.workflow);
    let outcome = scope
        .service
        .perform(actor, Action::AssignWfRole, workflow)
        .unwrap();
    assert!(outcome.is_allowed());

    let assignee = scope
        .service
        .registry()
        .acl_entries()
        .last()
        .expect("assignment recorded an ACL entry")
        .person;
    let task_group = scope.task_group;
    let outcome = scope
        .service
        .perform(assignee, Action::Update, task_group)
        .unwrap();
    assert!(outcome.is_allowed());
}
