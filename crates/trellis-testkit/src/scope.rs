//! Workflow scope fixtures
//!
//! Builds the minimal object graph a permission test needs: one workflow
//! with a task group and task template, one spawned cycle with its working
//! copies, a pre-mapped comment and control, and an actor with a chosen
//! global role and optionally a workflow ACR. Every build produces fresh
//! identifiers, and the scope is assembled completely before it is handed
//! out, so evaluation never sees partial ancestry.

use chrono::NaiveDate;
use trellis_authorization::{AccessControlRole, RoleRegistry};
use trellis_core::{ObjectId, ObjectKind, PersonId, Result, Role};
use trellis_workflow::{WorkflowService, WorkflowStore};

/// A fully built workflow scope plus its actor
#[derive(Debug)]
pub struct WorkflowScope {
    /// Service wrapping the scope's store and registry
    pub service: WorkflowService,
    /// The actor under test
    pub actor: PersonId,
    /// The workflow at the root of the scope
    pub workflow: ObjectId,
    /// Task group under the workflow
    pub task_group: ObjectId,
    /// Task template under the task group
    pub task_group_task: ObjectId,
    /// Cycle spawned from the workflow
    pub cycle: ObjectId,
    /// Working copy of the task group inside the cycle
    pub cycle_task_group: ObjectId,
    /// Working copy of the task inside the cycle task group
    pub cycle_task: ObjectId,
}

impl WorkflowScope {
    /// The scope object of the given kind
    ///
    /// Panics on kinds the scope does not expose; fixtures only deal in the
    /// six workflow kinds.
    pub fn object_of_kind(&self, kind: ObjectKind) -> ObjectId {
        match kind {
            ObjectKind::Workflow => self.workflow,
            ObjectKind::TaskGroup => self.task_group,
            ObjectKind::TaskGroupTask => self.task_group_task,
            ObjectKind::Cycle => self.cycle,
            ObjectKind::CycleTaskGroup => self.cycle_task_group,
            ObjectKind::CycleTask => self.cycle_task,
            other => panic!("scope has no {other} object"),
        }
    }

    /// The parent used when creating a new object of the given kind
    pub fn create_parent(&self, kind: ObjectKind) -> Option<ObjectId> {
        match kind {
            ObjectKind::Workflow | ObjectKind::Comment | ObjectKind::Control => None,
            ObjectKind::TaskGroup | ObjectKind::Cycle => Some(self.workflow),
            ObjectKind::TaskGroupTask => Some(self.task_group),
            ObjectKind::CycleTaskGroup => Some(self.cycle),
            ObjectKind::CycleTask => Some(self.cycle_task_group),
        }
    }
}

/// Builder for [`WorkflowScope`]
#[derive(Debug, Clone)]
pub struct WorkflowScopeBuilder {
    actor_role: Role,
    with_workflow_admin: bool,
}

impl WorkflowScopeBuilder {
    /// Start a scope for an actor holding the given global role
    pub fn new(actor_role: Role) -> Self {
        Self {
            actor_role,
            with_workflow_admin: false,
        }
    }

    /// Also grant the actor the workflow Admin ACR on the scope workflow
    pub fn with_workflow_admin(mut self) -> Self {
        self.with_workflow_admin = true;
        self
    }

    /// Build the scope
    pub fn build(self) -> Result<WorkflowScope> {
        let date = NaiveDate::from_ymd_opt(2020, 3, 26).unwrap_or_default();
        let mut store = WorkflowStore::new();

        let workflow = store.add_workflow("Scope workflow")?;
        let task_group = store.add_task_group(workflow, "Scope task group")?;
        let task_group_task =
            store.add_task_group_task(task_group, "Scope task", date, date)?;
        let cycle = store.add_cycle(workflow, "Scope cycle")?;
        let cycle_task_group = store.add_cycle_task_group(cycle, "Scope cycle task group")?;
        let cycle_task =
            store.add_cycle_task(cycle_task_group, "Scope cycle task", date, date)?;

        // Pre-mapped endpoints so unmap/read/delete actions have something
        // to act on.
        let comment = store.add_comment("scope comment")?;
        store.add_relationship(cycle_task, comment);
        let control = store.add_control("scope control", None)?;
        store.add_relationship(cycle_task, control);
        let tg_control = store.add_control("scope task group control", None)?;
        store.add_relationship(task_group, tg_control);

        let mut registry = RoleRegistry::new();
        let actor = PersonId::new();
        registry.assign_global(actor, self.actor_role);
        if self.with_workflow_admin {
            registry.assign_acr(
                actor,
                AccessControlRole::workflow_admin(),
                workflow,
                store.arena(),
            )?;
        }

        Ok(WorkflowScope {
            service: WorkflowService::new(store, registry),
            actor,
            workflow,
            task_group,
            task_group_task,
            cycle,
            cycle_task_group,
            cycle_task,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_is_complete() {
        let scope = WorkflowScopeBuilder::new(Role::Reader).build().unwrap();
        for kind in ObjectKind::WORKFLOW_KINDS {
            let id = scope.object_of_kind(kind);
            assert!(scope.service.store().kind_of(id).is_some());
        }
        // Ancestry resolves end to end.
        let chain = scope
            .service
            .store()
            .arena()
            .ancestry(scope.cycle_task)
            .unwrap();
        assert_eq!(chain.len(), 4);
    }

    #[test]
    fn test_scopes_do_not_share_objects() {
        let a = WorkflowScopeBuilder::new(Role::Editor).build().unwrap();
        let b = WorkflowScopeBuilder::new(Role::Editor).build().unwrap();
        assert_ne!(a.workflow, b.workflow);
        assert_ne!(a.actor, b.actor);
    }

    #[test]
    fn test_workflow_admin_grant() {
        let scope = WorkflowScopeBuilder::new(Role::Creator)
            .with_workflow_admin()
            .build()
            .unwrap();
        assert_eq!(scope.service.registry().acl_entries().len(), 1);
    }
}
