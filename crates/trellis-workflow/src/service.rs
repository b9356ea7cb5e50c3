//! The guarded action boundary
//!
//! Every operation goes through `WorkflowService`: the permission evaluator
//! runs first, a denial returns `Forbidden` without touching any state, and
//! only a granted action reaches the state machine or the store. This
//! ordering is a contract: a denied actor can never observe a state error.

use crate::records::{WorkflowStatus, WorkflowStore};
use trellis_authorization::{AccessControlRole, PermissionEvaluator, RoleRegistry};
use trellis_core::{Action, ObjectId, ObjectKind, PersonId, Result, Role, TrellisError};

/// Outcome of a guarded action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Permission granted and the action applied
    Allowed,
    /// Permission denied; nothing was touched
    Forbidden,
}

impl ActionOutcome {
    /// Whether the action was applied
    pub fn is_allowed(&self) -> bool {
        matches!(self, ActionOutcome::Allowed)
    }
}

/// Service wrapping the workflow store behind permission checks
#[derive(Debug, Clone)]
pub struct WorkflowService {
    store: WorkflowStore,
    registry: RoleRegistry,
}

impl WorkflowService {
    /// Create a service over an existing store and registry
    pub fn new(store: WorkflowStore, registry: RoleRegistry) -> Self {
        Self { store, registry }
    }

    /// Read access to the store
    pub fn store(&self) -> &WorkflowStore {
        &self.store
    }

    /// Mutable access to the store, for fixture setup
    pub fn store_mut(&mut self) -> &mut WorkflowStore {
        &mut self.store
    }

    /// Read access to the registry
    pub fn registry(&self) -> &RoleRegistry {
        &self.registry
    }

    /// Mutable access to the registry, for fixture setup
    pub fn registry_mut(&mut self) -> &mut RoleRegistry {
        &mut self.registry
    }

    /// Create a new object of `kind` under `parent`, permission first
    ///
    /// Root kinds (Workflow, Comment, Control) take `parent = None`.
    pub fn create(
        &mut self,
        actor: PersonId,
        kind: ObjectKind,
        parent: Option<ObjectId>,
    ) -> Result<ActionOutcome> {
        let permitted = PermissionEvaluator::new(&self.registry).can_create(
            actor,
            kind,
            parent,
            self.store.arena(),
        )?;
        if !permitted {
            tracing::debug!(actor = %actor, kind = %kind, "create forbidden");
            return Ok(ActionOutcome::Forbidden);
        }
        self.apply_create(kind, parent)?;
        Ok(ActionOutcome::Allowed)
    }

    /// Perform a non-create action on an existing object, permission first
    pub fn perform(
        &mut self,
        actor: PersonId,
        action: Action,
        target: ObjectId,
    ) -> Result<ActionOutcome> {
        if action == Action::Create {
            return Err(TrellisError::invalid(
                "create goes through WorkflowService::create",
            ));
        }
        let permitted = PermissionEvaluator::new(&self.registry).can(
            actor,
            action,
            target,
            self.store.arena(),
        )?;
        if !permitted {
            tracing::debug!(actor = %actor, action = %action, target = %target, "forbidden");
            return Ok(ActionOutcome::Forbidden);
        }
        self.apply(actor, action, target)?;
        tracing::debug!(actor = %actor, action = %action, target = %target, "applied");
        Ok(ActionOutcome::Allowed)
    }

    fn apply_create(&mut self, kind: ObjectKind, parent: Option<ObjectId>) -> Result<ObjectId> {
        let require_parent = |parent: Option<ObjectId>| {
            parent.ok_or_else(|| {
                TrellisError::invalid(format!("creating a {kind} requires a parent"))
            })
        };
        match kind {
            ObjectKind::Workflow => self.store.add_workflow("New workflow"),
            ObjectKind::TaskGroup => self
                .store
                .add_task_group(require_parent(parent)?, "New task group"),
            ObjectKind::TaskGroupTask => {
                let today = chrono::Utc::now().date_naive();
                self.store.add_task_group_task(
                    require_parent(parent)?,
                    "New task group task",
                    today,
                    today,
                )
            }
            ObjectKind::Cycle => self.store.add_cycle(require_parent(parent)?, "New cycle"),
            ObjectKind::CycleTaskGroup => self
                .store
                .add_cycle_task_group(require_parent(parent)?, "New cycle task group"),
            ObjectKind::CycleTask => {
                let today = chrono::Utc::now().date_naive();
                self.store
                    .add_cycle_task(require_parent(parent)?, "New cycle task", today, today)
            }
            ObjectKind::Comment => self.store.add_comment("New comment"),
            ObjectKind::Control => self.store.add_control("New control", None),
        }
    }

    fn apply(&mut self, actor: PersonId, action: Action, target: ObjectId) -> Result<()> {
        let kind = self
            .store
            .kind_of(target)
            .ok_or_else(|| TrellisError::not_found(format!("object {target}")))?;
        match action {
            Action::Create => unreachable!("routed through create"),
            // Read paths leave the store untouched.
            Action::Read
            | Action::ReadRevisions
            | Action::ReadComment
            | Action::ReadMappedControl => Ok(()),
            Action::Update => self.apply_update(kind, target),
            Action::BulkUpdate => self.apply_update(kind, target),
            Action::Delete => self.store.remove_object(target),
            Action::Clone => self.apply_clone(kind, target),
            Action::Activate => self.apply_activate(kind, target),
            Action::AssignWfRole => self.apply_assign_wf_role(kind, target),
            Action::Assign => self.apply_assign(kind, target),
            Action::MapControl => {
                let control = self.store.add_control("Mapped control", None)?;
                self.store.add_relationship(target, control);
                Ok(())
            }
            Action::MapCreatedControl => {
                let control = self.store.add_control("Own control", Some(actor))?;
                self.store.add_relationship(target, control);
                Ok(())
            }
            Action::UpmapControl => {
                let control = self
                    .store
                    .related_of_kind(target, ObjectKind::Control)
                    .first()
                    .copied()
                    .ok_or_else(|| {
                        TrellisError::not_found(format!("no control mapped to {target}"))
                    })?;
                self.store.remove_relationship(target, control);
                Ok(())
            }
            Action::AddComment => {
                let comment = self.store.add_comment("New comment")?;
                self.store.add_relationship(target, comment);
                Ok(())
            }
            Action::DeleteComment => {
                let comment = self
                    .store
                    .related_of_kind(target, ObjectKind::Comment)
                    .first()
                    .copied()
                    .ok_or_else(|| {
                        TrellisError::not_found(format!("no comment mapped to {target}"))
                    })?;
                self.store.remove_relationship(target, comment);
                self.store.remove_object(comment)
            }
            Action::Start
            | Action::End
            | Action::Verify
            | Action::Decline
            | Action::Deprecate
            | Action::Restore => self.apply_transition(kind, action, target),
        }
    }

    fn apply_update(&mut self, kind: ObjectKind, target: ObjectId) -> Result<()> {
        let missing = || TrellisError::not_found(format!("{kind} record {target}"));
        match kind {
            ObjectKind::Workflow => {
                self.store.workflow_mut(target).ok_or_else(missing)?.title =
                    "Updated workflow".to_string();
            }
            ObjectKind::TaskGroup => {
                self.store.task_group_mut(target).ok_or_else(missing)?.title =
                    "Updated task group".to_string();
            }
            ObjectKind::TaskGroupTask => {
                self.store
                    .task_group_task_mut(target)
                    .ok_or_else(missing)?
                    .title = "Updated task".to_string();
            }
            ObjectKind::Cycle => {
                self.store.cycle_mut(target).ok_or_else(missing)?.title =
                    "Updated cycle".to_string();
            }
            ObjectKind::CycleTaskGroup => {
                self.store
                    .cycle_task_group_mut(target)
                    .ok_or_else(missing)?
                    .title = "Updated cycle task group".to_string();
            }
            ObjectKind::CycleTask => {
                self.store.cycle_task_mut(target).ok_or_else(missing)?.title =
                    "Updated cycle task".to_string();
            }
            ObjectKind::Comment | ObjectKind::Control => {
                return Err(TrellisError::invalid(format!("{kind} is not updatable")));
            }
        }
        Ok(())
    }

    fn apply_clone(&mut self, kind: ObjectKind, target: ObjectId) -> Result<()> {
        match kind {
            ObjectKind::Workflow => {
                let title = self
                    .store
                    .workflow(target)
                    .map(|record| format!("{} (copy)", record.title))
                    .ok_or_else(|| TrellisError::not_found(format!("workflow {target}")))?;
                let new_workflow = self.store.add_workflow(title)?;
                for task_group in self.store.children_of(target, ObjectKind::TaskGroup) {
                    let tg_title = self
                        .store
                        .task_group(task_group)
                        .map(|record| record.title.clone())
                        .unwrap_or_default();
                    let new_tg = self.store.add_task_group(new_workflow, tg_title)?;
                    for task in self.store.children_of(task_group, ObjectKind::TaskGroupTask) {
                        if let Some(record) = self.store.task_group_task(task).cloned() {
                            self.store.add_task_group_task(
                                new_tg,
                                record.title,
                                record.start_date,
                                record.end_date,
                            )?;
                        }
                    }
                }
                Ok(())
            }
            ObjectKind::TaskGroup => {
                let record = self
                    .store
                    .task_group(target)
                    .cloned()
                    .ok_or_else(|| TrellisError::not_found(format!("task group {target}")))?;
                let workflow = self
                    .store
                    .arena()
                    .get(target)
                    .and_then(|r| r.parent)
                    .ok_or_else(|| TrellisError::configuration("task group without workflow"))?;
                let new_tg = self
                    .store
                    .add_task_group(workflow, format!("{} (copy)", record.title))?;
                for task in self.store.children_of(target, ObjectKind::TaskGroupTask) {
                    if let Some(task_record) = self.store.task_group_task(task).cloned() {
                        self.store.add_task_group_task(
                            new_tg,
                            task_record.title,
                            task_record.start_date,
                            task_record.end_date,
                        )?;
                    }
                }
                Ok(())
            }
            _ => Err(TrellisError::invalid(format!("{kind} cannot be cloned"))),
        }
    }

    /// Activation flips the workflow to Active and spawns a cycle holding
    /// working copies of every task group and task
    fn apply_activate(&mut self, kind: ObjectKind, target: ObjectId) -> Result<()> {
        if kind != ObjectKind::Workflow {
            return Err(TrellisError::invalid(format!(
                "{kind} cannot be activated"
            )));
        }
        let title = {
            let workflow = self
                .store
                .workflow_mut(target)
                .ok_or_else(|| TrellisError::not_found(format!("workflow {target}")))?;
            workflow.status = WorkflowStatus::Active;
            workflow.title.clone()
        };

        let cycle = self.store.add_cycle(target, format!("{title} cycle"))?;
        for task_group in self.store.children_of(target, ObjectKind::TaskGroup) {
            let tg_title = self
                .store
                .task_group(task_group)
                .map(|record| record.title.clone())
                .unwrap_or_default();
            let cycle_tg = self.store.add_cycle_task_group(cycle, tg_title)?;
            for task in self.store.children_of(task_group, ObjectKind::TaskGroupTask) {
                if let Some(record) = self.store.task_group_task(task).cloned() {
                    self.store.add_cycle_task(
                        cycle_tg,
                        record.title,
                        record.start_date,
                        record.end_date,
                    )?;
                }
            }
        }
        tracing::info!(workflow = %target, cycle = %cycle, "workflow activated");
        Ok(())
    }

    fn apply_assign_wf_role(&mut self, kind: ObjectKind, target: ObjectId) -> Result<()> {
        if kind != ObjectKind::Workflow {
            return Err(TrellisError::invalid(format!(
                "workflow roles cannot be assigned on a {kind}"
            )));
        }
        let person = PersonId::new();
        self.registry.assign_global(person, Role::Reader);
        self.registry.assign_acr(
            person,
            AccessControlRole::workflow_admin(),
            target,
            self.store.arena(),
        )
    }

    fn apply_assign(&mut self, kind: ObjectKind, target: ObjectId) -> Result<()> {
        let person = PersonId::new();
        self.registry.assign_global(person, Role::Reader);
        let missing = || TrellisError::not_found(format!("{kind} record {target}"));
        match kind {
            ObjectKind::TaskGroup => {
                self.store.task_group_mut(target).ok_or_else(missing)?.contact = Some(person);
            }
            ObjectKind::TaskGroupTask => {
                self.store
                    .task_group_task_mut(target)
                    .ok_or_else(missing)?
                    .contact = Some(person);
            }
            ObjectKind::CycleTask => {
                self.store.cycle_task_mut(target).ok_or_else(missing)?.assignee = Some(person);
            }
            _ => {
                return Err(TrellisError::invalid(format!(
                    "{kind} does not take assignments"
                )));
            }
        }
        Ok(())
    }

    fn apply_transition(&mut self, kind: ObjectKind, action: Action, target: ObjectId) -> Result<()> {
        // Ending a cycle is not a task transition: it retires the cycle.
        if kind == ObjectKind::Cycle && action == Action::End {
            self.store
                .cycle_mut(target)
                .ok_or_else(|| TrellisError::not_found(format!("cycle {target}")))?
                .current = false;
            return Ok(());
        }
        if kind != ObjectKind::CycleTask {
            return Err(TrellisError::invalid(format!(
                "{action} only applies to cycle tasks, not {kind}"
            )));
        }
        let task = self
            .store
            .cycle_task_mut(target)
            .ok_or_else(|| TrellisError::not_found(format!("cycle task {target}")))?;
        task.state = task.state.transition(action)?;
        Ok(())
    }
}
