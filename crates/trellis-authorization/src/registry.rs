//! Role registry and effective-role resolution
//!
//! The registry holds three tables: ACR definitions per object kind, global
//! role assignments per person, and instance-scoped ACL entries. Effective
//! roles for (person, object) are the person's global role plus every ACL
//! entry held on the object or one of its ancestors.

use crate::acr::{AccessControlRole, AclEntry, RoleAssignment};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use trellis_core::{ObjectArena, ObjectId, PersonId, Result, Role, TrellisError};

/// Registry of roles, ACR definitions, and ACL assignments
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleRegistry {
    acr_definitions: IndexSet<AccessControlRole>,
    global_roles: Vec<(PersonId, Role)>,
    acl: Vec<AclEntry>,
}

impl RoleRegistry {
    /// Create a registry with the built-in workflow Admin ACR defined
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.define_acr(AccessControlRole::workflow_admin());
        registry
    }

    /// Register an ACR definition; idempotent
    pub fn define_acr(&mut self, acr: AccessControlRole) {
        self.acr_definitions.insert(acr);
    }

    /// Look up a defined ACR by kind and name
    pub fn find_acr(
        &self,
        object_kind: trellis_core::ObjectKind,
        name: &str,
    ) -> Option<&AccessControlRole> {
        self.acr_definitions
            .iter()
            .find(|acr| acr.object_kind == object_kind && acr.name == name)
    }

    /// Assign a person their global role, replacing any previous one
    pub fn assign_global(&mut self, person: PersonId, role: Role) {
        if let Some(entry) = self.global_roles.iter_mut().find(|(p, _)| *p == person) {
            entry.1 = role;
        } else {
            self.global_roles.push((person, role));
        }
    }

    /// The person's global role, if any
    pub fn global_role(&self, person: PersonId) -> Option<Role> {
        self.global_roles
            .iter()
            .find(|(p, _)| *p == person)
            .map(|(_, role)| *role)
    }

    /// Assign an ACR to a person on a specific object instance
    ///
    /// The ACR must be defined and the object must be in the arena with a
    /// kind matching the ACR scope; both failures are configuration defects.
    pub fn assign_acr(
        &mut self,
        person: PersonId,
        acr: AccessControlRole,
        object: ObjectId,
        arena: &ObjectArena,
    ) -> Result<()> {
        if !self.acr_definitions.contains(&acr) {
            return Err(TrellisError::configuration(format!(
                "ACR {acr} is not defined"
            )));
        }
        let record = arena
            .get(object)
            .ok_or_else(|| TrellisError::not_found(format!("object {object}")))?;
        if record.kind != acr.object_kind {
            return Err(TrellisError::configuration(format!(
                "ACR {} cannot be assigned on a {} instance",
                acr, record.kind
            )));
        }
        self.acl.push(AclEntry {
            person,
            acr,
            object,
        });
        Ok(())
    }

    /// All ACL entries, in assignment order
    pub fn acl_entries(&self) -> &[AclEntry] {
        &self.acl
    }

    /// Resolve the effective roles a person holds with respect to an object
    ///
    /// Returns the global role (if assigned) followed by every ACL entry on
    /// the object itself or an ancestor reachable through the propagation
    /// graph. Propagation is strictly downward: an ACR held on a descendant
    /// never surfaces for an ancestor target.
    pub fn resolve_effective_roles(
        &self,
        person: PersonId,
        object: ObjectId,
        arena: &ObjectArena,
    ) -> Result<Vec<RoleAssignment>> {
        let ancestry = arena.ancestry(object)?;
        let mut assignments = Vec::new();

        if let Some(role) = self.global_role(person) {
            assignments.push(RoleAssignment::Global(role));
        }

        for entry in &self.acl {
            if entry.person != person {
                continue;
            }
            if ancestry.iter().any(|record| record.id == entry.object) {
                assignments.push(RoleAssignment::Custom {
                    acr: entry.acr.clone(),
                    object: entry.object,
                });
            }
        }

        tracing::debug!(
            person = %person,
            object = %object,
            count = assignments.len(),
            "resolved effective roles"
        );
        Ok(assignments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use trellis_core::{ObjectKind, ObjectRecord};

    fn workflow_scope() -> (ObjectArena, ObjectId, ObjectId) {
        let mut arena = ObjectArena::new();
        let workflow = ObjectId::new();
        let task_group = ObjectId::new();
        arena
            .insert(ObjectRecord::root(workflow, ObjectKind::Workflow))
            .unwrap();
        arena
            .insert(ObjectRecord::child(
                task_group,
                ObjectKind::TaskGroup,
                workflow,
            ))
            .unwrap();
        (arena, workflow, task_group)
    }

    #[test]
    fn test_global_role_replacement() {
        let mut registry = RoleRegistry::new();
        let person = PersonId::new();
        registry.assign_global(person, Role::Reader);
        registry.assign_global(person, Role::Editor);
        assert_eq!(registry.global_role(person), Some(Role::Editor));
    }

    #[test]
    fn test_acr_propagates_to_descendant() {
        let (arena, workflow, task_group) = workflow_scope();
        let mut registry = RoleRegistry::new();
        let person = PersonId::new();
        registry
            .assign_acr(
                person,
                AccessControlRole::workflow_admin(),
                workflow,
                &arena,
            )
            .unwrap();

        let roles = registry
            .resolve_effective_roles(person, task_group, &arena)
            .unwrap();
        assert_eq!(roles.len(), 1);
        assert_matches!(&roles[0], RoleAssignment::Custom { object, .. } if *object == workflow);
    }

    #[test]
    fn test_no_upward_propagation() {
        let (mut arena, workflow, task_group) = workflow_scope();
        let mut registry = RoleRegistry::new();
        registry.define_acr(AccessControlRole::new(ObjectKind::TaskGroup, "Assignee"));
        let person = PersonId::new();
        registry
            .assign_acr(
                person,
                AccessControlRole::new(ObjectKind::TaskGroup, "Assignee"),
                task_group,
                &arena,
            )
            .unwrap();

        // The task-group role must not surface on the parent workflow.
        let roles = registry
            .resolve_effective_roles(person, workflow, &arena)
            .unwrap();
        assert!(roles.is_empty());

        // Sibling objects get nothing either.
        let other_tg = ObjectId::new();
        arena
            .insert(ObjectRecord::child(other_tg, ObjectKind::TaskGroup, workflow))
            .unwrap();
        let roles = registry
            .resolve_effective_roles(person, other_tg, &arena)
            .unwrap();
        assert!(roles.is_empty());
    }

    #[test]
    fn test_undefined_acr_is_configuration_error() {
        let (arena, workflow, _) = workflow_scope();
        let mut registry = RoleRegistry::new();
        let err = registry
            .assign_acr(
                PersonId::new(),
                AccessControlRole::new(ObjectKind::Workflow, "Phantom"),
                workflow,
                &arena,
            )
            .unwrap_err();
        assert_matches!(err, TrellisError::Configuration { .. });
    }

    #[test]
    fn test_acr_scope_must_match_instance_kind() {
        let (arena, _, task_group) = workflow_scope();
        let mut registry = RoleRegistry::new();
        let err = registry
            .assign_acr(
                PersonId::new(),
                AccessControlRole::workflow_admin(),
                task_group,
                &arena,
            )
            .unwrap_err();
        assert_matches!(err, TrellisError::Configuration { .. });
    }
}
