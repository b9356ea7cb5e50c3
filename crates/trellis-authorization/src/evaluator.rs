//! Permission evaluation
//!
//! Evaluation is a pure, synchronous, read-only function over the registry
//! and an arena snapshot: resolve the actor's effective roles, look each up
//! in the static grant tables, and OR the results. There is no explicit
//! deny that can override a grant, so the most permissive assignment wins.
//! Denial is an ordinary `Ok(false)`, never an error.

use crate::acr::RoleAssignment;
use crate::grants::{acr_allows, baseline_allows};
use crate::registry::RoleRegistry;
use trellis_core::{Action, ObjectArena, ObjectId, PersonId, Result, TrellisError};

/// Evaluates whether an actor may perform an action on an object
#[derive(Debug, Clone, Copy)]
pub struct PermissionEvaluator<'a> {
    registry: &'a RoleRegistry,
}

impl<'a> PermissionEvaluator<'a> {
    /// Create an evaluator over a registry
    pub fn new(registry: &'a RoleRegistry) -> Self {
        Self { registry }
    }

    /// Decide whether `person` may perform `action` on `object`
    ///
    /// Errors signal lookup or configuration failures, never denial.
    pub fn can(
        &self,
        person: PersonId,
        action: Action,
        object: ObjectId,
        arena: &ObjectArena,
    ) -> Result<bool> {
        let record = arena
            .get(object)
            .ok_or_else(|| TrellisError::not_found(format!("object {object}")))?;
        let assignments = self
            .registry
            .resolve_effective_roles(person, object, arena)?;

        let allowed = assignments.iter().any(|assignment| match assignment {
            RoleAssignment::Global(role) => baseline_allows(*role, record.kind, action),
            RoleAssignment::Custom { acr, .. } => {
                let in_scope = record.kind == acr.object_kind
                    || record.kind.descends_from(acr.object_kind);
                in_scope && acr_allows(acr, record.kind, action)
            }
        });

        tracing::debug!(
            person = %person,
            action = %action,
            kind = %record.kind,
            object = %object,
            allowed,
            "permission evaluated"
        );
        Ok(allowed)
    }

    /// Decide whether `person` may create an object of `kind`
    ///
    /// Creation has no target instance yet, so the instance-scoped side is
    /// evaluated against the prospective parent: an ACR held on the parent
    /// (or one of its ancestors) covers the created kind when the kind
    /// falls inside the ACR scope. Root kinds pass `None`.
    pub fn can_create(
        &self,
        person: PersonId,
        kind: trellis_core::ObjectKind,
        parent: Option<ObjectId>,
        arena: &ObjectArena,
    ) -> Result<bool> {
        let assignments = match parent {
            Some(parent) => self.registry.resolve_effective_roles(person, parent, arena)?,
            None => self
                .registry
                .global_role(person)
                .map(RoleAssignment::Global)
                .into_iter()
                .collect(),
        };

        let allowed = assignments.iter().any(|assignment| match assignment {
            RoleAssignment::Global(role) => baseline_allows(*role, kind, Action::Create),
            RoleAssignment::Custom { acr, .. } => {
                let in_scope =
                    kind == acr.object_kind || kind.descends_from(acr.object_kind);
                in_scope && acr_allows(acr, kind, Action::Create)
            }
        });

        tracing::debug!(person = %person, kind = %kind, allowed, "create permission evaluated");
        Ok(allowed)
    }
}
