//! The referential-integrity repair migration
//!
//! Cleans up orphan rows that would violate the foreign-key constraints
//! about to be declared, then declares them. The order matters: constraint
//! declaration validates existing rows, so any orphan left behind by the
//! cleanup passes fails the whole migration.

use trellis_core::{Result, TrellisError};

use crate::store::{ForeignKeyConstraint, Store};

/// Revision identifier of this migration
pub const REVISION: &str = "5c0e3870b881";
/// Revision this migration builds on
pub const DOWN_REVISION: &str = "51cadec32665";

/// Row counts of the repair passes, for logging and assertions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// `audits.audit_firm_id` values nulled
    pub audits_nulled: usize,
    /// `user_roles` rows deleted
    pub user_roles_deleted: usize,
    /// `risk_assessments` rows deleted
    pub risk_assessments_deleted: usize,
    /// Constraints declared
    pub constraints_added: usize,
}

/// Null `audits.audit_firm_id` where it references no `org_groups` row
pub fn null_orphan_audit_firms(store: &mut Store) -> Result<usize> {
    let mut nulled = 0;
    for id in store.row_ids("audits")? {
        if let Some(firm) = store.value("audits", id, "audit_firm_id")? {
            if !store.contains("org_groups", firm)? {
                store.set_value("audits", id, "audit_firm_id", None)?;
                tracing::info!(audit = id, firm, "nulled orphan audit firm reference");
                nulled += 1;
            }
        }
    }
    Ok(nulled)
}

/// Delete `user_roles` rows whose `person_id` references no person
///
/// Each deleted id is logged as a `deleted` revision event under the
/// `UserRole` model name.
pub fn delete_orphan_user_roles(store: &mut Store) -> Result<usize> {
    delete_orphans(store, "user_roles", "person_id", "people", "UserRole")
}

/// Delete `risk_assessments` rows whose `program_id` references no program
///
/// Each deleted id is logged as a `deleted` revision event under the
/// `RiskAssessment` model name.
pub fn delete_orphan_risk_assessments(store: &mut Store) -> Result<usize> {
    delete_orphans(
        store,
        "risk_assessments",
        "program_id",
        "programs",
        "RiskAssessment",
    )
}

fn delete_orphans(
    store: &mut Store,
    table: &str,
    column: &str,
    referenced: &str,
    model: &str,
) -> Result<usize> {
    let mut deleted = 0;
    for id in store.row_ids(table)? {
        if let Some(value) = store.value(table, id, column)? {
            if !store.contains(referenced, value)? {
                store.remove_row_unchecked(table, id)?;
                store.record_deletion(model, id);
                tracing::info!(table, row = id, "deleted orphan row");
                deleted += 1;
            }
        }
    }
    Ok(deleted)
}

/// The constraints this migration declares, in declaration order
///
/// Everything is ON DELETE NO ACTION except `saved_searches.person_id`,
/// where dropping the person cascades to their saved searches.
pub fn constraints() -> Vec<ForeignKeyConstraint> {
    vec![
        ForeignKeyConstraint::no_action("fk_audit_firm_id", "audits", "audit_firm_id", "org_groups"),
        ForeignKeyConstraint::no_action("fk_contexts_contexts", "contexts", "context_id", "contexts"),
        ForeignKeyConstraint::no_action(
            "fk_custom_attribute_definitions_context_id",
            "custom_attribute_definitions",
            "context_id",
            "contexts",
        ),
        ForeignKeyConstraint::no_action(
            "fk_custom_attribute_values_context_id",
            "custom_attribute_values",
            "context_id",
            "contexts",
        ),
        ForeignKeyConstraint::no_action(
            "fk_secondary_contact_id",
            "cycle_task_groups",
            "secondary_contact_id",
            "people",
        ),
        ForeignKeyConstraint::no_action("fk_task_group_id", "cycle_task_groups", "task_group_id", "task_groups"),
        ForeignKeyConstraint::no_action("fk_cycles_secondary_contact_id", "cycles", "secondary_contact_id", "people"),
        ForeignKeyConstraint::no_action(
            "fk_notification_types_context_id",
            "notification_types",
            "context_id",
            "contexts",
        ),
        ForeignKeyConstraint::no_action("fk_notifications_context_id", "notifications", "context_id", "contexts"),
        ForeignKeyConstraint::no_action(
            "fk_notifications_history_context_id",
            "notifications_history",
            "context_id",
            "contexts",
        ),
        ForeignKeyConstraint::no_action("fk_roles_context_id", "roles", "context_id", "contexts"),
        ForeignKeyConstraint::cascade("fk_person_id", "saved_searches", "person_id", "people"),
        ForeignKeyConstraint::no_action("fk_snapshots_context_id", "snapshots", "context_id", "contexts"),
        ForeignKeyConstraint::no_action(
            "fk_task_groups_secondary_contact_id",
            "task_groups",
            "secondary_contact_id",
            "people",
        ),
        ForeignKeyConstraint::no_action("fk_threats_context_id", "threats", "context_id", "contexts"),
        ForeignKeyConstraint::no_action("fk_user_roles_person_id", "user_roles", "person_id", "people"),
        ForeignKeyConstraint::no_action("fk_vendors_context_id", "vendors", "context_id", "contexts"),
    ]
}

/// Run the migration once against the store
///
/// Rejects stores that already carry this revision. Runs the cleanup
/// passes before declaring constraints; declaration validates rows, so a
/// skipped cleanup surfaces as `ConstraintViolation` rather than silently
/// binding a broken schema.
pub fn upgrade(store: &mut Store) -> Result<MigrationReport> {
    if store.is_applied(REVISION) {
        return Err(TrellisError::AlreadyApplied {
            revision: REVISION.to_string(),
        });
    }
    let mut report = MigrationReport {
        audits_nulled: null_orphan_audit_firms(store)?,
        user_roles_deleted: delete_orphan_user_roles(store)?,
        risk_assessments_deleted: delete_orphan_risk_assessments(store)?,
        ..MigrationReport::default()
    };
    for constraint in constraints() {
        store.add_constraint(constraint)?;
        report.constraints_added += 1;
    }
    store.mark_applied(REVISION);
    tracing::info!(
        revision = REVISION,
        nulled = report.audits_nulled,
        user_roles = report.user_roles_deleted,
        risk_assessments = report.risk_assessments_deleted,
        constraints = report.constraints_added,
        "migration applied"
    );
    Ok(report)
}

/// Downgrade is not supported for this migration
pub fn downgrade(_store: &mut Store) -> Result<()> {
    Err(TrellisError::unsupported(
        "cannot restore rows deleted by the integrity repair",
    ))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::store::row;

    #[test]
    fn test_null_pass_only_touches_orphans() {
        let mut store = Store::new();
        store.insert_row("org_groups", 5, row(&[])).unwrap();
        store
            .insert_row("audits", 1, row(&[("audit_firm_id", Some(5))]))
            .unwrap();
        store
            .insert_row("audits", 2, row(&[("audit_firm_id", Some(42))]))
            .unwrap();
        assert_eq!(null_orphan_audit_firms(&mut store).unwrap(), 1);
        assert_eq!(store.value("audits", 1, "audit_firm_id").unwrap(), Some(5));
        assert_eq!(store.value("audits", 2, "audit_firm_id").unwrap(), None);
    }

    #[test]
    fn test_orphan_deletes_log_revision_events() {
        let mut store = Store::new();
        store.insert_row("people", 1, row(&[])).unwrap();
        store
            .insert_row("user_roles", 10, row(&[("person_id", Some(1))]))
            .unwrap();
        store
            .insert_row("user_roles", 11, row(&[("person_id", Some(77))]))
            .unwrap();
        assert_eq!(delete_orphan_user_roles(&mut store).unwrap(), 1);
        let events = store.revision_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].resource_type, "UserRole");
        assert_eq!(events[0].resource_id, 11);
        assert_eq!(events[0].action, "deleted");
    }

    #[test]
    fn test_upgrade_rejects_second_run() {
        let mut store = Store::new();
        upgrade(&mut store).unwrap();
        assert_matches!(
            upgrade(&mut store),
            Err(TrellisError::AlreadyApplied { ref revision }) if revision == REVISION
        );
    }

    #[test]
    fn test_downgrade_is_refused() {
        let mut store = Store::new();
        upgrade(&mut store).unwrap();
        assert_matches!(downgrade(&mut store), Err(TrellisError::Unsupported { .. }));
    }

    #[test]
    fn test_constraint_list_is_cascade_only_for_saved_searches() {
        let cascades: Vec<_> = constraints()
            .into_iter()
            .filter(|c| c.on_delete == crate::store::OnDelete::Cascade)
            .collect();
        assert_eq!(cascades.len(), 1);
        assert_eq!(cascades[0].name, "fk_person_id");
        assert_eq!(cascades[0].table, "saved_searches");
    }

    #[test]
    fn test_contexts_self_reference_keeps_its_schema_name() {
        let fk = constraints()
            .into_iter()
            .find(|c| c.table == "contexts")
            .unwrap();
        assert_eq!(fk.name, "fk_contexts_contexts");
        assert_eq!(fk.referenced_table, "contexts");
    }
}
