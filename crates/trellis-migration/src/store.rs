//! In-memory relational store
//!
//! Stands in for the storage boundary during migration work: named tables
//! of integer-keyed rows, declared foreign-key constraints, a revision
//! event log, and bookkeeping of applied migration revisions. Constraints
//! are enforced when they are added (existing rows are validated) and on
//! every subsequent delete (ON DELETE policy).

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use trellis_core::{Result, TrellisError};

/// A row keyed by column name; foreign-key columns hold the referenced id
pub type Row = BTreeMap<String, Option<i64>>;

/// Behavior when a referenced row is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnDelete {
    /// Refuse the delete while dependent rows exist
    NoAction,
    /// Delete dependent rows along with the referenced row
    Cascade,
}

/// A named foreign-key constraint between two tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyConstraint {
    /// Constraint name as it would appear in the schema
    pub name: String,
    /// Table holding the foreign-key column
    pub table: String,
    /// The foreign-key column
    pub column: String,
    /// Table whose primary key is referenced
    pub referenced_table: String,
    /// Delete policy
    pub on_delete: OnDelete,
}

impl ForeignKeyConstraint {
    /// A NO ACTION constraint
    pub fn no_action(
        name: impl Into<String>,
        table: impl Into<String>,
        column: impl Into<String>,
        referenced_table: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            column: column.into(),
            referenced_table: referenced_table.into(),
            on_delete: OnDelete::NoAction,
        }
    }

    /// A CASCADE constraint
    pub fn cascade(
        name: impl Into<String>,
        table: impl Into<String>,
        column: impl Into<String>,
        referenced_table: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            column: column.into(),
            referenced_table: referenced_table.into(),
            on_delete: OnDelete::Cascade,
        }
    }
}

/// One entry in the revision event log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionEvent {
    /// Model name of the resource the event concerns
    pub resource_type: String,
    /// Primary key of the affected row
    pub resource_id: i64,
    /// Event action, e.g. `deleted`
    pub action: String,
}

/// Tables the migrated schema knows about
pub const TABLES: [&str; 20] = [
    "people",
    "user_roles",
    "audits",
    "org_groups",
    "risk_assessments",
    "programs",
    "saved_searches",
    "contexts",
    "custom_attribute_definitions",
    "custom_attribute_values",
    "cycle_task_groups",
    "cycles",
    "notification_types",
    "notifications",
    "notifications_history",
    "roles",
    "snapshots",
    "task_groups",
    "threats",
    "vendors",
];

/// The in-memory relational store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Store {
    tables: IndexMap<String, BTreeMap<i64, Row>>,
    constraints: Vec<ForeignKeyConstraint>,
    revision_events: Vec<RevisionEvent>,
    applied_revisions: Vec<String>,
}

impl Store {
    /// A store with the full table set, all tables empty
    pub fn new() -> Self {
        let mut store = Self::default();
        for table in TABLES {
            store.tables.insert(table.to_string(), BTreeMap::new());
        }
        store
    }

    fn table(&self, name: &str) -> Result<&BTreeMap<i64, Row>> {
        self.tables
            .get(name)
            .ok_or_else(|| TrellisError::not_found(format!("no table named {name}")))
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut BTreeMap<i64, Row>> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| TrellisError::not_found(format!("no table named {name}")))
    }

    /// Insert a row, failing on duplicate primary key
    pub fn insert_row(&mut self, table: &str, id: i64, row: Row) -> Result<()> {
        let rows = self.table_mut(table)?;
        if rows.contains_key(&id) {
            return Err(TrellisError::invalid(format!(
                "duplicate primary key {id} in {table}"
            )));
        }
        rows.insert(id, row);
        Ok(())
    }

    /// Look up a row by primary key
    pub fn row(&self, table: &str, id: i64) -> Result<Option<&Row>> {
        Ok(self.table(table)?.get(&id))
    }

    /// Primary keys of a table, in key order
    pub fn row_ids(&self, table: &str) -> Result<Vec<i64>> {
        Ok(self.table(table)?.keys().copied().collect())
    }

    /// Number of rows in a table
    pub fn row_count(&self, table: &str) -> Result<usize> {
        Ok(self.table(table)?.len())
    }

    /// Whether a table holds a row with the given primary key
    pub fn contains(&self, table: &str, id: i64) -> Result<bool> {
        Ok(self.table(table)?.contains_key(&id))
    }

    /// Set one column value on an existing row
    pub fn set_value(
        &mut self,
        table: &str,
        id: i64,
        column: &str,
        value: Option<i64>,
    ) -> Result<()> {
        let rows = self.table_mut(table)?;
        let row = rows.get_mut(&id).ok_or_else(|| {
            TrellisError::not_found(format!("no row {id} in {table}"))
        })?;
        row.insert(column.to_string(), value);
        Ok(())
    }

    /// Read one column value from an existing row
    pub fn value(&self, table: &str, id: i64, column: &str) -> Result<Option<i64>> {
        let rows = self.table(table)?;
        let row = rows.get(&id).ok_or_else(|| {
            TrellisError::not_found(format!("no row {id} in {table}"))
        })?;
        Ok(row.get(column).copied().flatten())
    }

    /// Declare a foreign-key constraint, validating every existing row
    ///
    /// A non-null value in the constrained column that matches no primary
    /// key in the referenced table fails the whole declaration.
    pub fn add_constraint(&mut self, constraint: ForeignKeyConstraint) -> Result<()> {
        let referenced = self.table(&constraint.referenced_table)?;
        for (id, row) in self.table(&constraint.table)? {
            if let Some(Some(value)) = row.get(&constraint.column) {
                if !referenced.contains_key(value) {
                    return Err(TrellisError::constraint_violation(
                        &constraint.name,
                        format!(
                            "{}.{} = {value} on row {id} references no {} row",
                            constraint.table, constraint.column, constraint.referenced_table
                        ),
                    ));
                }
            }
        }
        tracing::debug!(constraint = %constraint.name, table = %constraint.table, "constraint added");
        self.constraints.push(constraint);
        Ok(())
    }

    /// Declared constraints, in declaration order
    pub fn constraints(&self) -> &[ForeignKeyConstraint] {
        &self.constraints
    }

    /// Delete a row, honoring ON DELETE policy of constraints pointing here
    ///
    /// NO ACTION blocks the delete while dependents exist; CASCADE removes
    /// dependents first, recursively.
    pub fn delete_row(&mut self, table: &str, id: i64) -> Result<()> {
        if !self.contains(table, id)? {
            return Err(TrellisError::not_found(format!("no row {id} in {table}")));
        }
        let inbound: Vec<ForeignKeyConstraint> = self
            .constraints
            .iter()
            .filter(|c| c.referenced_table == table)
            .cloned()
            .collect();
        for constraint in inbound {
            let dependents: Vec<i64> = self
                .table(&constraint.table)?
                .iter()
                .filter(|(_, row)| row.get(&constraint.column) == Some(&Some(id)))
                .map(|(dep_id, _)| *dep_id)
                .collect();
            if dependents.is_empty() {
                continue;
            }
            match constraint.on_delete {
                OnDelete::NoAction => {
                    return Err(TrellisError::constraint_violation(
                        &constraint.name,
                        format!(
                            "{} rows in {} still reference {table} row {id}",
                            dependents.len(),
                            constraint.table
                        ),
                    ));
                }
                OnDelete::Cascade => {
                    for dep_id in dependents {
                        self.delete_row(&constraint.table, dep_id)?;
                    }
                }
            }
        }
        self.table_mut(table)?.remove(&id);
        Ok(())
    }

    /// Remove a row without constraint checks, for migration cleanup passes
    pub(crate) fn remove_row_unchecked(&mut self, table: &str, id: i64) -> Result<bool> {
        Ok(self.table_mut(table)?.remove(&id).is_some())
    }

    /// Append a `deleted` event to the revision log
    pub fn record_deletion(&mut self, resource_type: &str, resource_id: i64) {
        self.revision_events.push(RevisionEvent {
            resource_type: resource_type.to_string(),
            resource_id,
            action: "deleted".to_string(),
        });
    }

    /// The revision event log, in append order
    pub fn revision_events(&self) -> &[RevisionEvent] {
        &self.revision_events
    }

    /// Whether a migration revision has been applied
    pub fn is_applied(&self, revision: &str) -> bool {
        self.applied_revisions.iter().any(|r| r == revision)
    }

    /// Mark a migration revision as applied
    pub fn mark_applied(&mut self, revision: &str) {
        if !self.is_applied(revision) {
            self.applied_revisions.push(revision.to_string());
        }
    }

    /// Applied revisions, in application order
    pub fn applied_revisions(&self) -> &[String] {
        &self.applied_revisions
    }
}

/// Build a row from (column, value) pairs
pub fn row(values: &[(&str, Option<i64>)]) -> Row {
    values
        .iter()
        .map(|(column, value)| ((*column).to_string(), *value))
        .collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use trellis_core::TrellisError;

    use super::*;

    #[test]
    fn test_insert_rejects_duplicate_key() {
        let mut store = Store::new();
        store.insert_row("people", 1, row(&[])).unwrap();
        assert_matches!(
            store.insert_row("people", 1, row(&[])),
            Err(TrellisError::Invalid { .. })
        );
    }

    #[test]
    fn test_add_constraint_validates_existing_rows() {
        let mut store = Store::new();
        store.insert_row("people", 1, row(&[])).unwrap();
        store
            .insert_row("user_roles", 10, row(&[("person_id", Some(99))]))
            .unwrap();
        let err = store
            .add_constraint(ForeignKeyConstraint::no_action(
                "fk_user_roles_person_id",
                "user_roles",
                "person_id",
                "people",
            ))
            .unwrap_err();
        assert_matches!(
            err,
            TrellisError::ConstraintViolation { ref constraint, .. }
                if constraint == "fk_user_roles_person_id"
        );
    }

    #[test]
    fn test_null_values_pass_constraint_validation() {
        let mut store = Store::new();
        store
            .insert_row("audits", 1, row(&[("audit_firm_id", None)]))
            .unwrap();
        store
            .add_constraint(ForeignKeyConstraint::no_action(
                "fk_audit_firm_id",
                "audits",
                "audit_firm_id",
                "org_groups",
            ))
            .unwrap();
    }

    #[test]
    fn test_no_action_blocks_delete_of_referenced_row() {
        let mut store = Store::new();
        store.insert_row("people", 1, row(&[])).unwrap();
        store
            .insert_row("user_roles", 10, row(&[("person_id", Some(1))]))
            .unwrap();
        store
            .add_constraint(ForeignKeyConstraint::no_action(
                "fk_user_roles_person_id",
                "user_roles",
                "person_id",
                "people",
            ))
            .unwrap();
        assert_matches!(
            store.delete_row("people", 1),
            Err(TrellisError::ConstraintViolation { .. })
        );
        assert!(store.contains("people", 1).unwrap());
    }

    #[test]
    fn test_cascade_deletes_dependents() {
        let mut store = Store::new();
        store.insert_row("people", 1, row(&[])).unwrap();
        store
            .insert_row("saved_searches", 10, row(&[("person_id", Some(1))]))
            .unwrap();
        store
            .add_constraint(ForeignKeyConstraint::cascade(
                "fk_person_id",
                "saved_searches",
                "person_id",
                "people",
            ))
            .unwrap();
        store.delete_row("people", 1).unwrap();
        assert!(!store.contains("saved_searches", 10).unwrap());
    }
}
