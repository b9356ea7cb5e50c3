//! One-shot referential-integrity repair over an in-memory relational store
//!
//! Models the storage boundary as named tables of integer-keyed rows and
//! runs a single forward-only migration: orphan cleanup first (nulled audit
//! firm references, deleted orphan user roles and risk assessments, each
//! delete logged as a revision event), then declaration of named
//! foreign-key constraints. Declaring a constraint validates every existing
//! row, which is what makes the cleanup-before-constraints ordering
//! observable. Downgrade is refused unconditionally.

/// The in-memory relational store
pub mod store;
/// The repair migration itself
pub mod upgrade;

pub use store::{row, ForeignKeyConstraint, OnDelete, RevisionEvent, Row, Store};
pub use upgrade::{
    constraints, delete_orphan_risk_assessments, delete_orphan_user_roles, downgrade,
    null_orphan_audit_firms, upgrade, MigrationReport, DOWN_REVISION, REVISION,
};
