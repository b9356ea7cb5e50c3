//! Role registry and permission evaluation for Trellis
//!
//! This crate decides the question "given an actor's role and authorization
//! context and a target object's kind and ancestry, is an action
//! permitted?". Global roles grant instance-independent baselines; access
//! control roles grant instance-scoped overrides that propagate strictly
//! downward through the workflow hierarchy. Grants combine by logical OR.

/// Access control roles and ACL entries
pub mod acr;
/// Permission evaluation
pub mod evaluator;
/// Static grant tables
pub mod grants;
/// Role registry and effective-role resolution
pub mod registry;

pub use acr::{AccessControlRole, AclEntry, RoleAssignment};
pub use evaluator::PermissionEvaluator;
pub use grants::{acr_allows, baseline_allows};
pub use registry::RoleRegistry;
