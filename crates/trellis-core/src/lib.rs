//! Core types for the Trellis permission system
//!
//! This crate defines the vocabulary shared by the whole workspace: stable
//! identifiers, the global role and action taxonomies, the object kind
//! hierarchy with its fixed propagation graph, the object arena used for
//! ancestry resolution, and the unified error type.

/// Actions the permission layer gates
pub mod action;
/// Object arena and ancestry resolution
pub mod arena;
/// Unified error type and Result alias
pub mod errors;
/// Person and object identifiers
pub mod identifiers;
/// Object kinds and the propagation graph
pub mod object;
/// Global roles
pub mod role;

pub use action::Action;
pub use arena::{ObjectArena, ObjectRecord};
pub use errors::{Result, TrellisError};
pub use identifiers::{ObjectId, PersonId};
pub use object::ObjectKind;
pub use role::Role;
