//! Test fixtures and the capability matrix runner
//!
//! Provides [`WorkflowScopeBuilder`] for assembling fully wired workflow
//! scopes, the declarative [`capability_matrix`], and [`MatrixRunner`]
//! which executes matrix rows against fresh scopes. Lives in its own crate
//! so integration tests across the workspace share one set of fixtures.

/// The declarative capability matrix
pub mod matrix;
/// Executes matrix rows against live scopes
pub mod runner;
/// Workflow scope fixtures
pub mod scope;

pub use matrix::{capability_matrix, Expectation, MatrixEntry, Note};
pub use runner::{MatrixFailure, MatrixRunner};
pub use scope::{WorkflowScope, WorkflowScopeBuilder};
