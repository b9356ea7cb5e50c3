//! Unified error system for Trellis
//!
//! One error type covers the whole workspace. Permission denial is never an
//! error: the evaluator and the action boundary report denials as ordinary
//! decision values, and this enum is reserved for state-machine violations,
//! configuration defects, and migration failures.

use serde::{Deserialize, Serialize};

/// Unified error type for all Trellis operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum TrellisError {
    /// Invalid input
    #[error("Invalid: {message}")]
    Invalid {
        /// Error message describing the invalid input
        message: String,
    },

    /// Resource not found
    #[error("Not found: {message}")]
    NotFound {
        /// Error message describing what was not found
        message: String,
    },

    /// Configuration defect detected at setup time
    ///
    /// Fatal by contract: an unknown object kind in the propagation graph or
    /// a malformed capability-matrix row indicates a programming error, not a
    /// runtime condition to recover from.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message describing the defect
        message: String,
    },

    /// A state-machine action was invoked from an incompatible state
    ///
    /// Only ever produced after a permission check has passed; a denied
    /// action never reaches the state machine.
    #[error("Invalid state transition: {action} from {from}")]
    InvalidStateTransition {
        /// State the object was in when the action arrived
        from: String,
        /// Action that was attempted
        action: String,
    },

    /// Rows violate a foreign-key constraint being installed or enforced
    #[error("Constraint {constraint} violated: {message}")]
    ConstraintViolation {
        /// Name of the violated constraint
        constraint: String,
        /// Error message describing the violating rows
        message: String,
    },

    /// A one-shot migration was run against an already-migrated store
    #[error("Migration revision {revision} already applied")]
    AlreadyApplied {
        /// Revision identifier that was rejected
        revision: String,
    },

    /// Operation is not supported
    #[error("Unsupported: {message}")]
    Unsupported {
        /// Error message describing the unsupported operation
        message: String,
    },
}

impl TrellisError {
    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a constraint violation error
    pub fn constraint_violation(
        constraint: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ConstraintViolation {
            constraint: constraint.into(),
            message: message.into(),
        }
    }

    /// Create an unsupported operation error
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }
}

/// Standard Result type for Trellis operations
pub type Result<T> = std::result::Result<T, TrellisError>;
