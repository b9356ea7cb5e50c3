//! Action taxonomy
//!
//! A closed enum of every operation the permission layer gates. Dispatch on
//! actions is an exhaustive `match`, so adding a variant forces every
//! handler and grant table to account for it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An operation an actor may attempt against a domain object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Create a new object of the target kind
    Create,
    /// Read an existing object
    Read,
    /// Update fields of an existing object
    Update,
    /// Delete an existing object
    Delete,
    /// Read the revision history of an object
    ReadRevisions,
    /// Clone a workflow or task group together with its children
    Clone,
    /// Activate a workflow, spawning its first cycle
    Activate,
    /// Assign a workflow access control role to a person
    AssignWfRole,
    /// Assign a person to the object
    Assign,
    /// Map an unrelated control to the object
    MapControl,
    /// Map a control the actor administers to the object
    MapCreatedControl,
    /// Read a control mapped to the object
    ReadMappedControl,
    /// Remove a control mapping from the object
    UpmapControl,
    /// Attach a comment to the object
    AddComment,
    /// Read comments attached to the object
    ReadComment,
    /// Delete a comment attached to the object
    DeleteComment,
    /// Move a cycle task from Assigned into In Progress
    Start,
    /// Move a cycle task from In Progress into Finished
    End,
    /// Move a finished cycle task into Verified
    Verify,
    /// Move a finished cycle task into Declined
    Decline,
    /// Deprecate a cycle task
    Deprecate,
    /// Restore a declined or deprecated cycle task to Assigned
    Restore,
    /// Update a batch of cycle tasks in one call
    BulkUpdate,
}

impl Action {
    /// Every action, in declaration order
    pub const ALL: [Action; 23] = [
        Action::Create,
        Action::Read,
        Action::Update,
        Action::Delete,
        Action::ReadRevisions,
        Action::Clone,
        Action::Activate,
        Action::AssignWfRole,
        Action::Assign,
        Action::MapControl,
        Action::MapCreatedControl,
        Action::ReadMappedControl,
        Action::UpmapControl,
        Action::AddComment,
        Action::ReadComment,
        Action::DeleteComment,
        Action::Start,
        Action::End,
        Action::Verify,
        Action::Decline,
        Action::Deprecate,
        Action::Restore,
        Action::BulkUpdate,
    ];

    /// Snake-case action name used in logs and failure messages
    pub fn name(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::ReadRevisions => "read_revisions",
            Action::Clone => "clone",
            Action::Activate => "activate",
            Action::AssignWfRole => "assign_wf_role",
            Action::Assign => "assign",
            Action::MapControl => "map_control",
            Action::MapCreatedControl => "map_created_control",
            Action::ReadMappedControl => "read_mapped_control",
            Action::UpmapControl => "upmap_control",
            Action::AddComment => "add_comment",
            Action::ReadComment => "read_comment",
            Action::DeleteComment => "delete_comment",
            Action::Start => "start",
            Action::End => "end",
            Action::Verify => "verify",
            Action::Decline => "decline",
            Action::Deprecate => "deprecate",
            Action::Restore => "restore",
            Action::BulkUpdate => "bulk_update",
        }
    }

    /// Whether this action drives the cycle-task state machine
    pub fn is_state_transition(&self) -> bool {
        matches!(
            self,
            Action::Start
                | Action::End
                | Action::Verify
                | Action::Decline
                | Action::Deprecate
                | Action::Restore
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_exhaustive() {
        // ALL must cover each variant exactly once.
        let mut seen = std::collections::HashSet::new();
        for action in Action::ALL {
            assert!(seen.insert(action), "duplicate in Action::ALL: {action}");
        }
        assert_eq!(seen.len(), Action::ALL.len());
    }

    #[test]
    fn test_state_transitions() {
        assert!(Action::Start.is_state_transition());
        assert!(Action::Restore.is_state_transition());
        assert!(!Action::Update.is_state_transition());
        assert!(!Action::AssignWfRole.is_state_transition());
    }

    #[test]
    fn test_serde_names_match() {
        let json = serde_json::to_string(&Action::AssignWfRole).unwrap();
        assert_eq!(json, "\"assign_wf_role\"");
    }
}
