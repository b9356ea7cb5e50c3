//! Cycle task state machine
//!
//! Transition legality is independent of permissions: the action boundary
//! checks permission first and only then consults this table, so a denied
//! actor never produces a state error.

use serde::{Deserialize, Serialize};
use std::fmt;
use trellis_core::{Action, Result, TrellisError};

/// Lifecycle state of a cycle task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CycleTaskState {
    /// Waiting for its assignee to begin work
    Assigned,
    /// Work underway
    InProgress,
    /// Work submitted, awaiting verification
    Finished,
    /// Verification rejected the finished work
    Declined,
    /// Taken out of the cycle without completion
    Deprecated,
    /// Verified and closed
    Verified,
}

impl CycleTaskState {
    /// State name as shown in status fields and error messages
    pub fn name(&self) -> &'static str {
        match self {
            CycleTaskState::Assigned => "Assigned",
            CycleTaskState::InProgress => "In Progress",
            CycleTaskState::Finished => "Finished",
            CycleTaskState::Declined => "Declined",
            CycleTaskState::Deprecated => "Deprecated",
            CycleTaskState::Verified => "Verified",
        }
    }

    /// Apply a transition-triggering action, yielding the next state
    ///
    /// Returns `InvalidStateTransition` when the action is not legal from
    /// the current state, and `Invalid` when the action does not drive the
    /// state machine at all.
    pub fn transition(self, action: Action) -> Result<CycleTaskState> {
        use CycleTaskState::*;

        if !action.is_state_transition() {
            return Err(TrellisError::invalid(format!(
                "{action} is not a state transition"
            )));
        }
        match (self, action) {
            (Assigned | Declined, Action::Start) => Ok(InProgress),
            (InProgress, Action::End) => Ok(Finished),
            (Finished, Action::Verify) => Ok(Verified),
            (Finished, Action::Decline) => Ok(Declined),
            (Assigned | InProgress | Finished | Declined, Action::Deprecate) => Ok(Deprecated),
            (Declined | Deprecated, Action::Restore) => Ok(Assigned),
            (from, action) => Err(TrellisError::InvalidStateTransition {
                from: from.name().to_string(),
                action: action.name().to_string(),
            }),
        }
    }
}

impl Default for CycleTaskState {
    fn default() -> Self {
        CycleTaskState::Assigned
    }
}

impl fmt::Display for CycleTaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_happy_path() {
        let state = CycleTaskState::Assigned
            .transition(Action::Start)
            .and_then(|s| s.transition(Action::End))
            .and_then(|s| s.transition(Action::Verify))
            .unwrap();
        assert_eq!(state, CycleTaskState::Verified);
    }

    #[test]
    fn test_decline_and_restore_path() {
        let declined = CycleTaskState::Finished.transition(Action::Decline).unwrap();
        assert_eq!(declined, CycleTaskState::Declined);

        // A declined task can be restored to Assigned or started directly.
        assert_eq!(
            declined.transition(Action::Restore).unwrap(),
            CycleTaskState::Assigned
        );
        assert_eq!(
            declined.transition(Action::Start).unwrap(),
            CycleTaskState::InProgress
        );
    }

    #[test]
    fn test_verified_is_terminal() {
        for action in [
            Action::Start,
            Action::End,
            Action::Decline,
            Action::Deprecate,
            Action::Restore,
        ] {
            assert_matches!(
                CycleTaskState::Verified.transition(action),
                Err(TrellisError::InvalidStateTransition { .. })
            );
        }
    }

    #[test]
    fn test_illegal_transitions() {
        assert_matches!(
            CycleTaskState::Assigned.transition(Action::End),
            Err(TrellisError::InvalidStateTransition { .. })
        );
        assert_matches!(
            CycleTaskState::InProgress.transition(Action::Verify),
            Err(TrellisError::InvalidStateTransition { .. })
        );
        assert_matches!(
            CycleTaskState::Deprecated.transition(Action::Deprecate),
            Err(TrellisError::InvalidStateTransition { .. })
        );
    }

    #[test]
    fn test_non_transition_action_is_invalid() {
        assert_matches!(
            CycleTaskState::Assigned.transition(Action::Update),
            Err(TrellisError::Invalid { .. })
        );
    }
}
