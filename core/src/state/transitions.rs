//! Task state transition rules

use super::types::TaskState;
use thiserror::Error;

/// Rejected state change
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: TaskState, to: TaskState },
    #[error("Cannot transition from terminal state {state}")]
    FromTerminalState { state: TaskState },
}

/// Which kind of node is transitioning; partial failure only exists for groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Leaf,
    Group,
}

pub struct StateTransition;

impl StateTransition {
    /// Check whether `from -> to` is legal for a node of `kind`.
    pub fn validate(kind: NodeKind, from: TaskState, to: TaskState) -> Result<(), TransitionError> {
        if from.is_terminal() {
            return Err(TransitionError::FromTerminalState { state: from });
        }

        let is_valid = match (from, to) {
            (TaskState::Pending, TaskState::InProgress) => true,

            (TaskState::InProgress, TaskState::Completed)
            | (TaskState::InProgress, TaskState::Failed) => true,

            // A group may report partial failure repeatedly while siblings still run,
            // and escalates to Failed once the last child fails.
            (TaskState::InProgress, TaskState::FailedPartially)
            | (TaskState::FailedPartially, TaskState::FailedPartially)
            | (TaskState::FailedPartially, TaskState::Failed) => kind == NodeKind::Group,

            _ => false,
        };

        if is_valid {
            Ok(())
        } else {
            Err(TransitionError::InvalidTransition { from, to })
        }
    }

    pub fn is_terminal(state: TaskState) -> bool {
        state.is_terminal()
    }
}
