use thiserror::Error;

use crate::executor::types::TaskId;
use crate::state::TransitionError;

/// Errors raised while executing a task tree
#[derive(Error, Debug, Clone)]
pub enum ExecutorError {
    /// A leaf action failed, or every child of a group failed.
    #[error("Task '{title}' failed: {message}")]
    TaskFailed {
        id: TaskId,
        title: String,
        message: String,
    },

    #[error("Illegal state change for task {id}: {source}")]
    InvalidTransition {
        id: TaskId,
        #[source]
        source: TransitionError,
    },

    #[error("Execution task aborted: {0}")]
    Join(String),
}

impl ExecutorError {
    /// Id of the task the error is attached to, if any.
    pub fn task_id(&self) -> Option<TaskId> {
        match self {
            Self::TaskFailed { id, .. } | Self::InvalidTransition { id, .. } => Some(*id),
            Self::Join(_) => None,
        }
    }

    /// True when the error is an ordinary task outcome rather than an engine fault.
    pub fn is_task_failure(&self) -> bool {
        matches!(self, Self::TaskFailed { .. })
    }
}
