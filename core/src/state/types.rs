//! Task state definitions

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a single task node.
///
/// Variants are declared in increasing severity, so `Ord` can be used to pick
/// the "worst" state when summarising.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    /// Built, not started yet
    #[default]
    Pending,
    /// Leaf action running, or group children running
    InProgress,
    /// Finished successfully
    Completed,
    /// Group only: some, but not all, children failed
    FailedPartially,
    /// Leaf action failed, or every child of a group failed
    Failed,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::FailedPartially => "FAILED_PARTIALLY",
            Self::Failed => "FAILED",
        }
    }

    /// `Completed` and `Failed` never transition again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
