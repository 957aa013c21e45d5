use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;

use crate::state::TaskState;

use super::task::{RuntimeTask, TaskId};

/// How a node's event sequence ended, when it did not end in failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Leaf succeeded, or every child of a group completed
    Completed,
    /// Group finished with a mix of completed and failed children
    PartiallyFailed,
}

/// Final tally of a run, taken from the node states once execution stopped.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Number of nodes (groups and leaves) in the tree
    pub total_tasks: usize,

    pub completed: usize,

    pub failed: usize,

    pub partially_failed: usize,

    /// Nodes that never started (a failing root stopped the run early)
    pub pending: usize,

    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: u64,

    /// Final state per node
    pub states: HashMap<TaskId, TaskState>,
}

impl RunSummary {
    pub fn from_forest(forest: &[RuntimeTask], elapsed: Duration) -> Self {
        let mut summary = Self {
            duration_ms: elapsed.as_millis() as u64,
            ..Self::default()
        };

        for node in forest.iter().flat_map(RuntimeTask::walk) {
            let state = node.state();
            summary.total_tasks += 1;
            match state {
                TaskState::Completed => summary.completed += 1,
                TaskState::Failed => summary.failed += 1,
                TaskState::FailedPartially => summary.partially_failed += 1,
                TaskState::Pending => summary.pending += 1,
                TaskState::InProgress => {}
            }
            summary.states.insert(node.id, state);
        }

        summary
    }

    /// Every node completed.
    pub fn all_completed(&self) -> bool {
        self.completed == self.total_tasks
    }
}
