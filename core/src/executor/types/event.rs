use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::state::TaskState;

use super::task::TaskId;

/// One state transition of one task node.
#[derive(Debug, Clone, Serialize)]
pub struct TaskEvent {
    pub id: TaskId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<TaskId>,
    pub state: TaskState,
    /// Set only on a leaf's `COMPLETED` event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Set only on `FAILED` events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl TaskEvent {
    pub fn new(id: TaskId, parent_id: Option<TaskId>, state: TaskState) -> Self {
        Self {
            id,
            parent_id,
            state,
            result: None,
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_result(mut self, result: Option<Value>) -> Self {
        self.result = result;
        self
    }

    pub fn with_error(mut self, error: Option<String>) -> Self {
        self.error = error;
        self
    }
}

/// Static description of one node, announced to sinks before execution starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskOutline {
    pub id: TaskId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<TaskId>,
    pub title: String,
    /// 0 for roots
    pub depth: usize,
    pub is_group: bool,
    pub concurrent: bool,
}
