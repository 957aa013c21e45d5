use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::state::{NodeKind, StateTransition, TaskState, TransitionError};

use super::event::TaskEvent;

/// Unique identifier for a runtime task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Asynchronous unit of work run by a leaf task.
///
/// The `Ok` value is carried on the leaf's `COMPLETED` event; the error is
/// rendered into the leaf's `FAILED` event.
#[async_trait]
pub trait TaskAction: Send + Sync {
    async fn run(&self) -> anyhow::Result<Value>;
}

struct FnAction<F>(F);

#[async_trait]
impl<F, Fut> TaskAction for FnAction<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Value>> + Send,
{
    async fn run(&self) -> anyhow::Result<Value> {
        (self.0)().await
    }
}

/// Shared handle to a leaf action. Cloning shares the action, so one
/// [`TaskSpec`] can be built and run many times.
#[derive(Clone)]
pub struct LeafAction(Arc<dyn TaskAction>);

impl LeafAction {
    pub fn new<A>(action: A) -> Self
    where
        A: TaskAction + 'static,
    {
        Self(Arc::new(action))
    }

    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        Self(Arc::new(FnAction(f)))
    }

    pub async fn invoke(&self) -> anyhow::Result<Value> {
        self.0.run().await
    }
}

impl fmt::Debug for LeafAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LeafAction(..)")
    }
}

/// What a [`TaskSpec`] does: run one action, or run an ordered list of subtasks.
#[derive(Debug, Clone)]
pub enum TaskWork {
    Leaf(LeafAction),
    Group(Vec<TaskSpec>),
}

/// Caller-authored, immutable description of a task tree.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    pub title: String,
    pub work: TaskWork,
    /// Only meaningful for groups: start every child without waiting on siblings.
    pub concurrent: bool,
}

impl TaskSpec {
    pub fn new(title: impl Into<String>, work: TaskWork) -> Self {
        Self {
            title: title.into(),
            work,
            concurrent: false,
        }
    }

    /// Leaf task backed by an async closure.
    pub fn leaf<F, Fut>(title: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        Self::new(title, TaskWork::Leaf(LeafAction::from_fn(f)))
    }

    /// Leaf task backed by a [`TaskAction`] implementation.
    pub fn action<A>(title: impl Into<String>, action: A) -> Self
    where
        A: TaskAction + 'static,
    {
        Self::new(title, TaskWork::Leaf(LeafAction::new(action)))
    }

    /// Group whose children run one at a time, in order.
    pub fn group(title: impl Into<String>, children: Vec<TaskSpec>) -> Self {
        Self::new(title, TaskWork::Group(children))
    }

    /// Group whose children all start at once.
    pub fn concurrent_group(title: impl Into<String>, children: Vec<TaskSpec>) -> Self {
        Self::group(title, children).with_concurrency(true)
    }

    pub fn with_concurrency(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    pub fn is_group(&self) -> bool {
        matches!(self.work, TaskWork::Group(_))
    }
}

/// Work carried by a [`RuntimeTask`]. Fixed at build time.
#[derive(Debug)]
pub enum RuntimeWork {
    Leaf(LeafAction),
    Group {
        children: Vec<RuntimeTask>,
        concurrent: bool,
    },
}

/// Mutable part of a runtime task; only the engine writes it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskStatus {
    pub state: TaskState,
    pub result: Option<Value>,
    pub error: Option<String>,
}

/// One node of a task tree during a run.
#[derive(Debug)]
pub struct RuntimeTask {
    pub id: TaskId,
    pub parent_id: Option<TaskId>,
    pub title: String,
    pub work: RuntimeWork,
    status: Mutex<TaskStatus>,
}

impl RuntimeTask {
    pub(crate) fn new(
        id: TaskId,
        parent_id: Option<TaskId>,
        title: String,
        work: RuntimeWork,
    ) -> Self {
        Self {
            id,
            parent_id,
            title,
            work,
            status: Mutex::new(TaskStatus::default()),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self.work {
            RuntimeWork::Leaf(_) => NodeKind::Leaf,
            RuntimeWork::Group { .. } => NodeKind::Group,
        }
    }

    pub fn is_group(&self) -> bool {
        self.kind() == NodeKind::Group
    }

    pub fn is_concurrent(&self) -> bool {
        matches!(self.work, RuntimeWork::Group { concurrent: true, .. })
    }

    /// Children of a group; empty for leaves.
    pub fn children(&self) -> &[RuntimeTask] {
        match &self.work {
            RuntimeWork::Group { children, .. } => children,
            RuntimeWork::Leaf(_) => &[],
        }
    }

    pub fn child_count(&self) -> usize {
        self.children().len()
    }

    pub fn status(&self) -> TaskStatus {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn state(&self) -> TaskState {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .state
    }

    /// Event describing the current status, without changing it.
    pub fn snapshot_event(&self) -> TaskEvent {
        let status = self.status();
        TaskEvent::new(self.id, self.parent_id, status.state)
            .with_result(status.result)
            .with_error(status.error)
    }

    /// Move to `state`, recording the leaf result or failure message.
    ///
    /// `result` and `error` replace the previous values, keeping them mutually
    /// exclusive.
    pub(crate) fn transition(
        &self,
        state: TaskState,
        result: Option<Value>,
        error: Option<String>,
    ) -> Result<TaskEvent, TransitionError> {
        let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
        StateTransition::validate(self.kind(), status.state, state)?;

        status.state = state;
        status.result = result.clone();
        status.error = error.clone();

        Ok(TaskEvent::new(self.id, self.parent_id, state)
            .with_result(result)
            .with_error(error))
    }

    /// Pre-order walk over this node and all descendants.
    pub fn walk(&self) -> Vec<&RuntimeTask> {
        let mut out = vec![self];
        for child in self.children() {
            out.extend(child.walk());
        }
        out
    }
}
