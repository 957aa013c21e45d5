use std::collections::HashSet;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, Stream};
use futures::{FutureExt, StreamExt};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::ExecutorError;
use crate::state::TaskState;

use super::types::{LeafAction, Outcome, RuntimeTask, RuntimeWork, TaskEvent, TaskId};

/// How one node's event sequence ended: cleanly, or in failure.
pub type NodeResult = Result<Outcome, ExecutorError>;

/// Write side of the single ordered event channel shared by every node of a run.
#[derive(Clone)]
pub struct EventEmitter {
    tx: mpsc::UnboundedSender<TaskEvent>,
}

impl EventEmitter {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TaskEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Apply a transition to `task` and publish the resulting event.
    fn emit(
        &self,
        task: &RuntimeTask,
        state: TaskState,
        result: Option<Value>,
        error: Option<String>,
    ) -> Result<(), ExecutorError> {
        let event = task
            .transition(state, result, error)
            .map_err(|source| ExecutorError::InvalidTransition {
                id: task.id,
                source,
            })?;

        tracing::debug!(task_id = %task.id, title = %task.title, state = %state, "task transition");

        // Receiver gone means nobody is watching; execution carries on.
        let _ = self.tx.send(event);
        Ok(())
    }
}

/// Run `task` and all its descendants, publishing every transition to `events`.
///
/// Resolves `Ok` when the node's sequence ends cleanly (including a group that
/// settled at `FAILED_PARTIALLY`) and `Err` when the node ends `FAILED`.
pub fn execute<'a>(task: &'a RuntimeTask, events: &'a EventEmitter) -> BoxFuture<'a, NodeResult> {
    async move {
        match &task.work {
            RuntimeWork::Leaf(action) => execute_leaf(task, action, events).await,
            RuntimeWork::Group {
                children,
                concurrent,
            } => execute_group(task, children, *concurrent, events).await,
        }
    }
    .boxed()
}

/// Run `task` on its own tokio task and expose its events as a stream.
///
/// The stream yields every event in emission order; when the node fails, the
/// last item is the `Err`. Must be called from within a tokio runtime.
pub fn execute_stream(
    task: Arc<RuntimeTask>,
) -> impl Stream<Item = Result<TaskEvent, ExecutorError>> + Send + 'static {
    let (emitter, mut rx) = EventEmitter::channel();
    let handle = tokio::spawn(async move { execute(&task, &emitter).await });

    async_stream::stream! {
        while let Some(event) = rx.recv().await {
            yield Ok(event);
        }

        match handle.await {
            Ok(Ok(_)) => {}
            Ok(Err(err)) => yield Err(err),
            Err(join_err) => yield Err(ExecutorError::Join(join_err.to_string())),
        }
    }
}

async fn execute_leaf(
    task: &RuntimeTask,
    action: &LeafAction,
    events: &EventEmitter,
) -> NodeResult {
    events.emit(task, TaskState::InProgress, None, None)?;

    // Results are always observed after a yield, so concurrently started
    // siblings all report IN_PROGRESS before any of them can finish.
    tokio::task::yield_now().await;

    match action.invoke().await {
        Ok(value) => {
            events.emit(task, TaskState::Completed, Some(value), None)?;
            Ok(Outcome::Completed)
        }
        Err(err) => {
            let message = format!("{err:#}");
            tracing::warn!(task_id = %task.id, title = %task.title, error = %message, "task failed");
            events.emit(task, TaskState::Failed, None, Some(message.clone()))?;
            Err(ExecutorError::TaskFailed {
                id: task.id,
                title: task.title.clone(),
                message,
            })
        }
    }
}

async fn execute_group(
    task: &RuntimeTask,
    children: &[RuntimeTask],
    concurrent: bool,
    events: &EventEmitter,
) -> NodeResult {
    events.emit(task, TaskState::InProgress, None, None)?;

    if children.is_empty() {
        // Same yield as a leaf, so an empty group never finishes ahead of a
        // concurrent sibling's IN_PROGRESS.
        tokio::task::yield_now().await;
        events.emit(task, TaskState::Completed, None, None)?;
        return Ok(Outcome::Completed);
    }

    let mut tally = ChildTally::new(children.len());

    if concurrent {
        let mut running: FuturesUnordered<_> = children
            .iter()
            .map(|child| execute(child, events).map(move |result| (child.id, result)))
            .collect();

        while let Some((child_id, result)) = running.next().await {
            if let Some(done) = settle(task, &mut tally, child_id, result, events) {
                return done;
            }
        }
    } else {
        for child in children {
            let result = execute(child, events).await;
            if let Some(done) = settle(task, &mut tally, child.id, result, events) {
                return done;
            }
        }
    }

    // Every child finished with a mix of outcomes: the group keeps its last
    // FAILED_PARTIALLY state and its sequence ends without error.
    tracing::debug!(task_id = %task.id, title = %task.title, failed = tally.failed.len(), "group settled partially failed");
    Ok(Outcome::PartiallyFailed)
}

/// Fold one finished child into the group's tally, emitting the group's new
/// state if it changed. Returns `Some` once the group's own sequence is over.
fn settle(
    task: &RuntimeTask,
    tally: &mut ChildTally,
    child_id: TaskId,
    result: NodeResult,
    events: &EventEmitter,
) -> Option<NodeResult> {
    if let Err(err) = &result {
        if !err.is_task_failure() {
            return Some(result);
        }
    }

    let next = tally.record(child_id, result.is_err())?;
    let error = (next == TaskState::Failed)
        .then(|| format!("all {} subtasks failed", tally.total));

    if let Err(err) = events.emit(task, next, None, error.clone()) {
        return Some(Err(err));
    }

    match next {
        TaskState::Completed => Some(Ok(Outcome::Completed)),
        TaskState::Failed => Some(Err(ExecutorError::TaskFailed {
            id: task.id,
            title: task.title.clone(),
            message: error.unwrap_or_default(),
        })),
        _ => None,
    }
}

/// Per-group child counters.
#[derive(Debug)]
struct ChildTally {
    total: usize,
    finished: usize,
    /// Children that ended `FAILED`, each counted once
    failed: HashSet<TaskId>,
}

impl ChildTally {
    fn new(total: usize) -> Self {
        Self {
            total,
            finished: 0,
            failed: HashSet::new(),
        }
    }

    /// Record a finished child and return the state the group should move to, if any.
    ///
    /// A child that settled at `FAILED_PARTIALLY` reports `child_failed = false`.
    fn record(&mut self, child: TaskId, child_failed: bool) -> Option<TaskState> {
        self.finished += 1;
        let newly_failed = child_failed && self.failed.insert(child);

        if self.failed.len() == self.total {
            Some(TaskState::Failed)
        } else if newly_failed {
            Some(TaskState::FailedPartially)
        } else if self.finished == self.total && self.failed.is_empty() {
            Some(TaskState::Completed)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::builder::build;
    use crate::executor::types::TaskSpec;
    use serde_json::json;

    async fn collect(task: &RuntimeTask) -> (NodeResult, Vec<TaskEvent>) {
        let (emitter, mut rx) = EventEmitter::channel();
        let result = execute(task, &emitter).await;
        drop(emitter);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        (result, events)
    }

    #[test]
    fn test_tally_counts_failures_once() {
        let mut tally = ChildTally::new(3);
        let a = TaskId::new();
        let b = TaskId::new();

        assert_eq!(tally.record(a, true), Some(TaskState::FailedPartially));
        assert_eq!(tally.record(b, false), None);
        // Same child reported again must not push the group to FAILED.
        assert_eq!(tally.record(a, true), None);
        assert_eq!(tally.failed.len(), 1);
    }

    #[test]
    fn test_tally_all_completed() {
        let mut tally = ChildTally::new(2);
        assert_eq!(tally.record(TaskId::new(), false), None);
        assert_eq!(tally.record(TaskId::new(), false), Some(TaskState::Completed));
    }

    #[test]
    fn test_tally_all_failed() {
        let mut tally = ChildTally::new(2);
        assert_eq!(
            tally.record(TaskId::new(), true),
            Some(TaskState::FailedPartially)
        );
        assert_eq!(tally.record(TaskId::new(), true), Some(TaskState::Failed));
    }

    #[tokio::test]
    async fn test_leaf_success_events() {
        let task = build(&TaskSpec::leaf("answer", || async { Ok::<_, anyhow::Error>(json!(42)) }), None);
        let (result, events) = collect(&task).await;

        assert_eq!(result.unwrap(), Outcome::Completed);
        let states: Vec<TaskState> = events.iter().map(|e| e.state).collect();
        assert_eq!(states, vec![TaskState::InProgress, TaskState::Completed]);
        assert_eq!(events[1].result, Some(json!(42)));
        assert!(events[1].error.is_none());
        assert_eq!(task.state(), TaskState::Completed);
    }

    #[tokio::test]
    async fn test_leaf_failure_events() {
        let task = build(
            &TaskSpec::leaf("broken", || async { Err::<Value, _>(anyhow::anyhow!("disk full")) }),
            None,
        );
        let (result, events) = collect(&task).await;

        match result {
            Err(ExecutorError::TaskFailed { id, message, .. }) => {
                assert_eq!(id, task.id);
                assert_eq!(message, "disk full");
            }
            other => panic!("expected TaskFailed, got {other:?}"),
        }
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].state, TaskState::Failed);
        assert_eq!(events[1].error.as_deref(), Some("disk full"));
        assert!(events[1].result.is_none());
    }

    #[tokio::test]
    async fn test_empty_group_completes_immediately() {
        let task = build(&TaskSpec::group("nothing", Vec::new()), None);
        let (result, events) = collect(&task).await;

        assert_eq!(result.unwrap(), Outcome::Completed);
        let states: Vec<TaskState> = events.iter().map(|e| e.state).collect();
        assert_eq!(states, vec![TaskState::InProgress, TaskState::Completed]);
    }

    #[tokio::test]
    async fn test_execute_stream_ends_with_error() {
        let task = Arc::new(build(
            &TaskSpec::group(
                "pair",
                vec![
                    TaskSpec::leaf("a", || async { Err::<Value, _>(anyhow::anyhow!("a failed")) }),
                    TaskSpec::leaf("b", || async { Err::<Value, _>(anyhow::anyhow!("b failed")) }),
                ],
            ),
            None,
        ));

        let items: Vec<_> = execute_stream(task.clone()).collect().await;
        let (last, events) = items.split_last().unwrap();

        assert!(matches!(last, Err(ExecutorError::TaskFailed { id, .. }) if *id == task.id));
        let group_states: Vec<TaskState> = events
            .iter()
            .map(|item| item.as_ref().unwrap())
            .filter(|event| event.id == task.id)
            .map(|event| event.state)
            .collect();
        assert_eq!(
            group_states,
            vec![
                TaskState::InProgress,
                TaskState::FailedPartially,
                TaskState::Failed
            ]
        );
    }
}
