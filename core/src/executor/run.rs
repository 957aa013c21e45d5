use std::time::Instant;

use crate::error::ExecutorError;

use super::builder::{build_forest, outline};
use super::engine::{execute, EventEmitter};
use super::traits::EventSink;
use super::types::{ExecutionOpts, RunSummary, RuntimeTask, TaskSpec};

/// Build `tasks`, run them, and stream every state change into `sink`.
///
/// Top-level tasks run one after another. Returns `Err` when a top-level task
/// ends `FAILED`; with `exit_on_error` the run stops there and the remaining
/// roots stay `PENDING`.
#[tracing::instrument(name = "executor.run", skip_all, fields(roots = tasks.len(), sink = sink.name()))]
pub async fn run(
    tasks: &[TaskSpec],
    opts: &ExecutionOpts,
    sink: &mut dyn EventSink,
) -> Result<RunSummary, ExecutorError> {
    let start = Instant::now();
    let forest = build_forest(tasks);
    let outline = outline(&forest);

    tracing::info!(
        total_tasks = outline.len(),
        exit_on_error = opts.exit_on_error,
        "run started"
    );

    sink.on_start(&outline);
    for node in forest.iter().flat_map(RuntimeTask::walk) {
        sink.on_event(&node.snapshot_event());
    }

    let (emitter, mut rx) = EventEmitter::channel();
    let drive = drive_roots(&forest, emitter, opts.exit_on_error);
    let pump = async {
        while let Some(event) = rx.recv().await {
            sink.on_event(&event);
        }
    };
    let (failure, ()) = tokio::join!(drive, pump);

    let summary = RunSummary::from_forest(&forest, start.elapsed());

    match failure {
        Some(err) => {
            tracing::warn!(
                error = %err,
                task_id = ?err.task_id(),
                duration_ms = summary.duration_ms,
                "run failed"
            );
            sink.on_error(&err, &summary);
            Err(err)
        }
        None => {
            tracing::info!(
                completed = summary.completed,
                partially_failed = summary.partially_failed,
                duration_ms = summary.duration_ms,
                "run finished"
            );
            sink.on_complete(&summary);
            Ok(summary)
        }
    }
}

/// Execute roots in order. Takes the emitter by value so the channel closes
/// as soon as the last root is done.
async fn drive_roots(
    forest: &[RuntimeTask],
    events: EventEmitter,
    exit_on_error: bool,
) -> Option<ExecutorError> {
    let mut failure = None;

    for root in forest {
        if let Err(err) = execute(root, &events).await {
            let stop = exit_on_error || !err.is_task_failure();
            failure.get_or_insert(err);
            if stop {
                break;
            }
        }
    }

    failure
}
