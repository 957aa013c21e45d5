mod common;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use futures::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::json;
use taskline_core::api::{
    build, execute_stream, run, CollectingSink, ExecutionOpts, ExecutorError, RunEnd, TaskSpec,
    TaskState,
};

use common::{
    events_of, failing_leaf, id_of, ok_leaf, position, slow_failing_leaf, slow_leaf, states_of,
};

async fn run_collect(tasks: &[TaskSpec]) -> (Result<taskline_core::api::RunSummary, ExecutorError>, CollectingSink) {
    let mut sink = CollectingSink::new();
    let result = run(tasks, &ExecutionOpts::default(), &mut sink).await;
    (result, sink)
}

#[tokio::test]
async fn single_leaf_yields_in_progress_then_completed() {
    let (result, sink) = run_collect(&[ok_leaf("answer", json!(42))]).await;

    let summary = result.unwrap();
    assert_eq!(summary.total_tasks, 1);
    assert_eq!(summary.completed, 1);

    let id = id_of(&sink, "answer");
    assert_eq!(
        states_of(&sink, id),
        vec![TaskState::Pending, TaskState::InProgress, TaskState::Completed]
    );
    let last = sink.events.last().unwrap();
    assert_eq!(last.result, Some(json!(42)));
    assert!(last.error.is_none());
    assert!(matches!(sink.end, Some(RunEnd::Completed(_))));
}

#[tokio::test]
async fn sequential_children_start_after_previous_finished() {
    let tasks = [TaskSpec::group(
        "pipeline",
        vec![slow_leaf("first", 30), slow_leaf("second", 0)],
    )];
    let (result, sink) = run_collect(&tasks).await;
    result.unwrap();

    let first = id_of(&sink, "first");
    let second = id_of(&sink, "second");
    assert!(
        position(&sink, first, TaskState::Completed)
            < position(&sink, second, TaskState::InProgress)
    );
}

#[tokio::test]
async fn sequential_group_keeps_going_after_a_failure() {
    let tasks = [TaskSpec::group(
        "pipeline",
        vec![failing_leaf("flaky", "nope"), ok_leaf("steady", json!("ok"))],
    )];
    let (result, sink) = run_collect(&tasks).await;

    // A partially failed root is not a run failure.
    let summary = result.unwrap();
    assert_eq!(summary.partially_failed, 1);
    assert_eq!(summary.failed, 1);

    let steady = id_of(&sink, "steady");
    assert_eq!(
        states_of(&sink, steady),
        vec![TaskState::Pending, TaskState::InProgress, TaskState::Completed]
    );
    let group = id_of(&sink, "pipeline");
    assert_eq!(
        states_of(&sink, group),
        vec![
            TaskState::Pending,
            TaskState::InProgress,
            TaskState::FailedPartially
        ]
    );
}

#[tokio::test]
async fn concurrent_children_all_start_before_any_finishes() {
    let tasks = [TaskSpec::concurrent_group(
        "fan-out",
        vec![slow_leaf("slow", 40), slow_leaf("fast", 5)],
    )];
    let (result, sink) = run_collect(&tasks).await;
    result.unwrap();

    let slow = id_of(&sink, "slow");
    let fast = id_of(&sink, "fast");
    let last_start = position(&sink, slow, TaskState::InProgress)
        .max(position(&sink, fast, TaskState::InProgress));
    let first_end = position(&sink, slow, TaskState::Completed)
        .min(position(&sink, fast, TaskState::Completed));
    assert!(last_start < first_end);

    // Finish order follows the actions, not the list.
    assert!(
        position(&sink, fast, TaskState::Completed) < position(&sink, slow, TaskState::Completed)
    );
}

#[tokio::test]
async fn concurrent_children_start_together_even_when_instant() {
    let tasks = [TaskSpec::concurrent_group(
        "instant",
        vec![ok_leaf("a", json!(1)), ok_leaf("b", json!(2))],
    )];
    let (result, sink) = run_collect(&tasks).await;
    result.unwrap();

    let a = id_of(&sink, "a");
    let b = id_of(&sink, "b");
    assert!(position(&sink, b, TaskState::InProgress) < position(&sink, a, TaskState::Completed));
}

#[tokio::test]
async fn all_children_failing_fails_the_group_and_the_run() {
    let tasks = [TaskSpec::group(
        "doomed",
        vec![failing_leaf("one", "bad one"), failing_leaf("two", "bad two")],
    )];
    let (result, sink) = run_collect(&tasks).await;

    let group = id_of(&sink, "doomed");
    match result {
        Err(ExecutorError::TaskFailed { id, message, .. }) => {
            assert_eq!(id, group);
            assert_eq!(message, "all 2 subtasks failed");
        }
        other => panic!("expected TaskFailed, got {other:?}"),
    }

    assert_eq!(
        states_of(&sink, group),
        vec![
            TaskState::Pending,
            TaskState::InProgress,
            TaskState::FailedPartially,
            TaskState::Failed
        ]
    );
    assert!(
        position(&sink, id_of(&sink, "two"), TaskState::Failed)
            < position(&sink, group, TaskState::Failed)
    );
    assert!(matches!(sink.end, Some(RunEnd::Failed { .. })));
}

#[tokio::test]
async fn mixed_concurrent_outcome_settles_partially_failed() {
    let tasks = [TaskSpec::concurrent_group(
        "mixed",
        vec![slow_leaf("good", 20), slow_failing_leaf("bad", 5, "broken")],
    )];
    let (result, sink) = run_collect(&tasks).await;
    let summary = result.unwrap();

    let group = id_of(&sink, "mixed");
    let states = states_of(&sink, group);
    assert_eq!(states.last(), Some(&TaskState::FailedPartially));
    assert!(!states.contains(&TaskState::Completed));
    assert!(!states.contains(&TaskState::Failed));
    assert_eq!(summary.states[&group], TaskState::FailedPartially);

    // The failing child's own detail is still delivered.
    let bad = id_of(&sink, "bad");
    let failed = sink
        .events
        .iter()
        .find(|e| e.id == bad && e.state == TaskState::Failed)
        .unwrap();
    assert_eq!(failed.error.as_deref(), Some("broken"));
}

#[tokio::test]
async fn partially_failed_child_counts_as_not_failed_at_parent() {
    let tasks = [TaskSpec::group(
        "outer",
        vec![
            TaskSpec::group(
                "inner",
                vec![ok_leaf("fine", json!(null)), failing_leaf("broken", "x")],
            ),
            failing_leaf("also-broken", "y"),
        ],
    )];
    let (result, sink) = run_collect(&tasks).await;
    result.unwrap();

    assert_eq!(
        states_of(&sink, id_of(&sink, "inner")).last(),
        Some(&TaskState::FailedPartially)
    );
    // One of two children failed outright, so the outer group is only partial.
    assert_eq!(
        states_of(&sink, id_of(&sink, "outer")).last(),
        Some(&TaskState::FailedPartially)
    );
}

#[tokio::test]
async fn empty_group_completes_without_child_events() {
    let (result, sink) = run_collect(&[TaskSpec::group("nothing", Vec::new())]).await;
    result.unwrap();

    assert_eq!(sink.events.len(), 3);
    assert_eq!(
        states_of(&sink, id_of(&sink, "nothing")),
        vec![TaskState::Pending, TaskState::InProgress, TaskState::Completed]
    );
}

#[tokio::test]
async fn empty_task_list_completes_with_no_events() {
    let (result, sink) = run_collect(&[]).await;

    let summary = result.unwrap();
    assert_eq!(summary.total_tasks, 0);
    assert!(sink.outline.is_empty());
    assert!(sink.events.is_empty());
    assert!(matches!(sink.end, Some(RunEnd::Completed(_))));
}

#[tokio::test]
async fn every_node_starts_once_and_ends_once() {
    let tasks = [TaskSpec::group(
        "release",
        vec![
            slow_leaf("lint", 5),
            TaskSpec::concurrent_group(
                "build",
                vec![slow_leaf("linux", 10), slow_failing_leaf("windows", 3, "linker")],
            ),
            TaskSpec::concurrent_group(
                "docs",
                vec![failing_leaf("api", "a"), failing_leaf("guide", "b")],
            ),
            ok_leaf("publish", json!("v1")),
        ],
    )];
    let (result, sink) = run_collect(&tasks).await;
    result.unwrap();

    for node in &sink.outline {
        let states = states_of(&sink, node.id);
        let starts = states.iter().filter(|s| **s == TaskState::InProgress).count();
        let ends = states.iter().filter(|s| s.is_terminal()).count();
        assert_eq!(starts, 1, "{} started {starts} times", node.title);

        if states.last() == Some(&TaskState::FailedPartially) {
            assert_eq!(ends, 0, "{} settled partial but also terminated", node.title);
        } else {
            assert_eq!(ends, 1, "{} ended {ends} times", node.title);
        }
    }

    // Child events carry their true parent id.
    let build_id = id_of(&sink, "build");
    for title in ["linux", "windows"] {
        let id = id_of(&sink, title);
        assert!(sink
            .events
            .iter()
            .filter(|e| e.id == id)
            .all(|e| e.parent_id == Some(build_id)));
    }
}

#[tokio::test]
async fn repeated_runs_reach_the_same_states() {
    let tasks = vec![TaskSpec::group(
        "root",
        vec![
            TaskSpec::concurrent_group(
                "fan",
                vec![slow_leaf("a", 5), slow_failing_leaf("b", 2, "b"), slow_leaf("c", 1)],
            ),
            ok_leaf("d", json!(4)),
        ],
    )];

    let mut seen = Vec::new();
    for _ in 0..3 {
        let (result, sink) = run_collect(&tasks).await;
        result.unwrap();

        let reached: BTreeMap<String, BTreeSet<TaskState>> = sink
            .outline
            .iter()
            .map(|node| {
                (
                    node.title.clone(),
                    states_of(&sink, node.id).into_iter().collect(),
                )
            })
            .collect();
        seen.push(reached);
    }

    assert_eq!(seen[0], seen[1]);
    assert_eq!(seen[1], seen[2]);
}

#[tokio::test]
async fn failing_root_stops_later_roots_by_default() {
    let tasks = [failing_leaf("setup", "no network"), ok_leaf("after", json!(1))];
    let (result, sink) = run_collect(&tasks).await;

    assert!(matches!(result, Err(ExecutorError::TaskFailed { .. })));
    assert_eq!(
        states_of(&sink, id_of(&sink, "after")),
        vec![TaskState::Pending]
    );
    match sink.end {
        Some(RunEnd::Failed { summary, error }) => {
            assert_eq!(summary.pending, 1);
            assert!(error.contains("no network"));
        }
        other => panic!("expected failed run, got {other:?}"),
    }
}

#[tokio::test]
async fn continue_on_error_runs_every_root() {
    let tasks = [failing_leaf("setup", "no network"), ok_leaf("after", json!(1))];
    let mut sink = CollectingSink::new();
    let opts = ExecutionOpts {
        exit_on_error: false,
    };
    let result = run(&tasks, &opts, &mut sink).await;

    assert!(result.is_err());
    assert_eq!(
        states_of(&sink, id_of(&sink, "after")),
        vec![TaskState::Pending, TaskState::InProgress, TaskState::Completed]
    );
}

#[tokio::test]
async fn execute_stream_delivers_descendant_events() {
    let spec = TaskSpec::concurrent_group(
        "stream",
        vec![
            TaskSpec::group("nested", vec![slow_leaf("deep", 5)]),
            ok_leaf("shallow", json!(true)),
        ],
    );
    let root = Arc::new(build(&spec, None));

    let items: Vec<_> = execute_stream(root.clone()).collect().await;
    let events: Vec<_> = items.into_iter().map(Result::unwrap).collect();

    // 4 nodes, each IN_PROGRESS + COMPLETED.
    assert_eq!(events.len(), 8);
    assert_eq!(events.first().map(|e| e.id), Some(root.id));
    assert_eq!(events.last().map(|e| (e.id, e.state)), Some((root.id, TaskState::Completed)));
    assert_eq!(root.state(), TaskState::Completed);
}

#[tokio::test]
async fn empty_group_does_not_finish_before_concurrent_sibling_starts() {
    let tasks = [TaskSpec::concurrent_group(
        "g",
        vec![TaskSpec::group("empty", Vec::new()), ok_leaf("b", json!("b"))],
    )];
    let (result, sink) = run_collect(&tasks).await;
    result.unwrap();

    let empty = id_of(&sink, "empty");
    let b = id_of(&sink, "b");
    assert!(
        position(&sink, b, TaskState::InProgress) < position(&sink, empty, TaskState::Completed)
    );
    assert!(
        position(&sink, empty, TaskState::InProgress) < position(&sink, b, TaskState::Completed)
    );
    assert_eq!(
        states_of(&sink, id_of(&sink, "g")).last(),
        Some(&TaskState::Completed)
    );
}

#[tokio::test]
async fn each_new_child_failure_repeats_failed_partially() {
    let tasks = [TaskSpec::group(
        "trio",
        vec![
            failing_leaf("first", "one"),
            ok_leaf("middle", json!(2)),
            failing_leaf("last", "three"),
        ],
    )];
    let (result, sink) = run_collect(&tasks).await;

    let summary = result.unwrap();
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.partially_failed, 1);

    let group = id_of(&sink, "trio");
    assert_eq!(
        states_of(&sink, group),
        vec![
            TaskState::Pending,
            TaskState::InProgress,
            TaskState::FailedPartially,
            TaskState::FailedPartially
        ]
    );
    // The second FAILED_PARTIALLY follows the second failing child.
    let second_partial = sink
        .events
        .iter()
        .rposition(|e| e.id == group && e.state == TaskState::FailedPartially)
        .unwrap();
    assert!(position(&sink, id_of(&sink, "last"), TaskState::Failed) < second_partial);
    assert!(events_of(&sink, group).iter().all(|e| e.error.is_none()));
}
