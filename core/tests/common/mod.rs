#![allow(dead_code)]

use std::time::Duration;

use serde_json::{json, Value};
use taskline_core::api::{CollectingSink, TaskEvent, TaskId, TaskSpec, TaskState};

pub fn ok_leaf(title: &str, value: Value) -> TaskSpec {
    TaskSpec::leaf(title, move || {
        let value = value.clone();
        async move { Ok::<_, anyhow::Error>(value) }
    })
}

/// Leaf that sleeps `ms` and then returns its own title.
pub fn slow_leaf(title: &str, ms: u64) -> TaskSpec {
    let result = json!(title);
    TaskSpec::leaf(title, move || {
        let result = result.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok::<_, anyhow::Error>(result)
        }
    })
}

pub fn failing_leaf(title: &str, message: &str) -> TaskSpec {
    slow_failing_leaf(title, 0, message)
}

pub fn slow_failing_leaf(title: &str, ms: u64, message: &str) -> TaskSpec {
    let message = message.to_string();
    TaskSpec::leaf(title, move || {
        let message = message.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Err::<Value, _>(anyhow::anyhow!(message))
        }
    })
}

/// Id of the first outline node titled `title`.
pub fn id_of(sink: &CollectingSink, title: &str) -> TaskId {
    sink.outline
        .iter()
        .find(|node| node.title == title)
        .map(|node| node.id)
        .unwrap_or_else(|| panic!("no task titled {title}"))
}

pub fn events_of<'a>(sink: &'a CollectingSink, id: TaskId) -> Vec<&'a TaskEvent> {
    sink.events.iter().filter(|e| e.id == id).collect()
}

/// Every state `id` went through, starting with the synthetic PENDING.
pub fn states_of(sink: &CollectingSink, id: TaskId) -> Vec<TaskState> {
    events_of(sink, id).into_iter().map(|e| e.state).collect()
}

/// Index of the first event where `id` entered `state`.
pub fn position(sink: &CollectingSink, id: TaskId, state: TaskState) -> usize {
    sink.events
        .iter()
        .position(|e| e.id == id && e.state == state)
        .unwrap_or_else(|| panic!("task {id} never reached {state}"))
}
