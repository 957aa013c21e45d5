use std::collections::HashMap;

use chrono::Local;
use serde_json::{json, Value};
use taskline_core::api::{EventSink, ExecutorError, RunSummary, TaskEvent, TaskId, TaskOutline};

/// Machine-readable renderer: one JSON object per line.
pub struct JsonlRendererPlugin {
    pretty_print: bool,
    titles: HashMap<TaskId, String>,
}

impl JsonlRendererPlugin {
    pub fn new(pretty_print: bool) -> Self {
        Self {
            pretty_print,
            titles: HashMap::new(),
        }
    }

    fn run_start_json(outline: &[TaskOutline]) -> Value {
        json!({
            "v": 1,
            "event_type": "run.start",
            "ts": Local::now().to_rfc3339(),
            "metadata": {
                "total_tasks": outline.len(),
                "tasks": outline,
            }
        })
    }

    fn event_to_json(&self, event: &TaskEvent) -> Value {
        json!({
            "v": 1,
            "event_type": "task.state",
            "ts": event.timestamp.to_rfc3339(),
            "task_id": event.id,
            "parent_id": event.parent_id,
            "title": self.titles.get(&event.id),
            "state": event.state,
            "result": event.result,
            "error": event.error,
        })
    }

    fn run_end_json(summary: &RunSummary, error: Option<&ExecutorError>) -> Value {
        let event_type = if error.is_some() { "run.error" } else { "run.end" };
        json!({
            "v": 1,
            "event_type": event_type,
            "ts": Local::now().to_rfc3339(),
            "error": error.map(|e| e.to_string()),
            "metadata": {
                "total_tasks": summary.total_tasks,
                "completed": summary.completed,
                "partially_failed": summary.partially_failed,
                "failed": summary.failed,
                "pending": summary.pending,
                "duration_ms": summary.duration_ms,
            }
        })
    }

    fn emit(&self, value: &Value) {
        let line = if self.pretty_print {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        println!("{}", line.unwrap_or_else(|_| "{}".into()));
    }
}

impl EventSink for JsonlRendererPlugin {
    fn name(&self) -> &str {
        "jsonl-renderer"
    }

    fn on_start(&mut self, outline: &[TaskOutline]) {
        self.titles = outline
            .iter()
            .map(|node| (node.id, node.title.clone()))
            .collect();
        self.emit(&Self::run_start_json(outline));
    }

    fn on_event(&mut self, event: &TaskEvent) {
        let value = self.event_to_json(event);
        self.emit(&value);
    }

    fn on_complete(&mut self, summary: &RunSummary) {
        self.emit(&Self::run_end_json(summary, None));
        self.titles.clear();
    }

    fn on_error(&mut self, error: &ExecutorError, summary: &RunSummary) {
        self.emit(&Self::run_end_json(summary, Some(error)));
        self.titles.clear();
    }
}
