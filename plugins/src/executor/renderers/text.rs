use std::collections::HashMap;

use taskline_core::api::{
    EventSink, ExecutorError, RunSummary, TaskEvent, TaskId, TaskOutline, TaskState,
};

/// Plain line-per-transition renderer, for logs and non-interactive terminals.
pub struct TextRendererPlugin {
    ascii_only: bool,
    show_results: bool,
    /// title and depth per task, captured from the outline
    nodes: HashMap<TaskId, (String, usize)>,
}

impl TextRendererPlugin {
    pub fn new(ascii_only: bool, show_results: bool) -> Self {
        Self {
            ascii_only,
            show_results,
            nodes: HashMap::new(),
        }
    }

    fn marker(&self, state: TaskState) -> &'static str {
        match (state, self.ascii_only) {
            (TaskState::Pending, _) => "PENDING",
            (TaskState::InProgress, _) => "START",
            (TaskState::Completed, true) => "OK",
            (TaskState::Completed, false) => "✔ DONE",
            (TaskState::FailedPartially, true) => "PARTIAL",
            (TaskState::FailedPartially, false) => "⚠ PARTIAL",
            (TaskState::Failed, true) => "FAIL",
            (TaskState::Failed, false) => "✖ FAILED",
        }
    }

    fn format_event(&self, event: &TaskEvent) -> String {
        let (title, depth) = self
            .nodes
            .get(&event.id)
            .map(|(title, depth)| (title.as_str(), *depth))
            .unwrap_or(("?", 0));

        let mut line = format!(
            "{:<10} {}{}",
            self.marker(event.state),
            "  ".repeat(depth),
            title
        );
        if let Some(err) = &event.error {
            line.push_str(&format!(" ({err})"));
        }
        if self.show_results {
            if let Some(result) = event.result.as_ref().filter(|r| !r.is_null()) {
                let arrow = if self.ascii_only { "->" } else { "→" };
                line.push_str(&format!(" {arrow} {result}"));
            }
        }
        line
    }

    fn format_summary(summary: &RunSummary) -> String {
        format!(
            "completed {}, partially failed {}, failed {}, not started {}, duration {}ms",
            summary.completed,
            summary.partially_failed,
            summary.failed,
            summary.pending,
            summary.duration_ms
        )
    }
}

impl EventSink for TextRendererPlugin {
    fn name(&self) -> &str {
        "text-renderer"
    }

    fn on_start(&mut self, outline: &[TaskOutline]) {
        self.nodes = outline
            .iter()
            .map(|node| (node.id, (node.title.clone(), node.depth)))
            .collect();
        println!("RUN START (tasks: {})", outline.len());
    }

    fn on_event(&mut self, event: &TaskEvent) {
        // The initial PENDING snapshot adds nothing to a line log.
        if event.state == TaskState::Pending {
            return;
        }
        println!("{}", self.format_event(event));
    }

    fn on_complete(&mut self, summary: &RunSummary) {
        println!("RUN END ({})", Self::format_summary(summary));
        self.nodes.clear();
    }

    fn on_error(&mut self, error: &ExecutorError, summary: &RunSummary) {
        println!("RUN FAILED: {error} ({})", Self::format_summary(summary));
        self.nodes.clear();
    }
}
