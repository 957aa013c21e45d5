use std::collections::HashMap;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde_json::Value;

use crate::state::TaskState;

use super::types::{TaskEvent, TaskId, TaskOutline};

const UNICODE_TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const ASCII_TICKS: &[&str] = &["|", "/", "-", "\\"];

/// Display options for [`ProgressMonitor`]
#[derive(Debug, Clone)]
pub struct MonitorStyle {
    /// Draw to the terminal; when false every bar is hidden
    pub enabled: bool,
    /// ASCII-only symbols and spinner
    pub ascii: bool,
    /// Spinner frame interval
    pub tick: Duration,
    /// Append leaf results to completed lines
    pub show_results: bool,
}

impl Default for MonitorStyle {
    fn default() -> Self {
        Self {
            enabled: true,
            ascii: false,
            tick: Duration::from_millis(80),
            show_results: false,
        }
    }
}

struct Line {
    bar: ProgressBar,
    title: String,
    is_group: bool,
    state: TaskState,
}

/// Live tree view of a run: one line per node, indented by depth, plus an
/// overall leaf counter.
///
/// Keeps its own copy of every node's state, keyed by task id.
pub struct ProgressMonitor {
    /// Multi-progress container
    multi: MultiProgress,
    /// Finished leaves / total leaves
    overall: ProgressBar,
    lines: HashMap<TaskId, Line>,
    style: MonitorStyle,
}

impl ProgressMonitor {
    /// Create a monitor with one (pending) line per outline entry, in outline order.
    pub fn new(outline: &[TaskOutline], style: MonitorStyle) -> Self {
        let multi = if style.enabled {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };

        let mut lines = HashMap::with_capacity(outline.len());
        for node in outline {
            let bar = multi.add(ProgressBar::new_spinner());
            bar.set_prefix("  ".repeat(node.depth));
            let line = Line {
                bar,
                title: node.title.clone(),
                is_group: node.is_group,
                state: TaskState::Pending,
            };
            Self::paint(&line, &style, None, None);
            lines.insert(node.id, line);
        }

        let leaves = outline.iter().filter(|n| !n.is_group).count();
        let overall = multi.add(ProgressBar::new(leaves as u64));
        overall.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {pos}/{len} tasks {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        Self {
            multi,
            overall,
            lines,
            style,
        }
    }

    /// Apply one event. Unknown ids are ignored.
    pub fn update(&mut self, event: &TaskEvent) {
        let Some(line) = self.lines.get_mut(&event.id) else {
            return;
        };

        let was_finished = line.state.is_terminal();
        line.state = event.state;
        Self::paint(line, &self.style, event.result.as_ref(), event.error.as_deref());

        if !line.is_group && event.state.is_terminal() && !was_finished {
            self.overall.inc(1);
        }
    }

    /// Current state of a node as last seen by the monitor.
    pub fn state_of(&self, id: &TaskId) -> Option<TaskState> {
        self.lines.get(id).map(|line| line.state)
    }

    /// Update overall progress message
    pub fn set_message(&self, msg: &str) {
        self.overall.set_message(msg.to_string());
    }

    /// Freeze every line and the overall counter.
    pub fn finish(&self, success: bool) {
        for line in self.lines.values() {
            line.bar.disable_steady_tick();
            line.bar.finish();
        }

        let msg = match (success, self.style.ascii) {
            (true, false) => "✔ done",
            (true, true) => "done",
            (false, false) => "✖ failed",
            (false, true) => "failed",
        };
        self.overall.finish_with_message(msg);
    }

    /// Remove everything from the terminal.
    pub fn clear(&self) {
        for line in self.lines.values() {
            line.bar.finish_and_clear();
        }
        self.overall.finish_and_clear();
        let _ = self.multi.clear();
    }

    fn paint(line: &Line, style: &MonitorStyle, result: Option<&Value>, error: Option<&str>) {
        let bar = &line.bar;

        if line.state == TaskState::InProgress {
            let ticks = if style.ascii { ASCII_TICKS } else { UNICODE_TICKS };
            bar.set_style(
                ProgressStyle::default_spinner()
                    .template("{prefix}{spinner:.cyan} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_strings(ticks),
            );
            bar.set_message(line.title.clone());
            bar.enable_steady_tick(style.tick);
            return;
        }

        bar.disable_steady_tick();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{prefix}{msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );

        let mut msg = format!("{} {}", symbol(line.state, style.ascii), line.title);
        if let Some(err) = error {
            msg.push_str(&format!(" ({err})"));
        }
        if style.show_results {
            if let Some(value) = result.filter(|v| !v.is_null()) {
                let arrow = if style.ascii { "->" } else { "→" };
                msg.push_str(&format!(" {arrow} {}", short_value(value)));
            }
        }
        bar.set_message(msg);
    }
}

fn symbol(state: TaskState, ascii: bool) -> &'static str {
    match (state, ascii) {
        (TaskState::Pending, _) => " ",
        (TaskState::InProgress, false) => "⠋",
        (TaskState::InProgress, true) => "|",
        (TaskState::Completed, false) => "✔",
        (TaskState::Completed, true) => "+",
        (TaskState::FailedPartially, false) => "⚠",
        (TaskState::FailedPartially, true) => "!",
        (TaskState::Failed, false) => "✖",
        (TaskState::Failed, true) => "x",
    }
}

/// Single-line rendering of a result, strings unquoted.
fn short_value(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let first_line = text.lines().next().unwrap_or_default();
    if first_line.chars().count() > 60 {
        let cut: String = first_line.chars().take(57).collect();
        format!("{cut}...")
    } else {
        first_line.to_string()
    }
}

impl Drop for ProgressMonitor {
    fn drop(&mut self) {
        // Stop background tick threads
        for line in self.lines.values() {
            line.bar.disable_steady_tick();
        }
    }
}
