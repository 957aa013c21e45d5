use crate::error::ExecutorError;
use crate::executor::types::{RunSummary, TaskEvent, TaskOutline};

/// Consumer of a run's event stream (terminal renderer, log writer, test recorder).
///
/// A sink only observes: it never touches runtime task state, and any render
/// state it keeps is its own copy keyed by task id. Call order for one run is
/// `on_start`, one `PENDING` `on_event` per node, every transition, then
/// exactly one of `on_complete` / `on_error`.
pub trait EventSink: Send {
    fn name(&self) -> &str;

    /// Tree shape, pre-order, before any event.
    fn on_start(&mut self, outline: &[TaskOutline]) {
        let _ = outline;
    }

    fn on_event(&mut self, event: &TaskEvent);

    fn on_complete(&mut self, summary: &RunSummary) {
        let _ = summary;
    }

    fn on_error(&mut self, error: &ExecutorError, summary: &RunSummary) {
        let _ = (error, summary);
    }
}

/// Sink that discards everything.
#[derive(Debug, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn name(&self) -> &str {
        "noop"
    }

    fn on_event(&mut self, _event: &TaskEvent) {}
}

/// How a run ended, as seen by [`CollectingSink`].
#[derive(Debug, Clone)]
pub enum RunEnd {
    Completed(RunSummary),
    Failed { error: String, summary: RunSummary },
}

/// Sink that keeps everything it receives, in order.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub outline: Vec<TaskOutline>,
    pub events: Vec<TaskEvent>,
    pub end: Option<RunEnd>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for CollectingSink {
    fn name(&self) -> &str {
        "collecting"
    }

    fn on_start(&mut self, outline: &[TaskOutline]) {
        self.outline = outline.to_vec();
    }

    fn on_event(&mut self, event: &TaskEvent) {
        self.events.push(event.clone());
    }

    fn on_complete(&mut self, summary: &RunSummary) {
        self.end = Some(RunEnd::Completed(summary.clone()));
    }

    fn on_error(&mut self, error: &ExecutorError, summary: &RunSummary) {
        self.end = Some(RunEnd::Failed {
            error: error.to_string(),
            summary: summary.clone(),
        });
    }
}
