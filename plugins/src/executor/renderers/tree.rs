use taskline_core::api::{
    EventSink, ExecutorError, MonitorStyle, ProgressMonitor, RunSummary, TaskEvent, TaskOutline,
};

/// Interactive renderer: a live indented tree drawn with indicatif.
pub struct TreeRendererPlugin {
    style: MonitorStyle,
    monitor: Option<ProgressMonitor>,
}

impl TreeRendererPlugin {
    pub fn new(style: MonitorStyle) -> Self {
        Self {
            style,
            monitor: None,
        }
    }

    fn finish(&mut self, success: bool, msg: String) {
        if let Some(monitor) = self.monitor.take() {
            monitor.set_message(&msg);
            monitor.finish(success);
        }
    }
}

impl EventSink for TreeRendererPlugin {
    fn name(&self) -> &str {
        "tree-renderer"
    }

    fn on_start(&mut self, outline: &[TaskOutline]) {
        self.monitor = Some(ProgressMonitor::new(outline, self.style.clone()));
    }

    fn on_event(&mut self, event: &TaskEvent) {
        if let Some(monitor) = self.monitor.as_mut() {
            monitor.update(event);
        }
    }

    fn on_complete(&mut self, summary: &RunSummary) {
        self.finish(true, complete_message(summary));
    }

    fn on_error(&mut self, error: &ExecutorError, summary: &RunSummary) {
        let msg = match summary.pending {
            0 => error.to_string(),
            n => format!("{error} ({n} not started)"),
        };
        self.finish(false, msg);
    }
}

fn complete_message(summary: &RunSummary) -> String {
    if summary.all_completed() {
        format!("in {}ms", summary.duration_ms)
    } else {
        format!(
            "({} partially failed, {} failed)",
            summary.partially_failed, summary.failed
        )
    }
}
