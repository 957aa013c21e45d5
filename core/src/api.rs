//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `taskline_core::api` instead of reaching into internal modules.

pub use crate::config::{
    apply_env_overrides, get_data_dir, load_default, load_from_path, AppConfig, ExecutionConfig,
    LoggingConfig, RenderConfig, RenderFormat,
};
pub use crate::error::{CliError, ExecutorError};
pub use crate::executor::{
    build, build_forest, execute, execute_stream, outline, run, CollectingSink, EventEmitter,
    EventSink, ExecutionOpts, LeafAction, MonitorStyle, NoopSink, Outcome, ProgressMonitor,
    RunEnd, RunSummary, RuntimeTask, TaskAction, TaskEvent, TaskId, TaskOutline, TaskSpec,
    TaskWork,
};
pub use crate::state::{TaskState, TransitionError};
