//! Hierarchical task tree executor
//!
//! This module turns a tree of [`TaskSpec`]s into a runtime tree and runs it,
//! publishing one [`TaskEvent`] per state transition. It supports:
//! - Leaf tasks backed by async actions
//! - Groups whose children run sequentially or concurrently
//! - Failure aggregation (`FAILED` when every child failed, `FAILED_PARTIALLY` otherwise)
//! - Pluggable event sinks for rendering
//!
//! # Architecture
//!
//! ```text
//! Vec<TaskSpec>
//!   ↓
//! builder::build_forest()  → Vec<RuntimeTask> (ids, parent links, PENDING)
//!   ↓
//! engine::execute()        → recursive leaf / sequential / concurrent composition
//!   ↓
//! EventEmitter (mpsc)      → one ordered channel per run
//!   ↓
//! EventSink::on_event()
//! ```

mod builder;
mod engine;
mod progress;
mod run;
pub mod traits;
pub mod types;

pub use builder::{build, build_forest, outline};
pub use engine::{execute, execute_stream, EventEmitter, NodeResult};
pub use progress::{MonitorStyle, ProgressMonitor};
pub use run::run;
pub use traits::{CollectingSink, EventSink, NoopSink, RunEnd};
pub use types::{
    ExecutionOpts, LeafAction, Outcome, RunSummary, RuntimeTask, RuntimeWork, TaskAction,
    TaskEvent, TaskId, TaskOutline, TaskSpec, TaskStatus, TaskWork,
};
