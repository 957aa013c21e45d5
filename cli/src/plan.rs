//! Task plan files.
//!
//! A plan is a TOML document with one `[[task]]` table per top-level task.
//! Each task is exactly one of:
//! - a shell command: `cmd = "cargo build"`
//! - a timed stub: `sleep_ms = 200`, optionally with `fail = "message"`
//! - a group: nested `[[task.task]]` tables (or `task = []`), with
//!   `concurrent = true` to start every child at once

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use taskline_core::api::{CliError, TaskSpec};
use thiserror::Error;

use crate::actions::{ShellAction, SleepAction};

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("read plan {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse plan: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("task {title:?}: {reason}")]
    InvalidNode { title: String, reason: String },
}

impl From<PlanError> for CliError {
    fn from(e: PlanError) -> Self {
        match e {
            PlanError::Read { source, .. } => CliError::Io(source),
            other => CliError::Plan(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanFile {
    #[serde(default, rename = "task")]
    pub tasks: Vec<PlanNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanNode {
    pub title: String,

    #[serde(default)]
    pub concurrent: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmd: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_ms: Option<u64>,

    /// Makes a `sleep_ms` task fail with this message once the sleep ends
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail: Option<String>,

    /// Subtasks; present (even empty) means this node is a group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<Vec<PlanNode>>,
}

impl PlanFile {
    pub fn load(path: &Path) -> Result<Self, PlanError> {
        let s = std::fs::read_to_string(path).map_err(|source| PlanError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&s)
    }

    pub fn parse(s: &str) -> Result<Self, PlanError> {
        let plan = toml::from_str::<PlanFile>(s)?;
        plan.validate()?;
        Ok(plan)
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        self.tasks.iter().try_for_each(PlanNode::validate)
    }

    /// Convert to executable task specs. The plan must already be valid.
    pub fn to_specs(&self) -> Vec<TaskSpec> {
        self.tasks.iter().map(PlanNode::to_spec).collect()
    }
}

impl PlanNode {
    fn invalid(&self, reason: &str) -> PlanError {
        PlanError::InvalidNode {
            title: self.title.clone(),
            reason: reason.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        if self.title.trim().is_empty() {
            return Err(self.invalid("title must not be empty"));
        }

        let kinds = [
            self.cmd.is_some(),
            self.sleep_ms.is_some(),
            self.task.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count();
        match kinds {
            0 => return Err(self.invalid("needs one of `cmd`, `sleep_ms` or subtasks")),
            1 => {}
            _ => return Err(self.invalid("`cmd`, `sleep_ms` and subtasks are mutually exclusive")),
        }

        if self.cmd.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(self.invalid("`cmd` must not be empty"));
        }
        if self.fail.is_some() && self.sleep_ms.is_none() {
            return Err(self.invalid("`fail` only applies to `sleep_ms` tasks"));
        }
        if self.concurrent && self.task.is_none() {
            return Err(self.invalid("`concurrent` only applies to groups"));
        }

        self.task
            .iter()
            .flatten()
            .try_for_each(PlanNode::validate)
    }

    fn to_spec(&self) -> TaskSpec {
        if let Some(children) = &self.task {
            let children = children.iter().map(PlanNode::to_spec).collect();
            return TaskSpec::group(self.title.clone(), children).with_concurrency(self.concurrent);
        }
        if let Some(cmd) = &self.cmd {
            return TaskSpec::action(self.title.clone(), ShellAction::new(cmd.clone()));
        }
        let duration = Duration::from_millis(self.sleep_ms.unwrap_or_default());
        TaskSpec::action(
            self.title.clone(),
            SleepAction::new(duration, self.fail.clone()),
        )
    }
}
