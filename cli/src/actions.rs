//! Leaf actions that plan files can name.

use std::process::Stdio;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::{json, Value};
use taskline_core::api::TaskAction;
use tokio::process::Command;

/// Runs a command line through the platform shell.
///
/// The result is the command's stdout with trailing whitespace removed; a
/// non-zero exit fails the task with the exit status and stderr.
#[derive(Debug, Clone)]
pub struct ShellAction {
    command: String,
}

impl ShellAction {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn shell(&self) -> Command {
        let mut cmd = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C");
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c");
            c
        };
        cmd.arg(&self.command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl TaskAction for ShellAction {
    async fn run(&self) -> anyhow::Result<Value> {
        tracing::debug!(command = %self.command, "spawning shell task");
        let output = self
            .shell()
            .output()
            .await
            .with_context(|| format!("spawn `{}`", self.command))?;

        if !output.status.success() {
            let status = output
                .status
                .code()
                .map(|c| format!("exit status {c}"))
                .unwrap_or_else(|| "terminated by signal".to_string());
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            if stderr.is_empty() {
                anyhow::bail!("{status}");
            }
            anyhow::bail!("{status}: {stderr}");
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(Value::String(stdout.trim_end().to_string()))
    }
}

/// Waits, then succeeds with the elapsed milliseconds or fails with a fixed message.
#[derive(Debug, Clone)]
pub struct SleepAction {
    duration: Duration,
    fail: Option<String>,
}

impl SleepAction {
    pub fn new(duration: Duration, fail: Option<String>) -> Self {
        Self { duration, fail }
    }
}

#[async_trait]
impl TaskAction for SleepAction {
    async fn run(&self) -> anyhow::Result<Value> {
        tokio::time::sleep(self.duration).await;
        match &self.fail {
            Some(msg) => Err(anyhow::anyhow!("{msg}")),
            None => Ok(json!({ "slept_ms": self.duration.as_millis() as u64 })),
        }
    }
}
