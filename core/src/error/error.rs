use thiserror::Error;

use super::executor::ExecutorError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(String),
    #[error("plan error: {0}")]
    Plan(String),
    #[error("run failed: {0}")]
    Executor(#[from] ExecutorError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

impl CliError {
    /// Process exit code for this error.
    ///
    /// 1: a top-level task failed
    /// 11: config error
    /// 12: plan file error
    /// 20: IO error
    /// 50: internal/uncategorized
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Executor(e) if e.is_task_failure() => 1,
            Self::Executor(_) => 50,
            Self::Config(_) => 11,
            Self::Plan(_) => 12,
            Self::Io(_) => 20,
            Self::Anyhow(_) => 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::types::TaskId;

    #[test]
    fn test_exit_codes() {
        let failed = CliError::Executor(ExecutorError::TaskFailed {
            id: TaskId::new(),
            title: "build".into(),
            message: "boom".into(),
        });
        assert_eq!(failed.exit_code(), 1);
        assert_eq!(CliError::Executor(ExecutorError::Join("panic".into())).exit_code(), 50);
        assert_eq!(CliError::Config("bad".into()).exit_code(), 11);
        assert_eq!(CliError::Plan("bad".into()).exit_code(), 12);
    }
}
