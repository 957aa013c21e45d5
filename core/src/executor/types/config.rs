use crate::config::ExecutionConfig;

/// Options for one call to [`crate::executor::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionOpts {
    /// Stop at the first failing top-level task; later roots stay `PENDING`.
    pub exit_on_error: bool,
}

impl Default for ExecutionOpts {
    fn default() -> Self {
        Self {
            exit_on_error: true,
        }
    }
}

impl From<&ExecutionConfig> for ExecutionOpts {
    fn from(cfg: &ExecutionConfig) -> Self {
        Self {
            exit_on_error: cfg.exit_on_error,
        }
    }
}
