use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub execution: ExecutionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default)]
    pub file: bool,

    /// EnvFilter string, e.g. "warn" or "taskline_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_level() -> String {
    // Console logs share stderr with the live tree view; keep them quiet by default.
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: false,
            level: default_logging_level(),
            directory: None,
        }
    }
}

/// Which event sink renders a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderFormat {
    /// Live indented tree with spinners
    #[default]
    Tree,
    /// One line per state change
    Text,
    /// One JSON object per state change
    Jsonl,
}

impl RenderFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tree => "tree",
            Self::Text => "text",
            Self::Jsonl => "jsonl",
        }
    }
}

impl std::str::FromStr for RenderFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tree" => Ok(Self::Tree),
            "text" => Ok(Self::Text),
            "jsonl" => Ok(Self::Jsonl),
            other => Err(format!("unknown render format: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub format: RenderFormat,

    /// ASCII-only markers (no Unicode)
    #[serde(default)]
    pub ascii: bool,

    /// Spinner frame interval in milliseconds
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Show leaf results next to completed tasks
    #[serde(default)]
    pub show_results: bool,

    /// Pretty-print JSON (jsonl format only)
    #[serde(default)]
    pub pretty: bool,
}

fn default_tick_ms() -> u64 {
    80
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            format: RenderFormat::default(),
            ascii: false,
            tick_ms: default_tick_ms(),
            show_results: false,
            pretty: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Stop after the first failing top-level task
    #[serde(default = "default_exit_on_error")]
    pub exit_on_error: bool,
}

fn default_exit_on_error() -> bool {
    true
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            exit_on_error: default_exit_on_error(),
        }
    }
}
