use std::path::{Path, PathBuf};

use anyhow::Context;

use super::types::{AppConfig, RenderFormat};

/// Get the default taskline data directory: ~/.taskline
pub fn get_data_dir() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(home.join(".taskline"))
}

/// Read one config file.
pub fn load_from_path(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let cfg = toml::from_str::<AppConfig>(&s)
        .with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.taskline/config.toml
    let user_config = get_data_dir().ok().map(|dir| dir.join("config.toml"));

    // Priority 2: ./taskline.toml (current directory)
    let local_config = Path::new("taskline.toml");

    let mut cfg = match user_config {
        Some(path) if path.exists() => load_from_path(&path)?,
        _ if local_config.exists() => load_from_path(local_config)?,
        _ => AppConfig::default(),
    };

    // Environment variable overrides (Priority 0: highest)
    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok())?;

    Ok(cfg)
}

/// Apply `TASKLINE_*` overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: F) -> anyhow::Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = non_empty("TASKLINE_RENDER_FORMAT") {
        cfg.render.format = v
            .parse::<RenderFormat>()
            .map_err(|e| anyhow::anyhow!("TASKLINE_RENDER_FORMAT: {e}"))?;
    }
    if let Some(v) = non_empty("TASKLINE_LOG_LEVEL") {
        cfg.logging.level = v;
    }
    if let Some(v) = non_empty("TASKLINE_EXIT_ON_ERROR") {
        cfg.execution.exit_on_error = parse_bool(&v)
            .ok_or_else(|| anyhow::anyhow!("TASKLINE_EXIT_ON_ERROR: expected a boolean, got {v}"))?;
    }
    if let Some(v) = non_empty("TASKLINE_ASCII") {
        cfg.render.ascii = parse_bool(&v)
            .ok_or_else(|| anyhow::anyhow!("TASKLINE_ASCII: expected a boolean, got {v}"))?;
    }

    Ok(())
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
