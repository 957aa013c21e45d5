use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use taskline_core::api::{AppConfig, RenderFormat};

#[derive(Parser, Debug)]
#[command(
    name = "taskline",
    version,
    about = "Run hierarchical task plans with live progress"
)]
pub struct Args {
    /// Config file; defaults to ~/.taskline/config.toml, then ./taskline.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Tree,
    Text,
    Jsonl,
}

impl From<FormatArg> for RenderFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Tree => RenderFormat::Tree,
            FormatArg::Text => RenderFormat::Text,
            FormatArg::Jsonl => RenderFormat::Jsonl,
        }
    }
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RunArgs {
    /// Plan file (TOML)
    pub plan: PathBuf,

    /// Override the configured renderer
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// ASCII-only output
    #[arg(long)]
    pub ascii: bool,

    /// Run every top-level task even after one fails
    #[arg(long)]
    pub continue_on_error: bool,

    /// Print leaf results next to completed tasks
    #[arg(long)]
    pub show_results: bool,
}

impl RunArgs {
    /// Fold command-line flags over the loaded config. Flags only ever switch
    /// options on; unset flags keep the config value.
    pub fn apply(&self, cfg: &mut AppConfig) {
        if let Some(format) = self.format {
            cfg.render.format = format.into();
        }
        cfg.render.ascii |= self.ascii;
        cfg.render.show_results |= self.show_results;
        if self.continue_on_error {
            cfg.execution.exit_on_error = false;
        }
    }
}

#[derive(ClapArgs, Debug, Clone)]
pub struct CheckArgs {
    /// Plan file (TOML)
    pub plan: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute a plan
    Run(RunArgs),
    /// Validate a plan and print its task tree
    Check(CheckArgs),
}
