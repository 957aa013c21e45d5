use taskline_core::api::{self as core_api, AppConfig, CliError, ExecutionOpts};
use taskline_plugins::factory::build_renderer;

use crate::commands::cli::RunArgs;
use crate::plan::PlanFile;

/// Handle `taskline run`: load the plan, render the run, report the exit code.
pub async fn handle_run(args: RunArgs, mut cfg: AppConfig) -> Result<i32, CliError> {
    let plan = PlanFile::load(&args.plan)?;
    let tasks = plan.to_specs();
    args.apply(&mut cfg);

    tracing::info!(
        plan = %args.plan.display(),
        roots = tasks.len(),
        format = cfg.render.format.as_str(),
        "starting plan"
    );

    let mut sink = build_renderer(&cfg.render);
    let opts = ExecutionOpts::from(&cfg.execution);
    let summary = core_api::run(&tasks, &opts, sink.as_mut()).await?;

    tracing::info!(
        completed = summary.completed,
        partially_failed = summary.partially_failed,
        failed = summary.failed,
        duration_ms = summary.duration_ms,
        "plan finished"
    );
    Ok(0)
}
