use taskline_core::api::{build_forest, outline, CliError, TaskOutline};

use crate::commands::cli::CheckArgs;
use crate::plan::PlanFile;

/// Handle `taskline check`: validate the plan and print its tree.
pub fn handle_check(args: CheckArgs) -> Result<i32, CliError> {
    let plan = PlanFile::load(&args.plan)?;
    let forest = build_forest(&plan.to_specs());
    print!("{}", format_outline(&outline(&forest)));
    Ok(0)
}

pub fn format_outline(nodes: &[TaskOutline]) -> String {
    let mut out = String::new();
    for node in nodes {
        let mode = match (node.is_group, node.concurrent) {
            (false, _) => "",
            (true, false) => " [sequential]",
            (true, true) => " [concurrent]",
        };
        out.push_str(&format!("{}{}{}\n", "  ".repeat(node.depth), node.title, mode));
    }

    let groups = nodes.iter().filter(|n| n.is_group).count();
    out.push_str(&format!(
        "{} tasks ({} groups, {} leaves)\n",
        nodes.len(),
        groups,
        nodes.len() - groups
    ));
    out
}
