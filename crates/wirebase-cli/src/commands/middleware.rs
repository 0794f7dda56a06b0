//! `wirebase middleware` - print the execution plan.

use crate::{config::BootContext, error::CliResult, output::OutputManager};

pub fn execute(ctx: &BootContext, output: &OutputManager) -> CliResult<()> {
    let plan = ctx.middleware()?.execution_plan();

    if output.is_json() {
        return output.json(&plan);
    }

    output.header("Middleware execution plan:")?;
    for (i, entry) in plan.iter().enumerate() {
        let line = match entry.priority {
            Some(priority) => format!(
                "{:>3}. {:<12} {} (priority {priority})",
                i + 1,
                entry.phase,
                entry.id
            ),
            None => format!("{:>3}. {:<12} {}", i + 1, entry.phase, entry.id),
        };
        output.data(&line)?;
    }
    Ok(())
}
