//! `wirebase deploy` - run the deployment task sequence.
//!
//! Each step is looked up under `deploy.tasks.<step>` and run through `sh`.
//! Steps without a command are skipped. A step failing once `lock` has
//! completed runs `unlock` before the error is reported.

use std::io::{self, IsTerminal};
use std::time::Duration;

use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, instrument};

use wirebase_adapters::ShellStepRunner;
use wirebase_core::{
    application::{DeployReport, DeployService},
    domain::{DeployPlan, DeployStep},
};

use crate::{
    cli::DeployArgs,
    config::BootContext,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(dry_run = args.dry_run))]
pub fn execute(args: DeployArgs, ctx: &BootContext, output: &OutputManager) -> CliResult<()> {
    let plan = DeployPlan::standard();
    let runner = ShellStepRunner::from_config(ctx.config(), ctx.base_path())?;

    if args.dry_run {
        return print_plan(&plan, &runner, output);
    }

    if !args.yes && !output.is_quiet() && io::stdin().is_terminal() && !confirm(ctx)? {
        return Err(CliError::Cancelled);
    }

    output.info(&format!(
        "Deploying {} into {}",
        ctx.environment(),
        runner.release_path().display()
    ))?;
    let started = Local::now();
    info!(
        environment = %ctx.environment(),
        release = %runner.release_path().display(),
        "Deploy started"
    );

    let spinner = spinner(output);
    let service = DeployService::new(Box::new(runner));
    let result = service.run_with(&plan, |step| {
        if let Some(pb) = &spinner {
            pb.set_message(format!("deploy:{step}"));
        }
    });
    if let Some(pb) = &spinner {
        pb.finish_and_clear();
    }

    let report = result?;
    let elapsed = Local::now() - started;
    info!(
        steps = report.completed.len(),
        elapsed_ms = elapsed.num_milliseconds(),
        "Deploy finished"
    );

    print_report(&report, output, started.format("%Y-%m-%d %H:%M:%S").to_string(), elapsed)
}

// ── helpers ───────────────────────────────────────────────────────────────────

fn print_plan(plan: &DeployPlan, runner: &ShellStepRunner, output: &OutputManager) -> CliResult<()> {
    let describe = |step: &DeployStep| {
        runner
            .command_for(step)
            .unwrap_or_else(|| "(no command)".to_owned())
    };

    output.header(&format!(
        "Deploy plan (release path: {})",
        runner.release_path().display()
    ))?;
    for (i, step) in plan.steps().iter().enumerate() {
        output.data(&format!("{:>3}. {:<26} {}", i + 1, step.name(), describe(step)))?;
    }
    if let Some(step) = plan.compensation() {
        output.data(&format!("on failure: {} {}", step.name(), describe(step)))?;
    }
    for hook in plan.success_hooks() {
        output.data(&format!("on success: {} {}", hook.name(), describe(hook)))?;
    }
    Ok(())
}

fn print_report(
    report: &DeployReport,
    output: &OutputManager,
    started: String,
    elapsed: chrono::TimeDelta,
) -> CliResult<()> {
    for (hook, reason) in &report.hook_failures {
        output.warning(&format!("Hook '{hook}' failed: {reason}"))?;
    }
    output.success(&format!(
        "Deployed {} steps (started {started}, took {:.1}s)",
        report.completed.len(),
        elapsed.num_milliseconds() as f64 / 1000.0
    ))?;
    Ok(())
}

fn spinner(output: &OutputManager) -> Option<ProgressBar> {
    if output.is_quiet() || !io::stderr().is_terminal() {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

#[cfg(feature = "interactive")]
fn confirm(ctx: &BootContext) -> CliResult<bool> {
    dialoguer::Confirm::new()
        .with_prompt(format!("Deploy to '{}'?", ctx.environment()))
        .default(false)
        .interact()
        .map_err(|e| CliError::InvalidInput {
            message: format!("confirmation prompt failed: {e}"),
        })
}

#[cfg(not(feature = "interactive"))]
fn confirm(ctx: &BootContext) -> CliResult<bool> {
    use std::io::Write;

    use crate::error::IntoCli;

    eprint!("Deploy to '{}'? [y/N] ", ctx.environment());
    io::stderr().flush().with_cli_context(|| "cannot write prompt")?;

    let mut answer = String::new();
    io::stdin()
        .read_line(&mut answer)
        .with_cli_context(|| "cannot read confirmation")?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
