//! # Wirebase CLI
//!
//! Bootstrap inspector and deploy runner for layered web applications.
//!
//! ## Startup sequence
//!
//! 1. Parse CLI arguments (clap handles `--help` / `--version` early-exit).
//! 2. Fix the base path and environment from `--base` / `--env` / `APP_ENV`.
//! 3. Initialise the tracing subscriber, including the per-environment log
//!    file under `{base}/tmp/log/`.
//! 4. Compose configuration from every layer.
//! 5. Dispatch to the appropriate command handler.
//! 6. Translate any [`CliError`] into a user-facing message and exit code.
//!
//! ## Exit codes
//!
//! | Code | Meaning                 |
//! |------|-------------------------|
//! |  0   | Success                 |
//! |  1   | Internal / system error |
//! |  2   | User / input error      |
//! |  3   | Resource not found      |
//! |  4   | Configuration error     |

use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info, instrument};

use crate::{
    cli::{Cli, Commands},
    config::{BootContext, Bootstrap},
    error::{CliError, CliResult},
    logging::{LogTarget, LoggerHandle, init_logging},
    output::OutputManager,
};

mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod output;

fn main() -> ExitCode {
    // .env may set APP_ENV, so it is read before the arguments.
    let _ = dotenvy::dotenv();

    // ── 1. Parse arguments ────────────────────────────────────────────────
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };
    let verbose = cli.global.verbose > 0;

    // Outlives `run` so the failure itself still reaches the log file.
    let mut logger = None;
    match run(cli, &mut logger) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => handle_error(e, verbose),
    }
}

/// Bootstrap, then dispatch to the correct command handler.
fn run(cli: Cli, logger: &mut Option<LoggerHandle>) -> CliResult<()> {
    let output = OutputManager::new(&cli.global);

    let command = match cli.command {
        Commands::Completions(args) => {
            *logger = Some(init_logging(&cli.global, None)?);
            return commands::completions::execute(args);
        }
        command => command,
    };

    // ── 2. Base path + environment ────────────────────────────────────────
    let bootstrap = Bootstrap::from_args(&cli.global)?;

    // ── 3. Logging ────────────────────────────────────────────────────────
    let logger = logger.insert(init_logging(
        &cli.global,
        Some(LogTarget {
            base_path: bootstrap.base_path(),
            environment: bootstrap.environment(),
        }),
    )?);
    debug!(
        uid = logger.uid(),
        verbose = cli.global.verbose,
        quiet = cli.global.quiet,
        "CLI started"
    );

    // ── 4. Configuration ──────────────────────────────────────────────────
    let ctx = bootstrap.load()?;

    // ── 5. Dispatch ───────────────────────────────────────────────────────
    dispatch(command, &ctx, &output, logger)?;
    info!("Wirebase completed successfully");
    Ok(())
}

#[instrument(skip_all, fields(uid = logger.uid()))]
fn dispatch(
    command: Commands,
    ctx: &BootContext,
    output: &OutputManager,
    logger: &LoggerHandle,
) -> CliResult<()> {
    match command {
        Commands::Config(cmd) => commands::config::execute(cmd, ctx, output),
        Commands::Dsn => commands::dsn::execute(ctx, output),
        Commands::Middleware => commands::middleware::execute(ctx, output),
        Commands::Check => commands::check::execute(ctx, output, logger),
        Commands::Deploy(args) => commands::deploy::execute(args, ctx, output),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Translate a `CliError` into a user message and an appropriate exit code.
fn handle_error(err: CliError, verbose: bool) -> ExitCode {
    err.log();

    // stderr, so the message survives a redirected stdout.
    let msg = if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
        err.format_colored(verbose)
    } else {
        err.format_plain(verbose)
    };
    eprint!("{msg}");

    ExitCode::from(err.exit_code())
}

// ── tests ─────────────────────────────────────────────────────────────────────
