//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::GlobalArgs;

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "wirebase",
    bin_name = "wirebase",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Layered configuration and bootstrap for web applications",
    long_about = "Wirebase composes configuration from layered TOML sources, \
                  resolves the database connection, orders the middleware \
                  pipeline and runs deployments.",
    after_help = "EXAMPLES:\n\
        \x20 wirebase check\n\
        \x20 wirebase --env production dsn\n\
        \x20 wirebase config get db.host\n\
        \x20 wirebase deploy --dry-run",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Inspect the composed configuration.
    #[command(
        about = "Inspect the composed configuration",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 wirebase config show\n\
            \x20 wirebase config get db.dbname\n\
            \x20 wirebase config has db.port\n\
            \x20 wirebase config sources"
    )]
    Config(ConfigCommands),

    /// Print the resolved database connection string.
    #[command(about = "Print the resolved DSN (never the password)")]
    Dsn,

    /// Print the middleware execution plan.
    #[command(visible_alias = "mw", about = "Show the middleware execution plan")]
    Middleware,

    /// Run the full bootstrap and report each stage.
    #[command(about = "Bootstrap everything and fail on the first problem")]
    Check,

    /// Run the deployment task sequence.
    #[command(
        about = "Deploy the application",
        after_help = "EXAMPLES:\n\
            \x20 wirebase --env production deploy --dry-run\n\
            \x20 wirebase --env production deploy --yes"
    )]
    Deploy(DeployArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 wirebase completions bash > ~/.local/share/bash-completion/completions/wirebase\n\
            \x20 wirebase completions zsh  > ~/.zfunc/_wirebase\n\
            \x20 wirebase completions fish > ~/.config/fish/completions/wirebase.fish"
    )]
    Completions(CompletionsArgs),
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `wirebase config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the whole merged tree.
    Show,
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `db.dbname`.
        key: String,
    },
    /// Print whether a key exists.
    Has {
        /// Dotted key path.
        key: String,
    },
    /// List the configuration layers in merge order.
    Sources,
}

// ── deploy ────────────────────────────────────────────────────────────────────

/// Arguments for `wirebase deploy`.
#[derive(Debug, Args)]
pub struct DeployArgs {
    /// Skip the confirmation prompt.
    #[arg(short = 'y', long = "yes", help = "Skip confirmation and deploy immediately")]
    pub yes: bool,

    /// Show the steps and their commands without running anything.
    #[arg(long = "dry-run", help = "Show what would run without running it")]
    pub dry_run: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `wirebase completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use wirebase_core::domain::Environment;

    #[test]
    fn parse_config_get() {
        let cli = Cli::parse_from(["wirebase", "config", "get", "db.host"]);
        assert!(matches!(
            cli.command,
            Commands::Config(ConfigCommands::Get { ref key }) if key == "db.host"
        ));
    }

    #[test]
    fn env_flag_parses_aliases() {
        let cli = Cli::parse_from(["wirebase", "--env", "prod", "dsn"]);
        assert_eq!(cli.global.env, Some(Environment::Production));
        assert!(cli.global.environment().is_production());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["wirebase", "check", "--base", "/srv/app", "-vv"]);
        assert_eq!(cli.global.verbose, 2);
        assert_eq!(cli.global.base.as_deref(), Some(std::path::Path::new("/srv/app")));
    }

    #[test]
    fn deploy_flags() {
        let cli = Cli::parse_from(["wirebase", "deploy", "--dry-run", "-y"]);
        match cli.command {
            Commands::Deploy(args) => {
                assert!(args.dry_run);
                assert!(args.yes);
            }
            other => panic!("expected Deploy, got {other:?}"),
        }
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["wirebase", "--quiet", "--verbose", "check"]);
        assert!(result.is_err());
    }
}
