//! `wirebase config` - inspect the composed configuration.

use wirebase_core::domain::{ConfigTree, ConfigValue, MASKED_SECRET, Table};

use crate::{
    cli::ConfigCommands,
    config::BootContext,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Keys whose values are never printed.
const SECRET_KEYS: &[&str] = &["db.password"];
const REDACTED: &str = MASKED_SECRET;

/// Dispatch to the correct config subcommand.
pub fn execute(cmd: ConfigCommands, ctx: &BootContext, output: &OutputManager) -> CliResult<()> {
    match cmd {
        ConfigCommands::Show => {
            let tree = redacted(ctx.config());
            if output.is_json() {
                output.json(&tree)?;
            } else {
                output.data(&render_toml(tree.as_table())?)?;
            }
        }

        ConfigCommands::Get { key } => {
            // Lookups go through the redacted tree so parent tables hide secrets too.
            let tree = redacted(ctx.config());
            let value = tree.get(&key)?;
            if output.is_json() {
                output.json(value)?;
            } else {
                // Scalars print bare so the output can be captured by scripts.
                let text = value.to_scalar_string().unwrap_or_else(|| value.to_string());
                output.data(&text)?;
            }
        }

        ConfigCommands::Has { key } => {
            let present = ctx.config().has(&key);
            if output.is_json() {
                output.json(&present)?;
            } else {
                output.data(&present.to_string())?;
            }
        }

        ConfigCommands::Sources => {
            if output.is_json() {
                output.json(ctx.source_names())?;
            } else {
                output.header("Configuration layers (later wins):")?;
                for (i, name) in ctx.source_names().iter().enumerate() {
                    output.data(&format!("  {}. {name}", i + 1))?;
                }
            }
        }
    }

    Ok(())
}

// ── helpers ───────────────────────────────────────────────────────────────────

fn redacted(tree: &ConfigTree) -> ConfigTree {
    SECRET_KEYS
        .iter()
        .filter(|key| tree.has(key))
        .fold(tree.clone(), |acc, key| acc.with(key, REDACTED))
}

fn render_toml(table: &Table) -> CliResult<String> {
    toml::to_string_pretty(&to_toml_table(table)).map_err(|e| CliError::Render {
        format: "TOML",
        message: e.to_string(),
    })
}

fn to_toml_table(table: &Table) -> toml::Table {
    table
        .iter()
        .map(|(key, value)| (key.clone(), to_toml(value)))
        .collect()
}

fn to_toml(value: &ConfigValue) -> toml::Value {
    match value {
        ConfigValue::Bool(b) => toml::Value::Boolean(*b),
        ConfigValue::Integer(n) => toml::Value::Integer(*n),
        ConfigValue::Float(f) => toml::Value::Float(*f),
        ConfigValue::String(s) => toml::Value::String(s.clone()),
        ConfigValue::List(items) => toml::Value::Array(items.iter().map(to_toml).collect()),
        ConfigValue::Table(inner) => toml::Value::Table(to_toml_table(inner)),
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
