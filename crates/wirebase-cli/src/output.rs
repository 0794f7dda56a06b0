//! Output management and formatting.
//!
//! Two kinds of line go to stdout:
//!
//! - **status** lines (`✓`, `⚠`, `ℹ`, headers) are for humans. `--quiet`
//!   drops them, and they are only coloured in human format.
//! - **data** lines (a DSN, a config value, a JSON document) are always
//!   written, so `wirebase -q dsn` stays scriptable.

use std::io::{self, IsTerminal};

use console::Term;
use owo_colors::{OwoColorize, Style};
use serde::Serialize;

use crate::cli::global::{GlobalArgs, OutputFormat};
use crate::error::{CliError, CliResult};

pub struct OutputManager {
    format: OutputFormat,
    quiet: bool,
    colored: bool,
    term: Term,
}

impl OutputManager {
    pub fn new(args: &GlobalArgs) -> Self {
        // Auto means human on a terminal and plain when piped.
        let format = match args.output_format {
            OutputFormat::Auto if io::stdout().is_terminal() => OutputFormat::Human,
            OutputFormat::Auto => OutputFormat::Plain,
            explicit => explicit,
        };

        Self {
            format,
            quiet: args.quiet,
            colored: format == OutputFormat::Human && !args.no_color,
            term: Term::stdout(),
        }
    }

    // ── data ──────────────────────────────────────────────────────────────

    /// Command result; never suppressed.
    pub fn data(&self, line: &str) -> io::Result<()> {
        self.term.write_line(line)
    }

    /// Pretty-printed JSON document; never suppressed.
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> CliResult<()> {
        let rendered = serde_json::to_string_pretty(value).map_err(|e| CliError::Render {
            format: "JSON",
            message: e.to_string(),
        })?;
        Ok(self.data(&rendered)?)
    }

    // ── status ────────────────────────────────────────────────────────────

    /// Unmarked status line.
    pub fn print(&self, line: &str) -> io::Result<()> {
        self.status(None, line, Style::new())
    }

    pub fn success(&self, msg: &str) -> io::Result<()> {
        self.status(Some('\u{2713}'), msg, Style::new().green()) // ✓
    }

    pub fn warning(&self, msg: &str) -> io::Result<()> {
        self.status(Some('\u{26a0}'), msg, Style::new().yellow()) // ⚠
    }

    pub fn info(&self, msg: &str) -> io::Result<()> {
        self.status(Some('\u{2139}'), msg, Style::new().blue()) // ℹ
    }

    pub fn header(&self, text: &str) -> io::Result<()> {
        self.status(None, text, Style::new().cyan().bold())
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    fn status(&self, marker: Option<char>, msg: &str, style: Style) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.term.write_line(&self.render(marker, msg, style))
    }

    fn render(&self, marker: Option<char>, msg: &str, style: Style) -> String {
        match (marker, self.colored) {
            (Some(m), true) => format!("{} {}", m.style(style.bold()), msg.style(style)),
            (Some(m), false) => format!("{m} {msg}"),
            (None, true) => msg.style(style).to_string(),
            (None, false) => msg.to_owned(),
        }
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
