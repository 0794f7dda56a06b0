//! Tracing subscriber initialisation.
//!
//! Only the CLI crate is allowed to call [`init_logging`]; `wirebase-core`
//! and the adapters only *emit* spans and events.
//!
//! Two layers are installed:
//!
//! | Layer  | Target                             | Threshold                          |
//! |--------|------------------------------------|------------------------------------|
//! | file   | `{base}/tmp/log/{environment}.log` | ERROR in production, DEBUG otherwise |
//! | stderr | terminal                           | `-q`/`-v` flags, `RUST_LOG` wins   |
//!
//! Every file record is prefixed with a 7-character process uid so lines
//! from concurrent processes can be told apart.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::IsTerminal as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use tracing::{Event, Subscriber};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::LevelFilter,
    fmt::{FmtContext, FormatEvent, FormatFields, format},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};
use uuid::Uuid;

use wirebase_core::domain::Environment;

use crate::cli::GlobalArgs;
use crate::error::{CliError, CliResult};

const UID_LEN: usize = 7;

/// Keeps the file writer alive. Dropping it flushes pending records.
#[derive(Debug)]
pub struct LoggerHandle {
    uid: String,
    path: Option<PathBuf>,
    level: LevelFilter,
    _guard: Option<WorkerGuard>,
}

impl LoggerHandle {
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// The log file, when one was opened.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }
}

/// Where the file layer writes.
pub struct LogTarget<'a> {
    pub base_path: &'a Path,
    pub environment: &'a Environment,
}

/// Initialise the global tracing subscriber.
///
/// Must be called exactly once, before any tracing macros fire. With a
/// `target`, failure to prepare the log file is fatal.
pub fn init_logging(args: &GlobalArgs, target: Option<LogTarget<'_>>) -> CliResult<LoggerHandle> {
    let uid = process_uid();

    let (file, path, level, guard) = match target {
        Some(target) => {
            let level = severity_for(target.environment);
            let path = log_path(target.base_path, target.environment);
            let (writer, guard) = open_writer(&path).map_err(|e| CliError::LoggerInit {
                path: path.clone(),
                message: format!("{e:#}"),
            })?;
            let layer = file_layer(uid.clone(), writer, level);
            (Some(layer), Some(path), level, Some(guard))
        }
        None => (None, None, LevelFilter::OFF, None),
    };

    tracing_subscriber::registry()
        .with(file)
        .with(stderr_layer(args))
        .try_init()
        .map_err(|e| CliError::LoggerInit {
            path: path.clone().unwrap_or_default(),
            message: format!("subscriber already installed: {e}"),
        })?;

    Ok(LoggerHandle {
        uid,
        path,
        level,
        _guard: guard,
    })
}

/// Production records errors only; every other environment records debug.
pub fn severity_for(environment: &Environment) -> LevelFilter {
    if environment.is_production() {
        LevelFilter::ERROR
    } else {
        LevelFilter::DEBUG
    }
}

pub fn log_path(base_path: &Path, environment: &Environment) -> PathBuf {
    base_path
        .join("tmp")
        .join("log")
        .join(format!("{}.log", environment.as_str()))
}

/// Short random identifier shared by every record of this process.
pub fn process_uid() -> String {
    Uuid::new_v4().simple().to_string()[..UID_LEN].to_owned()
}

fn open_writer(path: &Path) -> anyhow::Result<(NonBlocking, WorkerGuard)> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating log directory {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    Ok(tracing_appender::non_blocking(file))
}

fn file_layer<S>(uid: String, writer: NonBlocking, level: LevelFilter) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .event_format(UidFormat::new(uid))
        .with_writer(writer)
        .with_ansi(false)
        .with_filter(level)
}

fn stderr_layer<S>(args: &GlobalArgs) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let level = derive_level(args);

    // RUST_LOG wins; otherwise every wirebase crate gets the flag level.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "wirebase={level},wirebase_core={level},wirebase_adapters={level}"
        ))
    });

    let use_ansi = !args.no_color && std::io::stderr().is_terminal();

    tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(use_ansi)
        .with_writer(std::io::stderr)
        .with_filter(filter)
}

/// Translate the verbosity counter + quiet flag to a level string.
fn derive_level(args: &GlobalArgs) -> &'static str {
    if args.quiet {
        return "error";
    }
    match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Full formatter with a `[uid] ` prefix.
struct UidFormat {
    uid: String,
    inner: format::Format,
}

impl UidFormat {
    fn new(uid: String) -> Self {
        Self {
            uid,
            inner: format::Format::default().with_ansi(false),
        }
    }
}

impl<S, N> FormatEvent<S, N> for UidFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(writer, "[{}] ", self.uid)?;
        self.inner.format_event(ctx, writer, event)
    }
}
