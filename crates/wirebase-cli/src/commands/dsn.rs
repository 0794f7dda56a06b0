//! `wirebase dsn` - print the resolved connection string.

use serde::Serialize;

use wirebase_core::{
    application::ConnectionResolver,
    domain::{DsnSource, SessionOptions, mask_credentials},
};

use crate::{config::BootContext, error::CliResult, output::OutputManager};

#[derive(Debug, Serialize)]
struct DsnReport<'a> {
    dsn: String,
    explicit: bool,
    username: &'a str,
    options: &'a SessionOptions,
}

pub fn execute(ctx: &BootContext, output: &OutputManager) -> CliResult<()> {
    let source = ConnectionResolver::dsn_source(ctx.config())?;

    if !output.is_json() {
        output.data(&source.masked())?;
        return Ok(());
    }

    let settings = ConnectionResolver::resolve(ctx.config())?;
    output.json(&DsnReport {
        dsn: mask_credentials(&settings.dsn),
        explicit: matches!(source, DsnSource::Explicit(_)),
        username: &settings.credentials.username,
        options: &settings.options,
    })
}
