//! `wirebase check` - run every bootstrap stage and report it.
//!
//! Stages run in the order a request would need them. The first failure
//! aborts the check with that stage's error.

use serde_json::json;
use tracing::{info, instrument};

use wirebase_core::{
    application::{ConnectionResolver, ports::DatabaseHandle},
    domain::mask_credentials,
};

use crate::{config::BootContext, error::CliResult, logging::LoggerHandle, output::OutputManager};

#[instrument(skip_all)]
pub fn execute(
    ctx: &BootContext,
    output: &OutputManager,
    logger: &LoggerHandle,
) -> CliResult<()> {
    let dsn = mask_credentials(&ConnectionResolver::resolve_dsn(ctx.config())?);
    let handle = ctx.connection()?;
    let chain = ctx.middleware()?;
    let templates = ctx.templates()?;
    let http = ctx.http_client()?;

    info!(
        handle = %handle.id(),
        middleware = chain.len(),
        "Bootstrap check passed"
    );

    if output.is_json() {
        return output.json(&json!({
            "environment": ctx.environment().as_str(),
            "base_path": ctx.base_path(),
            "sources": ctx.source_names(),
            "dsn": dsn,
            "connection": handle.id().to_string(),
            "middleware": chain.execution_plan(),
            "templates": templates,
            "log": {
                "path": logger.path(),
                "level": logger.level().to_string(),
            },
            "http_client": {
                "timeout_secs": http.timeout.as_secs_f64(),
                "connect_timeout_secs": http.connect_timeout.as_secs_f64(),
                "allow_redirects": http.allow_redirects,
            },
        }));
    }

    output.header(&format!(
        "Bootstrapping {} ({})",
        ctx.base_path().display(),
        ctx.environment()
    ))?;
    output.success(&format!(
        "Configuration: {} layers composed",
        ctx.source_names().len()
    ))?;
    output.success(&format!("DSN: {dsn}"))?;
    output.success(&format!("Connection handle: {}", short_id(handle.as_ref())))?;
    output.success(&format!(
        "Middleware: {} pre-router, {} post-router",
        chain.pre_router().len(),
        chain.post_router().len()
    ))?;
    output.success(&format!(
        "Templates: {} search paths, assets at {}",
        templates.template_paths.len(),
        templates.asset_path.display()
    ))?;
    output.success(&format!(
        "HTTP client: timeout {:?}, connect {:?}, redirects {}",
        http.timeout,
        http.connect_timeout,
        if http.allow_redirects { "on" } else { "off" }
    ))?;
    if let Some(path) = logger.path() {
        output.success(&format!("Log: {} (level {})", path.display(), logger.level()))?;
    }
    output.print("")?;
    output.success("Bootstrap OK")?;

    Ok(())
}

fn short_id(handle: &dyn DatabaseHandle) -> String {
    handle.id().simple().to_string()[..8].to_owned()
}
