//! `stats` and `serve`

use super::common::HandlerContext;
use crate::cli::output::OutputFormatter;
use crate::core::Actor;
use crate::error::Result;

pub fn handle_stats_command(
    actor: &Actor,
    project_dir: Option<&str>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let ctx = HandlerContext::new(project_dir)?;
    let stats = ctx.desk.ticket_stats(actor)?;

    if formatter.is_json() {
        formatter.print_json(&stats)?;
    } else {
        formatter.print_stats(&stats);
    }
    Ok(())
}

/// Run the REST API until interrupted
#[cfg(feature = "api")]
pub fn handle_serve_command(
    host: Option<String>,
    port: Option<u16>,
    project_dir: Option<&str>,
    formatter: &OutputFormatter,
) -> Result<()> {
    use crate::error::HelpdeskError;

    let ctx = HandlerContext::new(project_dir)?;
    let host = host.unwrap_or_else(|| ctx.config.api.host.clone());
    let port = port.unwrap_or(ctx.config.api.port);

    formatter.info(&format!("Serving help desk API on http://{host}:{port}"));
    let runtime = tokio::runtime::Runtime::new()?;
    runtime
        .block_on(crate::api::serve(ctx.desk, &host, port))
        .map_err(|e| HelpdeskError::custom(format!("{e:#}")))
}
