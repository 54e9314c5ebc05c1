//! Comment log commands: `comment` and `comments`

use super::common::HandlerContext;
use crate::cli::output::OutputFormatter;
use crate::core::Actor;
use crate::error::Result;

pub fn handle_comment_command(
    actor: &Actor,
    ticket_ref: &str,
    body: &str,
    project_dir: Option<&str>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let ctx = HandlerContext::new(project_dir)?;
    let id = ctx.resolve_ticket_ref(ticket_ref)?;
    let comment = ctx.desk.add_comment(actor, &id, body)?;

    if formatter.is_json() {
        formatter.print_json(&comment)?;
    } else {
        formatter.success(&format!(
            "Added comment #{} to ticket {}",
            comment.id,
            id.short()
        ));
    }
    Ok(())
}

pub fn handle_comments_command(
    actor: &Actor,
    ticket_ref: &str,
    project_dir: Option<&str>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let ctx = HandlerContext::new(project_dir)?;
    let id = ctx.resolve_ticket_ref(ticket_ref)?;
    let comments = ctx.desk.list_comments(actor, &id)?;

    if formatter.is_json() {
        formatter.print_json(&comments)?;
    } else if comments.is_empty() {
        formatter.info(&format!("No comments on ticket {}", id.short()));
    } else {
        for comment in &comments {
            formatter.print_comment(comment);
        }
    }
    Ok(())
}
