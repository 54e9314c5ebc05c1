//! Ticket filing and viewing: `new`, `show` and `list`

use super::common::HandlerContext;
use crate::cli::output::OutputFormatter;
use crate::core::{Actor, Priority, Status};
use crate::error::Result;
use crate::query::TicketQuery;

pub fn handle_new_command(
    actor: &Actor,
    title: &str,
    description: &str,
    priority: Option<&str>,
    project_dir: Option<&str>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let priority = priority.map(str::parse::<Priority>).transpose()?;
    let ctx = HandlerContext::new(project_dir)?;
    let ticket = ctx.desk.create_ticket(actor, title, description, priority)?;

    if formatter.is_json() {
        formatter.print_json(&ticket)?;
    } else {
        formatter.success(&format!(
            "Filed ticket {} '{}' ({} priority)",
            ticket.id.short(),
            ticket.title,
            ticket.priority
        ));
    }
    Ok(())
}

/// Show a ticket. An administrator viewing an open ticket starts handling it.
pub fn handle_show_command(
    actor: &Actor,
    ticket_ref: &str,
    with_comments: bool,
    project_dir: Option<&str>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let ctx = HandlerContext::new(project_dir)?;
    let id = ctx.resolve_ticket_ref(ticket_ref)?;
    let ticket = ctx.desk.get_ticket(actor, &id)?;
    let comments = if with_comments {
        ctx.desk.list_comments(actor, &id)?
    } else {
        Vec::new()
    };

    if formatter.is_json() {
        if with_comments {
            formatter.print_json(&serde_json::json!({
                "ticket": ticket,
                "comments": comments,
            }))?;
        } else {
            formatter.print_json(&ticket)?;
        }
        return Ok(());
    }

    formatter.print_ticket(&ticket);
    if with_comments {
        formatter.info("");
        if comments.is_empty() {
            formatter.info("No comments yet");
        }
        for comment in &comments {
            formatter.print_comment(comment);
        }
    }
    Ok(())
}

pub fn handle_list_command(
    actor: &Actor,
    status: Option<&str>,
    priority: Option<&str>,
    search: Option<&str>,
    project_dir: Option<&str>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let query = TicketQuery {
        status: status.map(str::parse::<Status>).transpose()?,
        priority: priority.map(str::parse::<Priority>).transpose()?,
        search: search.map(str::to_string),
    };

    let ctx = HandlerContext::new(project_dir)?;
    let summaries = ctx.desk.list_tickets(actor, &query)?;

    if formatter.is_json() {
        formatter.print_json(&summaries)?;
    } else {
        formatter.print_summaries(&summaries);
    }
    Ok(())
}
