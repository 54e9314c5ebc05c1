//! Administrator workflow commands: `resolve` and `reopen`

use super::common::HandlerContext;
use crate::cli::output::OutputFormatter;
use crate::core::Actor;
use crate::error::Result;
use dialoguer::{Confirm, Input, theme::ColorfulTheme};

/// Resolve a ticket, prompting for the resolution comment when not given
pub fn handle_resolve_command(
    actor: &Actor,
    ticket_ref: &str,
    message: Option<String>,
    project_dir: Option<&str>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let ctx = HandlerContext::new(project_dir)?;
    let id = ctx.resolve_ticket_ref(ticket_ref)?;

    let resolution = if let Some(message) = message {
        message
    } else {
        Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt("Resolution comment")
            .interact_text()?
    };

    let ticket = ctx.desk.resolve_ticket(actor, &id, &resolution)?;

    if formatter.is_json() {
        formatter.print_json(&ticket)?;
    } else {
        formatter.success(&format!("Resolved ticket {} '{}'", id.short(), ticket.title));
    }
    Ok(())
}

/// Reopen a resolved ticket after confirmation
pub fn handle_reopen_command(
    actor: &Actor,
    ticket_ref: &str,
    yes: bool,
    project_dir: Option<&str>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let ctx = HandlerContext::new(project_dir)?;
    let id = ctx.resolve_ticket_ref(ticket_ref)?;

    if !yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Reopen ticket {}?", id.short()))
            .default(false)
            .interact()?;
        if !confirmed {
            formatter.info("Reopen cancelled");
            return Ok(());
        }
    }

    let ticket = ctx.desk.reopen_ticket(actor, &id)?;

    if formatter.is_json() {
        formatter.print_json(&ticket)?;
    } else {
        formatter.success(&format!("Reopened ticket {} '{}'", id.short(), ticket.title));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Priority, Status};
    use crate::error::HelpdeskError;
    use crate::storage::{CommentRepository, TicketRepository};
    use crate::test_utils::{TestProject, create_test_ticket};

    #[test]
    fn test_resolve_then_reopen() {
        let project = TestProject::new();
        let root = project.project_root.to_str();
        let formatter = OutputFormatter::new(true, true);
        let ticket = create_test_ticket("Printer jam", "alice", Priority::Low, Status::InProgress);
        project.save_ticket(&ticket);
        let ops = Actor::admin("ops");

        handle_resolve_command(
            &ops,
            &ticket.id.to_string(),
            Some("Replaced fuser".to_string()),
            root,
            &formatter,
        )
        .unwrap();
        assert_eq!(project.storage.load(&ticket.id).unwrap().status, Status::Resolved);

        handle_reopen_command(&ops, &ticket.id.to_string(), true, root, &formatter).unwrap();
        assert_eq!(project.storage.load(&ticket.id).unwrap().status, Status::InProgress);
        assert_eq!(project.storage.comments(&ticket.id).unwrap().len(), 2);
    }

    #[test]
    fn test_resolve_blank_message_is_rejected() {
        let project = TestProject::new();
        let ticket = create_test_ticket("Printer jam", "alice", Priority::Low, Status::InProgress);
        project.save_ticket(&ticket);

        let result = handle_resolve_command(
            &Actor::admin("ops"),
            &ticket.id.to_string(),
            Some("  ".to_string()),
            project.project_root.to_str(),
            &OutputFormatter::new(true, true),
        );
        assert!(matches!(result, Err(HelpdeskError::Validation(_))));
        assert_eq!(project.storage.load(&ticket.id).unwrap().status, Status::InProgress);
    }
}
