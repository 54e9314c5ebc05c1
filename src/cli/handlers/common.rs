use crate::cli::utils::find_project_root;
use crate::config::Config;
use crate::core::TicketId;
use crate::error::{HelpdeskError, Result};
use crate::lifecycle::Helpdesk;
use crate::storage::{FileStorage, TicketRepository};
use std::path::PathBuf;

/// Shortest accepted ID prefix
const MIN_PREFIX_LEN: usize = 4;

/// Common context for all handler operations
pub struct HandlerContext {
    pub project_root: PathBuf,
    pub config: Config,
    pub desk: Helpdesk<FileStorage>,
}

impl HandlerContext {
    /// Locate the project, load its configuration and open the store
    pub fn new(project_dir: Option<&str>) -> Result<Self> {
        let project_root = find_project_root(project_dir)?;
        let config = Config::load(Some(&project_root))?;
        let desk = Helpdesk::open_project(&project_root, &config)?;
        tracing::debug!(root = %project_root.display(), "Opened help desk");

        Ok(Self {
            project_root,
            config,
            desk,
        })
    }

    /// Resolve a full ticket ID or a unique prefix of one
    pub fn resolve_ticket_ref(&self, ticket_ref: &str) -> Result<TicketId> {
        let ticket_ref = ticket_ref.trim();
        if let Ok(id) = TicketId::parse_str(ticket_ref) {
            return Ok(id);
        }

        let not_found = || HelpdeskError::TicketNotFound {
            id: ticket_ref.to_string(),
        };
        if ticket_ref.len() < MIN_PREFIX_LEN {
            return Err(not_found());
        }

        let prefix = ticket_ref.to_lowercase();
        let mut matches = self
            .desk
            .repository()
            .find(|t| t.id.to_string().starts_with(&prefix))?;
        match matches.len() {
            0 => Err(not_found()),
            1 => Ok(matches.remove(0).id),
            n => Err(HelpdeskError::validation(format!(
                "Ticket reference '{ticket_ref}' is ambiguous ({n} matches)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Priority, Status};
    use crate::test_utils::{TestProject, create_test_ticket};

    #[test]
    fn test_resolve_by_full_id_and_prefix() {
        let project = TestProject::new();
        let ticket = create_test_ticket("Printer jam", "alice", Priority::Low, Status::Open);
        project.save_ticket(&ticket);

        let ctx = HandlerContext::new(project.project_root.to_str()).unwrap();
        assert_eq!(ctx.resolve_ticket_ref(&ticket.id.to_string()).unwrap(), ticket.id);
        assert_eq!(ctx.resolve_ticket_ref(&ticket.id.short()).unwrap(), ticket.id);
    }

    #[test]
    fn test_resolve_unknown_reference() {
        let project = TestProject::new();
        let ctx = HandlerContext::new(project.project_root.to_str()).unwrap();

        assert!(matches!(
            ctx.resolve_ticket_ref("abc"),
            Err(HelpdeskError::TicketNotFound { .. })
        ));
        assert!(matches!(
            ctx.resolve_ticket_ref("deadbeef"),
            Err(HelpdeskError::TicketNotFound { .. })
        ));
    }
}
