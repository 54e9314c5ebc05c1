//! Access policy
//!
//! The single place that decides whether an actor may perform an operation
//! on a ticket in its current state. Checks are pure functions of the actor
//! and the ticket as just read, so nothing is cached between calls.

use crate::core::{Actor, Status, Ticket};
use crate::error::{HelpdeskError, Result};

/// Operations gated by the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    View,
    Comment,
    Transition,
    ListAll,
    Stats,
}

/// Which tickets a listing may include
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope<'a> {
    All,
    OwnedBy(&'a crate::core::UserId),
}

impl Scope<'_> {
    #[must_use]
    pub fn includes(&self, ticket: &Ticket) -> bool {
        match self {
            Self::All => true,
            Self::OwnedBy(user) => ticket.is_owned_by(user),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy;

impl AccessPolicy {
    /// Owners see their own tickets, administrators see everything
    #[must_use]
    pub fn can_view(&self, actor: &Actor, ticket: &Ticket) -> bool {
        actor.is_admin() || ticket.is_owned_by(&actor.id)
    }

    /// Administrators may comment in any state; owners only until resolution
    #[must_use]
    pub fn can_comment(&self, actor: &Actor, ticket: &Ticket) -> bool {
        if actor.is_admin() {
            return true;
        }
        ticket.is_owned_by(&actor.id) && ticket.status != Status::Resolved
    }

    #[must_use]
    pub const fn can_transition(&self, actor: &Actor) -> bool {
        actor.is_admin()
    }

    /// Tickets are filed by users, not administrators
    #[must_use]
    pub const fn can_create(&self, actor: &Actor) -> bool {
        !actor.is_admin()
    }

    /// Listing scope for an actor, applied before any filter
    #[must_use]
    pub fn scope<'a>(&self, actor: &'a Actor) -> Scope<'a> {
        if actor.is_admin() {
            Scope::All
        } else {
            Scope::OwnedBy(&actor.id)
        }
    }

    /// Check an operation that does not depend on a particular ticket
    pub fn authorize(&self, actor: &Actor, operation: Operation) -> Result<()> {
        let allowed = match operation {
            Operation::Create => self.can_create(actor),
            Operation::Transition | Operation::ListAll | Operation::Stats => {
                self.can_transition(actor)
            },
            Operation::View | Operation::Comment => true,
        };
        if allowed {
            Ok(())
        } else {
            Err(denied(actor, operation, None))
        }
    }

    /// Check an operation against a ticket in its current state
    pub fn authorize_on(&self, actor: &Actor, operation: Operation, ticket: &Ticket) -> Result<()> {
        let allowed = match operation {
            Operation::View => self.can_view(actor, ticket),
            Operation::Comment => self.can_comment(actor, ticket),
            Operation::Transition => self.can_transition(actor),
            other => return self.authorize(actor, other),
        };
        if allowed {
            Ok(())
        } else {
            Err(denied(actor, operation, Some(ticket)))
        }
    }
}

fn denied(actor: &Actor, operation: Operation, ticket: Option<&Ticket>) -> HelpdeskError {
    tracing::debug!(actor = %actor.id, role = %actor.role, ?operation, "Access denied");
    let message = match (operation, ticket) {
        (Operation::Create, _) => "Administrators cannot file tickets".to_string(),
        (Operation::View, Some(t)) => format!("{} cannot view ticket {}", actor.id, t.id.short()),
        (Operation::Comment, Some(t)) if t.status == Status::Resolved && t.is_owned_by(&actor.id) => {
            format!("Ticket {} is resolved; comments are closed", t.id.short())
        },
        (Operation::Comment, Some(t)) => {
            format!("{} cannot comment on ticket {}", actor.id, t.id.short())
        },
        (Operation::Transition, _) => "Only administrators can change ticket status".to_string(),
        (Operation::ListAll, _) => "Only administrators can list all tickets".to_string(),
        (Operation::Stats, _) => "Only administrators can view ticket statistics".to_string(),
        (op, _) => format!("{} is not allowed to perform {op:?}", actor.id),
    };
    HelpdeskError::Forbidden(message)
}
