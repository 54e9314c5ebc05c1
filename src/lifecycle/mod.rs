//! Lifecycle engine
//!
//! [`Helpdesk`] is the entry point for every ticket operation. Each call
//! takes the acting [`Actor`] explicitly, consults the [`AccessPolicy`],
//! and for status changes hands the store a single compare-and-set request
//! that carries both the new status and its mandatory comment.
//!
//! # Transitions
//!
//! | From          | To            | Operation          | Comment                       |
//! |---------------|---------------|--------------------|-------------------------------|
//! | `open`        | `in_progress` | [`Helpdesk::begin_handling`] | configured handling text |
//! | `in_progress` | `resolved`    | [`Helpdesk::resolve_ticket`] | the resolution text      |
//! | `resolved`    | `in_progress` | [`Helpdesk::reopen_ticket`]  | configured reopen text   |
//!
//! `begin_handling` runs whenever an administrator loads an open ticket
//! through [`Helpdesk::get_ticket`]. It is idempotent: once the ticket has
//! left `open`, further calls return the ticket unchanged.

use crate::config::{Config, DATA_DIR, WorkflowConfig};
use crate::core::validation::{validate_comment, validate_description, validate_title};
use crate::core::{
    Actor, Clock, Comment, NewComment, Priority, Status, SystemClock, Ticket, TicketId,
    Transition,
};
use crate::error::{HelpdeskError, Result};
use crate::events::EventBus;
use crate::policy::{AccessPolicy, Operation};
use crate::query::{TicketQuery, TicketStats, TicketSummary};
use crate::storage::{FileStorage, Repository, TransitionOutcome, TransitionRequest};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Help-desk service over a ticket repository
pub struct Helpdesk<R> {
    repo: R,
    policy: AccessPolicy,
    workflow: WorkflowConfig,
    clock: Arc<dyn Clock>,
    events: EventBus,
}

impl Helpdesk<FileStorage> {
    /// Open the file-backed help desk of an initialized project
    pub fn open_project(project_root: &Path, config: &Config) -> Result<Self> {
        let storage =
            FileStorage::with_config(project_root.join(DATA_DIR), config.storage.clone());
        if !storage.is_initialized() {
            return Err(HelpdeskError::ProjectNotInitialized);
        }
        Ok(Self::new(storage, config.workflow.clone()))
    }
}

impl<R: Repository> Helpdesk<R> {
    #[must_use]
    pub fn new(repo: R, workflow: WorkflowConfig) -> Self {
        Self {
            repo,
            policy: AccessPolicy,
            workflow,
            clock: Arc::new(SystemClock),
            events: EventBus::default(),
        }
    }

    /// Replace the timestamp source
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Publish events on an existing bus
    #[must_use]
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    pub const fn repository(&self) -> &R {
        &self.repo
    }

    /// File a new ticket in `open` state
    pub fn create_ticket(
        &self,
        actor: &Actor,
        title: &str,
        description: &str,
        priority: Option<Priority>,
    ) -> Result<Ticket> {
        self.policy.authorize(actor, Operation::Create)?;
        let title = validate_title(title)?;
        let description = validate_description(description)?;
        let priority = priority.unwrap_or(self.workflow.default_priority);

        let ticket = Ticket::new(actor.id.clone(), title, description, priority, self.clock.now());
        self.repo.create(&ticket)?;
        self.events.notify_ticket_created(&ticket);
        Ok(ticket)
    }

    /// Load a ticket the actor may view.
    ///
    /// When an administrator loads an `open` ticket this also performs
    /// [`Self::begin_handling`] and returns the updated ticket.
    pub fn get_ticket(&self, actor: &Actor, id: &TicketId) -> Result<Ticket> {
        let ticket = self.repo.load(id)?;
        self.policy.authorize_on(actor, Operation::View, &ticket)?;

        if actor.is_admin() && ticket.status == Status::Open {
            return self.begin_handling(actor, id);
        }
        Ok(ticket)
    }

    /// Move an `open` ticket to `in_progress` on first administrator contact.
    ///
    /// Appends the handling comment authored by `actor` and assigns the
    /// ticket to them. A no-op for tickets that already left `open`,
    /// including when a concurrent caller got there first.
    pub fn begin_handling(&self, actor: &Actor, id: &TicketId) -> Result<Ticket> {
        self.policy.authorize(actor, Operation::Transition)?;
        let ticket = self.repo.load(id)?;
        if ticket.status != Status::Open {
            tracing::debug!(ticket = %id.short(), status = %ticket.status, "Already handled");
            return Ok(ticket);
        }

        let comment = self.workflow.handling_comment.clone();
        match self.commit(actor, id, Transition::BeginHandling, comment)? {
            TransitionOutcome::Applied { ticket, .. } => Ok(ticket),
            TransitionOutcome::Stale { current } => {
                tracing::debug!(ticket = %id.short(), "Handling already started concurrently");
                Ok(current)
            },
        }
    }

    /// Resolve an `in_progress` ticket with a mandatory resolution comment
    pub fn resolve_ticket(&self, actor: &Actor, id: &TicketId, resolution: &str) -> Result<Ticket> {
        self.policy.authorize(actor, Operation::Transition)?;
        let resolution = validate_comment(resolution, "Resolution comment")?;
        self.transition(actor, id, Transition::Resolve, resolution)
    }

    /// Reopen a `resolved` ticket.
    ///
    /// Callers are expected to have obtained explicit confirmation from the
    /// administrator before invoking this.
    pub fn reopen_ticket(&self, actor: &Actor, id: &TicketId) -> Result<Ticket> {
        self.policy.authorize(actor, Operation::Transition)?;
        let comment = self.workflow.reopen_comment.clone();
        self.transition(actor, id, Transition::Reopen, comment)
    }

    /// Append a comment, subject to the comment rule for the ticket's current status
    pub fn add_comment(&self, actor: &Actor, id: &TicketId, body: &str) -> Result<Comment> {
        let body = validate_comment(body, "Comment")?;
        let policy = self.policy;
        let new_comment = NewComment::new(actor.id.clone(), body, self.clock.now());

        let comment = self.repo.append_comment(id, new_comment, |ticket| {
            policy.authorize_on(actor, Operation::View, ticket)?;
            policy.authorize_on(actor, Operation::Comment, ticket)
        })?;
        self.events.notify_comment_added(&comment);
        Ok(comment)
    }

    /// Comments on a ticket the actor may view, oldest first
    pub fn list_comments(&self, actor: &Actor, id: &TicketId) -> Result<Vec<Comment>> {
        let ticket = self.repo.load(id)?;
        self.policy.authorize_on(actor, Operation::View, &ticket)?;

        let mut comments = self.repo.comments(id)?;
        comments.sort_by_key(Comment::recency_key);
        Ok(comments)
    }

    /// List tickets within the actor's scope, newest first
    pub fn list_tickets(&self, actor: &Actor, query: &TicketQuery) -> Result<Vec<TicketSummary>> {
        let scope = self.policy.scope(actor);
        let (tickets, mut latest): (Vec<Ticket>, HashMap<TicketId, Option<Comment>>) = self
            .repo
            .tickets_with_latest_comment()?
            .into_iter()
            .map(|(ticket, comment)| {
                let id = ticket.id.clone();
                (ticket, (id, comment))
            })
            .unzip();

        let tickets = query.apply(&scope, tickets);
        tracing::debug!(actor = %actor.id, count = tickets.len(), "Listed tickets");

        Ok(tickets
            .into_iter()
            .map(|ticket| TicketSummary {
                last_comment: latest.remove(&ticket.id).flatten(),
                ticket,
            })
            .collect())
    }

    /// Administrator listing over the full ticket set
    pub fn list_all_tickets(
        &self,
        actor: &Actor,
        query: &TicketQuery,
    ) -> Result<Vec<TicketSummary>> {
        self.policy.authorize(actor, Operation::ListAll)?;
        self.list_tickets(actor, query)
    }

    /// Dashboard counts, administrators only
    pub fn ticket_stats(&self, actor: &Actor) -> Result<TicketStats> {
        self.policy.authorize(actor, Operation::Stats)?;
        Ok(TicketStats::from_tickets(&self.repo.load_all()?))
    }

    /// Check the source status, then commit; a lost race becomes `Conflict`
    fn transition(
        &self,
        actor: &Actor,
        id: &TicketId,
        transition: Transition,
        comment: String,
    ) -> Result<Ticket> {
        let ticket = self.repo.load(id)?;
        if ticket.status != transition.from() {
            return Err(HelpdeskError::InvalidState {
                operation: transition.verb(),
                status: ticket.status,
            });
        }

        match self.commit(actor, id, transition, comment)? {
            TransitionOutcome::Applied { ticket, .. } => Ok(ticket),
            TransitionOutcome::Stale { current } => {
                tracing::warn!(
                    ticket = %id.short(),
                    expected = %transition.from(),
                    actual = %current.status,
                    "Transition lost a concurrent update"
                );
                Err(HelpdeskError::Conflict {
                    id: id.to_string(),
                    expected: transition.from(),
                    actual: current.status,
                })
            },
        }
    }

    fn commit(
        &self,
        actor: &Actor,
        id: &TicketId,
        transition: Transition,
        comment: String,
    ) -> Result<TransitionOutcome> {
        let now = self.clock.now();
        let outcome = self.repo.apply_transition(TransitionRequest {
            ticket_id: id.clone(),
            transition,
            actor: actor.id.clone(),
            comment: NewComment::new(actor.id.clone(), comment, now),
            at: now,
        })?;

        if let TransitionOutcome::Applied { ticket, comment } = &outcome {
            self.events.notify_status_changed(
                &ticket.id,
                transition.from(),
                transition.to(),
                &actor.id,
            );
            self.events.notify_comment_added(comment);
        }
        Ok(outcome)
    }
}
