use crate::core::{Comment, NewComment, Ticket, TicketId, Transition, UserId};
use crate::error::Result;
use chrono::{DateTime, Utc};

/// Repository trait for ticket storage operations
///
/// This trait defines the interface for storing and retrieving tickets,
/// allowing for different storage implementations.
pub trait TicketRepository: Send + Sync {
    /// Stores a newly created ticket with an empty comment log
    fn create(&self, ticket: &Ticket) -> Result<()>;

    /// Loads a ticket by ID
    fn load(&self, id: &TicketId) -> Result<Ticket>;

    /// Loads all tickets
    fn load_all(&self) -> Result<Vec<Ticket>>;

    /// Checks if a ticket exists by ID
    fn exists(&self, id: &TicketId) -> Result<bool>;

    /// Finds tickets matching a predicate
    fn find<F>(&self, predicate: F) -> Result<Vec<Ticket>>
    where
        F: Fn(&Ticket) -> bool;

    /// Counts tickets matching a predicate
    fn count<F>(&self, predicate: F) -> Result<usize>
    where
        F: Fn(&Ticket) -> bool;
}

/// Repository trait for the per-ticket comment log
pub trait CommentRepository: Send + Sync {
    /// Appends a comment to a ticket's log.
    ///
    /// `guard` is evaluated against the ticket as it stands while the
    /// ticket is locked for the append; if it fails nothing is written.
    fn append_comment<F>(&self, ticket_id: &TicketId, comment: NewComment, guard: F) -> Result<Comment>
    where
        F: FnOnce(&Ticket) -> Result<()>;

    /// All comments on a ticket, oldest first
    fn comments(&self, ticket_id: &TicketId) -> Result<Vec<Comment>>;

    /// Most recent comment by timestamp, ties broken by highest ID
    fn latest_comment(&self, ticket_id: &TicketId) -> Result<Option<Comment>> {
        Ok(self
            .comments(ticket_id)?
            .into_iter()
            .max_by_key(Comment::recency_key))
    }

    /// Every ticket paired with its latest comment. Each pair comes from a
    /// single read, so a status change and its comment are seen together.
    fn tickets_with_latest_comment(&self) -> Result<Vec<(Ticket, Option<Comment>)>>;
}

/// A status change paired with its mandatory comment
#[derive(Debug, Clone)]
pub struct TransitionRequest {
    pub ticket_id: TicketId,
    pub transition: Transition,
    pub actor: UserId,
    pub comment: NewComment,
    pub at: DateTime<Utc>,
}

/// Result of a compare-and-set transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Status and comment were written together
    Applied { ticket: Ticket, comment: Comment },
    /// The ticket was no longer in the transition's source status; nothing was written
    Stale { current: Ticket },
}

/// Repository trait for atomic status transitions
pub trait TransitionRepository: Send + Sync {
    /// Applies `request.transition` only if the ticket is currently in
    /// `request.transition.from()`, appending the paired comment in the
    /// same write.
    fn apply_transition(&self, request: TransitionRequest) -> Result<TransitionOutcome>;
}

/// Combined repository trait
pub trait Repository: TicketRepository + CommentRepository + TransitionRepository {}

/// Implementation of Repository for types that implement all three traits
impl<T> Repository for T where T: TicketRepository + CommentRepository + TransitionRepository {}

use super::file::{FileStorage, TicketRecord};
use crate::core::Status;
use crate::error::HelpdeskError;

impl TicketRepository for FileStorage {
    fn create(&self, ticket: &Ticket) -> Result<()> {
        self.with_ticket_lock(&ticket.id, || {
            if self.record_exists(&ticket.id) {
                return Err(HelpdeskError::custom(format!(
                    "Ticket {} already exists",
                    ticket.id
                )));
            }
            self.write_record(&TicketRecord::new(ticket.clone()))
        })
    }

    fn load(&self, id: &TicketId) -> Result<Ticket> {
        self.read_record(id).map(|record| record.ticket)
    }

    fn load_all(&self) -> Result<Vec<Ticket>> {
        Ok(self
            .load_all_records()?
            .into_iter()
            .map(|record| record.ticket)
            .collect())
    }

    fn exists(&self, id: &TicketId) -> Result<bool> {
        match self.read_record(id) {
            Ok(_) => Ok(true),
            Err(HelpdeskError::TicketNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn find<F>(&self, predicate: F) -> Result<Vec<Ticket>>
    where
        F: Fn(&Ticket) -> bool,
    {
        let tickets = self.load_all()?;
        Ok(tickets.into_iter().filter(predicate).collect())
    }

    fn count<F>(&self, predicate: F) -> Result<usize>
    where
        F: Fn(&Ticket) -> bool,
    {
        let tickets = self.load_all()?;
        Ok(tickets.iter().filter(|t| predicate(t)).count())
    }
}

impl CommentRepository for FileStorage {
    fn append_comment<F>(&self, ticket_id: &TicketId, comment: NewComment, guard: F) -> Result<Comment>
    where
        F: FnOnce(&Ticket) -> Result<()>,
    {
        self.with_ticket_lock(ticket_id, || {
            let mut record = self.read_record(ticket_id)?;
            guard(&record.ticket)?;
            let comment = record.push_comment(comment);
            self.write_record(&record)?;
            Ok(comment)
        })
    }

    fn comments(&self, ticket_id: &TicketId) -> Result<Vec<Comment>> {
        self.read_record(ticket_id).map(|record| record.comments)
    }

    fn tickets_with_latest_comment(&self) -> Result<Vec<(Ticket, Option<Comment>)>> {
        Ok(self
            .load_all_records()?
            .into_iter()
            .map(|record| {
                let latest = record.latest_comment().cloned();
                (record.ticket, latest)
            })
            .collect())
    }
}

impl TransitionRepository for FileStorage {
    fn apply_transition(&self, request: TransitionRequest) -> Result<TransitionOutcome> {
        let TransitionRequest {
            ticket_id,
            transition,
            actor,
            comment,
            at,
        } = request;

        self.with_ticket_lock(&ticket_id, || {
            let mut record = self.read_record(&ticket_id)?;
            let current: Status = record.ticket.status;
            if current != transition.from() {
                return Ok(TransitionOutcome::Stale {
                    current: record.ticket,
                });
            }

            transition.apply_to(&mut record.ticket, &actor, at);
            let comment = record.push_comment(comment);
            self.write_record(&record)?;

            Ok(TransitionOutcome::Applied {
                ticket: record.ticket,
                comment,
            })
        })
    }
}
