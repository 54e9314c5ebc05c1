//! Lifecycle event notifications
//!
//! The engine publishes an event after each committed operation so that
//! collaborators (the API server, dashboards, tests) can react without
//! polling. Publishing never fails the operation that produced the event.

use crate::core::{Comment, Status, Ticket, TicketId, UserId};
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 100;

/// Events emitted by the lifecycle engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    TicketCreated {
        ticket: Ticket,
    },
    StatusChanged {
        ticket_id: TicketId,
        old_status: Status,
        new_status: Status,
        by: UserId,
    },
    CommentAdded {
        comment: Comment,
    },
}

/// Broadcast channel for lifecycle events
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<LifecycleEvent>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("receivers", &self.sender.receiver_count())
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventBus {
    /// Create a bus that buffers up to `capacity` events per receiver
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Get an event receiver
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.sender.subscribe()
    }

    /// Notify about a ticket creation
    pub fn notify_ticket_created(&self, ticket: &Ticket) {
        tracing::info!("Ticket created - {} by {}", ticket.id.short(), ticket.owner);
        self.publish(LifecycleEvent::TicketCreated {
            ticket: ticket.clone(),
        });
    }

    /// Notify about a status change
    pub fn notify_status_changed(
        &self,
        ticket_id: &TicketId,
        old_status: Status,
        new_status: Status,
        by: &UserId,
    ) {
        tracing::info!(
            "Status changed - {} from {} to {} by {}",
            ticket_id.short(),
            old_status,
            new_status,
            by
        );
        self.publish(LifecycleEvent::StatusChanged {
            ticket_id: ticket_id.clone(),
            old_status,
            new_status,
            by: by.clone(),
        });
    }

    /// Notify about a new comment
    pub fn notify_comment_added(&self, comment: &Comment) {
        tracing::debug!(
            "Comment {} added to {} by {}",
            comment.id,
            comment.ticket_id.short(),
            comment.author
        );
        self.publish(LifecycleEvent::CommentAdded {
            comment: comment.clone(),
        });
    }

    fn publish(&self, event: LifecycleEvent) {
        // No receivers is fine
        let _ = self.sender.send(event);
    }
}
