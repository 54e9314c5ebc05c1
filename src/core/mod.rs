//! Core data model for helpdesk
//!
//! Tickets, comments and actors, plus the input validation rules applied when
//! they are created. The lifecycle rules that move a ticket between statuses
//! live in [`crate::lifecycle`]; this module only describes the shapes.

mod actor;
mod builders;
mod clock;
mod comment;
mod ticket;
mod transition;
pub mod validation;

pub use actor::{Actor, Role, UserId};
pub use builders::TicketBuilder;
pub use clock::{Clock, SystemClock};
pub use comment::{Comment, CommentId, NewComment};
pub use ticket::{Priority, Status, Ticket, TicketId};
pub use transition::Transition;

#[cfg(test)]
pub use clock::MockClock;
