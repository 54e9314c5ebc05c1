//! Persistence for tickets and their comment logs

mod file;
mod lock;
mod repository;

pub use file::{FileStorage, ProjectState, TicketRecord};
pub use repository::{
    CommentRepository, Repository, TicketRepository, TransitionOutcome, TransitionRepository,
    TransitionRequest,
};
