//! Command handlers
//!
//! Each handler opens the project through [`HandlerContext`], performs one
//! engine operation on behalf of the acting user, and reports the result
//! through the [`OutputFormatter`](crate::cli::OutputFormatter).

mod comment;
mod common;
mod init;
mod stats;
mod ticket;
mod workflow;

pub use comment::{handle_comment_command, handle_comments_command};
pub use common::HandlerContext;
pub use init::handle_init;
#[cfg(feature = "api")]
pub use stats::handle_serve_command;
pub use stats::handle_stats_command;
pub use ticket::{handle_list_command, handle_new_command, handle_show_command};
pub use workflow::{handle_reopen_command, handle_resolve_command};
