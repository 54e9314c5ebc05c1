//! helpdesk - A help-desk ticket tracker with an enforced resolution workflow
//!
//! Users file tickets and discuss them in a per-ticket comment log.
//! Administrators pick tickets up, resolve them with a mandatory resolution
//! comment, and reopen them when needed. Every status change is written
//! together with the comment that explains it.
//!
//! - [`lifecycle`] the engine that owns every ticket operation
//! - [`policy`] who may view, comment on, or transition a ticket
//! - [`query`] scoped, filtered, ordered listings and statistics
//! - [`storage`] the YAML file store with per-ticket locking
//! - [`cli`] and `api` (feature `api`) are the outer surfaces

// Allow missing error documentation for internal implementations
#![allow(clippy::missing_errors_doc)]
// Allow some pedantic lints that don't improve code quality
#![allow(clippy::option_if_let_else)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_self)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::too_many_lines)]

//! # Concurrent Safety
//!
//! Status changes are compare-and-set: the store re-reads the ticket under
//! its lock file and only writes when the ticket is still in the expected
//! status. Two administrators resolving the same ticket produce exactly one
//! resolution; the other receives a conflict error.
//!
//! # Example
//!
//! ```rust,ignore
//! use helpdesk::config::WorkflowConfig;
//! use helpdesk::core::Actor;
//! use helpdesk::lifecycle::Helpdesk;
//! use helpdesk::storage::FileStorage;
//!
//! let desk = Helpdesk::new(FileStorage::new(".helpdesk"), WorkflowConfig::default());
//! let ticket = desk.create_ticket(&Actor::user("alice"), "Printer jam", "Jams on every job", None)?;
//!
//! // First administrator view starts handling
//! let ticket = desk.get_ticket(&Actor::admin("ops"), &ticket.id)?;
//! desk.resolve_ticket(&Actor::admin("ops"), &ticket.id, "Replaced the fuser")?;
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod policy;
pub mod query;
pub mod storage;

#[cfg(feature = "api")]
pub mod api;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use error::{HelpdeskError, Result};
pub use lifecycle::Helpdesk;
