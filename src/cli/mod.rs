//! Command-line interface for helpdesk
//!
//! Argument definitions live here; each subcommand is implemented by a
//! handler in [`handlers`] that receives the resolved [`Actor`] and an
//! [`OutputFormatter`].

pub mod handlers;
pub mod output;
pub mod utils;

pub use output::OutputFormatter;

use crate::core::{Actor, Role};
use crate::error::{HelpdeskError, Result};
use clap::{Parser, Subcommand};

/// Help-desk ticket tracker
#[derive(Parser, Debug)]
#[command(name = "helpdesk", version, about, long_about = None)]
pub struct Cli {
    /// Output results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project directory (defaults to the nearest directory containing .helpdesk)
    #[arg(short, long, global = true, value_name = "DIR")]
    pub project: Option<String>,

    /// Act as this user
    #[arg(long = "as", global = true, env = "HELPDESK_USER", value_name = "USER")]
    pub user: Option<String>,

    /// Role of the acting user (user or admin)
    #[arg(long, global = true, env = "HELPDESK_ROLE", default_value = "user")]
    pub role: String,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// The acting user, from `--as`/`--role` or their environment variables
    pub fn actor(&self) -> Result<Actor> {
        let id = self
            .user
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                HelpdeskError::validation("No acting user. Pass --as <user> or set HELPDESK_USER")
            })?;
        let role: Role = self.role.parse()?;
        Ok(Actor::new(id, role))
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a help desk in the current directory
    Init {
        /// Project name
        #[arg(short, long)]
        name: Option<String>,

        /// Project description
        #[arg(short, long)]
        description: Option<String>,

        /// Reinitialize an existing help desk
        #[arg(short, long)]
        force: bool,
    },

    /// File a new ticket
    New {
        /// Short summary (at least 5 characters)
        title: String,

        /// Full description (at least 10 characters)
        #[arg(short, long)]
        description: String,

        /// Priority: low, medium or high
        #[arg(short = 'P', long)]
        priority: Option<String>,
    },

    /// Show a ticket; administrators viewing an open ticket start handling it
    Show {
        /// Ticket ID or unique ID prefix
        ticket: String,

        /// Also print the comment log
        #[arg(short, long)]
        comments: bool,
    },

    /// List tickets visible to the acting user
    List {
        /// Filter by status (open, in_progress, resolved)
        #[arg(short, long)]
        status: Option<String>,

        /// Filter by priority (low, medium, high)
        #[arg(short = 'P', long)]
        priority: Option<String>,

        /// Case-insensitive text search over title and description
        #[arg(short = 'q', long)]
        search: Option<String>,
    },

    /// Add a comment to a ticket
    Comment {
        /// Ticket ID or unique ID prefix
        ticket: String,

        /// Comment text
        body: String,
    },

    /// Print a ticket's comment log, oldest first
    Comments {
        /// Ticket ID or unique ID prefix
        ticket: String,
    },

    /// Resolve an in-progress ticket (administrators)
    Resolve {
        /// Ticket ID or unique ID prefix
        ticket: String,

        /// Resolution comment; prompted for when omitted
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Reopen a resolved ticket (administrators)
    Reopen {
        /// Ticket ID or unique ID prefix
        ticket: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show ticket counts and average resolution time (administrators)
    Stats,

    /// Serve the REST API
    #[cfg(feature = "api")]
    Serve {
        /// Address to bind (defaults to the configured host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (defaults to the configured port)
        #[arg(long)]
        port: Option<u16>,
    },
}
