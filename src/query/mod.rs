//! Ticket listing, filtering and statistics

use crate::core::{Comment, Priority, Status, Ticket};
use crate::policy::Scope;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Filters for ticket listings; all provided filters must match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketQuery {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    /// Case-insensitive substring over title and description
    pub search: Option<String>,
}

impl TicketQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    /// Lowercased search needle, `None` when absent or blank
    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    #[must_use]
    pub fn matches(&self, ticket: &Ticket) -> bool {
        self.matches_with(ticket, self.needle().as_deref())
    }

    fn matches_with(&self, ticket: &Ticket, needle: Option<&str>) -> bool {
        if let Some(status) = self.status {
            if ticket.status != status {
                return false;
            }
        }

        if let Some(priority) = self.priority {
            if ticket.priority != priority {
                return false;
            }
        }

        if let Some(needle) = needle {
            if !ticket.matches_text(needle) {
                return false;
            }
        }

        true
    }

    /// Restrict `tickets` to `scope`, apply the filters, and order newest first
    #[must_use]
    pub fn apply(&self, scope: &Scope<'_>, tickets: Vec<Ticket>) -> Vec<Ticket> {
        let needle = self.needle();
        let mut selected: Vec<Ticket> = tickets
            .into_iter()
            .filter(|t| scope.includes(t))
            .filter(|t| self.matches_with(t, needle.as_deref()))
            .collect();
        sort_newest_first(&mut selected);
        selected
    }
}

/// Order by creation time descending, ties broken by ticket ID descending
pub fn sort_newest_first(tickets: &mut [Ticket]) {
    tickets.sort_by_key(|t| Reverse((t.created_at, t.id.clone())));
}

/// A ticket with its most recent comment, for list views
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketSummary {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub last_comment: Option<Comment>,
}

/// Dashboard counts across a set of tickets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketStats {
    pub open: usize,
    #[serde(rename = "in_progress")]
    pub in_progress: usize,
    pub resolved: usize,
    pub total: usize,
    /// Mean `resolved_at - created_at` in hours over resolved tickets
    #[serde(rename = "averageResolutionTime")]
    pub average_resolution_hours: f64,
}

impl TicketStats {
    #[must_use]
    pub fn from_tickets(tickets: &[Ticket]) -> Self {
        let mut stats = Self {
            total: tickets.len(),
            ..Self::default()
        };
        let mut resolution_secs = 0i64;
        let mut resolved_with_time = 0u32;

        for ticket in tickets {
            match ticket.status {
                Status::Open => stats.open += 1,
                Status::InProgress => stats.in_progress += 1,
                Status::Resolved => {
                    stats.resolved += 1;
                    if let Some(resolved_at) = ticket.resolved_at {
                        resolution_secs += (resolved_at - ticket.created_at).num_seconds();
                        resolved_with_time += 1;
                    }
                },
            }
        }

        if resolved_with_time > 0 {
            #[allow(clippy::cast_precision_loss)]
            let avg = resolution_secs as f64 / f64::from(resolved_with_time) / 3600.0;
            stats.average_resolution_hours = avg;
        }
        stats
    }
}
