use super::{Status, Ticket, UserId};
use chrono::{DateTime, Utc};
use std::fmt;

/// Administrator-triggered status changes
///
/// Each transition has exactly one legal source status and one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// `open -> in_progress`, fired the first time an administrator loads the ticket
    BeginHandling,
    /// `in_progress -> resolved`, carries the resolution comment
    Resolve,
    /// `resolved -> in_progress`
    Reopen,
}

impl Transition {
    #[must_use]
    pub const fn from(self) -> Status {
        match self {
            Self::BeginHandling => Status::Open,
            Self::Resolve => Status::InProgress,
            Self::Reopen => Status::Resolved,
        }
    }

    #[must_use]
    pub const fn to(self) -> Status {
        match self {
            Self::BeginHandling | Self::Reopen => Status::InProgress,
            Self::Resolve => Status::Resolved,
        }
    }

    /// Verb used in error messages
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::BeginHandling => "begin handling",
            Self::Resolve => "resolve",
            Self::Reopen => "reopen",
        }
    }

    /// Update `ticket` to the target status.
    ///
    /// The caller must have checked that `ticket.status == self.from()`.
    pub fn apply_to(self, ticket: &mut Ticket, by: &UserId, at: DateTime<Utc>) {
        debug_assert_eq!(ticket.status, self.from());
        ticket.status = self.to();
        ticket.updated_at = at;
        match self {
            Self::BeginHandling => {
                if ticket.assignee.is_none() {
                    ticket.assignee = Some(by.clone());
                }
            },
            Self::Resolve => ticket.resolved_at = Some(at),
            Self::Reopen => ticket.resolved_at = None,
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from(), self.to())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_transition_targets_open() {
        for t in [Transition::BeginHandling, Transition::Resolve, Transition::Reopen] {
            assert_ne!(t.to(), Status::Open);
            assert_ne!(t.from(), t.to());
        }
    }

    #[test]
    fn test_apply_to_tracks_assignee_and_resolution() {
        let mut ticket = crate::core::TicketBuilder::new().owner("alice").build();
        let admin = UserId::from("ops");
        let now = Utc::now();

        Transition::BeginHandling.apply_to(&mut ticket, &admin, now);
        assert_eq!(ticket.status, Status::InProgress);
        assert_eq!(ticket.assignee, Some(admin.clone()));

        Transition::Resolve.apply_to(&mut ticket, &admin, now);
        assert_eq!(ticket.status, Status::Resolved);
        assert_eq!(ticket.resolved_at, Some(now));

        Transition::Reopen.apply_to(&mut ticket, &UserId::from("other"), now);
        assert_eq!(ticket.status, Status::InProgress);
        assert!(ticket.resolved_at.is_none());
        assert_eq!(ticket.assignee, Some(admin));
    }

    #[test]
    fn test_display() {
        assert_eq!(Transition::Reopen.to_string(), "resolved -> in_progress");
    }
}
