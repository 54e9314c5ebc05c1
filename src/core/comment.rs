use super::{TicketId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comment identifier, strictly increasing within a ticket's comment log
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CommentId(u64);

impl CommentId {
    pub const FIRST: Self = Self(1);

    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A remark in a ticket's append-only comment log
///
/// Comments written as the side effect of a status change are stored the
/// same way as comments typed by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub ticket_id: TicketId,
    pub author: UserId,
    #[serde(rename = "comment")]
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Ordering key for "most recent": newest timestamp, then highest id
    #[must_use]
    pub fn recency_key(&self) -> (DateTime<Utc>, CommentId) {
        (self.created_at, self.id)
    }
}

/// A comment that has not been appended yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub author: UserId,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl NewComment {
    #[must_use]
    pub fn new(author: UserId, body: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            author,
            body: body.into(),
            created_at,
        }
    }

    /// Materialize the comment with its assigned ID
    #[must_use]
    pub fn into_comment(self, id: CommentId, ticket_id: TicketId) -> Comment {
        Comment {
            id,
            ticket_id,
            author: self.author,
            body: self.body,
            created_at: self.created_at,
        }
    }
}
