//! YAML file store
//!
//! Layout under the data directory:
//!
//! ```text
//! .helpdesk/
//!   state.yaml
//!   config.yaml
//!   tickets/<uuid>.yaml    ticket + its comment log
//!   tickets/<uuid>.lock    present while a writer holds the ticket
//! ```
//!
//! A ticket and its comment log share one file. Every write goes to a
//! temporary file that is then renamed over the original, so readers see
//! either the old record or the new one, never a status change without
//! its comment.

use super::lock::FileLock;
use crate::config::StorageConfig;
use crate::core::{Comment, CommentId, NewComment, Ticket, TicketId};
use crate::error::{HelpdeskError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const TICKETS_DIR: &str = "tickets";
const STATE_FILE: &str = "state.yaml";

/// Project-level metadata written by `init`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectState {
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// On-disk unit: one ticket and its append-only comment log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRecord {
    pub ticket: Ticket,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl TicketRecord {
    #[must_use]
    pub const fn new(ticket: Ticket) -> Self {
        Self {
            ticket,
            comments: Vec::new(),
        }
    }

    /// Most recent comment by timestamp, ties broken by highest ID
    #[must_use]
    pub fn latest_comment(&self) -> Option<&Comment> {
        self.comments.iter().max_by_key(|c| c.recency_key())
    }

    fn next_comment_id(&self) -> CommentId {
        self.comments
            .iter()
            .map(|c| c.id)
            .max()
            .map_or(CommentId::FIRST, CommentId::next)
    }

    /// Append a comment, assigning the next ID
    pub fn push_comment(&mut self, comment: NewComment) -> Comment {
        let comment = comment.into_comment(self.next_comment_id(), self.ticket.id.clone());
        self.comments.push(comment.clone());
        comment
    }
}

/// File-based storage for tickets and comments
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_dir: PathBuf,
    settings: StorageConfig,
}

impl FileStorage {
    /// Create a store rooted at the `.helpdesk` data directory
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self::with_config(base_dir, StorageConfig::default())
    }

    pub fn with_config(base_dir: impl AsRef<Path>, settings: StorageConfig) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            settings,
        }
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn tickets_dir(&self) -> PathBuf {
        self.base_dir.join(TICKETS_DIR)
    }

    fn ticket_path(&self, id: &TicketId) -> PathBuf {
        self.tickets_dir().join(format!("{id}.yaml"))
    }

    fn lock_path(&self, id: &TicketId) -> PathBuf {
        self.tickets_dir().join(format!("{id}.lock"))
    }

    /// Create the data directory layout if missing
    pub fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(self.tickets_dir())?;
        Ok(())
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.base_dir.join(STATE_FILE).exists()
    }

    pub fn save_state(&self, state: &ProjectState) -> Result<()> {
        fs::create_dir_all(&self.base_dir)?;
        write_atomically(&self.base_dir.join(STATE_FILE), &serde_yaml::to_string(state)?)
    }

    pub fn load_state(&self) -> Result<ProjectState> {
        let path = self.base_dir.join(STATE_FILE);
        if !path.exists() {
            return Err(HelpdeskError::ProjectNotInitialized);
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    pub(crate) fn record_exists(&self, id: &TicketId) -> bool {
        self.ticket_path(id).exists()
    }

    /// Read a ticket record; `TicketNotFound` when the file is absent
    pub fn read_record(&self, id: &TicketId) -> Result<TicketRecord> {
        let path = self.ticket_path(id);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(HelpdeskError::TicketNotFound { id: id.to_string() });
            },
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(ticket = %id.short(), "Read ticket record");
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Write a ticket record. Callers must hold the ticket's lock.
    pub(crate) fn write_record(&self, record: &TicketRecord) -> Result<()> {
        let content = serde_yaml::to_string(record)?;
        write_atomically(&self.ticket_path(&record.ticket.id), &content)
    }

    /// Read every ticket record in the store
    pub fn load_all_records(&self) -> Result<Vec<TicketRecord>> {
        let dir = self.tickets_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                // Renamed away between listing and reading; skip it
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            records.push(serde_yaml::from_str(&content)?);
        }
        Ok(records)
    }

    /// Run `f` while holding the ticket's lock file
    pub(crate) fn with_ticket_lock<T>(
        &self,
        id: &TicketId,
        f: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        let _lock = FileLock::acquire(self.lock_path(id), id, &self.settings)?;
        f()
    }
}

fn write_atomically(path: &Path, content: &str) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
