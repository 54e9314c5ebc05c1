//! Test utilities for helpdesk
//!
//! Common fixtures shared by the unit tests across the crate.

#![cfg(test)]

use crate::config::{DATA_DIR, WorkflowConfig};
use crate::core::{Priority, Status, Ticket, TicketBuilder};
use crate::lifecycle::Helpdesk;
use crate::storage::{FileStorage, ProjectState, TicketRepository};
use chrono::Utc;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test fixture for a temporary, initialized project
pub struct TestProject {
    pub temp_dir: TempDir,
    pub project_root: PathBuf,
    pub data_dir: PathBuf,
    pub storage: FileStorage,
}

impl TestProject {
    /// Create a new test project with an initialized `.helpdesk` directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let project_root = temp_dir.path().to_path_buf();
        let data_dir = project_root.join(DATA_DIR);

        let storage = FileStorage::new(&data_dir);
        storage
            .ensure_directories()
            .expect("Failed to create data dir");
        storage
            .save_state(&ProjectState {
                name: "test".to_string(),
                description: None,
                created_at: Utc::now(),
            })
            .expect("Failed to save project state");

        Self {
            temp_dir,
            project_root,
            data_dir,
            storage,
        }
    }

    /// Create a test project with one ticket per status, owned by `alice`
    pub fn with_sample_tickets() -> Self {
        let project = Self::new();
        for (title, priority, status) in [
            ("Fix login bug", Priority::High, Status::Open),
            ("Add search feature", Priority::Medium, Status::InProgress),
            ("Update documentation", Priority::Low, Status::Resolved),
        ] {
            project.save_ticket(&create_test_ticket(title, "alice", priority, status));
        }
        project
    }

    /// Engine over this project's storage with default workflow texts
    pub fn helpdesk(&self) -> Helpdesk<FileStorage> {
        Helpdesk::new(self.storage.clone(), WorkflowConfig::default())
    }

    pub fn save_ticket(&self, ticket: &Ticket) {
        self.storage.create(ticket).expect("Failed to save ticket");
    }
}

/// Create a test ticket with default values
pub fn create_test_ticket(title: &str, owner: &str, priority: Priority, status: Status) -> Ticket {
    let mut builder = TicketBuilder::new()
        .title(title)
        .description(format!("Description for {title}"))
        .owner(owner)
        .priority(priority)
        .status(status);
    if status == Status::Resolved {
        builder = builder.resolved_at(Utc::now());
    }
    builder.build()
}

#[test]
fn test_sample_project_has_one_ticket_per_status() {
    let project = TestProject::with_sample_tickets();
    let tickets = project.storage.load_all().expect("Failed to load tickets");
    assert_eq!(tickets.len(), 3);
    for status in Status::ALL {
        assert_eq!(tickets.iter().filter(|t| t.status == status).count(), 1);
    }
}
