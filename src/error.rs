//! Error types for helpdesk
//!
//! Every core operation reports failures through [`HelpdeskError`]. The five
//! workflow variants (`Validation`, `Forbidden`, `NotFound`, `InvalidState`,
//! `Conflict`) are distinct outcomes the caller can act on; the remaining
//! variants cover the storage, configuration and I/O collaborators.

use crate::core::Status;
use thiserror::Error;

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, HelpdeskError>;

/// Main error type for helpdesk
#[derive(Error, Debug)]
pub enum HelpdeskError {
    /// Malformed input; the caller can correct it and retry
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The actor lacks permission for the operation in the ticket's current state
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Referenced ticket does not exist
    #[error("Ticket not found: {id}")]
    TicketNotFound { id: String },

    /// The operation is not legal from the ticket's current status
    #[error("Cannot {operation} a ticket that is {status}")]
    InvalidState {
        operation: &'static str,
        status: Status,
    },

    /// A concurrent transition changed the status we expected to find
    #[error("Ticket {id} changed concurrently: expected {expected}, found {actual}")]
    Conflict {
        id: String,
        expected: Status,
        actual: Status,
    },

    /// The per-ticket lock could not be acquired in time
    #[error("Ticket {id} is locked by another writer")]
    LockTimeout { id: String },

    #[error("Project not initialized. Run 'helpdesk init' first")]
    ProjectNotInitialized,

    #[error("Project already initialized at {0}")]
    ProjectAlreadyInitialized(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Prompt error: {0}")]
    Dialog(#[from] dialoguer::Error),

    #[error("{0}")]
    Custom(String),
}

impl HelpdeskError {
    /// Create a custom error from any displayable message
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Stable machine-readable error code
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Forbidden(_) => "forbidden",
            Self::TicketNotFound { .. } => "not_found",
            Self::InvalidState { .. } => "invalid_state",
            Self::Conflict { .. } => "conflict",
            Self::LockTimeout { .. } => "lock_timeout",
            Self::ProjectNotInitialized | Self::ProjectAlreadyInitialized(_) => "project",
            Self::Config(_) => "config_error",
            Self::Io(_) | Self::Yaml(_) | Self::Json(_) => "storage_error",
            Self::Dialog(_) | Self::Custom(_) => "error",
        }
    }

    /// Message suitable for showing to the end user
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Io(e) => format!("File operation failed: {e}"),
            Self::Yaml(e) => format!("Failed to read or write ticket data: {e}"),
            other => other.to_string(),
        }
    }

    /// Hints for resolving the error
    #[must_use]
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::ProjectNotInitialized => vec![
                "Run 'helpdesk init' to initialize a help desk in this directory".to_string(),
                "Use --project to point at an existing help desk".to_string(),
            ],
            Self::TicketNotFound { .. } => {
                vec!["Run 'helpdesk list' to see the tickets you can access".to_string()]
            },
            Self::Forbidden(_) => vec![
                "Check the --as and --role options (or HELPDESK_USER / HELPDESK_ROLE)".to_string(),
            ],
            Self::InvalidState { status, .. } => match status {
                Status::Open => vec!["An administrator must open the ticket first".to_string()],
                Status::InProgress => {
                    vec!["Resolve the ticket with 'helpdesk resolve <id>'".to_string()]
                },
                Status::Resolved => {
                    vec!["Reopen the ticket with 'helpdesk reopen <id>'".to_string()]
                },
            },
            Self::Conflict { .. } | Self::LockTimeout { .. } => {
                vec!["Reload the ticket and retry the operation".to_string()]
            },
            Self::Config(_) => vec!["Check .helpdesk/config.yaml for syntax errors".to_string()],
            _ => Vec::new(),
        }
    }

    /// Whether the caller can retry after correcting the triggering condition
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Yaml(_) | Self::Json(_) | Self::Config(_))
    }

    /// Whether the error originates from configuration
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_) | Self::ProjectNotInitialized)
    }
}

impl From<config::ConfigError> for HelpdeskError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
