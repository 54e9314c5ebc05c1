//! Input validation applied when tickets and comments are created

use crate::error::{HelpdeskError, Result};

pub const MIN_TITLE_LEN: usize = 5;
pub const MIN_DESCRIPTION_LEN: usize = 10;

/// Validate a ticket title and return it trimmed
pub fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(HelpdeskError::validation("Ticket title cannot be empty"));
    }
    if title.chars().count() < MIN_TITLE_LEN {
        return Err(HelpdeskError::validation(format!(
            "Ticket title must be at least {MIN_TITLE_LEN} characters"
        )));
    }
    Ok(title.to_string())
}

/// Validate a ticket description and return it trimmed
pub fn validate_description(description: &str) -> Result<String> {
    let description = description.trim();
    if description.is_empty() {
        return Err(HelpdeskError::validation(
            "Ticket description cannot be empty",
        ));
    }
    if description.chars().count() < MIN_DESCRIPTION_LEN {
        return Err(HelpdeskError::validation(format!(
            "Ticket description must be at least {MIN_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(description.to_string())
}

/// Validate a comment body; whitespace-only bodies are rejected
pub fn validate_comment(body: &str, what: &str) -> Result<String> {
    let body = body.trim();
    if body.is_empty() {
        return Err(HelpdeskError::validation(format!("{what} cannot be empty")));
    }
    Ok(body.to_string())
}
