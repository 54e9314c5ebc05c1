//! `helpdesk init`

use crate::cli::output::OutputFormatter;
use crate::config::{Config, DATA_DIR};
use crate::error::{HelpdeskError, Result};
use crate::storage::{FileStorage, ProjectState};
use chrono::Utc;
use std::env;
use std::path::PathBuf;

/// Create the `.helpdesk` data directory, project state and config file
pub fn handle_init(
    name: Option<&str>,
    description: Option<&str>,
    force: bool,
    project_dir: Option<&str>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let project_root = match project_dir {
        Some(dir) => PathBuf::from(dir),
        None => env::current_dir()?,
    };
    let data_dir = project_root.join(DATA_DIR);
    let storage = FileStorage::new(&data_dir);

    if storage.is_initialized() && !force {
        return Err(HelpdeskError::ProjectAlreadyInitialized(
            data_dir.display().to_string(),
        ));
    }

    let mut config = Config::load_or_default(Some(&project_root));
    if let Some(name) = name {
        config.project.name = name.to_string();
    } else if let Some(dir_name) = project_root.file_name().and_then(|n| n.to_str()) {
        config.project.name = dir_name.to_string();
    }
    if let Some(description) = description {
        config.project.description = Some(description.to_string());
    }

    storage.ensure_directories()?;
    let state = ProjectState {
        name: config.project.name.clone(),
        description: config.project.description.clone(),
        created_at: Utc::now(),
    };
    storage.save_state(&state)?;
    config.save(&project_root)?;
    tracing::info!(project = %state.name, "Initialized help desk");

    if formatter.is_json() {
        formatter.print_json(&serde_json::json!({
            "status": "success",
            "project": state.name,
            "path": data_dir.display().to_string(),
        }))?;
    } else {
        formatter.success(&format!(
            "Initialized help desk '{}' in {}",
            state.name,
            data_dir.display()
        ));
        formatter.info("\nNext steps:");
        formatter.info("  • File a ticket: helpdesk --as <user> new \"<title>\" -d \"<description>\"");
        formatter.info("  • Work the queue: helpdesk --as <admin> --role admin list");
    }

    Ok(())
}
