//! Layered configuration
//!
//! Values are resolved in order, later sources overriding earlier ones:
//! built-in defaults, the user config file, the project's
//! `.helpdesk/config.yaml`, then `HELPDESK__SECTION__KEY` environment
//! variables.

use crate::core::Priority;
use crate::error::{HelpdeskError, Result};
use config::{Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the per-project data directory
pub const DATA_DIR: &str = ".helpdesk";
pub const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub project: ProjectConfig,
    pub workflow: WorkflowConfig,
    pub storage: StorageConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
    pub description: Option<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "helpdesk".to_string(),
            description: None,
        }
    }
}

/// Texts and defaults used by the lifecycle engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Comment appended when an administrator first picks up an open ticket
    pub handling_comment: String,
    /// Comment appended when an administrator reopens a resolved ticket
    pub reopen_comment: String,
    /// Priority used when a ticket is filed without one
    pub default_priority: Priority,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            handling_comment: "Ticket is being handled by an administrator".to_string(),
            reopen_comment: "Ticket reopened by an administrator for review".to_string(),
            default_priority: Priority::Low,
        }
    }
}

/// Lock file behavior for the file store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub lock_retries: u32,
    pub lock_retry_delay_ms: u64,
    /// Locks older than this are treated as left behind by a crashed writer
    pub stale_lock_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            lock_retries: 100,
            lock_retry_delay_ms: 10,
            stale_lock_secs: 30,
        }
    }
}

impl StorageConfig {
    #[must_use]
    pub const fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.lock_retry_delay_ms)
    }

    #[must_use]
    pub const fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_lock_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

impl Config {
    /// Load configuration for the project rooted at `project_root`
    pub fn load(project_root: Option<&Path>) -> Result<Self> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = Self::user_config_path() {
            builder = builder.add_source(File::from(path).required(false));
        }

        if let Some(root) = project_root {
            builder = builder.add_source(File::from(Self::project_config_path(root)).required(false));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("HELPDESK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        tracing::debug!(project = %config.project.name, "Loaded configuration");
        Ok(config)
    }

    /// Load configuration, falling back to defaults when it cannot be read
    #[must_use]
    pub fn load_or_default(project_root: Option<&Path>) -> Self {
        Self::load(project_root).unwrap_or_else(|e| {
            tracing::warn!("Using default configuration: {e}");
            Self::default()
        })
    }

    /// Write this configuration to the project's config file
    pub fn save(&self, project_root: &Path) -> Result<()> {
        let path = Self::project_config_path(project_root);
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&path, content).map_err(|e| {
            HelpdeskError::Config(format!("Failed to write {}: {e}", path.display()))
        })
    }

    #[must_use]
    pub fn project_config_path(project_root: &Path) -> PathBuf {
        project_root.join(DATA_DIR).join(CONFIG_FILE)
    }

    fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "helpdesk").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }
}
