//! Configuration loading and management
//!
//! Handles parsing of the `karma.toml` file stored in the data directory.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name of the configuration inside the data directory
pub const CONFIG_FILE: &str = "karma.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// New-task defaulting policy
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Settings applied when creating workspaces
    #[serde(default)]
    pub workspace: WorkspaceConfigDefaults,

    /// Listing configuration
    #[serde(default)]
    pub list: ListConfig,
}

/// Storage-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Prefix for every collection file name
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// How long to wait for a collection lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_prefix() -> String {
    "karma-tasks".to_string()
}

fn default_lock_timeout_ms() -> u64 {
    crate::lock::DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// Defaulting rules for new tasks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Perspective id stamped on new tasks when the workspace has none
    #[serde(default = "default_fallback_perspective")]
    pub fallback_perspective: String,

    /// Refuse to create tasks in workspaces without perspectives
    #[serde(default)]
    pub require_perspective: bool,
}

fn default_fallback_perspective() -> String {
    "inbox".to_string()
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            fallback_perspective: default_fallback_perspective(),
            require_perspective: false,
        }
    }
}

/// Settings for newly created workspaces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfigDefaults {
    /// Perspective names created (in order) with each new workspace
    #[serde(default = "default_workspace_perspectives")]
    pub perspectives: Vec<String>,
}

fn default_workspace_perspectives() -> Vec<String> {
    vec![
        "Inbox".to_string(),
        "First".to_string(),
        "Next".to_string(),
        "Someday".to_string(),
    ]
}

impl Default for WorkspaceConfigDefaults {
    fn default() -> Self {
        Self {
            perspectives: default_workspace_perspectives(),
        }
    }
}

/// Listing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConfig {
    /// Page size used when a query does not specify one
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    crate::persistence::DEFAULT_PAGE_SIZE
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

/// Policy consumed by the defaults resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerspectivePolicy {
    pub fallback: String,
    pub required: bool,
}

impl Default for PerspectivePolicy {
    fn default() -> Self {
        DefaultsConfig::default().perspective_policy()
    }
}

impl DefaultsConfig {
    pub fn perspective_policy(&self) -> PerspectivePolicy {
        PerspectivePolicy {
            fallback: self.fallback_perspective.trim().to_string(),
            required: self.require_perspective,
        }
    }

    fn validate(&self) -> crate::error::Result<()> {
        if !self.require_perspective && self.fallback_perspective.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "defaults.fallback_perspective cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a data directory, or return defaults
    pub fn load_from_dir(data_dir: &Path) -> crate::error::Result<Self> {
        let config_path = data_dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> crate::error::Result<()> {
        self.storage.validate()?;
        self.defaults.validate()?;
        self.workspace.validate()?;
        if self.list.page_size == 0 {
            return Err(crate::error::Error::InvalidConfig(
                "list.page_size must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl StorageConfig {
    fn validate(&self) -> crate::error::Result<()> {
        let prefix = self.prefix.trim();
        if prefix.is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "storage.prefix cannot be empty".to_string(),
            ));
        }
        if !prefix
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
        {
            return Err(crate::error::Error::InvalidConfig(
                "storage.prefix must be alphanumeric, '-' or '_'".to_string(),
            ));
        }
        if self.lock_timeout_ms == 0 {
            return Err(crate::error::Error::InvalidConfig(
                "storage.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl WorkspaceConfigDefaults {
    fn validate(&self) -> crate::error::Result<()> {
        let mut seen = std::collections::HashSet::new();
        for name in &self.perspectives {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(crate::error::Error::InvalidConfig(
                    "workspace.perspectives cannot include empty entries".to_string(),
                ));
            }
            if !seen.insert(crate::model::slugify(trimmed)) {
                return Err(crate::error::Error::InvalidConfig(format!(
                    "workspace.perspectives has duplicate entry '{trimmed}'"
                )));
            }
        }
        Ok(())
    }
}
