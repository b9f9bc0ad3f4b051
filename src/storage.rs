//! Storage layer for karma
//!
//! All state lives as JSON collection files in one data directory:
//!
//! ```text
//! <data_dir>/
//!   karma.toml                          # optional configuration
//!   <prefix>-workspaces.json            # workspace records
//!   <prefix>-current-workspace          # last selected workspace id
//!   <prefix>-<ws>-perspectives.json     # per-workspace collections
//!   <prefix>-<ws>-projects.json
//!   <prefix>-<ws>-tasks.json
//!   *.lock                              # fs2 lock files
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::lock::{self, FileLock};

/// Per-workspace collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Perspectives,
    Projects,
    Tasks,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::Perspectives,
        Collection::Projects,
        Collection::Tasks,
    ];

    fn file_stem(self) -> &'static str {
        match self {
            Collection::Perspectives => "perspectives",
            Collection::Projects => "projects",
            Collection::Tasks => "tasks",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

/// Storage manager for one data directory
#[derive(Debug, Clone)]
pub struct Storage {
    data_dir: PathBuf,
    prefix: String,
    lock_timeout_ms: u64,
}

impl Storage {
    pub fn new(data_dir: PathBuf, prefix: impl Into<String>, lock_timeout_ms: u64) -> Self {
        Self {
            data_dir,
            prefix: prefix.into(),
            lock_timeout_ms,
        }
    }

    pub fn from_config(data_dir: PathBuf, config: &Config) -> Self {
        Self::new(
            data_dir,
            config.storage.prefix.trim(),
            config.storage.lock_timeout_ms,
        )
    }

    /// Platform data directory (e.g. `~/.local/share/karma`).
    pub fn default_data_dir() -> Result<PathBuf> {
        directories::ProjectDirs::from("", "", "karma")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| {
                Error::OperationFailed(
                    "could not determine a data directory; pass --data-dir".to_string(),
                )
            })
    }

    // =========================================================================
    // Path accessors
    // =========================================================================

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn workspaces_file(&self) -> PathBuf {
        self.data_dir.join(format!("{}-workspaces.json", self.prefix))
    }

    pub fn current_workspace_file(&self) -> PathBuf {
        self.data_dir.join(format!("{}-current-workspace", self.prefix))
    }

    pub fn collection_file(&self, workspace_id: &str, collection: Collection) -> PathBuf {
        self.data_dir.join(format!(
            "{}-{}-{}.json",
            self.prefix,
            workspace_id,
            collection.file_stem()
        ))
    }

    // =========================================================================
    // JSON collections
    // =========================================================================

    /// Read a collection; a missing file is an empty collection.
    pub fn read_collection<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// Write a collection atomically (caller coordinates locking).
    pub fn write_collection<T: Serialize>(&self, path: &Path, records: &[T]) -> Result<()> {
        let json = serde_json::to_string_pretty(records)?;
        lock::write_atomic(path, json.as_bytes())
    }

    /// Exclusive lock on a collection. Lock files are never removed, so every
    /// process contends on the same inode for the life of the data directory.
    pub fn lock_collection(&self, path: &Path) -> Result<FileLock> {
        FileLock::acquire(lock::lock_path_for(path), self.lock_timeout_ms)
    }

    /// Read-modify-write a collection while holding its lock. The file is
    /// only rewritten when `mutator` succeeds.
    pub fn update_collection<T, R, F>(&self, path: &Path, mutator: F) -> Result<R>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<T>) -> Result<R>,
    {
        let _lock = self.lock_collection(path)?;
        let mut records = self.read_collection(path)?;
        let result = mutator(&mut records)?;
        self.write_collection(path, &records)?;
        debug!(path = %path.display(), records = records.len(), "collection written");
        Ok(result)
    }

    /// Delete a collection file under its lock. The lock file stays.
    pub fn remove_collection(&self, path: &Path) -> Result<()> {
        let _lock = self.lock_collection(path)?;
        remove_if_exists(path)
    }

    // =========================================================================
    // Current workspace
    // =========================================================================

    pub fn read_current_workspace(&self) -> Option<String> {
        fs::read_to_string(self.current_workspace_file())
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    pub fn write_current_workspace(&self, workspace_id: &str) -> Result<()> {
        lock::write_atomic(self.current_workspace_file(), workspace_id.as_bytes())
    }

    pub fn clear_current_workspace(&self) -> Result<()> {
        remove_if_exists(&self.current_workspace_file())
    }
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}
