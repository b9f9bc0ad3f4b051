//! Data directory, config and workspace selection shared by commands.

use std::path::PathBuf;

use tracing::debug;

use super::GlobalOptions;
use crate::config::Config;
use crate::error::{EntityKind, Error, Result};
use crate::model::{Task, WorkspaceConfig, WorkspaceRecord};
use crate::persistence::{FileStore, PersistencePort};
use crate::storage::Storage;

pub(crate) struct Context {
    pub data_dir: PathBuf,
    pub config: Config,
    pub store: FileStore,
}

impl Context {
    pub fn load(global: &GlobalOptions) -> Result<Self> {
        let data_dir = match &global.data_dir {
            Some(dir) => dir.clone(),
            None => Storage::default_data_dir()?,
        };
        let config = Config::load_from_dir(&data_dir)?;
        let store = FileStore::open(data_dir.clone(), &config);
        debug!(data_dir = %data_dir.display(), "context loaded");
        Ok(Self {
            data_dir,
            config,
            store,
        })
    }

    /// Workspace for this invocation: `--workspace`, else the remembered
    /// current workspace, else the first one.
    pub fn workspace(&self, global: &GlobalOptions) -> Result<WorkspaceRecord> {
        if let Some(key) = global.workspace.as_deref() {
            return self.find_workspace(key);
        }

        let workspaces = self.store.list_workspaces()?;
        if let Some(current) = self.store.storage().read_current_workspace() {
            if let Some(record) = workspaces.iter().find(|w| w.id == current) {
                return Ok(record.clone());
            }
            debug!(current = %current, "remembered workspace no longer exists");
        }
        workspaces.into_iter().next().ok_or_else(|| {
            Error::InvalidArgument(
                "no workspaces yet; run `karma init` or `karma ws new <name>`".to_string(),
            )
        })
    }

    /// Look a workspace up by id, then by case-insensitive name.
    pub fn find_workspace(&self, key: &str) -> Result<WorkspaceRecord> {
        let key = key.trim();
        let workspaces = self.store.list_workspaces()?;
        if let Some(record) = workspaces.iter().find(|w| w.id == key) {
            return Ok(record.clone());
        }
        workspaces
            .into_iter()
            .find(|w| w.name.eq_ignore_ascii_case(key))
            .ok_or_else(|| Error::not_found(EntityKind::Workspace, key))
    }

    pub fn workspace_config(&self, global: &GlobalOptions) -> Result<WorkspaceConfig> {
        let record = self.workspace(global)?;
        self.store.load_workspace_config(&record.id)
    }

    /// Full task id from an id or a unique prefix of one.
    pub fn resolve_task(&self, workspace_id: &str, input: &str) -> Result<Task> {
        let input = input.trim();
        if input.is_empty() {
            return Err(Error::InvalidArgument("task id cannot be empty".to_string()));
        }

        let tasks = self.store.list_tasks(workspace_id, None)?;
        if let Some(task) = tasks.iter().find(|t| t.id == input) {
            return Ok(task.clone());
        }

        let mut matches = tasks.into_iter().filter(|t| t.id.starts_with(input));
        match (matches.next(), matches.next()) {
            (Some(task), None) => Ok(task),
            (Some(_), Some(_)) => Err(Error::InvalidArgument(format!(
                "task id prefix '{input}' is ambiguous"
            ))),
            (None, _) => Err(Error::not_found(EntityKind::Task, input)),
        }
    }
}
