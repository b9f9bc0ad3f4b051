//! Persistence port for workspaces, perspectives, projects and tasks.
//!
//! The view engine never touches storage; callers load a snapshot through
//! [`PersistencePort::load_workspace_config`] plus a task list and hand both
//! to the resolver. [`FileStore`] is the JSON-file implementation.

mod file_store;
mod query;
mod requests;

pub use file_store::FileStore;
pub use query::{ListQuery, Page, SortDirection, SortField, SortKey, TaskFilter, DEFAULT_PAGE_SIZE};
pub use requests::{
    CreatePerspectiveRequest, CreateProjectRequest, CreateTaskRequest, CreateWorkspaceRequest,
    UpdatePerspectiveRequest, UpdateProjectRequest, UpdateTaskRequest, UpdateWorkspaceRequest,
};

use crate::error::Result;
use crate::model::{Perspective, Project, Task, WorkspaceConfig, WorkspaceRecord};

/// Storage operations used by the CLI.
///
/// Every `get_*`, `update_*` and `delete_*` call on a missing id fails with
/// [`crate::error::Error::NotFound`].
pub trait PersistencePort {
    // Workspaces
    fn list_workspaces(&self) -> Result<Vec<WorkspaceRecord>>;
    fn get_workspace(&self, id: &str) -> Result<WorkspaceRecord>;
    fn create_workspace(&self, request: CreateWorkspaceRequest) -> Result<WorkspaceRecord>;
    fn update_workspace(&self, id: &str, request: UpdateWorkspaceRequest)
        -> Result<WorkspaceRecord>;
    /// Removes the workspace with all of its perspectives, projects and tasks.
    fn delete_workspace(&self, id: &str) -> Result<()>;

    // Perspectives
    fn list_perspectives(&self, workspace_id: &str) -> Result<Vec<Perspective>>;
    fn get_perspective(&self, workspace_id: &str, id: &str) -> Result<Perspective>;
    fn create_perspective(
        &self,
        workspace_id: &str,
        request: CreatePerspectiveRequest,
    ) -> Result<Perspective>;
    fn update_perspective(
        &self,
        workspace_id: &str,
        id: &str,
        request: UpdatePerspectiveRequest,
    ) -> Result<Perspective>;
    fn delete_perspective(&self, workspace_id: &str, id: &str) -> Result<()>;

    // Projects
    fn list_projects(&self, workspace_id: &str) -> Result<Vec<Project>>;
    fn get_project(&self, workspace_id: &str, id: &str) -> Result<Project>;
    fn create_project(&self, workspace_id: &str, request: CreateProjectRequest) -> Result<Project>;
    fn update_project(
        &self,
        workspace_id: &str,
        id: &str,
        request: UpdateProjectRequest,
    ) -> Result<Project>;
    /// Removes the project and every task filed under it.
    fn delete_project(&self, workspace_id: &str, id: &str) -> Result<()>;

    // Tasks
    fn list_tasks(&self, workspace_id: &str, filter: Option<&TaskFilter>) -> Result<Vec<Task>>;
    fn get_task(&self, workspace_id: &str, id: &str) -> Result<Task>;
    fn create_task(&self, request: CreateTaskRequest) -> Result<Task>;
    fn update_task(&self, workspace_id: &str, id: &str, request: UpdateTaskRequest)
        -> Result<Task>;
    fn delete_task(&self, workspace_id: &str, id: &str) -> Result<()>;
    /// Flip `completed` and return the updated task.
    fn toggle_task(&self, workspace_id: &str, id: &str) -> Result<Task>;

    /// Filter, sort and paginate tasks across every workspace.
    fn query_tasks(&self, query: &ListQuery) -> Result<Page<Task>>;

    /// Snapshot of a workspace for the view engine.
    fn load_workspace_config(&self, workspace_id: &str) -> Result<WorkspaceConfig> {
        let record = self.get_workspace(workspace_id)?;
        WorkspaceConfig::new(
            record.id,
            record.name,
            self.list_perspectives(workspace_id)?,
            self.list_projects(workspace_id)?,
        )
    }
}
