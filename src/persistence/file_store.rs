//! JSON-file implementation of [`PersistencePort`].

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use super::{
    CreatePerspectiveRequest, CreateProjectRequest, CreateTaskRequest, CreateWorkspaceRequest,
    ListQuery, Page, PersistencePort, TaskFilter, UpdatePerspectiveRequest, UpdateProjectRequest,
    UpdateTaskRequest, UpdateWorkspaceRequest,
};
use crate::config::Config;
use crate::error::{EntityKind, Error, Result};
use crate::model::{generate_id, Perspective, Project, Task, WorkspaceRecord};
use crate::storage::{Collection, Storage};

const WORKSPACE_ID_PREFIX: &str = "ws";
const PERSPECTIVE_ID_PREFIX: &str = "psp";
const PROJECT_ID_PREFIX: &str = "prj";

/// Store backed by the collection files of one data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    storage: Storage,
}

impl FileStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn open(data_dir: PathBuf, config: &Config) -> Self {
        Self::new(Storage::from_config(data_dir, config))
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// True when no workspace has been created yet.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.list_workspaces()?.is_empty())
    }

    fn ensure_workspace(&self, workspace_id: &str) -> Result<()> {
        self.get_workspace(workspace_id).map(|_| ())
    }

    fn ensure_project(&self, workspace_id: &str, project_id: &str) -> Result<()> {
        self.get_project(workspace_id, project_id).map(|_| ())
    }

    fn path(&self, workspace_id: &str, collection: Collection) -> PathBuf {
        self.storage.collection_file(workspace_id, collection)
    }

    /// Run `write` under the workspace registry lock once the workspace is
    /// known to exist. Every write to a per-workspace collection goes through
    /// here, so a concurrent `delete_workspace` either runs before the check
    /// or waits for the write to finish. Lock order: registry, then collection.
    fn write_in_workspace<R>(
        &self,
        workspace_id: &str,
        write: impl FnOnce() -> Result<R>,
    ) -> Result<R> {
        let _registry = self
            .storage
            .lock_collection(&self.storage.workspaces_file())?;
        self.ensure_workspace(workspace_id)?;
        write()
    }

    fn insert_perspectives(
        &self,
        workspace_id: &str,
        requests: Vec<CreatePerspectiveRequest>,
    ) -> Result<Vec<Perspective>> {
        let path = self.path(workspace_id, Collection::Perspectives);
        self.write_in_workspace(workspace_id, || {
            self.storage
                .update_collection(&path, |perspectives: &mut Vec<Perspective>| {
                let mut created = Vec::with_capacity(requests.len());
                for request in requests {
                    let name = required_name(&request.name, EntityKind::Perspective)?;
                    let taken: HashSet<String> =
                        perspectives.iter().map(|p| p.id.clone()).collect();
                    let perspective = Perspective {
                        id: generate_id(PERSPECTIVE_ID_PREFIX, &name, &taken),
                        name,
                        icon: request.icon.unwrap_or_default(),
                        order: request
                            .order
                            .unwrap_or_else(|| next_perspective_order(perspectives)),
                    };
                    perspectives.push(perspective.clone());
                    created.push(perspective);
                }
                Ok(created)
            })
        })
    }
}

fn required_name(name: &str, kind: EntityKind) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidArgument(format!("{kind} name cannot be empty")));
    }
    Ok(name.to_string())
}

fn find_index<T>(
    records: &[T],
    id: &str,
    kind: EntityKind,
    key: impl Fn(&T) -> &str,
) -> Result<usize> {
    records
        .iter()
        .position(|record| key(record) == id)
        .ok_or_else(|| Error::not_found(kind, id))
}

/// Perspectives count up from 0 so the first one created is the default.
fn next_perspective_order(perspectives: &[Perspective]) -> i64 {
    perspectives
        .iter()
        .map(|p| p.order + 1)
        .max()
        .unwrap_or(0)
}

/// `max(order, 0) + 1` over the given siblings.
fn next_order(orders: impl Iterator<Item = i64>) -> i64 {
    orders.fold(0, i64::max) + 1
}

impl PersistencePort for FileStore {
    fn list_workspaces(&self) -> Result<Vec<WorkspaceRecord>> {
        self.storage
            .read_collection(&self.storage.workspaces_file())
    }

    fn get_workspace(&self, id: &str) -> Result<WorkspaceRecord> {
        self.list_workspaces()?
            .into_iter()
            .find(|workspace| workspace.id == id)
            .ok_or_else(|| Error::not_found(EntityKind::Workspace, id))
    }

    fn create_workspace(&self, request: CreateWorkspaceRequest) -> Result<WorkspaceRecord> {
        let name = required_name(&request.name, EntityKind::Workspace)?;
        let path = self.storage.workspaces_file();
        let record = self
            .storage
            .update_collection(&path, |workspaces: &mut Vec<WorkspaceRecord>| {
                let taken: HashSet<String> = workspaces.iter().map(|w| w.id.clone()).collect();
                let record = WorkspaceRecord {
                    id: generate_id(WORKSPACE_ID_PREFIX, &name, &taken),
                    name,
                    created_at: Utc::now(),
                };
                workspaces.push(record.clone());
                Ok(record)
            })?;

        let perspectives = request
            .perspectives
            .into_iter()
            .enumerate()
            .map(|(index, perspective)| CreatePerspectiveRequest {
                order: perspective.order.or(Some(index as i64)),
                ..perspective
            })
            .collect();
        self.insert_perspectives(&record.id, perspectives)?;

        debug!(workspace = %record.id, "workspace created");
        Ok(record)
    }

    fn update_workspace(
        &self,
        id: &str,
        request: UpdateWorkspaceRequest,
    ) -> Result<WorkspaceRecord> {
        let name = request
            .name
            .as_deref()
            .map(|name| required_name(name, EntityKind::Workspace))
            .transpose()?;
        let path = self.storage.workspaces_file();
        self.storage
            .update_collection(&path, |workspaces: &mut Vec<WorkspaceRecord>| {
                let index = find_index(workspaces, id, EntityKind::Workspace, |w| w.id.as_str())?;
                let workspace = &mut workspaces[index];
                if let Some(name) = name {
                    workspace.name = name;
                }
                Ok(workspace.clone())
            })
    }

    /// Collection files go first and the record last, all under the registry
    /// lock; a failed removal leaves the workspace listed so the delete can be
    /// retried.
    fn delete_workspace(&self, id: &str) -> Result<()> {
        let path = self.storage.workspaces_file();
        let _registry = self.storage.lock_collection(&path)?;
        let mut workspaces: Vec<WorkspaceRecord> = self.storage.read_collection(&path)?;
        let index = find_index(&workspaces, id, EntityKind::Workspace, |w| w.id.as_str())?;

        for collection in Collection::ALL {
            self.storage.remove_collection(&self.path(id, collection))?;
        }
        workspaces.remove(index);
        self.storage.write_collection(&path, &workspaces)?;

        if self.storage.read_current_workspace().as_deref() == Some(id) {
            self.storage.clear_current_workspace()?;
        }
        debug!(workspace = id, "workspace deleted");
        Ok(())
    }

    fn list_perspectives(&self, workspace_id: &str) -> Result<Vec<Perspective>> {
        self.ensure_workspace(workspace_id)?;
        self.storage
            .read_collection(&self.path(workspace_id, Collection::Perspectives))
    }

    fn get_perspective(&self, workspace_id: &str, id: &str) -> Result<Perspective> {
        self.list_perspectives(workspace_id)?
            .into_iter()
            .find(|perspective| perspective.id == id)
            .ok_or_else(|| Error::not_found(EntityKind::Perspective, id))
    }

    fn create_perspective(
        &self,
        workspace_id: &str,
        request: CreatePerspectiveRequest,
    ) -> Result<Perspective> {
        let mut created = self.insert_perspectives(workspace_id, vec![request])?;
        created
            .pop()
            .ok_or_else(|| Error::OperationFailed("perspective was not created".to_string()))
    }

    fn update_perspective(
        &self,
        workspace_id: &str,
        id: &str,
        request: UpdatePerspectiveRequest,
    ) -> Result<Perspective> {
        let name = request
            .name
            .as_deref()
            .map(|name| required_name(name, EntityKind::Perspective))
            .transpose()?;
        let path = self.path(workspace_id, Collection::Perspectives);
        self.write_in_workspace(workspace_id, || {
            self.storage
                .update_collection(&path, |perspectives: &mut Vec<Perspective>| {
                    let index =
                        find_index(perspectives, id, EntityKind::Perspective, |p| p.id.as_str())?;
                    let perspective = &mut perspectives[index];
                    if let Some(name) = name {
                        perspective.name = name;
                    }
                    if let Some(icon) = request.icon {
                        perspective.icon = icon;
                    }
                    if let Some(order) = request.order {
                        perspective.order = order;
                    }
                    Ok(perspective.clone())
                })
        })
    }

    /// Tasks filed under the perspective lose their tag.
    fn delete_perspective(&self, workspace_id: &str, id: &str) -> Result<()> {
        let path = self.path(workspace_id, Collection::Perspectives);
        let untagged = self.write_in_workspace(workspace_id, || {
            self.storage
                .update_collection(&path, |perspectives: &mut Vec<Perspective>| {
                    let index =
                        find_index(perspectives, id, EntityKind::Perspective, |p| p.id.as_str())?;
                    perspectives.remove(index);
                    Ok(())
                })?;

            let now = Utc::now();
            self.storage.update_collection(
                &self.path(workspace_id, Collection::Tasks),
                |tasks: &mut Vec<Task>| {
                    let mut count = 0usize;
                    for task in tasks.iter_mut().filter(|t| t.perspective() == Some(id)) {
                        task.perspective_id = None;
                        task.updated_at = now;
                        count += 1;
                    }
                    Ok(count)
                },
            )
        })?;
        debug!(workspace = workspace_id, perspective = id, untagged, "perspective deleted");
        Ok(())
    }

    fn list_projects(&self, workspace_id: &str) -> Result<Vec<Project>> {
        self.ensure_workspace(workspace_id)?;
        self.storage
            .read_collection(&self.path(workspace_id, Collection::Projects))
    }

    fn get_project(&self, workspace_id: &str, id: &str) -> Result<Project> {
        self.list_projects(workspace_id)?
            .into_iter()
            .find(|project| project.id == id)
            .ok_or_else(|| Error::not_found(EntityKind::Project, id))
    }

    fn create_project(&self, workspace_id: &str, request: CreateProjectRequest) -> Result<Project> {
        let name = required_name(&request.name, EntityKind::Project)?;
        let path = self.path(workspace_id, Collection::Projects);
        let project = self.write_in_workspace(workspace_id, || {
            self.storage
                .update_collection(&path, |projects: &mut Vec<Project>| {
                    let taken: HashSet<String> = projects.iter().map(|p| p.id.clone()).collect();
                    let project = Project {
                        id: generate_id(PROJECT_ID_PREFIX, &name, &taken),
                        name,
                        icon: request.icon.filter(|icon| !icon.trim().is_empty()),
                        order: request
                            .order
                            .unwrap_or_else(|| next_order(projects.iter().map(|p| p.order))),
                        workspace_id: workspace_id.to_string(),
                        created_at: Utc::now(),
                    };
                    projects.push(project.clone());
                    Ok(project)
                })
        })?;
        debug!(workspace = workspace_id, project = %project.id, order = project.order, "project created");
        Ok(project)
    }

    fn update_project(
        &self,
        workspace_id: &str,
        id: &str,
        request: UpdateProjectRequest,
    ) -> Result<Project> {
        let name = request
            .name
            .as_deref()
            .map(|name| required_name(name, EntityKind::Project))
            .transpose()?;
        let path = self.path(workspace_id, Collection::Projects);
        self.write_in_workspace(workspace_id, || {
            self.storage
                .update_collection(&path, |projects: &mut Vec<Project>| {
                    let index = find_index(projects, id, EntityKind::Project, |p| p.id.as_str())?;
                    let project = &mut projects[index];
                    if let Some(name) = name {
                        project.name = name;
                    }
                    request.icon.apply_to(&mut project.icon);
                    if let Some(order) = request.order {
                        project.order = order;
                    }
                    Ok(project.clone())
                })
        })
    }

    fn delete_project(&self, workspace_id: &str, id: &str) -> Result<()> {
        let path = self.path(workspace_id, Collection::Projects);
        let removed = self.write_in_workspace(workspace_id, || {
            self.storage
                .update_collection(&path, |projects: &mut Vec<Project>| {
                    let index = find_index(projects, id, EntityKind::Project, |p| p.id.as_str())?;
                    projects.remove(index);
                    Ok(())
                })?;

            self.storage.update_collection(
                &self.path(workspace_id, Collection::Tasks),
                |tasks: &mut Vec<Task>| {
                    let before = tasks.len();
                    tasks.retain(|task| task.project_id != id);
                    Ok(before - tasks.len())
                },
            )
        })?;
        debug!(workspace = workspace_id, project = id, removed, "project deleted");
        Ok(())
    }

    fn list_tasks(&self, workspace_id: &str, filter: Option<&TaskFilter>) -> Result<Vec<Task>> {
        self.ensure_workspace(workspace_id)?;
        let mut tasks: Vec<Task> = self
            .storage
            .read_collection(&self.path(workspace_id, Collection::Tasks))?;
        if let Some(filter) = filter {
            tasks.retain(|task| filter.matches_within_workspace(task));
        }
        Ok(tasks)
    }

    fn get_task(&self, workspace_id: &str, id: &str) -> Result<Task> {
        self.list_tasks(workspace_id, None)?
            .into_iter()
            .find(|task| task.id == id)
            .ok_or_else(|| Error::not_found(EntityKind::Task, id))
    }

    fn create_task(&self, request: CreateTaskRequest) -> Result<Task> {
        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(Error::InvalidArgument("task title cannot be empty".to_string()));
        }
        let workspace_id = request.workspace_id;
        let path = self.path(&workspace_id, Collection::Tasks);
        let task = self.write_in_workspace(&workspace_id, || {
            self.ensure_project(&workspace_id, &request.project_id)?;
            self.storage.update_collection(&path, |tasks: &mut Vec<Task>| {
                let order = next_order(
                    tasks
                        .iter()
                        .filter(|t| t.project_id == request.project_id)
                        .map(|t| t.order),
                );
                let now = Utc::now();
                let task = Task {
                    id: Uuid::new_v4().to_string(),
                    title,
                    description: request.description,
                    completed: false,
                    perspective_id: request.perspective_id,
                    project_id: request.project_id,
                    workspace_id: workspace_id.clone(),
                    order,
                    created_at: now,
                    updated_at: now,
                };
                tasks.push(task.clone());
                Ok(task)
            })
        })?;
        debug!(workspace = %workspace_id, task = %task.id, order = task.order, "task created");
        Ok(task)
    }

    fn update_task(
        &self,
        workspace_id: &str,
        id: &str,
        request: UpdateTaskRequest,
    ) -> Result<Task> {
        let title = match request.title.as_deref().map(str::trim) {
            Some("") => {
                return Err(Error::InvalidArgument("task title cannot be empty".to_string()))
            }
            title => title.map(str::to_string),
        };
        let path = self.path(workspace_id, Collection::Tasks);
        self.write_in_workspace(workspace_id, || {
            if let Some(project_id) = request.project_id.as_deref() {
                self.ensure_project(workspace_id, project_id)?;
            }
            self.storage.update_collection(&path, |tasks: &mut Vec<Task>| {
                let index = find_index(tasks, id, EntityKind::Task, |t| t.id.as_str())?;
                let task = &mut tasks[index];
                if let Some(title) = title {
                    task.title = title;
                }
                request.description.apply_to(&mut task.description);
                if let Some(project_id) = request.project_id {
                    task.project_id = project_id;
                }
                request.perspective_id.apply_to(&mut task.perspective_id);
                if let Some(completed) = request.completed {
                    task.completed = completed;
                }
                if let Some(order) = request.order {
                    task.order = order;
                }
                task.updated_at = Utc::now();
                Ok(task.clone())
            })
        })
    }

    fn delete_task(&self, workspace_id: &str, id: &str) -> Result<()> {
        let path = self.path(workspace_id, Collection::Tasks);
        self.write_in_workspace(workspace_id, || {
            self.storage.update_collection(&path, |tasks: &mut Vec<Task>| {
                let index = find_index(tasks, id, EntityKind::Task, |t| t.id.as_str())?;
                tasks.remove(index);
                Ok(())
            })
        })
    }

    fn toggle_task(&self, workspace_id: &str, id: &str) -> Result<Task> {
        let path = self.path(workspace_id, Collection::Tasks);
        self.write_in_workspace(workspace_id, || {
            self.storage.update_collection(&path, |tasks: &mut Vec<Task>| {
                let index = find_index(tasks, id, EntityKind::Task, |t| t.id.as_str())?;
                let task = &mut tasks[index];
                task.completed = !task.completed;
                task.updated_at = Utc::now();
                Ok(task.clone())
            })
        })
    }

    fn query_tasks(&self, query: &ListQuery) -> Result<Page<Task>> {
        let workspace_ids: Vec<String> = match query
            .filter
            .as_ref()
            .and_then(|filter| filter.workspace_id.clone())
        {
            Some(id) => vec![id],
            None => self.list_workspaces()?.into_iter().map(|w| w.id).collect(),
        };

        let mut tasks = Vec::new();
        for workspace_id in &workspace_ids {
            tasks.extend(self.list_tasks(workspace_id, None)?);
        }
        query.apply(tasks)
    }
}
