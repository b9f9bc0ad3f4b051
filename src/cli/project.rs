//! karma project command implementations.

use super::context::Context;
use super::GlobalOptions;
use crate::error::{Error, Result};
use crate::field_update::FieldUpdate;
use crate::model::Project;
use crate::output::{emit_success, HumanOutput};
use crate::persistence::{CreateProjectRequest, PersistencePort, UpdateProjectRequest};

pub struct NewOptions {
    pub name: String,
    pub icon: Option<String>,
    pub order: Option<i64>,
    pub global: GlobalOptions,
}

pub struct EditOptions {
    pub id: String,
    pub name: Option<String>,
    pub icon: Option<String>,
    pub clear_icon: bool,
    pub order: Option<i64>,
    pub global: GlobalOptions,
}

#[derive(serde::Serialize)]
struct ProjectEntry {
    #[serde(flatten)]
    project: Project,
    open_tasks: usize,
    completed_tasks: usize,
}

#[derive(serde::Serialize)]
struct ProjectListOutput {
    workspace: String,
    total: usize,
    projects: Vec<ProjectEntry>,
}

#[derive(serde::Serialize)]
struct ProjectOutput {
    workspace: String,
    project: Project,
}

#[derive(serde::Serialize)]
struct ProjectRemovedOutput {
    workspace: String,
    id: String,
    removed_tasks: usize,
}

pub fn run_list(global: GlobalOptions) -> Result<()> {
    let ctx = Context::load(&global)?;
    let config = ctx.workspace_config(&global)?;
    let tasks = ctx.store.list_tasks(config.id(), None)?;

    let entries: Vec<ProjectEntry> = config
        .projects()
        .iter()
        .map(|project| {
            let (completed, open): (Vec<_>, Vec<_>) = tasks
                .iter()
                .filter(|t| t.project_id == project.id)
                .partition(|t| t.completed);
            ProjectEntry {
                project: project.clone(),
                open_tasks: open.len(),
                completed_tasks: completed.len(),
            }
        })
        .collect();

    let mut human = HumanOutput::new(format!("Projects in {}", config.name()));
    human.push_summary("Total", entries.len().to_string());
    for (index, entry) in entries.iter().enumerate() {
        let icon = entry
            .project
            .icon
            .as_deref()
            .map(|icon| format!("{icon} "))
            .unwrap_or_default();
        let default = if index == 0 { "  (default)" } else { "" };
        human.push_detail(format!(
            "{icon}{} ({})  {} open, {} done{default}",
            entry.project.name, entry.project.id, entry.open_tasks, entry.completed_tasks
        ));
    }
    if entries.is_empty() {
        human.push_warning("tasks cannot be created until the workspace has a project");
        human.push_next_step("karma project new <name>");
    }

    let output = ProjectListOutput {
        workspace: config.id().to_string(),
        total: entries.len(),
        projects: entries,
    };
    emit_success(global.output(), "project ls", &output, Some(&human))
}

pub fn run_new(options: NewOptions) -> Result<()> {
    let global = options.global;
    let ctx = Context::load(&global)?;
    let workspace = ctx.workspace(&global)?;
    let project = ctx.store.create_project(
        &workspace.id,
        CreateProjectRequest {
            name: options.name,
            icon: options.icon,
            order: options.order,
        },
    )?;

    let mut human = HumanOutput::new("Project created");
    human.push_summary("ID", project.id.clone());
    human.push_summary("Name", project.name.clone());
    human.push_summary("Order", project.order.to_string());
    human.push_next_step(format!("karma task new <title> --project {}", project.id));

    let output = ProjectOutput {
        workspace: workspace.id,
        project,
    };
    emit_success(global.output(), "project new", &output, Some(&human))
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let global = options.global;
    let icon = FieldUpdate::from_input(options.icon, options.clear_icon);
    if options.name.is_none() && icon.is_keep() && options.order.is_none() {
        return Err(Error::InvalidArgument(
            "nothing to change; pass --name, --icon, --clear-icon or --order".to_string(),
        ));
    }
    let ctx = Context::load(&global)?;
    let workspace = ctx.workspace(&global)?;
    let project = ctx.store.update_project(
        &workspace.id,
        &options.id,
        UpdateProjectRequest {
            name: options.name,
            icon,
            order: options.order,
        },
    )?;

    let mut human = HumanOutput::new("Project updated");
    human.push_summary("ID", project.id.clone());
    human.push_summary("Name", project.name.clone());
    human.push_summary("Icon", project.icon.clone().unwrap_or_else(|| "none".to_string()));
    human.push_summary("Order", project.order.to_string());

    let output = ProjectOutput {
        workspace: workspace.id,
        project,
    };
    emit_success(global.output(), "project edit", &output, Some(&human))
}

pub fn run_rm(id: String, global: GlobalOptions) -> Result<()> {
    let ctx = Context::load(&global)?;
    let workspace = ctx.workspace(&global)?;
    let removed_tasks = ctx
        .store
        .list_tasks(&workspace.id, None)?
        .iter()
        .filter(|t| t.project_id == id)
        .count();
    ctx.store.delete_project(&workspace.id, &id)?;

    let mut human = HumanOutput::new("Project deleted");
    human.push_summary("ID", id.clone());
    human.push_summary("Tasks removed", removed_tasks.to_string());

    let output = ProjectRemovedOutput {
        workspace: workspace.id,
        id,
        removed_tasks,
    };
    emit_success(global.output(), "project rm", &output, Some(&human))
}
