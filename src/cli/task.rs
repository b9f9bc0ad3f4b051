//! karma task command implementations.

use super::context::Context;
use super::{GlobalOptions, NavArgs};
use crate::defaults;
use crate::error::{EntityKind, Error, Result};
use crate::field_update::FieldUpdate;
use crate::model::{Task, WorkspaceConfig};
use crate::navigation;
use crate::output::{emit_success, format_task, short_id, HumanOutput};
use crate::persistence::{ListQuery, PersistencePort, SortKey, TaskFilter, UpdateTaskRequest};

pub struct ListOptions {
    pub project: Option<String>,
    pub perspective: Option<String>,
    pub completed: Option<bool>,
    pub search: Option<String>,
    pub sort: Vec<String>,
    pub page: usize,
    pub page_size: Option<usize>,
    pub all_workspaces: bool,
    pub global: GlobalOptions,
}

pub struct NewOptions {
    pub title: String,
    pub description: Option<String>,
    pub nav: NavArgs,
    pub global: GlobalOptions,
}

pub struct EditOptions {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub clear_description: bool,
    pub project: Option<String>,
    pub perspective: Option<String>,
    pub clear_perspective: bool,
    pub order: Option<i64>,
    pub global: GlobalOptions,
}

#[derive(serde::Serialize)]
struct TaskOutput {
    task: Task,
}

#[derive(serde::Serialize)]
struct TaskRemovedOutput {
    workspace: String,
    id: String,
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let global = options.global;
    let ctx = Context::load(&global)?;
    let config = ctx.workspace_config(&global)?;

    let sort = options
        .sort
        .iter()
        .map(|raw| raw.parse::<SortKey>())
        .collect::<Result<Vec<_>>>()?;
    let query = ListQuery {
        filter: Some(TaskFilter {
            workspace_id: (!options.all_workspaces).then(|| config.id().to_string()),
            project_id: options.project,
            perspective_id: options.perspective,
            completed: options.completed,
            search: options.search,
        }),
        sort,
        page: Some(options.page),
        page_size: Some(options.page_size.unwrap_or(ctx.config.list.page_size)),
    };
    let page = ctx.store.query_tasks(&query)?;

    let mut human = HumanOutput::new(if options.all_workspaces {
        "Tasks in all workspaces".to_string()
    } else {
        format!("Tasks in {}", config.name())
    });
    human.push_summary("Total", page.total.to_string());
    if page.total_pages > 1 {
        human.push_summary("Page", format!("{} of {}", page.page, page.total_pages));
    }
    for task in &page.items {
        let line = format_task(task, &config, true, true);
        if options.all_workspaces && task.workspace_id != config.id() {
            human.push_detail(format!("{line}  [{}]", task.workspace_id));
        } else {
            human.push_detail(line);
        }
    }
    if page.page < page.total_pages {
        human.push_next_step(format!("karma task ls --page {}", page.page + 1));
    }

    emit_success(global.output(), "task ls", &page, Some(&human))
}

pub fn run_show(id: String, global: GlobalOptions) -> Result<()> {
    let ctx = Context::load(&global)?;
    let config = ctx.workspace_config(&global)?;
    let task = ctx.resolve_task(config.id(), &id)?;

    let mut human = HumanOutput::new(task.title.clone());
    push_task_summary(&mut human, &task, &config);

    emit_success(global.output(), "task show", &TaskOutput { task }, Some(&human))
}

pub fn run_new(options: NewOptions) -> Result<()> {
    let global = options.global;
    let ctx = Context::load(&global)?;
    let config = ctx.workspace_config(&global)?;

    if let Some(project) = options.nav.project.as_deref() {
        if !config.has_project(project) {
            return Err(Error::not_found(EntityKind::Project, project));
        }
    }
    if let Some(perspective) = options.nav.perspective.as_deref() {
        if !config.has_perspective(perspective) {
            return Err(Error::not_found(EntityKind::Perspective, perspective));
        }
    }

    let nav = navigation::initialize(&options.nav.to_params(), &config);
    let mut request = defaults::new_task_request(
        &options.title,
        options.description,
        &nav,
        &config,
        &ctx.config.defaults.perspective_policy(),
    )?;
    // Explicit flags win over whatever the view implies.
    if let Some(project) = options.nav.project {
        request.project_id = project;
    }
    if let Some(perspective) = options.nav.perspective {
        request.perspective_id = Some(perspective);
    }

    let task = ctx.store.create_task(request)?;

    let mut human = HumanOutput::new("Task created");
    push_task_summary(&mut human, &task, &config);
    if let Some(perspective) = task.perspective().filter(|id| !config.has_perspective(id)) {
        human.push_warning(format!(
            "perspective '{perspective}' is not configured in this workspace"
        ));
    }

    emit_success(global.output(), "task new", &TaskOutput { task }, Some(&human))
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let global = options.global;
    let request = UpdateTaskRequest {
        title: options.title,
        description: FieldUpdate::from_input(options.description, options.clear_description),
        project_id: options.project,
        perspective_id: FieldUpdate::from_input(options.perspective, options.clear_perspective),
        completed: None,
        order: options.order,
    };
    if request.is_empty() {
        return Err(Error::InvalidArgument(
            "nothing to change; pass --title, --description, --project, --perspective or --order"
                .to_string(),
        ));
    }

    let ctx = Context::load(&global)?;
    let config = ctx.workspace_config(&global)?;
    let existing = ctx.resolve_task(config.id(), &options.id)?;
    let task = ctx.store.update_task(config.id(), &existing.id, request)?;

    let mut human = HumanOutput::new("Task updated");
    push_task_summary(&mut human, &task, &config);
    if let Some(perspective) = task.perspective().filter(|id| !config.has_perspective(id)) {
        human.push_warning(format!(
            "perspective '{perspective}' is not configured in this workspace"
        ));
    }

    emit_success(global.output(), "task edit", &TaskOutput { task }, Some(&human))
}

pub fn run_toggle(id: String, global: GlobalOptions) -> Result<()> {
    let ctx = Context::load(&global)?;
    let config = ctx.workspace_config(&global)?;
    let existing = ctx.resolve_task(config.id(), &id)?;
    let task = ctx.store.toggle_task(config.id(), &existing.id)?;

    let header = if task.completed {
        "Task completed"
    } else {
        "Task reopened"
    };
    let mut human = HumanOutput::new(header);
    human.push_detail(format_task(&task, &config, true, true));

    emit_success(global.output(), "task toggle", &TaskOutput { task }, Some(&human))
}

pub fn run_rm(id: String, global: GlobalOptions) -> Result<()> {
    let ctx = Context::load(&global)?;
    let config = ctx.workspace_config(&global)?;
    let existing = ctx.resolve_task(config.id(), &id)?;
    ctx.store.delete_task(config.id(), &existing.id)?;

    let mut human = HumanOutput::new("Task deleted");
    human.push_summary("ID", existing.id.clone());
    human.push_summary("Title", existing.title.clone());

    let output = TaskRemovedOutput {
        workspace: config.id().to_string(),
        id: existing.id,
    };
    emit_success(global.output(), "task rm", &output, Some(&human))
}

fn push_task_summary(human: &mut HumanOutput, task: &Task, config: &WorkspaceConfig) {
    human.push_summary("ID", short_id(&task.id).to_string());
    human.push_summary("Title", task.title.clone());
    if let Some(description) = task.description.as_deref() {
        human.push_summary("Description", description.to_string());
    }
    let project = task
        .project()
        .map(|id| {
            config
                .project(id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| id.to_string())
        })
        .unwrap_or_else(|| "none".to_string());
    human.push_summary("Project", project);
    let perspective = task
        .perspective()
        .map(|id| {
            config
                .perspective(id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| id.to_string())
        })
        .unwrap_or_else(|| "none".to_string());
    human.push_summary("Perspective", perspective);
    human.push_summary("Status", if task.completed { "done" } else { "open" });
}
