//! karma ws command implementations.

use super::context::Context;
use super::GlobalOptions;
use crate::error::Result;
use crate::model::WorkspaceRecord;
use crate::output::{emit_success, HumanOutput};
use crate::persistence::{CreateWorkspaceRequest, PersistencePort, UpdateWorkspaceRequest};

pub struct NewOptions {
    pub name: String,
    pub perspectives: Vec<String>,
    pub use_it: bool,
    pub global: GlobalOptions,
}

pub struct RenameOptions {
    pub target: String,
    pub name: String,
    pub global: GlobalOptions,
}

pub struct TargetOptions {
    pub target: String,
    pub global: GlobalOptions,
}

#[derive(serde::Serialize)]
struct WorkspaceEntry {
    #[serde(flatten)]
    record: WorkspaceRecord,
    current: bool,
    perspectives: usize,
    projects: usize,
    open_tasks: usize,
}

#[derive(serde::Serialize)]
struct WorkspaceListOutput {
    total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    current: Option<String>,
    workspaces: Vec<WorkspaceEntry>,
}

#[derive(serde::Serialize)]
struct WorkspaceChangeOutput {
    id: String,
    name: String,
    current: bool,
}

pub fn run_list(global: GlobalOptions) -> Result<()> {
    let ctx = Context::load(&global)?;
    let current = ctx.workspace(&global).ok().map(|record| record.id);

    let mut entries = Vec::new();
    for record in ctx.store.list_workspaces()? {
        let tasks = ctx.store.list_tasks(&record.id, None)?;
        entries.push(WorkspaceEntry {
            current: current.as_deref() == Some(record.id.as_str()),
            perspectives: ctx.store.list_perspectives(&record.id)?.len(),
            projects: ctx.store.list_projects(&record.id)?.len(),
            open_tasks: tasks.iter().filter(|t| t.is_active()).count(),
            record,
        });
    }

    let mut human = HumanOutput::new("Workspaces");
    human.push_summary("Total", entries.len().to_string());
    for entry in &entries {
        let marker = if entry.current { "*" } else { " " };
        human.push_detail(format!(
            "{marker} {} ({})  {} projects, {} open tasks",
            entry.record.name, entry.record.id, entry.projects, entry.open_tasks
        ));
    }
    if entries.is_empty() {
        human.push_next_step("karma init");
    }

    let output = WorkspaceListOutput {
        total: entries.len(),
        current,
        workspaces: entries,
    };
    emit_success(global.output(), "ws ls", &output, Some(&human))
}

pub fn run_new(options: NewOptions) -> Result<()> {
    let global = options.global;
    let ctx = Context::load(&global)?;
    let perspectives = if options.perspectives.is_empty() {
        ctx.config.workspace.perspectives.clone()
    } else {
        options.perspectives
    };
    let first_workspace = ctx.store.is_empty()?;

    let record = ctx
        .store
        .create_workspace(CreateWorkspaceRequest::with_perspective_names(
            options.name,
            perspectives,
        ))?;
    let current = options.use_it || first_workspace;
    if current {
        ctx.store.storage().write_current_workspace(&record.id)?;
    }

    let mut human = HumanOutput::new("Workspace created");
    human.push_summary("ID", record.id.clone());
    human.push_summary("Name", record.name.clone());
    if current {
        human.push_summary("Current", "yes");
    }
    human.push_next_step(format!("karma -w {} project new <name>", record.id));

    let output = WorkspaceChangeOutput {
        id: record.id,
        name: record.name,
        current,
    };
    emit_success(global.output(), "ws new", &output, Some(&human))
}

pub fn run_rename(options: RenameOptions) -> Result<()> {
    let global = options.global;
    let ctx = Context::load(&global)?;
    let target = ctx.find_workspace(&options.target)?;
    let record = ctx.store.update_workspace(
        &target.id,
        UpdateWorkspaceRequest {
            name: Some(options.name),
        },
    )?;

    let mut human = HumanOutput::new("Workspace renamed");
    human.push_summary("ID", record.id.clone());
    human.push_summary("Name", record.name.clone());

    let current = ctx.store.storage().read_current_workspace();
    let output = WorkspaceChangeOutput {
        current: current.as_deref() == Some(record.id.as_str()),
        id: record.id,
        name: record.name,
    };
    emit_success(global.output(), "ws rename", &output, Some(&human))
}

pub fn run_rm(options: TargetOptions) -> Result<()> {
    let global = options.global;
    let ctx = Context::load(&global)?;
    let target = ctx.find_workspace(&options.target)?;
    ctx.store.delete_workspace(&target.id)?;

    let mut human = HumanOutput::new("Workspace deleted");
    human.push_summary("ID", target.id.clone());
    human.push_summary("Name", target.name.clone());

    let output = WorkspaceChangeOutput {
        id: target.id,
        name: target.name,
        current: false,
    };
    emit_success(global.output(), "ws rm", &output, Some(&human))
}

pub fn run_use(options: TargetOptions) -> Result<()> {
    let global = options.global;
    let ctx = Context::load(&global)?;
    let target = ctx.find_workspace(&options.target)?;
    ctx.store.storage().write_current_workspace(&target.id)?;

    let mut human = HumanOutput::new(format!("Now using {}", target.name));
    human.push_summary("ID", target.id.clone());

    let output = WorkspaceChangeOutput {
        id: target.id,
        name: target.name,
        current: true,
    };
    emit_success(global.output(), "ws use", &output, Some(&human))
}
