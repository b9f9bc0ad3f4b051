//! karma perspective command implementations.

use super::context::Context;
use super::GlobalOptions;
use crate::error::{Error, Result};
use crate::model::Perspective;
use crate::output::{emit_success, HumanOutput};
use crate::persistence::{CreatePerspectiveRequest, PersistencePort, UpdatePerspectiveRequest};

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
    pub order: Option<i64>,
    pub global: GlobalOptions,
}

#[derive(serde::Serialize)]
struct PerspectiveListOutput {
    workspace: String,
    total: usize,
    perspectives: Vec<Perspective>,
}

#[derive(serde::Serialize)]
struct PerspectiveOutput {
    workspace: String,
    perspective: Perspective,
}

#[derive(serde::Serialize)]
struct PerspectiveRemovedOutput {
    workspace: String,
    id: String,
}

pub fn run_list(global: GlobalOptions) -> Result<()> {
    let ctx = Context::load(&global)?;
    let config = ctx.workspace_config(&global)?;
    let perspectives = config.perspectives().to_vec();

    let mut human = HumanOutput::new(format!("Perspectives in {}", config.name()));
    human.push_summary("Total", perspectives.len().to_string());
    for (index, perspective) in perspectives.iter().enumerate() {
        let default = if index == 0 { "  (default)" } else { "" };
        let label = if perspective.icon.is_empty() {
            perspective.name.clone()
        } else {
            format!("{} {}", perspective.icon, perspective.name)
        };
        human.push_detail(format!("{label} ({}){default}", perspective.id));
    }
    if perspectives.is_empty() {
        human.push_warning(format!(
            "no perspectives; new tasks are filed under '{}'",
            ctx.config.defaults.fallback_perspective
        ));
        human.push_next_step("karma perspective new <name>");
    }

    let output = PerspectiveListOutput {
        workspace: config.id().to_string(),
        total: perspectives.len(),
        perspectives,
    };
    emit_success(global.output(), "perspective ls", &output, Some(&human))
}

pub fn run_new(options: NewOptions) -> Result<()> {
    let global = options.global;
    let ctx = Context::load(&global)?;
    let workspace = ctx.workspace(&global)?;
    let perspective = ctx.store.create_perspective(
        &workspace.id,
        CreatePerspectiveRequest {
            name: options.name,
            icon: options.icon,
            order: options.order,
        },
    )?;

    let mut human = HumanOutput::new("Perspective created");
    human.push_summary("ID", perspective.id.clone());
    human.push_summary("Name", perspective.name.clone());
    human.push_summary("Order", perspective.order.to_string());

    let output = PerspectiveOutput {
        workspace: workspace.id,
        perspective,
    };
    emit_success(global.output(), "perspective new", &output, Some(&human))
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let global = options.global;
    if options.name.is_none() && options.icon.is_none() && options.order.is_none() {
        return Err(Error::InvalidArgument(
            "nothing to change; pass --name, --icon or --order".to_string(),
        ));
    }
    let ctx = Context::load(&global)?;
    let workspace = ctx.workspace(&global)?;
    let perspective = ctx.store.update_perspective(
        &workspace.id,
        &options.id,
        UpdatePerspectiveRequest {
            name: options.name,
            icon: options.icon,
            order: options.order,
        },
    )?;

    let mut human = HumanOutput::new("Perspective updated");
    human.push_summary("ID", perspective.id.clone());
    human.push_summary("Name", perspective.name.clone());
    human.push_summary("Order", perspective.order.to_string());

    let output = PerspectiveOutput {
        workspace: workspace.id,
        perspective,
    };
    emit_success(global.output(), "perspective edit", &output, Some(&human))
}

pub fn run_rm(id: String, global: GlobalOptions) -> Result<()> {
    let ctx = Context::load(&global)?;
    let workspace = ctx.workspace(&global)?;
    ctx.store.delete_perspective(&workspace.id, &id)?;

    let mut human = HumanOutput::new("Perspective deleted");
    human.push_summary("ID", id.clone());

    let output = PerspectiveRemovedOutput {
        workspace: workspace.id,
        id,
    };
    emit_success(global.output(), "perspective rm", &output, Some(&human))
}
