//! karma view command implementation
//!
//! Loads one workspace, runs the view resolver and prints the groups.

use serde::Serialize;

use super::context::Context;
use super::{GlobalOptions, NavArgs};
use crate::error::Result;
use crate::model::{Task, TaskGroup};
use crate::navigation::{self, NavigationState, ViewKind};
use crate::output::{emit_success, format_task, HumanOutput};
use crate::persistence::PersistencePort;
use crate::resolver::{self, Grouping};

pub struct ViewOptions {
    pub nav: NavArgs,
    pub flat: bool,
    pub completed: bool,
    pub global: GlobalOptions,
}

#[derive(Serialize)]
struct ViewOutput<'a> {
    workspace: &'a str,
    navigation: &'a NavigationState,
    query: String,
    title: &'a str,
    grouping: Grouping,
    groups: &'a [TaskGroup],
    active_count: usize,
    completed_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed: Option<&'a [Task]>,
}

pub fn run(options: ViewOptions) -> Result<()> {
    let global = options.global;
    let ctx = Context::load(&global)?;
    let config = ctx.workspace_config(&global)?;
    let tasks = ctx.store.list_tasks(config.id(), None)?;

    let params = options.nav.to_params();
    let nav = navigation::initialize(&params, &config);
    let grouping = if options.flat {
        Grouping::Flat
    } else {
        Grouping::for_view(nav.view)
    };
    let resolution = resolver::resolve_with(&tasks, &config, &nav, grouping);

    let mut human = HumanOutput::new(resolution.title.clone());
    human.push_summary("workspace", config.name());
    human.push_summary("view", nav.view.as_str());
    human.push_summary(
        "tasks",
        format!(
            "{} open, {} done",
            resolution.active.len(),
            resolution.completed.len()
        ),
    );

    let requested_view = params
        .view
        .as_deref()
        .and_then(|raw| raw.parse::<ViewKind>().ok());
    match (params.view.as_deref(), requested_view) {
        (Some(raw), None) => {
            human.push_warning(format!("unknown view '{raw}'; showing {}", resolution.title));
        }
        (_, Some(ViewKind::Project)) if nav.view != ViewKind::Project => {
            let project = params.project.as_deref().unwrap_or_default();
            human.push_warning(format!(
                "unknown project '{project}'; showing {}",
                resolution.title
            ));
        }
        (_, Some(ViewKind::Perspective)) => {
            if let Some(requested) = params.perspective.as_deref() {
                if nav.selected_perspective() != Some(requested.trim()) {
                    human.push_warning(format!(
                        "unknown perspective '{requested}'; showing {}",
                        resolution.title
                    ));
                }
            }
        }
        _ => {}
    }

    let mut first = true;
    for group in &resolution.groups {
        if !first {
            human.push_detail("");
        }
        first = false;
        human.push_detail(format!("{} ({})", group.title, group.tasks.len()));
        for task in &group.tasks {
            human.push_detail(format!(
                "  {}",
                format_task(
                    task,
                    &config,
                    resolution.show_project_badge,
                    resolution.show_perspective_badge
                )
            ));
        }
    }
    if options.completed && !resolution.completed.is_empty() {
        if !first {
            human.push_detail("");
        }
        human.push_detail(format!("Completed ({})", resolution.completed.len()));
        for task in &resolution.completed {
            human.push_detail(format!(
                "  {}",
                format_task(
                    task,
                    &config,
                    resolution.show_project_badge,
                    resolution.show_perspective_badge
                )
            ));
        }
    }
    if resolution.groups.is_empty() {
        human.push_detail("No open tasks");
    }
    if config.projects().is_empty() {
        human.push_next_step("karma project new <name>");
    }

    let output = ViewOutput {
        workspace: config.id(),
        navigation: &nav,
        query: nav.to_query(Some(config.id())),
        title: &resolution.title,
        grouping,
        groups: &resolution.groups,
        active_count: resolution.active.len(),
        completed_count: resolution.completed.len(),
        completed: options.completed.then_some(resolution.completed.as_slice()),
    };
    emit_success(global.output(), "view", &output, Some(&human))
}
