//! Starter data for a fresh data directory.

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::persistence::{
    CreateProjectRequest, CreateTaskRequest, CreateWorkspaceRequest, PersistencePort,
    UpdateTaskRequest,
};

struct SeedTask {
    title: &'static str,
    project: usize,
    /// Position in the workspace's perspective list.
    perspective: Option<usize>,
    completed: bool,
}

const fn open(title: &'static str, project: usize, perspective: usize) -> SeedTask {
    SeedTask {
        title,
        project,
        perspective: Some(perspective),
        completed: false,
    }
}

const fn finished(title: &'static str, project: usize, perspective: usize) -> SeedTask {
    SeedTask {
        title,
        project,
        perspective: Some(perspective),
        completed: true,
    }
}

struct SeedWorkspace {
    name: &'static str,
    projects: &'static [(&'static str, Option<&'static str>)],
    tasks: &'static [SeedTask],
}

const WORKSPACES: &[SeedWorkspace] = &[
    SeedWorkspace {
        name: "Personal",
        projects: &[
            ("Home Life", Some("🏠")),
            ("Health", Some("💪")),
            ("Family", None),
            ("Entertainment", None),
        ],
        tasks: &[
            open("Buy groceries", 0, 0),
            open("Review monthly budget", 0, 1),
            open("Plan vacation", 3, 3),
            finished("Read book", 3, 2),
            open("Exercise routine", 1, 2),
            SeedTask {
                title: "Call insurance company",
                project: 0,
                perspective: None,
                completed: false,
            },
            open("Clean workspace", 0, 2),
            open("Learn new skill", 2, 3),
        ],
    },
    SeedWorkspace {
        name: "Work",
        projects: &[("Projects", Some("📁")), ("Meetings", None)],
        tasks: &[
            open("Complete project proposal", 0, 1),
            finished("Update software", 0, 2),
            open("Team meeting", 1, 0),
            open("Organize files", 0, 3),
        ],
    },
    SeedWorkspace {
        name: "Hobby",
        projects: &[("Apartment", None)],
        tasks: &[open("Hang shelves", 0, 0)],
    },
];

/// What [`seed`] created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub workspaces: Vec<String>,
    pub projects: usize,
    pub tasks: usize,
}

/// Create the starter workspaces through `store`.
///
/// Every workspace gets `perspective_names` as its perspectives. Seed tasks
/// pointing past the end of that list are left untagged.
pub fn seed<S: PersistencePort + ?Sized>(
    store: &S,
    perspective_names: &[String],
) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    for entry in WORKSPACES {
        let workspace = store.create_workspace(CreateWorkspaceRequest::with_perspective_names(
            entry.name,
            perspective_names.iter().cloned(),
        ))?;
        let perspectives = store.load_workspace_config(&workspace.id)?.perspectives().to_vec();

        let mut project_ids = Vec::with_capacity(entry.projects.len());
        for &(name, icon) in entry.projects {
            let project = store.create_project(
                &workspace.id,
                CreateProjectRequest {
                    name: name.to_string(),
                    icon: icon.map(str::to_string),
                    order: None,
                },
            )?;
            project_ids.push(project.id);
        }
        report.projects += project_ids.len();

        for seed_task in entry.tasks {
            let Some(project_id) = project_ids.get(seed_task.project) else {
                continue;
            };
            let task = store.create_task(CreateTaskRequest {
                title: seed_task.title.to_string(),
                description: None,
                project_id: project_id.clone(),
                perspective_id: seed_task
                    .perspective
                    .and_then(|index| perspectives.get(index))
                    .map(|perspective| perspective.id.clone()),
                workspace_id: workspace.id.clone(),
            })?;
            if seed_task.completed {
                store.update_task(
                    &workspace.id,
                    &task.id,
                    UpdateTaskRequest {
                        completed: Some(true),
                        ..UpdateTaskRequest::default()
                    },
                )?;
            }
            report.tasks += 1;
        }

        debug!(workspace = %workspace.id, "seeded workspace");
        report.workspaces.push(workspace.id);
    }

    Ok(report)
}
