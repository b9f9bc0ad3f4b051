//! Builders shared by unit tests.

use chrono::{TimeZone, Utc};

use crate::model::{Perspective, Project, Task, WorkspaceConfig};

pub fn perspective(id: &str, order: i64) -> Perspective {
    Perspective {
        id: id.to_string(),
        name: capitalize(id),
        icon: String::new(),
        order,
    }
}

pub fn project(id: &str, name: &str, order: i64) -> Project {
    Project {
        id: id.to_string(),
        name: name.to_string(),
        icon: None,
        order,
        workspace_id: "ws".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

pub fn task(id: &str, perspective: Option<&str>, project: &str, order: i64) -> Task {
    let at = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
    Task {
        id: id.to_string(),
        title: id.to_string(),
        description: None,
        completed: false,
        perspective_id: perspective.map(str::to_string),
        project_id: project.to_string(),
        workspace_id: "ws".to_string(),
        order,
        created_at: at,
        updated_at: at,
    }
}

pub fn done(mut task: Task) -> Task {
    task.completed = true;
    task
}

pub fn workspace(perspectives: Vec<Perspective>, projects: Vec<Project>) -> WorkspaceConfig {
    WorkspaceConfig::new("ws", "Personal", perspectives, projects).expect("workspace")
}

pub fn standard() -> WorkspaceConfig {
    workspace(
        vec![
            perspective("inbox", 0),
            perspective("first", 1),
            perspective("next", 2),
            perspective("someday", 3),
        ],
        vec![project("home", "Home", 0), project("garden", "Garden", 1)],
    )
}

pub fn ids(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|task| task.id.as_str()).collect()
}

fn capitalize(id: &str) -> String {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
