//! View resolution: which tasks a view shows and how they are grouped.
//!
//! `resolve` is pure. Unknown perspective or project ids never fail; they
//! simply match nothing, rank last, or fall back to the raw id as a title.

use std::collections::HashMap;

use serde::Serialize;
use tracing::trace;

use crate::model::{Task, TaskGroup, WorkspaceConfig};
use crate::navigation::{NavigationState, ViewKind};
use crate::ordering::{self, Rank};

pub const ACTIONS_GROUP_ID: &str = "actions";
pub const ACTIONS_GROUP_TITLE: &str = "Actions";
pub const FLAT_GROUP_ID: &str = "all";
pub const FLAT_GROUP_TITLE: &str = "Tasks";

/// How active tasks are split into display groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Grouping {
    ByProject,
    ByPerspective,
    Flat,
}

impl Grouping {
    pub fn for_view(view: ViewKind) -> Self {
        match view {
            ViewKind::Perspective | ViewKind::All => Grouping::ByProject,
            ViewKind::Project | ViewKind::ProjectAll => Grouping::ByPerspective,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub title: String,
    pub grouping: Grouping,
    pub filtered: Vec<Task>,
    pub groups: Vec<TaskGroup>,
    pub active: Vec<Task>,
    pub completed: Vec<Task>,
    pub show_project_badge: bool,
    pub show_perspective_badge: bool,
}

/// Resolve a view with the grouping that belongs to it.
pub fn resolve(tasks: &[Task], workspace: &WorkspaceConfig, nav: &NavigationState) -> Resolution {
    resolve_with(tasks, workspace, nav, Grouping::for_view(nav.view))
}

/// Resolve a view with an explicit grouping.
pub fn resolve_with(
    tasks: &[Task],
    workspace: &WorkspaceConfig,
    nav: &NavigationState,
    grouping: Grouping,
) -> Resolution {
    let filtered = filter_tasks(tasks, workspace, nav);
    let (active, completed): (Vec<Task>, Vec<Task>) =
        filtered.iter().cloned().partition(Task::is_active);
    let groups = match grouping {
        Grouping::ByProject => group_by_project(&active, workspace),
        Grouping::ByPerspective => group_by_perspective(&active, workspace, nav.view),
        Grouping::Flat => group_flat(&active),
    };

    trace!(
        workspace = workspace.id(),
        view = %nav.view,
        input = tasks.len(),
        filtered = filtered.len(),
        groups = groups.len(),
        "resolved view"
    );

    Resolution {
        title: view_title(workspace, nav),
        grouping,
        show_project_badge: grouping != Grouping::ByProject && nav.view != ViewKind::Project,
        show_perspective_badge: grouping != Grouping::ByPerspective
            && nav.view != ViewKind::Perspective,
        filtered,
        groups,
        active,
        completed,
    }
}

/// Perspective shown by a perspective view: the requested one when it is
/// configured, otherwise the workspace default.
pub fn effective_view_perspective<'a>(
    workspace: &'a WorkspaceConfig,
    nav: &'a NavigationState,
) -> Option<&'a str> {
    nav.perspective_id
        .as_deref()
        .filter(|id| workspace.has_perspective(id))
        .or_else(|| workspace.default_perspective().map(|p| p.id.as_str()))
}

/// Tasks a view shows, in input order.
pub fn filter_tasks(tasks: &[Task], workspace: &WorkspaceConfig, nav: &NavigationState) -> Vec<Task> {
    match nav.view {
        ViewKind::Perspective => match effective_view_perspective(workspace, nav) {
            Some(perspective) => tasks
                .iter()
                .filter(|task| task.is_active() && task.perspective() == Some(perspective))
                .cloned()
                .collect(),
            None => Vec::new(),
        },
        ViewKind::Project => match nav.project_id.as_deref().filter(|id| !id.is_empty()) {
            Some(project) => tasks
                .iter()
                .filter(|task| task.project_id == project)
                .cloned()
                .collect(),
            None => tasks.to_vec(),
        },
        ViewKind::ProjectAll => tasks
            .iter()
            .filter(|task| task.project().is_some())
            .cloned()
            .collect(),
        ViewKind::All => tasks.to_vec(),
    }
}

/// Group active tasks by project: a leading "Actions" bucket for tasks
/// without a project, then one group per project in project order.
pub fn group_by_project(active: &[Task], workspace: &WorkspaceConfig) -> Vec<TaskGroup> {
    let mut groups = Vec::new();

    let mut loose: Vec<Task> = active
        .iter()
        .filter(|task| task.project().is_none())
        .cloned()
        .collect();
    if !loose.is_empty() {
        ordering::sort_by_perspective_then_order(&mut loose, workspace);
        groups.push(TaskGroup {
            id: ACTIONS_GROUP_ID.to_string(),
            title: ACTIONS_GROUP_TITLE.to_string(),
            tasks: loose,
        });
    }

    let mut buckets: Vec<(String, Vec<Task>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for task in active {
        let Some(project_id) = task.project() else {
            continue;
        };
        let slot = *index.entry(project_id.to_string()).or_insert_with(|| {
            buckets.push((project_id.to_string(), Vec::new()));
            buckets.len() - 1
        });
        buckets[slot].1.push(task.clone());
    }

    buckets.sort_by_key(|(project_id, _)| project_rank(project_id, workspace));

    for (project_id, mut tasks) in buckets {
        ordering::sort_by_perspective_then_order(&mut tasks, workspace);
        let title = workspace
            .project(&project_id)
            .map(|project| project.name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| project_id.clone());
        groups.push(TaskGroup {
            id: format!("project-{project_id}"),
            title,
            tasks,
        });
    }

    groups
}

/// Group active tasks by perspective in configured order. Tasks without a
/// perspective land in the default perspective's group; tasks filed under
/// an unknown perspective are left out.
pub fn group_by_perspective(
    active: &[Task],
    workspace: &WorkspaceConfig,
    view: ViewKind,
) -> Vec<TaskGroup> {
    let default_perspective = workspace.default_perspective().map(|p| p.id.as_str());

    workspace
        .perspectives()
        .iter()
        .filter_map(|perspective| {
            let mut tasks: Vec<Task> = active
                .iter()
                .filter(|task| {
                    task.perspective().or(default_perspective) == Some(perspective.id.as_str())
                })
                .cloned()
                .collect();
            if tasks.is_empty() {
                return None;
            }
            if view == ViewKind::ProjectAll {
                ordering::sort_by_project_then_order(&mut tasks, workspace);
            } else {
                ordering::sort_by_order(&mut tasks);
            }
            Some(TaskGroup {
                id: format!("perspective-{}", perspective.id),
                title: perspective.name.clone(),
                tasks,
            })
        })
        .collect()
}

/// Single "Tasks" group with every active task by `order`.
pub fn group_flat(active: &[Task]) -> Vec<TaskGroup> {
    if active.is_empty() {
        return Vec::new();
    }
    let mut tasks = active.to_vec();
    ordering::sort_by_order(&mut tasks);
    vec![TaskGroup {
        id: FLAT_GROUP_ID.to_string(),
        title: FLAT_GROUP_TITLE.to_string(),
        tasks,
    }]
}

/// Heading for the current view.
pub fn view_title(workspace: &WorkspaceConfig, nav: &NavigationState) -> String {
    match nav.view {
        ViewKind::All => "All".to_string(),
        ViewKind::ProjectAll => "All Projects".to_string(),
        ViewKind::Project => nav
            .project_id
            .as_deref()
            .and_then(|id| workspace.project(id))
            .map(|project| project.name.clone())
            .unwrap_or_else(|| "Project".to_string()),
        ViewKind::Perspective => nav
            .perspective_id
            .as_deref()
            .and_then(|id| workspace.perspective(id))
            .map(|perspective| perspective.name.clone())
            .unwrap_or_else(|| "Tasks".to_string()),
    }
}

fn project_rank(project_id: &str, workspace: &WorkspaceConfig) -> Rank {
    ordering::project_rank(Some(project_id), workspace.projects())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    fn scenario_workspace() -> WorkspaceConfig {
        workspace(
            vec![perspective("inbox", 0), perspective("next", 1)],
            vec![project("p1", "Errands", 0)],
        )
    }

    fn scenario_tasks() -> Vec<Task> {
        vec![
            task("t1", Some("inbox"), "p1", 0),
            task("t2", Some("next"), "p1", 0),
        ]
    }

    #[test]
    fn perspective_view_keeps_active_tasks_of_that_perspective() {
        let resolution = resolve(
            &scenario_tasks(),
            &scenario_workspace(),
            &NavigationState::perspective("inbox"),
        );
        assert_eq!(ids(&resolution.filtered), vec!["t1"]);
        assert_eq!(resolution.grouping, Grouping::ByProject);
        assert_eq!(resolution.title, "Inbox");
    }

    #[test]
    fn all_view_groups_by_project_in_perspective_order() {
        let resolution = resolve(&scenario_tasks(), &scenario_workspace(), &NavigationState::all());
        assert_eq!(ids(&resolution.filtered), vec!["t1", "t2"]);
        assert_eq!(resolution.groups.len(), 1);
        assert_eq!(resolution.groups[0].id, "project-p1");
        assert_eq!(resolution.groups[0].title, "Errands");
        assert_eq!(ids(&resolution.groups[0].tasks), vec!["t1", "t2"]);
    }

    #[test]
    fn perspective_view_excludes_completed_tasks() {
        let tasks = vec![
            done(task("old", Some("inbox"), "p1", 0)),
            task("new", Some("inbox"), "p1", 1),
        ];
        let resolution = resolve(&tasks, &scenario_workspace(), &NavigationState::perspective("inbox"));
        assert_eq!(ids(&resolution.filtered), vec!["new"]);
        assert!(resolution.completed.is_empty());
    }

    #[test]
    fn unknown_perspective_uses_default() {
        let resolution = resolve(
            &scenario_tasks(),
            &scenario_workspace(),
            &NavigationState::perspective("later"),
        );
        assert_eq!(ids(&resolution.filtered), vec!["t1"]);
        assert_eq!(resolution.title, "Tasks");
    }

    #[test]
    fn workspace_without_perspectives_shows_nothing() {
        let ws = workspace(Vec::new(), vec![project("p1", "Errands", 0)]);
        let resolution = resolve(&scenario_tasks(), &ws, &NavigationState::perspective("inbox"));
        assert!(resolution.filtered.is_empty());
        assert!(resolution.groups.is_empty());
    }

    #[test]
    fn project_view_keeps_completed_but_groups_only_active() {
        let tasks = vec![
            task("a", Some("next"), "p1", 2),
            done(task("b", Some("inbox"), "p1", 1)),
            task("c", None, "p1", 1),
            task("other", Some("inbox"), "p2", 0),
        ];
        let resolution = resolve(&tasks, &scenario_workspace(), &NavigationState::project("p1"));
        assert_eq!(ids(&resolution.filtered), vec!["a", "b", "c"]);
        assert_eq!(ids(&resolution.completed), vec!["b"]);
        assert_eq!(resolution.grouping, Grouping::ByPerspective);
        let group_ids: Vec<_> = resolution.groups.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(group_ids, vec!["perspective-inbox", "perspective-next"]);
        // no perspective falls back to the default (inbox) bucket
        assert_eq!(ids(&resolution.groups[0].tasks), vec!["c"]);
        assert!(!resolution.show_project_badge);
        assert!(!resolution.show_perspective_badge);
    }

    #[test]
    fn project_view_without_id_is_unfiltered() {
        let nav = NavigationState::of(ViewKind::Project);
        let resolution = resolve(&scenario_tasks(), &scenario_workspace(), &nav);
        assert_eq!(resolution.filtered.len(), 2);
        assert_eq!(resolution.title, "Project");
    }

    #[test]
    fn project_all_drops_tasks_without_project() {
        let tasks = vec![task("legacy", Some("inbox"), "", 0), task("t1", Some("inbox"), "p1", 0)];
        let resolution = resolve(&tasks, &scenario_workspace(), &NavigationState::project_all());
        assert_eq!(ids(&resolution.filtered), vec!["t1"]);
        assert_eq!(resolution.title, "All Projects");
    }

    #[test]
    fn project_all_sorts_groups_by_project_then_order() {
        let ws = standard();
        let tasks = vec![
            task("g", Some("inbox"), "garden", 0),
            task("h2", Some("inbox"), "home", 5),
            task("h1", Some("inbox"), "home", 3),
        ];
        let resolution = resolve(&tasks, &ws, &NavigationState::project_all());
        assert_eq!(ids(&resolution.groups[0].tasks), vec!["h1", "h2", "g"]);
    }

    #[test]
    fn tasks_without_project_lead_as_actions() {
        let tasks = vec![
            task("p", Some("inbox"), "home", 0),
            task("loose2", Some("next"), "", 0),
            task("loose1", Some("inbox"), "", 4),
        ];
        let resolution = resolve(&tasks, &standard(), &NavigationState::all());
        assert_eq!(resolution.groups[0].id, ACTIONS_GROUP_ID);
        assert_eq!(resolution.groups[0].title, ACTIONS_GROUP_TITLE);
        assert_eq!(ids(&resolution.groups[0].tasks), vec!["loose1", "loose2"]);
        assert_eq!(resolution.groups[1].id, "project-home");
    }

    #[test]
    fn project_groups_follow_project_order_with_unknown_last() {
        let tasks = vec![
            task("x", Some("inbox"), "ghost", 0),
            task("g", Some("inbox"), "garden", 0),
            task("h", Some("inbox"), "home", 0),
        ];
        let resolution = resolve(&tasks, &standard(), &NavigationState::all());
        let titles: Vec<_> = resolution.groups.iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, vec!["Home", "Garden", "ghost"]);
    }

    #[test]
    fn unknown_perspective_is_left_out_of_perspective_groups() {
        let tasks = vec![task("odd", Some("archive"), "home", 0)];
        let resolution = resolve(&tasks, &standard(), &NavigationState::project("home"));
        assert_eq!(resolution.filtered.len(), 1);
        assert!(resolution.groups.is_empty());
    }

    #[test]
    fn flat_grouping_sorts_by_order() {
        let tasks = vec![
            task("b", Some("next"), "home", 2),
            done(task("c", Some("inbox"), "home", 0)),
            task("a", Some("inbox"), "garden", 1),
        ];
        let resolution = resolve_with(&tasks, &standard(), &NavigationState::all(), Grouping::Flat);
        assert_eq!(resolution.groups.len(), 1);
        assert_eq!(resolution.groups[0].id, FLAT_GROUP_ID);
        assert_eq!(ids(&resolution.groups[0].tasks), vec!["a", "b"]);
        assert!(group_flat(&[]).is_empty());
    }

    #[test]
    fn resolve_is_deterministic() {
        let tasks = vec![
            task("a", Some("next"), "garden", 1),
            task("b", None, "home", 1),
            task("c", Some("inbox"), "", 1),
            done(task("d", Some("inbox"), "home", 0)),
        ];
        let ws = standard();
        for nav in [
            NavigationState::all(),
            NavigationState::project_all(),
            NavigationState::project("home"),
            NavigationState::perspective("inbox"),
        ] {
            assert_eq!(resolve(&tasks, &ws, &nav), resolve(&tasks, &ws, &nav));
        }
    }
}
