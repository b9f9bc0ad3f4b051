//! Navigation state: which view the user is looking at.
//!
//! Also turns loosely-typed navigation parameters (CLI flags or a
//! `view=..&perspective=..&project=..` query string) into a state that is
//! valid for a given workspace.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::WorkspaceConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewKind {
    #[default]
    Perspective,
    Project,
    ProjectAll,
    All,
}

impl ViewKind {
    pub const ALL: [ViewKind; 4] = [
        ViewKind::Perspective,
        ViewKind::Project,
        ViewKind::ProjectAll,
        ViewKind::All,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ViewKind::Perspective => "perspective",
            ViewKind::Project => "project",
            ViewKind::ProjectAll => "project-all",
            ViewKind::All => "all",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        ViewKind::ALL
            .into_iter()
            .find(|view| view.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "invalid view '{needle}' (expected perspective|project|project-all|all)"
                ))
            })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    pub view: ViewKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perspective_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

impl NavigationState {
    pub fn perspective(id: impl Into<String>) -> Self {
        Self {
            view: ViewKind::Perspective,
            perspective_id: Some(id.into()),
            project_id: None,
        }
    }

    pub fn project(id: impl Into<String>) -> Self {
        Self {
            view: ViewKind::Project,
            perspective_id: None,
            project_id: Some(id.into()),
        }
    }

    pub fn project_all() -> Self {
        Self::of(ViewKind::ProjectAll)
    }

    pub fn all() -> Self {
        Self::of(ViewKind::All)
    }

    pub fn of(view: ViewKind) -> Self {
        Self {
            view,
            perspective_id: None,
            project_id: None,
        }
    }

    /// Perspective id, only when the view is a perspective view.
    pub fn selected_perspective(&self) -> Option<&str> {
        match self.view {
            ViewKind::Perspective => non_empty(self.perspective_id.as_deref()),
            _ => None,
        }
    }

    /// Project id, only when the view is a single-project view.
    pub fn selected_project(&self) -> Option<&str> {
        match self.view {
            ViewKind::Project => non_empty(self.project_id.as_deref()),
            _ => None,
        }
    }

    /// Render as a query string; ids are only emitted for the view that uses them.
    pub fn to_query(&self, workspace_id: Option<&str>) -> String {
        let mut pairs = Vec::new();
        if let Some(workspace) = non_empty(workspace_id) {
            pairs.push(format!("workspace={workspace}"));
        }
        pairs.push(format!("view={}", self.view));
        if let Some(perspective) = self.selected_perspective() {
            pairs.push(format!("perspective={perspective}"));
        }
        if let Some(project) = self.selected_project() {
            pairs.push(format!("project={project}"));
        }
        pairs.join("&")
    }
}

/// Unvalidated navigation input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationParams {
    pub workspace: Option<String>,
    pub view: Option<String>,
    pub perspective: Option<String>,
    pub project: Option<String>,
}

impl NavigationParams {
    /// Parse `key=value` pairs separated by `&`. Unknown keys are ignored.
    pub fn parse_query(query: &str) -> Self {
        let mut params = Self::default();
        let query = query.trim().trim_start_matches('?');
        for pair in query.split('&') {
            let (key, value) = match pair.split_once('=') {
                Some((key, value)) => (key.trim(), value.trim()),
                None => continue,
            };
            if value.is_empty() {
                continue;
            }
            let slot = match key {
                "workspace" => &mut params.workspace,
                "view" => &mut params.view,
                "perspective" => &mut params.perspective,
                "project" => &mut params.project,
                _ => continue,
            };
            *slot = Some(value.to_string());
        }
        params
    }
}

/// Build a navigation state that is valid for `workspace`.
///
/// A missing or invalid view lands on the default perspective. A project
/// view pointing at an unknown project falls back to the default
/// perspective as well.
pub fn initialize(params: &NavigationParams, workspace: &WorkspaceConfig) -> NavigationState {
    let view = params
        .view
        .as_deref()
        .and_then(|raw| raw.parse::<ViewKind>().ok());

    match view {
        Some(ViewKind::Project) => {
            match non_empty(params.project.as_deref()).filter(|id| workspace.has_project(id)) {
                Some(project) => NavigationState::project(project),
                None => default_perspective_view(workspace),
            }
        }
        Some(ViewKind::ProjectAll) => NavigationState::project_all(),
        Some(ViewKind::All) => NavigationState::all(),
        Some(ViewKind::Perspective) | None => {
            match non_empty(params.perspective.as_deref())
                .filter(|id| view.is_some() && workspace.has_perspective(id))
            {
                Some(perspective) => NavigationState::perspective(perspective),
                None => default_perspective_view(workspace),
            }
        }
    }
}

fn default_perspective_view(workspace: &WorkspaceConfig) -> NavigationState {
    NavigationState {
        view: ViewKind::Perspective,
        perspective_id: workspace.default_perspective().map(|p| p.id.clone()),
        project_id: None,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
