//! Domain records: perspectives, projects, workspaces and tasks.
//!
//! `WorkspaceConfig` is the immutable snapshot the view engine reads. It is
//! only built through [`WorkspaceConfig::new`], which rejects duplicate ids
//! and sorts both lists by `order`, so list position doubles as rank.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::{EntityKind, Error, Result};

const GENERATED_ID_SUFFIX_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Perspective {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub order: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub order: i64,
    pub workspace_id: String,
    pub created_at: DateTime<Utc>,
}

/// Stored workspace identity (perspectives and projects live in their own
/// collections).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceRecord {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    /// `None` means the task has not been filed under a perspective yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perspective_id: Option<String>,
    /// Empty for legacy records without a project.
    #[serde(default)]
    pub project_id: String,
    pub workspace_id: String,
    #[serde(default)]
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn project(&self) -> Option<&str> {
        let id = self.project_id.trim();
        if id.is_empty() {
            None
        } else {
            Some(id)
        }
    }

    pub fn perspective(&self) -> Option<&str> {
        self.perspective_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn is_active(&self) -> bool {
        !self.completed
    }
}

/// A named bucket of tasks produced for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskGroup {
    pub id: String,
    pub title: String,
    pub tasks: Vec<Task>,
}

/// Read-only snapshot of one workspace's identity and ordering config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspaceConfig {
    id: String,
    name: String,
    perspectives: Vec<Perspective>,
    projects: Vec<Project>,
}

impl WorkspaceConfig {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        mut perspectives: Vec<Perspective>,
        mut projects: Vec<Project>,
    ) -> Result<Self> {
        ensure_unique(
            EntityKind::Perspective,
            perspectives.iter().map(|p| p.id.as_str()),
        )?;
        ensure_unique(EntityKind::Project, projects.iter().map(|p| p.id.as_str()))?;
        perspectives.sort_by_key(|perspective| perspective.order);
        projects.sort_by_key(|project| project.order);
        Ok(Self {
            id: id.into(),
            name: name.into(),
            perspectives,
            projects,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Perspectives in ascending `order`.
    pub fn perspectives(&self) -> &[Perspective] {
        &self.perspectives
    }

    /// Projects in ascending `order`.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn perspective(&self, id: &str) -> Option<&Perspective> {
        self.perspectives.iter().find(|p| p.id == id)
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn has_perspective(&self, id: &str) -> bool {
        self.perspective(id).is_some()
    }

    pub fn has_project(&self, id: &str) -> bool {
        self.project(id).is_some()
    }

    pub fn default_perspective(&self) -> Option<&Perspective> {
        self.perspectives.first()
    }

    pub fn default_project(&self) -> Option<&Project> {
        self.projects.first()
    }
}

fn ensure_unique<'a>(kind: EntityKind, ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(Error::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

/// Lowercase, dash-separated id derived from a display name.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.trim().chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Id for a new entity: the slug of its name, or `<prefix>-<ulid suffix>`
/// when the slug is empty or already taken.
pub fn generate_id(prefix: &str, name: &str, existing: &HashSet<String>) -> String {
    let slug = slugify(name);
    if !slug.is_empty() && !existing.contains(&slug) {
        return slug;
    }
    loop {
        let raw = Ulid::new().to_string().to_ascii_lowercase();
        let candidate = format!("{prefix}-{}", &raw[raw.len() - GENERATED_ID_SUFFIX_LEN..]);
        if !existing.contains(&candidate) {
            return candidate;
        }
    }
}
