//! Total orders over tasks.
//!
//! Ranks come from a task's position in the workspace's ordered perspective
//! or project list. Unknown or missing ids rank after every configured one.
//! All sorts here are stable: ties on both keys keep input order.

use std::cmp::Ordering;

use crate::model::{Perspective, Project, Task, WorkspaceConfig};

/// Position of a perspective or project in its ordered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rank(usize);

impl Rank {
    /// Sentinel for ids that are absent, empty, or not configured.
    pub const UNRANKED: Rank = Rank(usize::MAX);

    pub fn index(self) -> Option<usize> {
        if self == Rank::UNRANKED {
            None
        } else {
            Some(self.0)
        }
    }
}

pub fn perspective_rank(perspective_id: Option<&str>, perspectives: &[Perspective]) -> Rank {
    rank_of(perspective_id, perspectives.iter().map(|p| p.id.as_str()))
}

pub fn project_rank(project_id: Option<&str>, projects: &[Project]) -> Rank {
    rank_of(project_id, projects.iter().map(|p| p.id.as_str()))
}

fn rank_of<'a>(id: Option<&str>, ids: impl Iterator<Item = &'a str>) -> Rank {
    let id = match id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => id,
        None => return Rank::UNRANKED,
    };
    ids.enumerate()
        .find(|(_, candidate)| *candidate == id)
        .map(|(index, _)| Rank(index))
        .unwrap_or(Rank::UNRANKED)
}

pub fn compare_by_perspective_then_order(a: &Task, b: &Task, ws: &WorkspaceConfig) -> Ordering {
    perspective_rank(a.perspective(), ws.perspectives())
        .cmp(&perspective_rank(b.perspective(), ws.perspectives()))
        .then_with(|| a.order.cmp(&b.order))
}

pub fn compare_by_project_then_order(a: &Task, b: &Task, ws: &WorkspaceConfig) -> Ordering {
    project_rank(a.project(), ws.projects())
        .cmp(&project_rank(b.project(), ws.projects()))
        .then_with(|| a.order.cmp(&b.order))
}

pub fn sort_by_perspective_then_order(tasks: &mut [Task], ws: &WorkspaceConfig) {
    tasks.sort_by(|a, b| compare_by_perspective_then_order(a, b, ws));
}

pub fn sort_by_project_then_order(tasks: &mut [Task], ws: &WorkspaceConfig) {
    tasks.sort_by(|a, b| compare_by_project_then_order(a, b, ws));
}

pub fn sort_by_order(tasks: &mut [Task]) {
    tasks.sort_by_key(|task| task.order);
}
