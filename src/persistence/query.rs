//! Filter, sort and page envelope for task listings.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::Task;

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: usize = 50;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perspective_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    /// Case-insensitive substring of title or description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(workspace_id) = &self.workspace_id {
            if &task.workspace_id != workspace_id {
                return false;
            }
        }
        self.matches_within_workspace(task)
    }

    /// Like [`TaskFilter::matches`] but ignores `workspace_id`.
    pub fn matches_within_workspace(&self, task: &Task) -> bool {
        if let Some(project_id) = &self.project_id {
            if &task.project_id != project_id {
                return false;
            }
        }
        if let Some(perspective_id) = &self.perspective_id {
            if task.perspective() != Some(perspective_id.as_str()) {
                return false;
            }
        }
        if let Some(completed) = self.completed {
            if task.completed != completed {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                task.title.to_lowercase().contains(&needle)
                    || task
                        .description
                        .as_deref()
                        .is_some_and(|text| text.to_lowercase().contains(&needle))
            }
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Order,
    Title,
    CreatedAt,
    UpdatedAt,
    Completed,
}

impl SortField {
    pub const ALL: [SortField; 5] = [
        SortField::Order,
        SortField::Title,
        SortField::CreatedAt,
        SortField::UpdatedAt,
        SortField::Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Order => "order",
            SortField::Title => "title",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Completed => "completed",
        }
    }

    fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            SortField::Order => a.order.cmp(&b.order),
            SortField::Title => a.title.cmp(&b.title),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::Completed => a.completed.cmp(&b.completed),
        }
    }
}

impl FromStr for SortField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SortField::ALL
            .into_iter()
            .find(|field| field.as_str() == s.trim())
            .ok_or_else(|| {
                let valid: Vec<_> = SortField::ALL.iter().map(|f| f.as_str()).collect();
                Error::InvalidArgument(format!(
                    "unknown sort field '{s}' (expected one of: {})",
                    valid.join(", ")
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: SortField,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Desc,
        }
    }

    fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let ordering = self.field.compare(a, b);
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Parses `field`, `field:asc`, `field:desc` or `-field`.
impl FromStr for SortKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(field) = s.strip_prefix('-') {
            return Ok(SortKey::desc(field.parse()?));
        }
        match s.split_once(':') {
            None => Ok(SortKey::asc(s.parse()?)),
            Some((field, "asc")) => Ok(SortKey::asc(field.parse()?)),
            Some((field, "desc")) => Ok(SortKey::desc(field.parse()?)),
            Some((_, direction)) => Err(Error::InvalidArgument(format!(
                "unknown sort direction '{direction}' (expected asc or desc)"
            ))),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            SortDirection::Asc => write!(f, "{}", self.field.as_str()),
            SortDirection::Desc => write!(f, "{}:desc", self.field.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<TaskFilter>,
    /// Earlier keys take precedence; ties keep storage order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortKey>,
    /// 1-based.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
}

impl ListQuery {
    /// Filter, sort and slice `tasks` into one page.
    pub fn apply(&self, mut tasks: Vec<Task>) -> Result<Page<Task>> {
        let page = self.page.unwrap_or(1);
        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page == 0 {
            return Err(Error::InvalidArgument("page numbers start at 1".to_string()));
        }
        if page_size == 0 {
            return Err(Error::InvalidArgument(
                "page size must be greater than 0".to_string(),
            ));
        }

        if let Some(filter) = &self.filter {
            tasks.retain(|task| filter.matches(task));
        }
        if !self.sort.is_empty() {
            tasks.sort_by(|a, b| {
                self.sort
                    .iter()
                    .map(|key| key.compare(a, b))
                    .find(|ordering| ordering.is_ne())
                    .unwrap_or(Ordering::Equal)
            });
        }

        let total = tasks.len();
        let items = tasks
            .into_iter()
            .skip((page - 1).saturating_mul(page_size))
            .take(page_size)
            .collect();
        Ok(Page {
            items,
            page,
            page_size,
            total,
            total_pages: total.div_ceil(page_size),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::task;

    fn with_title(mut task: Task, title: &str, description: Option<&str>) -> Task {
        task.title = title.to_string();
        task.description = description.map(str::to_string);
        task
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_description() {
        let filter = TaskFilter {
            search: Some("MILK".to_string()),
            ..TaskFilter::default()
        };
        let by_title = with_title(task("a", None, "home", 1), "Buy milk", None);
        let by_description = with_title(task("b", None, "home", 2), "Groceries", Some("milk, eggs"));
        let neither = with_title(task("c", None, "home", 3), "Call mom", None);
        assert!(filter.matches(&by_title));
        assert!(filter.matches(&by_description));
        assert!(!filter.matches(&neither));
    }

    #[test]
    fn perspective_filter_skips_untagged_tasks() {
        let filter = TaskFilter {
            perspective_id: Some("next".to_string()),
            ..TaskFilter::default()
        };
        assert!(filter.matches(&task("a", Some("next"), "home", 1)));
        assert!(!filter.matches(&task("b", None, "home", 1)));
    }

    #[test]
    fn workspace_scope_can_be_ignored() {
        let filter = TaskFilter {
            workspace_id: Some("elsewhere".to_string()),
            project_id: Some("home".to_string()),
            ..TaskFilter::default()
        };
        let task = task("a", None, "home", 1);
        assert!(!filter.matches(&task));
        assert!(filter.matches_within_workspace(&task));
    }

    #[test]
    fn sort_key_parsing() {
        assert_eq!("title".parse::<SortKey>().expect("asc"), SortKey::asc(SortField::Title));
        assert_eq!(
            "created_at:desc".parse::<SortKey>().expect("desc"),
            SortKey::desc(SortField::CreatedAt)
        );
        assert_eq!("-order".parse::<SortKey>().expect("dash"), SortKey::desc(SortField::Order));
        assert!("priority".parse::<SortKey>().is_err());
        assert!("title:up".parse::<SortKey>().is_err());
    }

    #[test]
    fn earlier_sort_keys_take_precedence() {
        let tasks = vec![
            with_title(task("a", None, "home", 2), "b", None),
            with_title(task("b", None, "home", 1), "b", None),
            with_title(task("c", None, "home", 3), "a", None),
        ];
        let query = ListQuery {
            sort: vec![SortKey::asc(SortField::Title), SortKey::desc(SortField::Order)],
            ..ListQuery::default()
        };
        let page = query.apply(tasks).expect("page");
        let ids: Vec<_> = page.items.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn pages_are_one_based() {
        let tasks: Vec<_> = (1..=5).map(|i| task(&format!("t{i}"), None, "home", i)).collect();
        let query = ListQuery {
            page: Some(2),
            page_size: Some(2),
            ..ListQuery::default()
        };
        let page = query.apply(tasks.clone()).expect("page");
        let ids: Vec<_> = page.items.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t3", "t4"]);
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);

        let beyond = ListQuery {
            page: Some(9),
            ..query
        }
        .apply(tasks.clone())
        .expect("page");
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 5);

        let zero = ListQuery {
            page: Some(0),
            ..ListQuery::default()
        };
        assert!(matches!(zero.apply(tasks), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn empty_result_has_no_pages() {
        let page = ListQuery::default().apply(Vec::new()).expect("page");
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(page.total_pages, 0);
    }
}
