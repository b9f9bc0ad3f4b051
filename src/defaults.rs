//! Effective ids stamped on newly created tasks.
//!
//! A project view pins the project and a perspective view pins the
//! perspective; everything else falls back to the workspace defaults.

use tracing::debug;

use crate::config::PerspectivePolicy;
use crate::error::{Error, Result};
use crate::model::WorkspaceConfig;
use crate::navigation::NavigationState;
use crate::persistence::CreateTaskRequest;

/// Project a new task goes into.
///
/// Fails with [`Error::NoDefaultProject`] when the view does not pin a
/// project and the workspace has none: a task cannot be created without one.
pub fn effective_project_id(nav: &NavigationState, workspace: &WorkspaceConfig) -> Result<String> {
    if let Some(project) = nav.selected_project() {
        return Ok(project.to_string());
    }
    workspace
        .default_project()
        .map(|project| project.id.clone())
        .ok_or_else(|| Error::NoDefaultProject(workspace.id().to_string()))
}

/// Perspective a new task is filed under.
///
/// With no perspectives configured this returns `policy.fallback` (`inbox`
/// unless configured otherwise), or [`Error::NoDefaultPerspective`] when the
/// policy requires a real perspective.
pub fn effective_perspective_id(
    nav: &NavigationState,
    workspace: &WorkspaceConfig,
    policy: &PerspectivePolicy,
) -> Result<String> {
    if let Some(perspective) = nav.selected_perspective() {
        return Ok(perspective.to_string());
    }
    if let Some(perspective) = workspace.default_perspective() {
        return Ok(perspective.id.clone());
    }
    if policy.required || policy.fallback.is_empty() {
        return Err(Error::NoDefaultPerspective(workspace.id().to_string()));
    }
    debug!(
        workspace = workspace.id(),
        fallback = %policy.fallback,
        "no perspectives configured, using fallback"
    );
    Ok(policy.fallback.clone())
}

/// Creation request for `title` with both effective ids filled in.
pub fn new_task_request(
    title: &str,
    description: Option<String>,
    nav: &NavigationState,
    workspace: &WorkspaceConfig,
    policy: &PerspectivePolicy,
) -> Result<CreateTaskRequest> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::InvalidArgument("task title cannot be empty".to_string()));
    }
    Ok(CreateTaskRequest {
        title: title.to_string(),
        description: description.filter(|text| !text.trim().is_empty()),
        project_id: effective_project_id(nav, workspace)?,
        perspective_id: Some(effective_perspective_id(nav, workspace, policy)?),
        workspace_id: workspace.id().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::ViewKind;
    use crate::test_support::*;

    #[test]
    fn project_view_pins_project() {
        let ws = standard();
        let id = effective_project_id(&NavigationState::project("garden"), &ws).expect("project");
        assert_eq!(id, "garden");
    }

    #[test]
    fn other_views_use_default_project() {
        let ws = standard();
        for nav in [
            NavigationState::all(),
            NavigationState::perspective("next"),
            NavigationState::of(ViewKind::Project),
        ] {
            assert_eq!(effective_project_id(&nav, &ws).expect("project"), "home");
        }
    }

    #[test]
    fn no_projects_is_an_error() {
        let ws = workspace(vec![perspective("inbox", 0)], Vec::new());
        let err = effective_project_id(&NavigationState::of(ViewKind::Project), &ws)
            .expect_err("no default project");
        assert!(matches!(err, Error::NoDefaultProject(ref id) if id == "ws"));
    }

    #[test]
    fn default_perspective_when_view_does_not_pin_one() {
        let ws = workspace(vec![perspective("next", 1)], Vec::new());
        let id = effective_perspective_id(&NavigationState::all(), &ws, &PerspectivePolicy::default())
            .expect("perspective");
        assert_eq!(id, "next");
    }

    #[test]
    fn perspective_view_pins_requested_id() {
        let ws = standard();
        let id = effective_perspective_id(
            &NavigationState::perspective("someday"),
            &ws,
            &PerspectivePolicy::default(),
        )
        .expect("perspective");
        assert_eq!(id, "someday");
    }

    #[test]
    fn empty_workspace_falls_back_to_inbox() {
        let ws = workspace(Vec::new(), Vec::new());
        let id = effective_perspective_id(&NavigationState::all(), &ws, &PerspectivePolicy::default())
            .expect("fallback");
        assert_eq!(id, "inbox");
    }

    #[test]
    fn strict_policy_rejects_empty_workspace() {
        let ws = workspace(Vec::new(), Vec::new());
        let policy = PerspectivePolicy {
            fallback: "inbox".to_string(),
            required: true,
        };
        assert!(matches!(
            effective_perspective_id(&NavigationState::all(), &ws, &policy),
            Err(Error::NoDefaultPerspective(_))
        ));
    }

    #[test]
    fn new_task_request_stamps_effective_ids() {
        let ws = standard();
        let request = new_task_request(
            "  Water plants ",
            Some(" ".to_string()),
            &NavigationState::project("garden"),
            &ws,
            &PerspectivePolicy::default(),
        )
        .expect("request");
        assert_eq!(request.title, "Water plants");
        assert_eq!(request.description, None);
        assert_eq!(request.project_id, "garden");
        assert_eq!(request.perspective_id.as_deref(), Some("inbox"));
        assert_eq!(request.workspace_id, "ws");
    }

    #[test]
    fn new_task_request_rejects_blank_title() {
        let ws = standard();
        assert!(matches!(
            new_task_request("  ", None, &NavigationState::all(), &ws, &PerspectivePolicy::default()),
            Err(Error::InvalidArgument(_))
        ));
    }
}
