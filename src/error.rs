//! Error types for karma
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, unknown ids, invalid config)
//! - 3: Precondition failed (task creation has no target project/perspective)
//! - 4: Operation failed (io, serialization, lock contention)

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Exit codes for the karma CLI
pub mod exit_codes {
    pub const USER_ERROR: i32 = 2;
    pub const PRECONDITION_FAILED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Kind of entity a lookup failed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Workspace,
    Perspective,
    Project,
    Task,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Workspace => "Workspace",
            EntityKind::Perspective => "Perspective",
            EntityKind::Project => "Project",
            EntityKind::Task => "Task",
        };
        f.write_str(name)
    }
}

/// Main error type for karma operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("Duplicate {kind} id: {id}")]
    DuplicateId { kind: EntityKind, id: String },

    // Preconditions (exit code 3)
    #[error("No default project in workspace {0}")]
    NoDefaultProject(String),

    #[error("No default perspective in workspace {0}")]
    NoDefaultPerspective(String),

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::NotFound { .. }
            | Error::DuplicateId { .. } => exit_codes::USER_ERROR,

            Error::NoDefaultProject(_) | Error::NoDefaultPerspective(_) => {
                exit_codes::PRECONDITION_FAILED
            }

            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::LockFailed(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for JSON error output, when the error carries any.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::NotFound { kind, id } | Error::DuplicateId { kind, id } => {
                Some(serde_json::json!({ "kind": kind, "id": id }))
            }
            Error::NoDefaultProject(workspace) | Error::NoDefaultPerspective(workspace) => {
                Some(serde_json::json!({ "workspace_id": workspace }))
            }
            Error::LockFailed(path) => Some(serde_json::json!({ "path": path })),
            _ => None,
        }
    }
}

/// Result type alias for karma operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}
