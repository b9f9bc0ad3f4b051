//! Shared output formatting for karma CLI commands.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{Task, WorkspaceConfig};

pub const SCHEMA_VERSION: &str = "karma.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
    details: Vec<String>,
    warnings: Vec<String>,
    next_steps: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            summary: Vec::new(),
            details: Vec::new(),
            warnings: Vec::new(),
            next_steps: Vec::new(),
        }
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.details.push(value.into());
    }

    pub fn push_warning(&mut self, value: impl Into<String>) {
        self.warnings.push(value.into());
    }

    pub fn push_next_step(&mut self, value: impl Into<String>) {
        self.next_steps.push(value.into());
    }
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let warnings = human.map(|h| h.warnings.clone()).unwrap_or_default();
        let next_steps = human.map(|h| h.next_steps.clone()).unwrap_or_default();

        #[derive(Serialize)]
        struct Envelope<'a, T: Serialize> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            data: &'a T,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            warnings: Vec<String>,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            next_steps: Vec<String>,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data,
            warnings,
            next_steps,
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if options.quiet {
        return Ok(());
    }

    if let Some(human) = human {
        println!("{}", format_human(human));
    }

    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let next_steps = error_next_steps(err);
    if json {
        #[derive(Serialize)]
        struct ErrorBody<'a> {
            message: &'a str,
            code: i32,
            kind: &'static str,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<serde_json::Value>,
        }

        #[derive(Serialize)]
        struct Envelope<'a> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            error: ErrorBody<'a>,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            next_steps: Vec<String>,
        }

        let message = err.to_string();
        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            error: ErrorBody {
                message: &message,
                code: err.exit_code(),
                kind: error_kind(err),
                details: err.details(),
            },
            next_steps,
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    if let Some(hint) = error_hint(err) {
        eprintln!("hint: {hint}");
    }
    for step in &next_steps {
        eprintln!("  {step}");
    }
    Ok(())
}

pub fn format_human(output: &HumanOutput) -> String {
    let mut lines = Vec::new();
    lines.push(output.header.clone());

    push_summary(&mut lines, &output.summary);
    push_details(&mut lines, &output.details);
    push_section(&mut lines, "Warnings", &output.warnings);
    push_section(&mut lines, "Next steps", &output.next_steps);

    lines.join("\n")
}

/// One task as a human-readable line: `[x] title  (id)` plus the badges the
/// current view asks for.
pub fn format_task(
    task: &Task,
    workspace: &WorkspaceConfig,
    project_badge: bool,
    perspective_badge: bool,
) -> String {
    let mark = if task.completed { "[x]" } else { "[ ]" };
    let mut line = format!("{mark} {}", task.title);

    if project_badge {
        if let Some(project) = task.project() {
            let name = workspace
                .project(project)
                .map(|p| p.name.as_str())
                .unwrap_or(project);
            line.push_str(&format!(" @{name}"));
        }
    }
    if perspective_badge {
        if let Some(perspective) = task.perspective() {
            let name = workspace
                .perspective(perspective)
                .map(|p| p.name.as_str())
                .unwrap_or(perspective);
            line.push_str(&format!(" #{name}"));
        }
    }

    line.push_str(&format!("  ({})", short_id(&task.id)));
    line
}

/// Leading segment of a uuid task id; other ids are returned whole.
pub fn short_id(id: &str) -> &str {
    match id.split_once('-') {
        Some((head, _)) if head.len() == 8 => head,
        _ => id,
    }
}

pub fn infer_command_name_from_args() -> String {
    let mut args = std::env::args().skip(1);
    let mut command = None;
    let mut subcommand = None;

    while let Some(arg) = args.next() {
        if arg.starts_with('-') {
            // Global flags that take a value.
            if matches!(arg.as_str(), "--data-dir" | "--workspace" | "-w") {
                args.next();
            }
            continue;
        }
        command = Some(arg);
        break;
    }

    let command = match command {
        Some(cmd) => cmd,
        None => return "karma".to_string(),
    };

    if matches!(
        command.as_str(),
        "ws" | "perspective" | "project" | "task"
    ) {
        for arg in args.by_ref() {
            if arg.starts_with('-') {
                continue;
            }
            subcommand = Some(arg);
            break;
        }
    }

    if let Some(sub) = subcommand {
        format!("{command} {sub}")
    } else {
        command
    }
}

fn error_kind(err: &Error) -> &'static str {
    match err.exit_code() {
        2 => "user_error",
        3 => "precondition_failed",
        _ => "operation_failed",
    }
}

fn error_hint(err: &Error) -> Option<&'static str> {
    match err {
        Error::NoDefaultProject(_) => Some("create a project before adding tasks"),
        Error::NoDefaultPerspective(_) => Some("create a perspective before adding tasks"),
        Error::LockFailed(_) => Some("another karma process is holding the lock; retry"),
        _ => None,
    }
}

fn error_next_steps(err: &Error) -> Vec<String> {
    use crate::error::EntityKind;

    match err {
        Error::NoDefaultProject(_) => vec!["karma project new <name>".to_string()],
        Error::NoDefaultPerspective(_) => vec!["karma perspective new <name>".to_string()],
        Error::NotFound {
            kind: EntityKind::Workspace,
            ..
        } => vec!["karma ws ls".to_string()],
        Error::NotFound {
            kind: EntityKind::Project,
            ..
        } => vec!["karma project ls".to_string()],
        Error::NotFound {
            kind: EntityKind::Perspective,
            ..
        } => vec!["karma perspective ls".to_string()],
        Error::NotFound {
            kind: EntityKind::Task,
            ..
        } => vec!["karma task ls".to_string()],
        Error::InvalidConfig(_) | Error::TomlParse(_) => {
            vec!["fix karma.toml then retry".to_string()]
        }
        _ => Vec::new(),
    }
}

fn push_summary(lines: &mut Vec<String>, summary: &[(String, String)]) {
    if summary.is_empty() {
        return;
    }

    lines.push(String::new());
    for (key, value) in summary {
        if value.is_empty() {
            lines.push(format!("  {key}"));
        } else {
            lines.push(format!("  {key}: {value}"));
        }
    }
}

fn push_details(lines: &mut Vec<String>, details: &[String]) {
    if details.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.extend(details.iter().cloned());
}

fn push_section(lines: &mut Vec<String>, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push(format!("{title}:"));
    for item in items {
        lines.push(format!("  {item}"));
    }
}
