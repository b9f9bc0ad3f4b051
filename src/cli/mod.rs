//! Command-line interface for karma
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is implemented in its own submodule.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::error::Result;
use crate::navigation::NavigationParams;
use crate::output::OutputOptions;

mod context;
mod init;
mod perspective;
mod project;
mod task;
mod view;
mod ws;

/// karma - workspace task manager
///
/// Tasks live in projects inside workspaces and are filed under
/// perspectives (Inbox, First, Next, Someday, ...).
#[derive(Parser, Debug)]
#[command(name = "karma")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory (defaults to the platform data dir)
    #[arg(long, global = true, env = "KARMA_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Workspace id or name (defaults to the current workspace)
    #[arg(short, long, global = true, env = "KARMA_WORKSPACE")]
    pub workspace: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the data directory and seed starter workspaces
    Init {
        /// Only write the config; do not seed workspaces
        #[arg(long)]
        empty: bool,
    },

    /// Workspace management
    #[command(subcommand)]
    Ws(WsCommands),

    /// Perspective management for the current workspace
    #[command(subcommand)]
    Perspective(PerspectiveCommands),

    /// Project management for the current workspace
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Task management for the current workspace
    #[command(subcommand)]
    Task(TaskCommands),

    /// Show a view of the current workspace, grouped for display
    View {
        #[command(flatten)]
        nav: NavArgs,

        /// Show active tasks as one flat list
        #[arg(long)]
        flat: bool,

        /// Also list the view's completed tasks
        #[arg(long)]
        completed: bool,
    },
}

/// Workspace subcommands
#[derive(Subcommand, Debug)]
pub enum WsCommands {
    /// List workspaces
    #[command(alias = "list")]
    Ls,

    /// Create a workspace
    New {
        /// Workspace name
        name: String,

        /// Perspective to create (repeatable; defaults to `workspace.perspectives` from config)
        #[arg(long = "perspective", value_name = "NAME")]
        perspectives: Vec<String>,

        /// Make the new workspace current
        #[arg(long = "use")]
        use_it: bool,
    },

    /// Rename a workspace
    Rename {
        /// Workspace id or name
        #[arg(value_name = "WORKSPACE")]
        target: String,

        /// New name
        name: String,
    },

    /// Delete a workspace with all of its perspectives, projects and tasks
    Rm {
        /// Workspace id or name
        #[arg(value_name = "WORKSPACE")]
        target: String,
    },

    /// Remember a workspace as the current one
    Use {
        /// Workspace id or name
        #[arg(value_name = "WORKSPACE")]
        target: String,
    },
}

/// Perspective subcommands
#[derive(Subcommand, Debug)]
pub enum PerspectiveCommands {
    /// List perspectives in order
    #[command(alias = "list")]
    Ls,

    /// Create a perspective
    New {
        /// Perspective name
        name: String,

        /// Icon shown next to the name
        #[arg(long)]
        icon: Option<String>,

        /// Position (defaults to after the last perspective)
        #[arg(long, allow_hyphen_values = true)]
        order: Option<i64>,
    },

    /// Edit a perspective
    Edit {
        /// Perspective id
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        icon: Option<String>,

        #[arg(long, allow_hyphen_values = true)]
        order: Option<i64>,
    },

    /// Delete a perspective (its tasks become untagged)
    Rm {
        /// Perspective id
        id: String,
    },
}

/// Project subcommands
#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// List projects in order
    #[command(alias = "list")]
    Ls,

    /// Create a project
    New {
        /// Project name
        name: String,

        #[arg(long)]
        icon: Option<String>,

        /// Position (defaults to after the last project)
        #[arg(long, allow_hyphen_values = true)]
        order: Option<i64>,
    },

    /// Edit a project
    Edit {
        /// Project id
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, conflicts_with = "clear_icon")]
        icon: Option<String>,

        /// Remove the icon
        #[arg(long)]
        clear_icon: bool,

        #[arg(long, allow_hyphen_values = true)]
        order: Option<i64>,
    },

    /// Delete a project and all of its tasks
    Rm {
        /// Project id
        id: String,
    },
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// List tasks with filters, sorting and pagination
    #[command(alias = "list")]
    Ls {
        /// Only tasks in this project
        #[arg(long)]
        project: Option<String>,

        /// Only tasks filed under this perspective
        #[arg(long)]
        perspective: Option<String>,

        /// Only open tasks
        #[arg(long, conflicts_with = "done")]
        open: bool,

        /// Only completed tasks
        #[arg(long)]
        done: bool,

        /// Case-insensitive text in title or description
        #[arg(long)]
        search: Option<String>,

        /// Sort key: order, title, created_at, updated_at, completed
        /// (`field:desc` or `-field` for descending; repeatable)
        #[arg(long, allow_hyphen_values = true)]
        sort: Vec<String>,

        /// Page number (1-based)
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Items per page (defaults to `list.page_size`)
        #[arg(long)]
        page_size: Option<usize>,

        /// List tasks from every workspace
        #[arg(long)]
        all_workspaces: bool,
    },

    /// Show a single task
    Show {
        /// Task id or unique id prefix
        id: String,
    },

    /// Create a task; project and perspective default from the view flags
    New {
        /// Task title
        title: String,

        #[arg(long)]
        description: Option<String>,

        #[command(flatten)]
        nav: NavArgs,
    },

    /// Edit a task
    Edit {
        /// Task id or unique id prefix
        id: String,

        #[arg(long)]
        title: Option<String>,

        /// New description (empty clears it)
        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,

        #[arg(long)]
        clear_description: bool,

        /// Move the task to another project
        #[arg(long)]
        project: Option<String>,

        /// File the task under another perspective (empty clears it)
        #[arg(long, conflicts_with = "clear_perspective")]
        perspective: Option<String>,

        #[arg(long)]
        clear_perspective: bool,

        #[arg(long, allow_hyphen_values = true)]
        order: Option<i64>,
    },

    /// Flip a task between open and completed
    Toggle {
        /// Task id or unique id prefix
        id: String,
    },

    /// Delete a task
    Rm {
        /// Task id or unique id prefix
        id: String,
    },
}

/// Navigation flags shared by `view` and `task new`.
#[derive(Args, Debug, Clone, Default)]
pub struct NavArgs {
    /// View kind: perspective, project, project-all, all
    #[arg(long)]
    pub view: Option<String>,

    /// Perspective id (implies `--view perspective`)
    #[arg(long)]
    pub perspective: Option<String>,

    /// Project id (implies `--view project`)
    #[arg(long)]
    pub project: Option<String>,

    /// Navigation as a query string, e.g. `view=project&project=home`
    #[arg(long, value_name = "QUERY")]
    pub nav: Option<String>,
}

impl NavArgs {
    /// Merge the query string with explicit flags; flags win. A `--project`
    /// or `--perspective` selects the matching view only when neither
    /// `--view` nor the query string names one.
    pub fn to_params(&self) -> NavigationParams {
        let mut params = self
            .nav
            .as_deref()
            .map(NavigationParams::parse_query)
            .unwrap_or_default();

        if self.view.is_some() {
            params.view = self.view.clone();
        }
        if self.perspective.is_some() {
            params.perspective = self.perspective.clone();
        }
        if self.project.is_some() {
            params.project = self.project.clone();
        }

        if params.view.is_none() {
            if self.project.is_some() {
                params.view = Some("project".to_string());
            } else if self.perspective.is_some() {
                params.view = Some("perspective".to_string());
            }
        }
        params
    }
}

/// Global flags handed to every command.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub data_dir: Option<PathBuf>,
    pub workspace: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

impl GlobalOptions {
    pub fn output(&self) -> OutputOptions {
        OutputOptions {
            json: self.json,
            quiet: self.quiet,
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let global = GlobalOptions {
            data_dir: self.data_dir,
            workspace: self.workspace,
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::Init { empty } => init::run(init::InitOptions { empty, global }),
            Commands::Ws(cmd) => match cmd {
                WsCommands::Ls => ws::run_list(global),
                WsCommands::New {
                    name,
                    perspectives,
                    use_it,
                } => ws::run_new(ws::NewOptions {
                    name,
                    perspectives,
                    use_it,
                    global,
                }),
                WsCommands::Rename { target, name } => ws::run_rename(ws::RenameOptions {
                    target,
                    name,
                    global,
                }),
                WsCommands::Rm { target } => ws::run_rm(ws::TargetOptions { target, global }),
                WsCommands::Use { target } => ws::run_use(ws::TargetOptions { target, global }),
            },
            Commands::Perspective(cmd) => match cmd {
                PerspectiveCommands::Ls => perspective::run_list(global),
                PerspectiveCommands::New { name, icon, order } => {
                    perspective::run_new(perspective::NewOptions {
                        name,
                        icon,
                        order,
                        global,
                    })
                }
                PerspectiveCommands::Edit {
                    id,
                    name,
                    icon,
                    order,
                } => perspective::run_edit(perspective::EditOptions {
                    id,
                    name,
                    icon,
                    order,
                    global,
                }),
                PerspectiveCommands::Rm { id } => perspective::run_rm(id, global),
            },
            Commands::Project(cmd) => match cmd {
                ProjectCommands::Ls => project::run_list(global),
                ProjectCommands::New { name, icon, order } => {
                    project::run_new(project::NewOptions {
                        name,
                        icon,
                        order,
                        global,
                    })
                }
                ProjectCommands::Edit {
                    id,
                    name,
                    icon,
                    clear_icon,
                    order,
                } => project::run_edit(project::EditOptions {
                    id,
                    name,
                    icon,
                    clear_icon,
                    order,
                    global,
                }),
                ProjectCommands::Rm { id } => project::run_rm(id, global),
            },
            Commands::Task(cmd) => match cmd {
                TaskCommands::Ls {
                    project,
                    perspective,
                    open,
                    done,
                    search,
                    sort,
                    page,
                    page_size,
                    all_workspaces,
                } => task::run_list(task::ListOptions {
                    project,
                    perspective,
                    completed: match (open, done) {
                        (true, _) => Some(false),
                        (_, true) => Some(true),
                        _ => None,
                    },
                    search,
                    sort,
                    page,
                    page_size,
                    all_workspaces,
                    global,
                }),
                TaskCommands::Show { id } => task::run_show(id, global),
                TaskCommands::New {
                    title,
                    description,
                    nav,
                } => task::run_new(task::NewOptions {
                    title,
                    description,
                    nav,
                    global,
                }),
                TaskCommands::Edit {
                    id,
                    title,
                    description,
                    clear_description,
                    project,
                    perspective,
                    clear_perspective,
                    order,
                } => task::run_edit(task::EditOptions {
                    id,
                    title,
                    description,
                    clear_description,
                    project,
                    perspective,
                    clear_perspective,
                    order,
                    global,
                }),
                TaskCommands::Toggle { id } => task::run_toggle(id, global),
                TaskCommands::Rm { id } => task::run_rm(id, global),
            },
            Commands::View {
                nav,
                flat,
                completed,
            } => view::run(view::ViewOptions {
                nav,
                flat,
                completed,
                global,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lone_project_flag_selects_project_view() {
        let args = NavArgs {
            project: Some("home".to_string()),
            ..NavArgs::default()
        };
        let params = args.to_params();
        assert_eq!(params.view.as_deref(), Some("project"));
        assert_eq!(params.project.as_deref(), Some("home"));
    }

    #[test]
    fn flags_override_query_string() {
        let args = NavArgs {
            view: Some("all".to_string()),
            nav: Some("view=project&project=home&perspective=next".to_string()),
            ..NavArgs::default()
        };
        let params = args.to_params();
        assert_eq!(params.view.as_deref(), Some("all"));
        assert_eq!(params.project.as_deref(), Some("home"));
        assert_eq!(params.perspective.as_deref(), Some("next"));
    }

    #[test]
    fn query_string_view_survives_project_flag() {
        let args = NavArgs {
            project: Some("home".to_string()),
            nav: Some("view=all".to_string()),
            ..NavArgs::default()
        };
        let params = args.to_params();
        assert_eq!(params.view.as_deref(), Some("all"));
        assert_eq!(params.project.as_deref(), Some("home"));

        let args = NavArgs {
            perspective: Some("next".to_string()),
            nav: Some("project=home".to_string()),
            ..NavArgs::default()
        };
        assert_eq!(args.to_params().view.as_deref(), Some("perspective"));
    }

    #[test]
    fn query_string_alone_is_kept() {
        let args = NavArgs {
            nav: Some("view=perspective&perspective=someday".to_string()),
            ..NavArgs::default()
        };
        let params = args.to_params();
        assert_eq!(params.view.as_deref(), Some("perspective"));
        assert_eq!(params.perspective.as_deref(), Some("someday"));
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
