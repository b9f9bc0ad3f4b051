//! karma init command implementation
//!
//! Creates the data directory, writes a default `karma.toml` and seeds the
//! starter workspaces when none exist yet.

use std::path::{Path, PathBuf};

use super::context::Context;
use super::GlobalOptions;
use crate::config::{Config, CONFIG_FILE};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};
use crate::persistence::PersistencePort;
use crate::seed::{self, SeedReport};

pub struct InitOptions {
    pub empty: bool,
    pub global: GlobalOptions,
}

#[derive(serde::Serialize)]
struct InitReport {
    data_dir: PathBuf,
    created_config: bool,
    seeded: Option<SeedReport>,
}

pub fn run(options: InitOptions) -> Result<()> {
    let global = options.global;
    let ctx = Context::load(&global)?;
    let created_dir = ensure_dir(&ctx.data_dir)?;
    let created_config = ensure_config(&ctx.data_dir)?;

    let seeded = if !options.empty && ctx.store.is_empty()? {
        let report = seed::seed(&ctx.store, &ctx.config.workspace.perspectives)?;
        if let Some(first) = report.workspaces.first() {
            ctx.store.storage().write_current_workspace(first)?;
        }
        Some(report)
    } else {
        None
    };

    let header = if !created_dir && !created_config && seeded.is_none() {
        "karma init: nothing to do"
    } else {
        "karma init: data directory ready"
    };
    let mut human = HumanOutput::new(header);
    human.push_summary("data dir", ctx.data_dir.display().to_string());
    human.push_summary("config", if created_config { "created" } else { "kept" });
    match &seeded {
        Some(report) => human.push_summary(
            "seeded",
            format!(
                "{} workspaces, {} projects, {} tasks",
                report.workspaces.len(),
                report.projects,
                report.tasks
            ),
        ),
        None => {
            let existing = ctx.store.list_workspaces()?.len();
            human.push_summary("workspaces", existing.to_string());
        }
    }
    if seeded.is_some() {
        human.push_next_step("karma view");
    } else if ctx.store.is_empty()? {
        human.push_next_step("karma ws new <name>");
    }

    let report = InitReport {
        data_dir: ctx.data_dir.clone(),
        created_config,
        seeded,
    };
    emit_success(global.output(), "init", &report, Some(&human))
}

fn ensure_config(data_dir: &Path) -> Result<bool> {
    let config_path = data_dir.join(CONFIG_FILE);
    if config_path.exists() {
        if !config_path.is_file() {
            return Err(Error::OperationFailed(format!(
                "{CONFIG_FILE} exists but is not a file: {}",
                config_path.display()
            )));
        }
        return Ok(false);
    }

    Config::default().save(&config_path)?;
    Ok(true)
}

fn ensure_dir(path: &Path) -> Result<bool> {
    if path.exists() {
        if !path.is_dir() {
            return Err(Error::OperationFailed(format!(
                "Expected directory at {}",
                path.display()
            )));
        }
        return Ok(false);
    }

    std::fs::create_dir_all(path)?;
    Ok(true)
}
