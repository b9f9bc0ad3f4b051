//! karma - workspace task manager
//!
//! Core library behind the `karma` CLI.
//!
//! # Core Concepts
//!
//! - **Workspaces**: Independent task spaces, each with its own perspectives and projects
//! - **Perspectives**: Ordered "when" buckets such as Inbox, Next or Waiting
//! - **Projects**: Ordered "what" buckets; every task belongs to one
//! - **Views**: Navigation state resolved into filtered, grouped task lists
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `karma.toml`
//! - `error`: Error types and result aliases
//! - `model`: Entities and the per-workspace configuration snapshot
//! - `navigation`: View state and its initialization from loose parameters
//! - `resolver`: Filtering and grouping of tasks for a view
//! - `ordering`: Sort keys shared by the resolver
//! - `defaults`: Project and perspective defaults for new tasks
//! - `persistence`: Storage port, file-backed store and task queries
//! - `storage`: On-disk layout of the data directory
//! - `lock`: File locking and atomic writes
//! - `seed`: Sample workspaces for first runs

pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod field_update;
pub mod lock;
pub mod model;
pub mod navigation;
pub mod ordering;
pub mod output;
pub mod persistence;
pub mod resolver;
pub mod seed;
pub mod storage;

#[cfg(test)]
mod test_support;

pub use error::{Error, Result};
