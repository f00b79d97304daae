//! Declarative dotfiles bootstrapper.
//!
//! Reads an ordered list of configuration sections from a TOML file and,
//! for each one, creates directories, reconciles symbolic links (with
//! optional backup and restore), clones git repositories and runs shell
//! commands, with pre/post hooks and a dry-run preview mode.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: load, template and validate the configuration file
//! - **[`resources`]**: probing, backups and the link reconciliation engine
//! - **[`tasks`]**: per-section stages wired to resources
//! - **[`commands`]**: top-level subcommand orchestration (`link`, `status`, `unlink`, `backup`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod resources;
pub mod tasks;
