//! Domain-specific error types for the bootstrapper.
//!
//! Internal modules return typed errors (e.g., [`ConfigError`]) while command
//! handlers at the CLI boundary convert them to [`anyhow::Error`] via the
//! standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! HidedotError
//! └── Config(ConfigError) — reading, templating, parsing, validation
//!
//! LinkError   — per-declaration symlink probing and mutation
//! BackupError — backup copies and restores
//! ```
//!
//! Only configuration errors end a run; link and backup errors are folded
//! into per-item outcomes.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum HidedotError {
    /// Configuration-related error. Always fatal to the run.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised while loading the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("error reading config file {path}: {source}")]
    Io {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML or does not match the schema.
    #[error("error parsing config file {path}: {message}")]
    Parse {
        /// Path of the configuration file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// A link declaration has an empty target.
    #[error("section {section}: link target cannot be empty")]
    EmptyLinkTarget {
        /// One-based section number.
        section: usize,
    },

    /// A link declaration has an empty source.
    #[error("section {section}: link source cannot be empty for target '{target}'")]
    EmptyLinkSource {
        /// One-based section number.
        section: usize,
        /// Declared target.
        target: String,
    },

    /// A git entry has an empty destination path.
    #[error("section {section}: git repository path cannot be empty")]
    EmptyRepoPath {
        /// One-based section number.
        section: usize,
    },

    /// A git entry has an empty URL.
    #[error("section {section}: git repository URL cannot be empty for path '{path}'")]
    EmptyRepoUrl {
        /// One-based section number.
        section: usize,
        /// Declared repository path.
        path: String,
    },

    /// A shell entry has an empty command.
    #[error("section {section}: shell command at index {index} cannot be empty")]
    EmptyShellCommand {
        /// One-based section number.
        section: usize,
        /// Zero-based index in the shell list.
        index: usize,
    },
}

/// Errors raised by symlink probing and mutation.
#[derive(Error, Debug)]
pub enum LinkError {
    /// Inspecting a path failed for a reason other than absence.
    #[error("cannot inspect {path}: {source}")]
    Probe {
        /// Path being inspected.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Creating the symlink failed.
    #[error("cannot create symlink {target} -> {source_path}: {source}")]
    Create {
        /// Link location.
        target: PathBuf,
        /// Link destination.
        source_path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors raised by backup and restore copies.
#[derive(Error, Debug)]
pub enum BackupError {
    /// The backup directory root could not be created.
    #[error("cannot create backup directory {path}: {source}")]
    CreateDir {
        /// Backup directory.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Restoring would write through an existing symlink.
    #[error("refusing to restore over symlink {0}")]
    TargetIsSymlink(PathBuf),
}
