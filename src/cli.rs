//! Command-line interface definitions.
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::config::DEFAULT_CONFIG_FILE;

/// Top-level CLI entry point.
#[derive(Parser, Debug)]
#[command(
    name = "hidedot",
    about = "Declarative dotfiles bootstrapper",
    long_about = "Manage symlinks, directories, git repositories and shell steps \
                  from a single TOML configuration file.",
    version
)]
pub struct Cli {
    /// Subcommand; `link` when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Flags accepted by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

impl Cli {
    /// The subcommand to run, defaulting to `link`.
    #[must_use]
    pub fn selected_command(&self) -> Command {
        self.command.clone().unwrap_or_default()
    }
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct GlobalOpts {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Only apply sections matching this profile
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Show what would be done without making changes
    #[arg(short = 'n', long, global = true)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only show errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Disable automatic backups
    #[arg(long, global = true)]
    pub no_backup: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, Default, PartialEq, Eq)]
pub enum Command {
    /// Create symlinks, directories, repositories and run shell steps (default)
    #[default]
    Link,
    /// Show the status of every declared symlink
    Status {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove declared symlinks
    Unlink {
        /// Restore files from backup after unlinking
        #[arg(short, long)]
        restore: bool,
    },
    /// Manage backups
    #[command(subcommand)]
    Backup(BackupAction),
    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Print version information
    Version,
}

impl Command {
    /// Short name, used for the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Status { .. } => "status",
            Self::Unlink { .. } => "unlink",
            Self::Backup(_) => "backup",
            Self::Completions { .. } => "completions",
            Self::Version => "version",
        }
    }
}

/// `backup` subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum BackupAction {
    /// Back up every declared target that is not already a symlink
    Create,
    /// List available backups
    List,
}
