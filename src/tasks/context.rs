//! Run environment and the shared execution context.
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use crate::exec::Executor;
use crate::logging::Log;
use crate::resources::backup::BackupManager;
use crate::resources::paths::PathResolver;

/// Name of the backup directory under the home directory.
pub const BACKUP_DIR_NAME: &str = ".hidedot-backups";

/// Directories a run works against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// User's home directory; `~` expands to this.
    pub home: PathBuf,
    /// Execution directory; relative paths are anchored here.
    pub exec_dir: PathBuf,
    /// Where backups are written.
    pub backup_dir: PathBuf,
}

impl Environment {
    /// Build an environment with the default backup directory under `home`.
    #[must_use]
    pub fn new(home: PathBuf, exec_dir: PathBuf) -> Self {
        let backup_dir = home.join(BACKUP_DIR_NAME);
        Self {
            home,
            exec_dir,
            backup_dir,
        }
    }

    /// Detect the home directory from the environment and use the process
    /// working directory as the execution directory.
    ///
    /// # Errors
    ///
    /// Returns an error if neither HOME nor USERPROFILE is set, or the
    /// working directory cannot be determined.
    pub fn detect() -> Result<Self> {
        let home = if cfg!(target_os = "windows") {
            std::env::var("USERPROFILE")
                .or_else(|_| std::env::var("HOME"))
                .map_err(|_| {
                    anyhow::anyhow!("neither USERPROFILE nor HOME environment variable is set")
                })?
        } else {
            std::env::var("HOME")
                .map_err(|_| anyhow::anyhow!("HOME environment variable is not set"))?
        };
        let exec_dir = std::env::current_dir()
            .map_err(|e| anyhow::anyhow!("cannot determine working directory: {e}"))?;
        Ok(Self::new(PathBuf::from(home), exec_dir))
    }
}

/// Shared context for one run.
pub struct Context {
    /// Directories the run works against.
    pub env: Environment,
    /// Preview mode: mutations are narrated but not performed.
    pub dry_run: bool,
    /// Global backup switch; `false` overrides every section's policy.
    pub backup_enabled: bool,
    /// Narration sink.
    pub log: Arc<dyn Log>,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("env", &self.env)
            .field("dry_run", &self.dry_run)
            .field("backup_enabled", &self.backup_enabled)
            .field("log", &"<dyn Log>")
            .field("executor", &"<dyn Executor>")
            .finish()
    }
}

impl Context {
    /// Create a context for a real run with backups enabled.
    #[must_use]
    pub fn new(env: Environment, log: Arc<dyn Log>, executor: Arc<dyn Executor>) -> Self {
        Self {
            env,
            dry_run: false,
            backup_enabled: true,
            log,
            executor,
        }
    }

    /// Set preview mode.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the global backup switch.
    #[must_use]
    pub const fn with_backup(mut self, enabled: bool) -> Self {
        self.backup_enabled = enabled;
        self
    }

    /// Path resolver for this run's home and execution directory.
    #[must_use]
    pub fn resolver(&self) -> PathResolver {
        PathResolver::new(self.env.home.clone(), self.env.exec_dir.clone())
    }

    /// Backup manager rooted at this run's backup directory.
    #[must_use]
    pub fn backups(&self) -> BackupManager {
        BackupManager::new(self.env.backup_dir.clone())
    }

    /// Run a mutating action, or do nothing in dry-run mode.
    ///
    /// This is the only place dry-run is checked: every filesystem change and
    /// every external command goes through here, and narration around the
    /// call is the same either way.
    ///
    /// # Errors
    ///
    /// Returns the action's error in a real run; never fails in dry-run.
    pub fn execute(&self, action: impl FnOnce() -> Result<()>) -> Result<()> {
        if self.dry_run {
            return Ok(());
        }
        action()
    }
}
