//! Subcommand drivers and the setup they share.
pub mod backup;
pub mod link;
pub mod status;
pub mod unlink;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::config::{Config, Section, TemplateVars};
use crate::error::HidedotError;
use crate::exec::Executor;
use crate::logging::Log;
use crate::tasks::{Context, Environment};

/// Build the run context from the global flags.
#[must_use]
pub fn context(
    global: &GlobalOpts,
    env: Environment,
    log: Arc<dyn Log>,
    executor: Arc<dyn Executor>,
) -> Context {
    Context::new(env, log, executor)
        .with_dry_run(global.dry_run)
        .with_backup(!global.no_backup)
}

/// Location of the configuration file; relative paths are anchored at the
/// execution directory.
#[must_use]
pub fn config_path(global: &GlobalOpts, env: &Environment) -> PathBuf {
    if global.config.is_absolute() {
        global.config.clone()
    } else {
        env.exec_dir.join(&global.config)
    }
}

/// Shared state produced by the common command setup sequence.
///
/// Loads the configuration once so that each command only has to walk
/// the selected sections.
#[derive(Debug)]
pub struct CommandSetup {
    /// Run context.
    pub ctx: Context,
    /// Loaded configuration, every section.
    pub config: Config,
    profile: Option<String>,
}

impl CommandSetup {
    /// Build the context and load the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read, parsed or
    /// validated. Nothing has been changed on disk at that point.
    pub fn init(
        global: &GlobalOpts,
        env: Environment,
        log: Arc<dyn Log>,
        executor: Arc<dyn Executor>,
    ) -> Result<Self> {
        let path = config_path(global, &env);
        let vars = TemplateVars::detect(&env.home);

        log.debug(&format!("Loading configuration: {}", path.display()));
        let config = Config::load(&path, &vars).map_err(HidedotError::from)?;
        log.debug(&format!("{} section(s) loaded", config.sections.len()));

        Ok(Self {
            ctx: context(global, env, log, executor),
            config,
            profile: global.profile.clone(),
        })
    }

    /// Sections that apply to the active profile, in file order.
    #[must_use]
    pub fn sections(&self) -> Vec<&Section> {
        self.config
            .select(self.profile.as_deref(), self.ctx.log.as_ref())
    }
}
