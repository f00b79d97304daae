//! Pre/post hook stages.
use anyhow::{Context as _, Result};

use super::{Context, Task};
use crate::config::Section;
use crate::logging::Tally;
use crate::resources::shell::run_hooks;

/// Points in the section pipeline where hook scripts run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    /// Before links are created.
    PreLink,
    /// After links are created.
    PostLink,
    /// Before shell commands run.
    PreShell,
    /// After shell commands run.
    PostShell,
}

impl HookPhase {
    /// Scripts configured for this phase.
    #[must_use]
    pub fn scripts(self, section: &Section) -> &[String] {
        let hooks = &section.hooks;
        match self {
            Self::PreLink => &hooks.pre_link,
            Self::PostLink => &hooks.post_link,
            Self::PreShell => &hooks.pre_shell,
            Self::PostShell => &hooks.post_shell,
        }
    }

    const fn failure_label(self) -> &'static str {
        match self {
            Self::PreLink => "Pre-link hook failed",
            Self::PostLink => "Post-link hook failed",
            Self::PreShell => "Pre-shell hook failed",
            Self::PostShell => "Post-shell hook failed",
        }
    }
}

/// Run one phase's hook scripts.
#[derive(Debug)]
pub struct RunHooks(pub HookPhase);

impl Task for RunHooks {
    fn name(&self) -> &'static str {
        match self.0 {
            HookPhase::PreLink => "Running pre-link hooks...",
            HookPhase::PostLink => "Running post-link hooks...",
            HookPhase::PreShell => "Running pre-shell hooks...",
            HookPhase::PostShell => "Running post-shell hooks...",
        }
    }

    fn should_run(&self, section: &Section) -> bool {
        !self.0.scripts(section).is_empty()
    }

    fn run(&self, ctx: &Context, section: &Section, _tally: &mut Tally) -> Result<()> {
        run_hooks(ctx, self.0.scripts(section)).context(self.0.failure_label())
    }
}
