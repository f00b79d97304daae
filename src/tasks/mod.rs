//! Section-level tasks that walk configuration entries and drive resources.
mod context;
pub mod directories;
pub mod hooks;
pub mod links;
pub mod repositories;
pub mod shell;
pub mod unlink;

pub use context::{BACKUP_DIR_NAME, Context, Environment};

use anyhow::Result;

use crate::config::Section;
use crate::logging::{Severity, Tally};
use hooks::{HookPhase, RunHooks};

/// One stage of section processing.
///
/// A task handles every entry of one kind in a section.  Per-entry problems
/// are narrated and counted in the [`Tally`] inside [`Task::run`]; an `Err`
/// return means the stage as a whole stopped early.
pub trait Task: Send + Sync {
    /// Stage heading, e.g. `Creating links...`.
    fn name(&self) -> &str;

    /// Whether the section has anything for this task.
    fn should_run(&self, section: &Section) -> bool;

    /// Process the section's entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the stage had to stop before its last entry.
    fn run(&self, ctx: &Context, section: &Section, tally: &mut Tally) -> Result<()>;
}

/// The stages of `link`, in the order they run for each section.
#[must_use]
pub fn link_pipeline() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(RunHooks(HookPhase::PreLink)),
        Box::new(directories::CreateDirectories),
        Box::new(links::CreateLinks),
        Box::new(RunHooks(HookPhase::PostLink)),
        Box::new(repositories::CloneRepositories),
        Box::new(RunHooks(HookPhase::PreShell)),
        Box::new(shell::RunShellCommands),
        Box::new(RunHooks(HookPhase::PostShell)),
    ]
}

/// Run a task against a section, recording a stage failure in `tally`.
pub fn execute(task: &dyn Task, ctx: &Context, section: &Section, tally: &mut Tally) {
    if !task.should_run(section) {
        return;
    }
    ctx.log.stage(task.name());
    if let Err(e) = task.run(ctx, section, tally) {
        ctx.log.error(&format!("{e:#}"));
        tally.record(Severity::Error);
    }
}

/// Run every `link` stage for one section.
///
/// Sections with a defaults block announce the policy they run under.
pub fn run_link_section(
    ctx: &Context,
    section: &Section,
    pipeline: &[Box<dyn Task>],
    tally: &mut Tally,
) {
    if section.defaults.is_some() {
        let policy = links::section_policy(ctx, section);
        ctx.log.info(&format!(
            "Settings: force={}, relink={}, backup={}",
            policy.force, policy.relink, policy.backup
        ));
    }
    for task in pipeline {
        execute(task.as_ref(), ctx, section, tally);
    }
}


#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::{Defaults, LinkDefaults};
    use crate::logging::Level;
    use test_helpers::TestEnv;

    struct FakeTask {
        name: &'static str,
        applies: bool,
        fails: bool,
    }

    impl Task for FakeTask {
        fn name(&self) -> &str {
            self.name
        }

        fn should_run(&self, _section: &Section) -> bool {
            self.applies
        }

        fn run(&self, ctx: &Context, _section: &Section, tally: &mut Tally) -> Result<()> {
            if self.fails {
                anyhow::bail!("{} broke", self.name);
            }
            ctx.log.success("done");
            tally.record(Severity::Success);
            Ok(())
        }
    }

    #[test]
    fn execute_skips_task_that_does_not_apply() {
        let env = TestEnv::new();
        let mut tally = Tally::default();
        let task = FakeTask {
            name: "Nothing...",
            applies: false,
            fails: false,
        };
        execute(&task, &env.context(), &Section::default(), &mut tally);
        assert_eq!(tally, Tally::default());
        assert!(env.log().entries().is_empty());
    }

    #[test]
    fn execute_prints_stage_and_runs() {
        let env = TestEnv::new();
        let mut tally = Tally::default();
        let task = FakeTask {
            name: "Doing things...",
            applies: true,
            fails: false,
        };
        execute(&task, &env.context(), &Section::default(), &mut tally);
        assert_eq!(tally.success, 1);
        assert_eq!(env.log().at(Level::Stage), vec!["Doing things..."]);
    }

    #[test]
    fn execute_counts_stage_failure() {
        let env = TestEnv::new();
        let mut tally = Tally::default();
        let task = FakeTask {
            name: "Breaking...",
            applies: true,
            fails: true,
        };
        execute(&task, &env.context(), &Section::default(), &mut tally);
        assert_eq!(tally.errors, 1);
        assert_eq!(env.log().at(Level::Error), vec!["Breaking... broke"]);
    }

    #[test]
    fn pipeline_order() {
        let names: Vec<String> = link_pipeline().iter().map(|t| t.name().to_string()).collect();
        assert_eq!(
            names,
            vec![
                "Running pre-link hooks...",
                "Creating directories...",
                "Creating links...",
                "Running post-link hooks...",
                "Setting up git repositories...",
                "Running pre-shell hooks...",
                "Running shell commands...",
                "Running post-shell hooks...",
            ]
        );
    }

    #[test]
    fn settings_line_only_with_defaults_block() {
        let env = TestEnv::new();
        let ctx = env.context();
        let mut tally = Tally::default();
        run_link_section(&ctx, &Section::default(), &[], &mut tally);
        assert!(!env.log().contains("Settings:"));

        let section = Section {
            defaults: Some(Defaults {
                link: LinkDefaults {
                    relink: true,
                    ..LinkDefaults::default()
                },
            }),
            ..Section::default()
        };
        run_link_section(&ctx, &section, &[], &mut tally);
        assert_eq!(
            env.log().at(Level::Info),
            vec!["Settings: force=false, relink=true, backup=false"]
        );
    }
}
