//! Link removal and backup restore for `unlink`.
use std::path::Path;

use anyhow::Result;

use super::links::declarations;
use super::{Context, Task};
use crate::config::Section;
use crate::logging::{Severity, Tally};
use crate::resources::BestEffort;
use crate::resources::fs::remove_symlink;
use crate::resources::probe::{self, PathState};

/// What happened to one link target during `unlink`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlinkOutcome {
    /// Nothing exists at the target.
    Absent,
    /// A real file or directory is there; it is left alone.
    NotSymlink,
    /// The symlink was removed.
    Removed,
    /// Inspection or removal failed.
    Failed(String),
}

impl UnlinkOutcome {
    /// How this outcome counts in the run tally.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::Absent => Severity::Neutral,
            Self::NotSymlink => Severity::Warning,
            Self::Removed => Severity::Success,
            Self::Failed(_) => Severity::Error,
        }
    }
}

/// Remove the symlink at `target`; anything else is left in place.
pub fn remove_link(ctx: &Context, target: &Path) -> UnlinkOutcome {
    let fail = |reason: String| {
        ctx.log.error(&reason);
        UnlinkOutcome::Failed(reason)
    };
    match probe::probe(target) {
        Ok(PathState::Absent) => {
            ctx.log
                .info(&format!("Symlink does not exist: {}", target.display()));
            UnlinkOutcome::Absent
        }
        Ok(PathState::Directory | PathState::RegularOrOther) => {
            ctx.log
                .warn(&format!("Not a symlink, skipping: {}", target.display()));
            UnlinkOutcome::NotSymlink
        }
        Ok(PathState::Symlink(_)) => {
            ctx.log
                .info(&format!("Removing symlink: {}", target.display()));
            match ctx.execute(|| remove_symlink(target)) {
                Ok(()) => {
                    ctx.log.success(&format!("Removed: {}", target.display()));
                    UnlinkOutcome::Removed
                }
                Err(e) => fail(format!("Error removing symlink: {e:#}")),
            }
        }
        Err(e) => fail(format!("Error checking {}: {e}", target.display())),
    }
}

/// Copy a removed target's backup back into place.
fn restore(ctx: &Context, target: &Path) -> Severity {
    match ctx.backups().restore_backup(ctx, target) {
        Ok(BestEffort::Done(_)) => {
            ctx.log.success(&format!("Restored: {}", target.display()));
            Severity::Success
        }
        Ok(BestEffort::Skipped(reason)) => {
            ctx.log.debug(&reason);
            Severity::Neutral
        }
        Err(e) => {
            ctx.log.error(&format!("Error restoring backup: {e:#}"));
            Severity::Error
        }
    }
}

/// Remove the section's link targets that are symlinks, optionally putting
/// their backups back.
#[derive(Debug)]
pub struct RemoveLinks {
    /// Restore each removed target from its backup.
    pub restore: bool,
}

impl Task for RemoveLinks {
    fn name(&self) -> &'static str {
        "Removing symlinks..."
    }

    fn should_run(&self, section: &Section) -> bool {
        !section.link.is_empty()
    }

    fn run(&self, ctx: &Context, section: &Section, tally: &mut Tally) -> Result<()> {
        let resolver = ctx.resolver();
        for decl in declarations(section) {
            let target = resolver.resolve_target(&decl.target);
            let outcome = remove_link(ctx, &target);
            tally.record(outcome.severity());
            if self.restore && outcome == UnlinkOutcome::Removed {
                tally.record(restore(ctx, &target));
            }
        }
        Ok(())
    }
}

#[cfg(all(test, unix))]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ordered::OrderedMap;
    use crate::tasks::test_helpers::TestEnv;
    use std::os::unix::fs::symlink;

    fn section(targets: &[&str]) -> Section {
        Section {
            link: OrderedMap::from(
                targets
                    .iter()
                    .map(|t| ((*t).to_string(), "src".to_string()))
                    .collect::<Vec<_>>(),
            ),
            ..Section::default()
        }
    }

    #[test]
    fn removes_only_symlinks() {
        let env = TestEnv::new();
        let source = env.source_file("src", "");
        let home = env.home();
        symlink(&source, home.join(".link")).unwrap();
        std::fs::write(home.join(".file"), "keep").unwrap();
        let mut tally = Tally::default();

        RemoveLinks { restore: false }
            .run(
                &env.context(),
                &section(&["~/.link", "~/.file", "~/.absent"]),
                &mut tally,
            )
            .unwrap();

        assert!(home.join(".link").symlink_metadata().is_err());
        assert_eq!(std::fs::read_to_string(home.join(".file")).unwrap(), "keep");
        assert!(source.exists());
        assert_eq!(
            tally,
            Tally {
                success: 1,
                warnings: 1,
                errors: 0
            }
        );
    }

    #[test]
    fn restore_puts_backup_back() {
        let env = TestEnv::new();
        let ctx = env.context();
        let source = env.source_file("src", "");
        let target = env.home().join(".profile");
        std::fs::write(&target, "original").unwrap();
        ctx.backups().create_backup(&target, false).unwrap();
        std::fs::remove_file(&target).unwrap();
        symlink(&source, &target).unwrap();
        let mut tally = Tally::default();

        RemoveLinks { restore: true }
            .run(&ctx, &section(&["~/.profile"]), &mut tally)
            .unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "original");
        assert!(!target.symlink_metadata().unwrap().file_type().is_symlink());
        assert_eq!(tally.success, 2);
        assert!(env.log().contains("Restored:"));
    }

    #[test]
    fn restore_without_backup_is_quiet() {
        let env = TestEnv::new();
        let source = env.source_file("src", "");
        symlink(&source, env.home().join(".x")).unwrap();
        let mut tally = Tally::default();

        RemoveLinks { restore: true }
            .run(&env.context(), &section(&["~/.x"]), &mut tally)
            .unwrap();

        assert_eq!(tally.success, 1);
        assert!(env.log().contains("No backup found for:"));
    }

    #[test]
    fn dry_run_keeps_links() {
        let env = TestEnv::new();
        let source = env.source_file("src", "");
        symlink(&source, env.home().join(".link")).unwrap();
        let mut tally = Tally::default();

        RemoveLinks { restore: false }
            .run(
                &env.context().with_dry_run(true),
                &section(&["~/.link"]),
                &mut tally,
            )
            .unwrap();

        assert_eq!(tally.success, 1);
        assert!(env.home().join(".link").symlink_metadata().is_ok());
    }
}
