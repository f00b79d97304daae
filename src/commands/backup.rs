//! `backup create` and `backup list` implementations.
use std::path::Path;

use anyhow::Result;

use super::CommandSetup;
use crate::logging::{Severity, Tally};
use crate::resources::backup::{BackupManager, render_list};
use crate::resources::probe::{self, PathState};
use crate::tasks::Context;
use crate::tasks::links::declarations;

/// Back up every declared target that exists and is not a symlink.
///
/// # Errors
///
/// Returns an error if the backup directory cannot be created.
pub fn create(setup: &CommandSetup) -> Result<Tally> {
    let ctx = &setup.ctx;
    let backups = ctx.backups();
    ctx.log.stage("Creating backups...");
    ctx.execute(|| backups.ensure_dir().map_err(anyhow::Error::from))?;

    let resolver = ctx.resolver();
    let mut tally = Tally::default();
    for section in setup.sections() {
        for decl in declarations(section) {
            let target = resolver.resolve_target(&decl.target);
            tally.record(back_up(ctx, &backups, &target));
        }
    }
    Ok(tally)
}

fn back_up(ctx: &Context, backups: &BackupManager, target: &Path) -> Severity {
    let is_dir = match probe::probe(target) {
        Ok(PathState::Absent) => return Severity::Neutral,
        Ok(PathState::Symlink(_)) => {
            ctx.log
                .debug(&format!("Skipping symlink: {}", target.display()));
            return Severity::Neutral;
        }
        Ok(PathState::Directory) => true,
        Ok(PathState::RegularOrOther) => false,
        Err(e) => {
            ctx.log
                .error(&format!("Error checking {}: {e}", target.display()));
            return Severity::Error;
        }
    };

    ctx.log.info(&format!(
        "Backing up: {} → {}",
        target.display(),
        backups.backup_path_for(target).display()
    ));
    match ctx.execute(|| backups.create_backup(target, is_dir).map(drop)) {
        Ok(()) => {
            ctx.log.success(&format!("Backed up: {}", target.display()));
            Severity::Success
        }
        Err(e) => {
            ctx.log.error(&format!("Error creating backup: {e:#}"));
            Severity::Error
        }
    }
}

/// Render the backup directory listing.
///
/// Needs no configuration; only the backup directory is read.
///
/// # Errors
///
/// Returns an error if the backup directory exists but cannot be read.
pub fn list(ctx: &Context) -> Result<String> {
    let backups = ctx.backups();
    ctx.log.stage(&format!(
        "Available backups in {}",
        backups.dir().display()
    ));
    let entries = backups.list()?;
    Ok(render_list(entries.as_deref()))
}

#[cfg(all(test, unix))]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tasks::test_helpers::TestEnv;
    use std::os::unix::fs::symlink;

    #[test]
    fn back_up_copies_files_and_directories() {
        let env = TestEnv::new();
        let ctx = env.context();
        let home = env.home();
        std::fs::write(home.join(".file"), "data").unwrap();
        std::fs::create_dir(home.join(".dir")).unwrap();
        std::fs::write(home.join(".dir/inner"), "nested").unwrap();
        let backups = ctx.backups();

        assert_eq!(
            back_up(&ctx, &backups, &home.join(".file")),
            Severity::Success
        );
        assert_eq!(
            back_up(&ctx, &backups, &home.join(".dir")),
            Severity::Success
        );

        let file_backup = backups.backup_path_for(&home.join(".file"));
        let dir_backup = backups.backup_path_for(&home.join(".dir"));
        assert_eq!(std::fs::read_to_string(file_backup).unwrap(), "data");
        assert_eq!(
            std::fs::read_to_string(dir_backup.join("inner")).unwrap(),
            "nested"
        );
    }

    #[test]
    fn back_up_skips_symlinks_and_absent_targets() {
        let env = TestEnv::new();
        let ctx = env.context();
        let source = env.source_file("src", "");
        let link = env.home().join(".link");
        symlink(&source, &link).unwrap();
        let backups = ctx.backups();

        assert_eq!(back_up(&ctx, &backups, &link), Severity::Neutral);
        assert_eq!(
            back_up(&ctx, &backups, &env.home().join(".absent")),
            Severity::Neutral
        );
        assert!(env.log().contains("Skipping symlink:"));
        assert!(!backups.backup_path_for(&link).exists());
    }

    #[test]
    fn back_up_in_dry_run_writes_nothing() {
        let env = TestEnv::new();
        let ctx = env.context().with_dry_run(true);
        let target = env.home().join(".file");
        std::fs::write(&target, "data").unwrap();
        let backups = ctx.backups();

        assert_eq!(back_up(&ctx, &backups, &target), Severity::Success);
        assert!(!backups.dir().exists());
        assert!(env.log().contains("Backing up:"));
    }

    #[test]
    fn list_without_backups() {
        let env = TestEnv::new();
        assert_eq!(list(&env.context()).unwrap(), "No backups found.\n");
    }

    #[test]
    fn list_shows_created_backups() {
        let env = TestEnv::new();
        let ctx = env.context();
        let target = env.home().join(".vimrc");
        std::fs::write(&target, "").unwrap();
        ctx.backups().create_backup(&target, false).unwrap();

        let listing = list(&ctx).unwrap();
        let name = ctx
            .backups()
            .backup_path_for(&target)
            .file_name()
            .unwrap()
            .to_string_lossy()
            .to_string();
        assert!(listing.trim_end().ends_with(&name));
        assert!(env.log().contains("Available backups in"));
    }
}
