//! Link reconciliation: decide and apply the change one declaration needs.
use std::io;
use std::path::{Path, PathBuf};

use super::duplicates::remove_duplicate_aliases;
use super::fs::{create_dir_all, create_symlink, remove_all, remove_symlink};
use super::paths::same_path;
use super::probe::{self, PathState};
use crate::config::LinkDefaults;
use crate::error::LinkError;
use crate::logging::{Severity, Tally};
use crate::tasks::Context;

/// One `target = source` entry from a section's link table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkDeclaration {
    /// Where the link is placed.
    pub target: String,
    /// What the link points to.
    pub source: String,
}

impl LinkDeclaration {
    /// Create a declaration.
    #[must_use]
    pub fn new(target: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            source: source.into(),
        }
    }
}

/// How to treat whatever already occupies a link target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkPolicy {
    /// Replace an existing non-symlink.
    pub force: bool,
    /// Replace an existing symlink that points elsewhere.
    pub relink: bool,
    /// Back up a non-symlink before replacing it.
    pub backup: bool,
}

impl Default for LinkPolicy {
    fn default() -> Self {
        Self::from_defaults(None)
    }
}

impl LinkPolicy {
    /// Policy for a section.
    ///
    /// Without a defaults block backups are on and everything else is off;
    /// with one, every field it leaves out is off.
    #[must_use]
    pub const fn from_defaults(defaults: Option<&LinkDefaults>) -> Self {
        match defaults {
            None => Self {
                force: false,
                relink: false,
                backup: true,
            },
            Some(d) => Self {
                force: d.force,
                relink: d.relink,
                backup: d.backup,
            },
        }
    }

    /// The same policy with backups switched off.
    #[must_use]
    pub const fn without_backup(self) -> Self {
        Self {
            backup: false,
            ..self
        }
    }

    /// Apply the global backup switch.
    #[must_use]
    pub const fn with_backup_enabled(self, enabled: bool) -> Self {
        if enabled { self } else { self.without_backup() }
    }
}

/// What happened to one declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The link already pointed at the source.
    AlreadyCorrect,
    /// A new link was created where nothing existed.
    Created,
    /// A link pointing elsewhere was replaced.
    Relinked,
    /// A non-symlink was backed up, removed and replaced.
    BackedUpAndOverwritten {
        /// Where the previous content was copied.
        backup: PathBuf,
    },
    /// A non-symlink was removed and replaced without a backup.
    Overwritten,
    /// A non-symlink is in the way and `force` is off.
    SkippedNotSymlinkNoForce,
    /// A link points elsewhere and `relink` is off.
    SkippedUnchangedNoRelink,
    /// The source does not exist.
    SkippedSourceMissing,
    /// The target's parent exists but is not a directory.
    SkippedParentInvalid,
    /// An operation failed; the reason was logged.
    Failed(String),
}

impl LinkOutcome {
    /// How this outcome counts in the run tally.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::AlreadyCorrect
            | Self::Created
            | Self::Relinked
            | Self::BackedUpAndOverwritten { .. }
            | Self::Overwritten => Severity::Success,
            Self::SkippedNotSymlinkNoForce
            | Self::SkippedUnchangedNoRelink
            | Self::SkippedSourceMissing
            | Self::SkippedParentInvalid => Severity::Warning,
            Self::Failed(_) => Severity::Error,
        }
    }
}

/// What was removed from the target before the new link is created.
enum Cleared {
    Nothing,
    Symlink,
    Path(Option<PathBuf>),
}

/// Applies link declarations against the live filesystem.
///
/// Every probe runs for real; every mutation goes through
/// [`Context::execute`], so a dry run narrates and reports exactly what a
/// real run would.
#[derive(Debug)]
pub struct LinkReconciler<'a> {
    ctx: &'a Context,
}

impl<'a> LinkReconciler<'a> {
    /// Create a reconciler bound to `ctx`.
    #[must_use]
    pub const fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    /// Reconcile one declaration and count its outcome in `tally`.
    ///
    /// Duplicate aliases removed along the way are counted separately.
    pub fn reconcile(
        &self,
        decl: &LinkDeclaration,
        policy: LinkPolicy,
        tally: &mut Tally,
    ) -> LinkOutcome {
        let outcome = self.decide(decl, policy, tally);
        tally.record(outcome.severity());
        outcome
    }

    fn decide(&self, decl: &LinkDeclaration, policy: LinkPolicy, tally: &mut Tally) -> LinkOutcome {
        let log = &self.ctx.log;
        let resolver = self.ctx.resolver();
        let target = resolver.resolve_target(&decl.target);
        let source = resolver.resolve_source(&decl.source);
        log.debug(&format!(
            "Processing link: {} → {}",
            target.display(),
            source.display()
        ));

        match probe::exists(&source) {
            Ok(presence) if presence.exists => {}
            Ok(_) => {
                log.warn(&format!("Source path does not exist: {}", source.display()));
                return LinkOutcome::SkippedSourceMissing;
            }
            Err(e) => return self.probe_failed(&source, e),
        }

        let mut parent_created = false;
        if let Some(parent) = target.parent() {
            // The parent itself is not followed: a symlinked parent is invalid.
            match probe::exists(parent) {
                Ok(presence) if presence.is_dir => {}
                Ok(presence) if presence.exists => {
                    log.warn(&format!(
                        "Parent path exists but is not a directory: {}",
                        parent.display()
                    ));
                    return LinkOutcome::SkippedParentInvalid;
                }
                Ok(_) => {
                    log.info(&format!("Creating parent directory: {}", parent.display()));
                    if let Err(e) = self.ctx.execute(|| create_dir_all(parent)) {
                        return self.fail(format!("Error creating parent directory: {e:#}"));
                    }
                    parent_created = true;
                }
                Err(e) => return self.probe_failed(parent, e),
            }
        }

        // A freshly created parent has no siblings to scan.
        if !parent_created {
            remove_duplicate_aliases(self.ctx, &target, &source, tally);
        }

        let state = match probe::probe(&target) {
            Ok(state) => state,
            Err(e) => return self.probe_failed(&target, e),
        };
        let cleared = match &state {
            PathState::Absent => Cleared::Nothing,
            PathState::Symlink(current) if same_path(current, &source) => {
                log.info(&format!("Symlink already correct: {}", target.display()));
                return LinkOutcome::AlreadyCorrect;
            }
            PathState::Symlink(current) if policy.relink => {
                log.info(&format!(
                    "Relinking: {} → {} (was: {})",
                    target.display(),
                    source.display(),
                    current.display()
                ));
                if let Err(e) = self.ctx.execute(|| remove_symlink(&target)) {
                    return self.fail(format!("Error removing symlink: {e:#}"));
                }
                Cleared::Symlink
            }
            PathState::Symlink(current) => {
                log.warn(&format!(
                    "Existing symlink left unchanged: {} → {}",
                    target.display(),
                    current.display()
                ));
                return LinkOutcome::SkippedUnchangedNoRelink;
            }
            PathState::Directory | PathState::RegularOrOther if policy.force => {
                let backup = if policy.backup {
                    match self.backup(&target, state == PathState::Directory) {
                        Ok(path) => Some(path),
                        Err(outcome) => return outcome,
                    }
                } else {
                    None
                };
                log.info(&format!(
                    "Removing existing path (force = true): {}",
                    target.display()
                ));
                if let Err(e) = self.ctx.execute(|| remove_all(&target)) {
                    return self.fail(format!("Error removing existing path: {e:#}"));
                }
                Cleared::Path(backup)
            }
            PathState::Directory | PathState::RegularOrOther => {
                log.warn(&format!(
                    "Path exists and is not a symlink (use force = true): {}",
                    target.display()
                ));
                return LinkOutcome::SkippedNotSymlinkNoForce;
            }
        };

        log.info(&format!(
            "Creating symlink: {} → {}",
            target.display(),
            source.display()
        ));
        if let Err(e) = self
            .ctx
            .execute(|| create_symlink(&source, &target).map_err(anyhow::Error::from))
        {
            return self.fail(format!("Error creating symlink: {e:#}"));
        }
        log.success(&format!("Created symlink: {}", target.display()));

        match cleared {
            Cleared::Nothing => LinkOutcome::Created,
            Cleared::Symlink => LinkOutcome::Relinked,
            Cleared::Path(Some(backup)) => LinkOutcome::BackedUpAndOverwritten { backup },
            Cleared::Path(None) => LinkOutcome::Overwritten,
        }
    }

    /// Copy the target aside; any failure ends the declaration untouched.
    fn backup(&self, target: &Path, is_dir: bool) -> Result<PathBuf, LinkOutcome> {
        let backups = self.ctx.backups();
        let backup = backups.backup_path_for(target);
        self.ctx.log.info(&format!(
            "Creating backup: {} → {}",
            target.display(),
            backup.display()
        ));
        self.ctx
            .execute(|| backups.create_backup(target, is_dir).map(|_| ()))
            .map_err(|e| self.fail(format!("Error creating backup: {e:#}")))?;
        Ok(backup)
    }

    fn probe_failed(&self, path: &Path, source: io::Error) -> LinkOutcome {
        self.fail(
            LinkError::Probe {
                path: path.to_path_buf(),
                source,
            }
            .to_string(),
        )
    }

    fn fail(&self, reason: String) -> LinkOutcome {
        self.ctx.log.error(&reason);
        LinkOutcome::Failed(reason)
    }
}


#[cfg(all(test, unix))]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::logging::Level;
    use crate::tasks::test_helpers::TestEnv;
    use std::os::unix::fs::symlink;

    const KEEP: LinkPolicy = LinkPolicy {
        force: false,
        relink: false,
        backup: true,
    };
    const RELINK: LinkPolicy = LinkPolicy {
        force: false,
        relink: true,
        backup: true,
    };
    const FORCE: LinkPolicy = LinkPolicy {
        force: true,
        relink: false,
        backup: true,
    };

    fn reconcile(env: &TestEnv, decl: &LinkDeclaration, policy: LinkPolicy) -> (LinkOutcome, Tally) {
        let ctx = env.context();
        let mut tally = Tally::default();
        let outcome = LinkReconciler::new(&ctx).reconcile(decl, policy, &mut tally);
        (outcome, tally)
    }

    #[test]
    fn creates_missing_link() {
        let env = TestEnv::new();
        let source = env.source_file("vimrc", "set nu");
        let decl = LinkDeclaration::new("~/.vimrc", "vimrc");

        let (outcome, tally) = reconcile(&env, &decl, KEEP);

        assert_eq!(outcome, LinkOutcome::Created);
        assert_eq!(tally.success, 1);
        assert_eq!(std::fs::read_link(env.home().join(".vimrc")).unwrap(), source);
        assert!(env.log().contains("Created symlink:"));
    }

    #[test]
    fn second_run_is_already_correct() {
        let env = TestEnv::new();
        env.source_file("vimrc", "");
        let decl = LinkDeclaration::new("~/.vimrc", "vimrc");

        reconcile(&env, &decl, KEEP);
        let (outcome, tally) = reconcile(&env, &decl, KEEP);

        assert_eq!(outcome, LinkOutcome::AlreadyCorrect);
        assert_eq!(tally.success, 1);
        assert!(env.log().contains("Symlink already correct"));
    }

    #[test]
    fn foreign_link_is_kept_without_relink() {
        let env = TestEnv::new();
        env.source_file("zshrc", "");
        let elsewhere = env.home().join("old-zshrc");
        std::fs::write(&elsewhere, "").unwrap();
        symlink(&elsewhere, env.home().join(".zshrc")).unwrap();

        let (outcome, tally) = reconcile(&env, &LinkDeclaration::new("~/.zshrc", "zshrc"), KEEP);

        assert_eq!(outcome, LinkOutcome::SkippedUnchangedNoRelink);
        assert_eq!(tally.warnings, 1);
        assert_eq!(std::fs::read_link(env.home().join(".zshrc")).unwrap(), elsewhere);
    }

    #[test]
    fn foreign_link_is_replaced_with_relink() {
        let env = TestEnv::new();
        let source = env.source_file("zshrc", "");
        let elsewhere = env.home().join("old-zshrc");
        std::fs::write(&elsewhere, "").unwrap();
        symlink(&elsewhere, env.home().join(".zshrc")).unwrap();

        let (outcome, _) = reconcile(&env, &LinkDeclaration::new("~/.zshrc", "zshrc"), RELINK);

        assert_eq!(outcome, LinkOutcome::Relinked);
        assert_eq!(std::fs::read_link(env.home().join(".zshrc")).unwrap(), source);
        assert!(elsewhere.exists(), "relinking must not touch the old destination");
    }

    #[test]
    fn regular_file_is_untouched_without_force() {
        let env = TestEnv::new();
        env.source_file("bashrc", "new");
        let target = env.home().join(".bashrc");
        std::fs::write(&target, "precious").unwrap();

        let (outcome, tally) = reconcile(&env, &LinkDeclaration::new("~/.bashrc", "bashrc"), KEEP);

        assert_eq!(outcome, LinkOutcome::SkippedNotSymlinkNoForce);
        assert_eq!(tally.warnings, 1);
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "precious");
        assert!(!env.context().backups().dir().exists());
    }

    #[test]
    fn force_backs_up_before_overwriting() {
        let env = TestEnv::new();
        let source = env.source_file("bashrc", "new");
        let target = env.home().join(".bashrc");
        std::fs::write(&target, "precious").unwrap();

        let (outcome, tally) = reconcile(&env, &LinkDeclaration::new("~/.bashrc", "bashrc"), FORCE);

        let backup = env.context().backups().backup_path_for(&target);
        assert_eq!(outcome, LinkOutcome::BackedUpAndOverwritten { backup: backup.clone() });
        assert_eq!(tally.success, 1);
        assert_eq!(std::fs::read_to_string(&backup).unwrap(), "precious");
        assert_eq!(std::fs::read_link(&target).unwrap(), source);
    }

    #[test]
    fn force_backs_up_directories() {
        let env = TestEnv::new();
        env.source_dir("nvim");
        let target = env.home().join(".config/nvim");
        std::fs::create_dir_all(&target).unwrap();
        std::fs::write(target.join("init.lua"), "old").unwrap();

        let (outcome, _) =
            reconcile(&env, &LinkDeclaration::new("~/.config/nvim", "nvim"), FORCE);

        let backup = env.context().backups().backup_path_for(&target);
        assert!(matches!(outcome, LinkOutcome::BackedUpAndOverwritten { .. }));
        assert_eq!(std::fs::read_to_string(backup.join("init.lua")).unwrap(), "old");
        assert!(target.symlink_metadata().unwrap().file_type().is_symlink());
    }

    #[test]
    fn force_without_backup_overwrites() {
        let env = TestEnv::new();
        env.source_file("bashrc", "new");
        let target = env.home().join(".bashrc");
        std::fs::write(&target, "old").unwrap();

        let (outcome, _) = reconcile(
            &env,
            &LinkDeclaration::new("~/.bashrc", "bashrc"),
            FORCE.without_backup(),
        );

        assert_eq!(outcome, LinkOutcome::Overwritten);
        assert!(!env.context().backups().dir().exists());
    }

    #[test]
    fn failed_backup_leaves_target_in_place() {
        let env = TestEnv::new();
        env.source_file("bashrc", "new");
        let target = env.home().join(".bashrc");
        std::fs::write(&target, "precious").unwrap();
        // A file where the backup directory should be.
        std::fs::write(env.context().backups().dir(), "").unwrap();

        let (outcome, tally) = reconcile(&env, &LinkDeclaration::new("~/.bashrc", "bashrc"), FORCE);

        assert!(matches!(outcome, LinkOutcome::Failed(_)));
        assert_eq!(tally.errors, 1);
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "precious");
    }

    #[test]
    fn missing_source_is_skipped() {
        let env = TestEnv::new();
        let (outcome, tally) = reconcile(&env, &LinkDeclaration::new("~/.vimrc", "nope"), KEEP);
        assert_eq!(outcome, LinkOutcome::SkippedSourceMissing);
        assert_eq!(tally.warnings, 1);
        assert!(env.home().join(".vimrc").symlink_metadata().is_err());
    }

    #[test]
    fn file_parent_is_skipped() {
        let env = TestEnv::new();
        env.source_file("conf", "");
        std::fs::write(env.home().join(".config"), "").unwrap();

        let (outcome, _) =
            reconcile(&env, &LinkDeclaration::new("~/.config/app.conf", "conf"), KEEP);
        assert_eq!(outcome, LinkOutcome::SkippedParentInvalid);
    }

    #[test]
    fn unreadable_parent_fails_with_inspect_error() {
        let env = TestEnv::new();
        env.source_file("conf", "");
        std::fs::write(env.home().join("plain"), "").unwrap();

        let (outcome, tally) =
            reconcile(&env, &LinkDeclaration::new("~/plain/sub/app.conf", "conf"), KEEP);

        let LinkOutcome::Failed(reason) = outcome else {
            panic!("expected failure, got {outcome:?}");
        };
        assert!(reason.starts_with("cannot inspect "));
        assert!(reason.contains("plain/sub"));
        assert_eq!(tally.errors, 1);
    }

    #[test]
    fn missing_parent_is_created() {
        let env = TestEnv::new();
        env.source_file("conf", "");
        let (outcome, _) =
            reconcile(&env, &LinkDeclaration::new("~/.config/app/app.conf", "conf"), KEEP);
        assert_eq!(outcome, LinkOutcome::Created);
        assert!(env.home().join(".config/app").is_dir());
    }

    #[test]
    fn parent_symlinked_to_directory_is_skipped() {
        let env = TestEnv::new();
        env.source_file("conf", "");
        let real = env.home().join("real-config");
        std::fs::create_dir(&real).unwrap();
        symlink(&real, env.home().join(".config")).unwrap();

        let (outcome, tally) =
            reconcile(&env, &LinkDeclaration::new("~/.config/app.conf", "conf"), KEEP);
        assert_eq!(outcome, LinkOutcome::SkippedParentInvalid);
        assert_eq!(tally.warnings, 1);
        assert!(real.join("app.conf").symlink_metadata().is_err());
    }

    #[test]
    fn duplicates_are_removed_before_linking() {
        let env = TestEnv::new();
        let source = env.source_file("gitconfig", "");
        symlink(&source, env.home().join(".gitconfig.bak")).unwrap();

        let (outcome, tally) =
            reconcile(&env, &LinkDeclaration::new("~/.gitconfig", "gitconfig"), KEEP);

        assert_eq!(outcome, LinkOutcome::Created);
        assert_eq!(tally.warnings, 1);
        assert_eq!(tally.success, 1);
        assert!(env.home().join(".gitconfig.bak").symlink_metadata().is_err());
    }

    #[test]
    fn relative_target_resolves_against_exec_dir() {
        let env = TestEnv::new();
        env.source_file("data", "");
        let (outcome, _) = reconcile(&env, &LinkDeclaration::new("out/data-link", "data"), KEEP);
        assert_eq!(outcome, LinkOutcome::Created);
        assert!(env.exec_dir().join("out/data-link").symlink_metadata().is_ok());
    }

    #[test]
    fn dry_run_changes_nothing_and_narrates_the_same() {
        let real = TestEnv::new();
        let dry = TestEnv::new();
        for env in [&real, &dry] {
            env.source_file("bashrc", "new");
            std::fs::write(env.home().join(".bashrc"), "old").unwrap();
            env.source_file("vimrc", "");
        }

        let decls = [
            LinkDeclaration::new("~/.bashrc", "bashrc"),
            LinkDeclaration::new("~/.vim/vimrc", "vimrc"),
        ];
        let run = |env: &TestEnv, dry_run: bool| {
            let ctx = env.context().with_dry_run(dry_run);
            let mut tally = Tally::default();
            let outcomes: Vec<LinkOutcome> = decls
                .iter()
                .map(|d| LinkReconciler::new(&ctx).reconcile(d, FORCE, &mut tally))
                .collect();
            (outcomes, tally)
        };
        let (real_outcomes, real_tally) = run(&real, false);
        let (dry_outcomes, dry_tally) = run(&dry, true);

        assert_eq!(real_tally, dry_tally);
        assert_eq!(real_outcomes.len(), dry_outcomes.len());
        assert!(matches!(dry_outcomes[0], LinkOutcome::BackedUpAndOverwritten { .. }));
        assert_eq!(dry_outcomes[1], LinkOutcome::Created);

        let strip = |env: &TestEnv| -> Vec<(Level, String)> {
            let home = env.home().display().to_string();
            let exec = env.exec_dir().display().to_string();
            env.log()
                .entries()
                .into_iter()
                .map(|(l, m)| (l, m.replace(&home, "~").replace(&exec, "$EXEC")))
                .collect()
        };
        let mut real_lines = strip(&real);
        let mut dry_lines = strip(&dry);
        // Backup names hash the absolute target, which differs per sandbox.
        for lines in [&mut real_lines, &mut dry_lines] {
            lines.retain(|(_, m)| !m.starts_with("Creating backup:"));
        }
        assert_eq!(real_lines, dry_lines);

        assert_eq!(std::fs::read_to_string(dry.home().join(".bashrc")).unwrap(), "old");
        assert!(!dry.home().join(".vim").exists());
        assert!(!dry.context().backups().dir().exists());
    }
}
