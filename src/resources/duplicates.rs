//! Removal of sibling symlinks that alias a link's source.
use std::path::Path;

use super::BestEffort;
use super::fs::remove_symlink;
use super::paths::same_path;
use super::probe::{self, PathState};
use crate::logging::{Severity, Tally};
use crate::tasks::Context;

/// Remove every symlink next to `target` that already resolves to `source`.
///
/// Siblings are visited in name order; `target` itself is never touched.
/// Each removal is a warning in `tally` (an error if it fails).  Returns the
/// number of aliases found, or [`BestEffort::Skipped`] when the parent
/// directory cannot be listed.
pub fn remove_duplicate_aliases(
    ctx: &Context,
    target: &Path,
    source: &Path,
    tally: &mut Tally,
) -> BestEffort<usize> {
    let Some(parent) = target.parent() else {
        return BestEffort::Skipped(format!("no parent directory: {}", target.display()));
    };
    let mut siblings: Vec<_> = match std::fs::read_dir(parent) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .collect(),
        Err(e) => {
            ctx.log.debug(&format!(
                "cannot scan {} for duplicates: {e}",
                parent.display()
            ));
            return BestEffort::Skipped(format!("cannot list {}: {e}", parent.display()));
        }
    };
    siblings.sort();

    let mut found = 0;
    for entry in siblings.iter().filter(|p| p.as_path() != target) {
        let Ok(PathState::Symlink(dest)) = probe::probe(entry) else {
            continue;
        };
        if !same_path(&dest, source) {
            continue;
        }

        found += 1;
        ctx.log.warn(&format!(
            "Found duplicate symlink: {} → {}",
            entry.display(),
            source.display()
        ));
        match ctx.execute(|| remove_symlink(entry)) {
            Ok(()) => tally.record(Severity::Warning),
            Err(e) => {
                ctx.log
                    .error(&format!("Error removing duplicate {}: {e:#}", entry.display()));
                tally.record(Severity::Error);
            }
        }
    }
    BestEffort::Done(found)
}

#[cfg(all(test, unix))]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::Level;
    use crate::tasks::test_helpers::TestEnv;
    use std::os::unix::fs::symlink;

    #[test]
    fn removes_aliases_and_keeps_target_and_others() {
        let env = TestEnv::new();
        let source = env.source_file("vimrc", "set nu");
        let other = env.source_file("other", "x");
        let home = env.home();
        symlink(&source, home.join(".vimrc.old")).unwrap();
        symlink(&source, home.join(".vimrc")).unwrap();
        symlink(&other, home.join(".other")).unwrap();
        std::fs::write(home.join("plain"), "x").unwrap();

        let ctx = env.context();
        let mut tally = Tally::default();
        let found =
            remove_duplicate_aliases(&ctx, &home.join(".vimrc"), &source, &mut tally);

        assert_eq!(found, BestEffort::Done(1));
        assert_eq!(tally.warnings, 1);
        assert!(home.join(".vimrc.old").symlink_metadata().is_err());
        assert!(home.join(".vimrc").symlink_metadata().is_ok());
        assert!(home.join(".other").symlink_metadata().is_ok());
        assert!(env.log().contains("Found duplicate symlink"));
    }

    #[test]
    fn relative_alias_is_detected() {
        let env = TestEnv::new();
        let home = env.home();
        std::fs::write(home.join("real"), "x").unwrap();
        symlink("real", home.join("alias")).unwrap();

        let ctx = env.context();
        let mut tally = Tally::default();
        let found =
            remove_duplicate_aliases(&ctx, &home.join("new"), &home.join("real"), &mut tally);
        assert_eq!(found, BestEffort::Done(1));
        assert!(home.join("alias").symlink_metadata().is_err());
    }

    #[test]
    fn aliases_reported_in_name_order() {
        let env = TestEnv::new();
        let source = env.source_file("zshrc", "");
        let home = env.home();
        symlink(&source, home.join("b-alias")).unwrap();
        symlink(&source, home.join("a-alias")).unwrap();

        let ctx = env.context();
        let mut tally = Tally::default();
        remove_duplicate_aliases(&ctx, &home.join(".zshrc"), &source, &mut tally);

        let warnings = env.log().at(Level::Warn);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("a-alias"));
        assert!(warnings[1].contains("b-alias"));
    }

    #[test]
    fn dry_run_reports_but_keeps_alias() {
        let env = TestEnv::new();
        let source = env.source_file("gitconfig", "");
        let home = env.home();
        symlink(&source, home.join("alias")).unwrap();

        let ctx = env.context().with_dry_run(true);
        let mut tally = Tally::default();
        let found =
            remove_duplicate_aliases(&ctx, &home.join(".gitconfig"), &source, &mut tally);

        assert_eq!(found, BestEffort::Done(1));
        assert_eq!(tally.warnings, 1);
        assert!(home.join("alias").symlink_metadata().is_ok());
    }

    #[test]
    fn unlistable_parent_is_skipped() {
        let env = TestEnv::new();
        let ctx = env.context();
        let mut tally = Tally::default();
        let found = remove_duplicate_aliases(
            &ctx,
            &env.home().join("missing/.vimrc"),
            Path::new("/src"),
            &mut tally,
        );
        assert!(matches!(found, BestEffort::Skipped(_)));
        assert_eq!(tally, Tally::default());
    }
}
