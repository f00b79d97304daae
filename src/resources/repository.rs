//! Git repository clones for a section's `git` table.
use anyhow::bail;

use super::probe;
use crate::config::GitRepo;
use crate::logging::Severity;
use crate::tasks::Context;

/// What happened to one repository entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryOutcome {
    /// A directory already exists at the destination.
    AlreadyExists,
    /// The repository was cloned.
    Cloned,
    /// Something other than a directory occupies the destination.
    NotADirectory,
    /// Inspection or cloning failed.
    Failed(String),
}

impl RepositoryOutcome {
    /// How this outcome counts in the run tally.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::AlreadyExists => Severity::Neutral,
            Self::Cloned => Severity::Success,
            Self::NotADirectory => Severity::Warning,
            Self::Failed(_) => Severity::Error,
        }
    }
}

/// Clone `repo` into `path` unless something is already there.
///
/// An existing directory is not inspected further; it is assumed to be the
/// repository.
pub fn ensure_repository(ctx: &Context, path: &str, repo: &GitRepo) -> RepositoryOutcome {
    let dest = ctx.resolver().resolve_target(path);
    let fail = |reason: String| {
        ctx.log.error(&reason);
        RepositoryOutcome::Failed(reason)
    };

    match probe::exists(&dest) {
        Ok(presence) if presence.is_dir => {
            ctx.log
                .info(&format!("Repository already exists: {}", dest.display()));
            return RepositoryOutcome::AlreadyExists;
        }
        Ok(presence) if presence.exists => {
            ctx.log.warn(&format!(
                "Path exists but is not a directory: {}",
                dest.display()
            ));
            return RepositoryOutcome::NotADirectory;
        }
        Ok(_) => {}
        Err(e) => {
            return fail(format!(
                "Error checking repository path {}: {e}",
                dest.display()
            ));
        }
    }

    if !ctx.executor.which("git") {
        return fail(format!(
            "git is not installed; cannot clone {}",
            repo.label()
        ));
    }

    ctx.log
        .info(&format!("Cloning {} to {}", repo.label(), dest.display()));
    let args = [
        "clone".to_string(),
        repo.url.clone(),
        dest.display().to_string(),
    ];
    let cloned = ctx.execute(|| {
        let result = ctx.executor.run(&ctx.env.exec_dir, "git", &args)?;
        if !result.success {
            bail!("{}", result.failure_message());
        }
        Ok(())
    });
    match cloned {
        Ok(()) => {
            ctx.log.success(&format!("Cloned: {}", dest.display()));
            RepositoryOutcome::Cloned
        }
        Err(e) => fail(format!("Error cloning repository: {e:#}")),
    }
}
