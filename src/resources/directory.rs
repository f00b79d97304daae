//! Directory creation for a section's `create` list.
use super::fs::create_dir_all;
use super::probe;
use crate::logging::Severity;
use crate::tasks::Context;

/// What happened to one `create` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryOutcome {
    /// A directory (or a link to one) is already there.
    AlreadyExists,
    /// The directory and any missing ancestors were created.
    Created,
    /// Something other than a directory occupies the path.
    NotADirectory,
    /// Inspection or creation failed.
    Failed(String),
}

impl DirectoryOutcome {
    /// How this outcome counts in the run tally.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::AlreadyExists => Severity::Neutral,
            Self::Created => Severity::Success,
            Self::NotADirectory => Severity::Warning,
            Self::Failed(_) => Severity::Error,
        }
    }
}

/// Ensure the directory named by `dir` exists.
pub fn ensure_directory(ctx: &Context, dir: &str) -> DirectoryOutcome {
    let path = ctx.resolver().resolve_target(dir);
    match probe::exists(&path) {
        Ok(presence) if presence.is_dir => {
            ctx.log
                .info(&format!("Directory already exists: {}", path.display()));
            DirectoryOutcome::AlreadyExists
        }
        Ok(presence) if presence.exists => {
            ctx.log.warn(&format!(
                "Path exists but is not a directory: {}",
                path.display()
            ));
            DirectoryOutcome::NotADirectory
        }
        Ok(_) => {
            ctx.log
                .info(&format!("Creating directory: {}", path.display()));
            match ctx.execute(|| create_dir_all(&path)) {
                Ok(()) => {
                    ctx.log
                        .success(&format!("Created directory: {}", path.display()));
                    DirectoryOutcome::Created
                }
                Err(e) => {
                    let reason = format!("Error creating directory: {e:#}");
                    ctx.log.error(&reason);
                    DirectoryOutcome::Failed(reason)
                }
            }
        }
        Err(e) => {
            let reason = format!("Error checking directory {}: {e}", path.display());
            ctx.log.error(&reason);
            DirectoryOutcome::Failed(reason)
        }
    }
}
