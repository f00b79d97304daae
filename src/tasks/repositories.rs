//! Git repository stage.
use anyhow::Result;

use super::{Context, Task};
use crate::config::Section;
use crate::logging::Tally;
use crate::resources::repository::ensure_repository;

/// Clone every repository in the section's `git` table.
#[derive(Debug)]
pub struct CloneRepositories;

impl Task for CloneRepositories {
    fn name(&self) -> &'static str {
        "Setting up git repositories..."
    }

    fn should_run(&self, section: &Section) -> bool {
        !section.git.is_empty()
    }

    fn run(&self, ctx: &Context, section: &Section, tally: &mut Tally) -> Result<()> {
        for (path, repo) in section.git.iter() {
            tally.record(ensure_repository(ctx, path, repo).severity());
        }
        Ok(())
    }
}
