//! Directory creation stage.
use anyhow::Result;

use super::{Context, Task};
use crate::config::Section;
use crate::logging::Tally;
use crate::resources::directory::ensure_directory;

/// Create every directory in the section's `create` list.
#[derive(Debug)]
pub struct CreateDirectories;

impl Task for CreateDirectories {
    fn name(&self) -> &'static str {
        "Creating directories..."
    }

    fn should_run(&self, section: &Section) -> bool {
        !section.create.is_empty()
    }

    fn run(&self, ctx: &Context, section: &Section, tally: &mut Tally) -> Result<()> {
        for dir in &section.create {
            tally.record(ensure_directory(ctx, dir).severity());
        }
        Ok(())
    }
}
