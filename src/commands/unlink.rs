//! `unlink` command implementation.
use super::CommandSetup;
use crate::logging::Tally;
use crate::tasks::{self, unlink::RemoveLinks};

/// Remove every declared symlink, optionally restoring backups.
#[must_use]
pub fn run(setup: &CommandSetup, restore: bool) -> Tally {
    let task = RemoveLinks { restore };
    let mut tally = Tally::default();
    for section in setup.sections() {
        tasks::execute(&task, &setup.ctx, section, &mut tally);
    }
    tally
}
