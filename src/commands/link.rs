//! `link` command implementation.
use super::CommandSetup;
use crate::logging::{Severity, Tally};
use crate::tasks::{self, links::duplicate_targets};

/// Run every section through the link pipeline and return the run's tally.
///
/// Targets declared by more than one selected section are reported first;
/// they are still processed in order, so the last declaration wins.
#[must_use]
pub fn run(setup: &CommandSetup) -> Tally {
    let ctx = &setup.ctx;
    let sections = setup.sections();
    let mut tally = Tally::default();

    for (target, numbers) in duplicate_targets(ctx, &sections) {
        let numbers: Vec<String> = numbers.iter().map(ToString::to_string).collect();
        ctx.log.warn(&format!(
            "Target {} is declared in sections {}; the last declaration wins",
            target.display(),
            numbers.join(", ")
        ));
        tally.record(Severity::Warning);
    }

    let pipeline = tasks::link_pipeline();
    for section in sections {
        tasks::run_link_section(ctx, section, &pipeline, &mut tally);
    }
    tally
}
