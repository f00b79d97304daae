//! `status` command implementation.
use anyhow::Result;

use super::CommandSetup;
use crate::resources::status::{LinkReport, evaluate, render, sort_reports, to_json};
use crate::tasks::links::declarations;

/// Evaluate every link of the selected sections, worst first.
#[must_use]
pub fn collect(setup: &CommandSetup) -> Vec<LinkReport> {
    let resolver = setup.ctx.resolver();
    let mut reports: Vec<LinkReport> = setup
        .sections()
        .into_iter()
        .flat_map(declarations)
        .map(|decl| evaluate(&resolver, &decl))
        .collect();
    sort_reports(&mut reports);
    reports
}

/// Print the link status report to stdout.
///
/// # Errors
///
/// Returns an error if the JSON report cannot be serialized.
#[allow(clippy::print_stdout)]
pub fn run(setup: &CommandSetup, json: bool, color: bool) -> Result<()> {
    let reports = collect(setup);
    if json {
        println!("{}", to_json(&reports)?);
        return Ok(());
    }
    setup.ctx.log.stage("Link Status Report");
    println!();
    print!("{}", render(&reports, color));
    Ok(())
}
