//! Link stage: policy resolution and per-declaration reconciliation.
use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Result;

use super::{Context, Task};
use crate::config::Section;
use crate::logging::Tally;
use crate::resources::symlink::{LinkDeclaration, LinkPolicy, LinkReconciler};

/// The link policy a section runs under, after the global backup switch.
#[must_use]
pub fn section_policy(ctx: &Context, section: &Section) -> LinkPolicy {
    LinkPolicy::from_defaults(section.defaults.as_ref().map(|d| &d.link))
        .with_backup_enabled(ctx.backup_enabled)
}

/// Link declarations of a section, in declaration order.
#[must_use]
pub fn declarations(section: &Section) -> Vec<LinkDeclaration> {
    section
        .link
        .iter()
        .map(|(target, source)| LinkDeclaration::new(target, source.as_str()))
        .collect()
}

/// Targets declared by more than one section, in first-seen order.
///
/// Targets are compared after resolution, so `~/.vimrc` and an absolute
/// spelling of the same path collide.
#[must_use]
pub fn duplicate_targets(ctx: &Context, sections: &[&Section]) -> Vec<(PathBuf, Vec<usize>)> {
    let resolver = ctx.resolver();
    let mut seen: Vec<(PathBuf, Vec<usize>)> = Vec::new();
    let mut index: HashMap<PathBuf, usize> = HashMap::new();
    for (number, section) in sections.iter().enumerate().map(|(i, s)| (i + 1, s)) {
        for (target, _) in section.link.iter() {
            let path = resolver.resolve_target(target);
            if let Some(&slot) = index.get(&path) {
                if let Some((_, numbers)) = seen.get_mut(slot)
                    && !numbers.contains(&number)
                {
                    numbers.push(number);
                }
            } else {
                index.insert(path.clone(), seen.len());
                seen.push((path, vec![number]));
            }
        }
    }
    seen.retain(|(_, numbers)| numbers.len() > 1);
    seen
}

/// Reconcile every link in the section.
#[derive(Debug)]
pub struct CreateLinks;

impl Task for CreateLinks {
    fn name(&self) -> &'static str {
        "Creating links..."
    }

    fn should_run(&self, section: &Section) -> bool {
        !section.link.is_empty()
    }

    fn run(&self, ctx: &Context, section: &Section, tally: &mut Tally) -> Result<()> {
        let policy = section_policy(ctx, section);
        let reconciler = LinkReconciler::new(ctx);
        for decl in declarations(section) {
            reconciler.reconcile(&decl, policy, tally);
        }
        Ok(())
    }
}
