//! Read-only link health report.
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::paths::{PathResolver, same_path};
use super::probe::{self, PathState};
use super::symlink::LinkDeclaration;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";

/// Health of one declared link, ordered from healthiest to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkStatus {
    /// Link exists and points at the declared source.
    Ok,
    /// Nothing exists at the target.
    Missing,
    /// The target cannot be inspected, or its destination does not exist.
    Broken,
    /// The link points somewhere else.
    Mismatch,
    /// A regular file or directory occupies the target.
    NotSymlink,
}

impl LinkStatus {
    /// Upper-case label used in reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Missing => "MISSING",
            Self::Broken => "BROKEN",
            Self::Mismatch => "MISMATCH",
            Self::NotSymlink => "NOT_SYMLINK",
        }
    }

    const fn icon(self) -> (&'static str, &'static str) {
        match self {
            Self::Ok => ("✓", GREEN),
            Self::Missing => ("✗", YELLOW),
            Self::Broken => ("⚠", RED),
            Self::Mismatch => ("≠", YELLOW),
            Self::NotSymlink => ("!", RED),
        }
    }
}

impl std::fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of one declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkReport {
    /// Absolute target path.
    pub target: PathBuf,
    /// Absolute source path.
    pub source: PathBuf,
    /// Classification.
    pub status: LinkStatus,
    /// Where the link currently points, when it is a readable symlink.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<PathBuf>,
    /// Explanation for anything other than [`LinkStatus::Ok`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Machine-readable form of a full report.
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    links: &'a [LinkReport],
    ok: usize,
    problems: usize,
}

/// Inspect one declaration without changing anything.
#[must_use]
pub fn evaluate(resolver: &PathResolver, decl: &LinkDeclaration) -> LinkReport {
    let target = resolver.resolve_target(&decl.target);
    let source = resolver.resolve_source(&decl.source);
    let (status, current, message) = classify(&target, &source);
    LinkReport {
        target,
        source,
        status,
        current,
        message,
    }
}

fn classify(target: &Path, source: &Path) -> (LinkStatus, Option<PathBuf>, Option<String>) {
    let dest = match probe::probe(target) {
        Ok(PathState::Absent) => {
            return (
                LinkStatus::Missing,
                None,
                Some("Symlink does not exist".to_string()),
            );
        }
        Ok(PathState::Directory | PathState::RegularOrOther) => {
            return (
                LinkStatus::NotSymlink,
                None,
                Some("Path exists but is not a symlink".to_string()),
            );
        }
        Ok(PathState::Symlink(dest)) => dest,
        Err(e) => return (LinkStatus::Broken, None, Some(e.to_string())),
    };

    if std::fs::metadata(target).is_err() {
        return (
            LinkStatus::Broken,
            Some(dest),
            Some("Symlink target does not exist".to_string()),
        );
    }
    if !same_path(&dest, source) {
        let message = format!("Points to {} instead of {}", dest.display(), source.display());
        return (LinkStatus::Mismatch, Some(dest), Some(message));
    }
    (LinkStatus::Ok, Some(dest), None)
}

/// Order reports worst first, then by target path.
pub fn sort_reports(reports: &mut [LinkReport]) {
    reports.sort_by(|a, b| {
        b.status
            .cmp(&a.status)
            .then_with(|| a.target.cmp(&b.target))
    });
}

/// Count healthy and unhealthy reports.
#[must_use]
pub fn counts(reports: &[LinkReport]) -> (usize, usize) {
    let ok = reports
        .iter()
        .filter(|r| r.status == LinkStatus::Ok)
        .count();
    (ok, reports.len() - ok)
}

/// Render the report table followed by the `N OK, M problems` footer.
#[must_use]
pub fn render(reports: &[LinkReport], color: bool) -> String {
    let mut out = String::new();
    for report in reports {
        if color {
            let (icon, paint) = report.status.icon();
            let _ = writeln!(
                out,
                "  {paint}{icon}{RESET} {BOLD}{}{RESET} → {}",
                report.target.display(),
                report.source.display()
            );
        } else {
            let _ = writeln!(
                out,
                "  [{}] {} → {}",
                report.status,
                report.target.display(),
                report.source.display()
            );
        }
        if let Some(message) = &report.message {
            let _ = writeln!(out, "      {message}");
        }
    }
    let (ok, problems) = counts(reports);
    let _ = writeln!(out, "\n{ok} OK, {problems} problems");
    out
}

/// Serialize reports with their counts as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json(reports: &[LinkReport]) -> serde_json::Result<String> {
    let (ok, problems) = counts(reports);
    serde_json::to_string_pretty(&JsonReport {
        links: reports,
        ok,
        problems,
    })
}
