//! Per-run success / warning / error counters.
use std::ops::AddAssign;

use serde::Serialize;

use super::types::Severity;

/// Counters for one run.
///
/// A `Tally` is an ordinary value: each command creates one, threads it
/// through every operation by `&mut`, and returns it.  Two runs in the same
/// process never share counts.
///
/// # Examples
///
/// ```
/// use hidedot::logging::{Severity, Tally};
///
/// let mut tally = Tally::default();
/// tally.record(Severity::Success);
/// tally.record(Severity::Warning);
/// tally.record(Severity::Neutral);
///
/// assert_eq!(tally.success, 1);
/// assert_eq!(tally.warnings, 1);
/// assert_eq!(tally.errors, 0);
/// assert_eq!(tally.summary(), "1 successful, 1 warnings, 0 errors");
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tally {
    /// Number of successful operations.
    pub success: u32,
    /// Number of skipped-with-warning operations.
    pub warnings: u32,
    /// Number of failed operations.
    pub errors: u32,
}

impl Tally {
    /// Count one finished operation.
    pub const fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Success => self.success += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Error => self.errors += 1,
            Severity::Neutral => {}
        }
    }

    /// Plain-text summary line.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} successful, {} warnings, {} errors",
            self.success, self.warnings, self.errors
        )
    }

    /// Return `true` if any operation failed.
    #[must_use]
    pub const fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

impl AddAssign for Tally {
    fn add_assign(&mut self, rhs: Self) {
        self.success += rhs.success;
        self.warnings += rhs.warnings;
        self.errors += rhs.errors;
    }
}
