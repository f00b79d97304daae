//! Core logging types: narration levels, severities, and the [`Log`] trait.

/// Narration level of a single message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Verbose detail, hidden on the console unless `--verbose`.
    Debug,
    /// Progress information.
    Info,
    /// Section heading (e.g. "Creating links...").
    Stage,
    /// A completed change or a confirmed correct state.
    Success,
    /// A recoverable condition; the item was skipped.
    Warn,
    /// An operational failure; processing continues with the next item.
    Error,
}

/// How a finished operation counts towards the run [`Tally`](super::Tally).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Counted as successful.
    Success,
    /// Counted as a warning.
    Warning,
    /// Counted as an error.
    Error,
    /// Not counted (nothing to do).
    Neutral,
}

/// Abstraction over narration backends.
///
/// [`Logger`](super::Logger) forwards to `tracing`; [`MemoryLog`](super::MemoryLog)
/// keeps messages in memory.  Narration is a side channel: nothing in the
/// engine branches on what a `Log` does with a message.
pub trait Log: Send + Sync {
    /// Log a stage header.
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message.
    fn debug(&self, msg: &str);
    /// Log a success message.
    fn success(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered_by_importance() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Warn < Level::Error);
    }

    #[test]
    fn severity_equality() {
        assert_eq!(Severity::Success, Severity::Success);
        assert_ne!(Severity::Warning, Severity::Error);
        assert_ne!(Severity::Neutral, Severity::Success);
    }
}
