//! Filesystem and process primitives used by tasks.
//!
//! The link engine lives here: path resolution ([`paths`]), non-dereferencing
//! probes ([`probe`]), duplicate alias cleanup ([`duplicates`]), backups
//! ([`backup`]), the reconciler ([`symlink`]) and the read-only health
//! report ([`status`]).  [`directory`], [`repository`] and [`shell`] cover
//! the remaining section entries.
pub mod backup;
pub mod directory;
pub mod duplicates;
pub mod fs;
pub mod paths;
pub mod probe;
pub mod repository;
pub mod shell;
pub mod status;
pub mod symlink;

/// Result of a step that is allowed to find nothing to do.
///
/// `Skipped` is neither a success nor a failure and is never counted in a
/// [`Tally`](crate::logging::Tally).
///
/// # Examples
///
/// ```
/// use hidedot::resources::BestEffort;
///
/// let done: BestEffort<usize> = BestEffort::Done(2);
/// let skipped: BestEffort<usize> = BestEffort::Skipped("no backup".into());
///
/// assert!(done.is_done());
/// assert!(!skipped.is_done());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BestEffort<T> {
    /// The step ran.
    Done(T),
    /// The step found nothing to act on.
    Skipped(String),
}

impl<T> BestEffort<T> {
    /// Whether the step ran.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }
}
