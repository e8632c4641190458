//! Error types for the journal tail library.

use thiserror::Error;

/// The main error type for journal reader operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Storage-layer failures from the journal handle: open/seek problems
    /// during construction, or advance/read/wait failures while reading.
    #[error("journal storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// The cancellation signal fired before the next entry was emitted.
    #[error("follow cancelled")]
    Cancelled,

    /// The consumer dropped its end of the sink while a follow was active.
    #[error("entry sink closed")]
    SinkClosed,
}

impl Error {
    /// True when the error represents a graceful stop rather than a
    /// storage failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

/// A convenient Result type for journal reader operations.
pub type Result<T> = std::result::Result<T, Error>;
