//! A journal reading library with pull and follow (live-tail) interfaces.
//!
//! This library reads an append-only, timestamp-ordered record store through
//! the [`Journal`] trait: seek to a configurable start position (a relative
//! time offset, or a number of entries back from the tail), drain the
//! available history in order, then block efficiently for new entries as
//! they are appended. Cancellation is cooperative and observed within one
//! poll interval, even while a blocking wait is outstanding.
//!
//! # Example
//!
//! ```rust,no_run
//! use journal_tail::{MemoryJournal, ReaderConfig, StartPosition, follow_journal};
//! use tokio_stream::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let journal = MemoryJournal::new();
//!     let writer = journal.writer();
//!     writer.append(&[("MESSAGE", "hello"), ("UNIT", "demo.service")]);
//!
//!     let config = ReaderConfig {
//!         start: StartPosition::FromTail(10),
//!         matches: vec!["UNIT=demo.service".to_string()],
//!         ..ReaderConfig::default()
//!     };
//!
//!     let mut stream = follow_journal(journal, config)?;
//!     while let Some(entry) = stream.next().await {
//!         println!("{:?}", entry?.message());
//!     }
//!
//!     Ok(())
//! }
//! ```

// Internal modules - not part of public API
mod entry;
mod error;
mod follow;
mod journal;
mod mem;
mod reader;
mod stream;

#[cfg(test)]
mod test_helpers;

// Public API exports
pub use entry::JournalEntry;
pub use error::{Error, Result};
pub use journal::{Journal, WaitEvent};
pub use mem::{MemoryJournal, MemoryJournalWriter};
pub use reader::{JournalReader, ReaderConfig, StartPosition};
pub use stream::JournalStream;

/// Creates a stream that follows a journal, draining existing entries and
/// then live-tailing new ones. Must be called from within a Tokio runtime.
///
/// # Example
///
/// ```rust,no_run
/// use journal_tail::{MemoryJournal, ReaderConfig, follow_journal};
/// use tokio_stream::StreamExt;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let journal = MemoryJournal::new();
///     let mut stream = follow_journal(journal, ReaderConfig::default())?;
///
///     while let Some(entry) = stream.next().await {
///         println!("{:?}", entry?);
///     }
///
///     Ok(())
/// }
/// ```
pub fn follow_journal<J: Journal + 'static>(
    journal: J,
    config: ReaderConfig,
) -> Result<JournalStream> {
    JournalStream::new(journal, config)
}
