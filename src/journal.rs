//! The journal storage abstraction consumed by the reader.

use std::collections::BTreeMap;
use std::io;
use std::time::Duration;

/// Change notification returned by [`Journal::wait`].
///
/// This is an open enumeration: stores may report codes the reader does not
/// interpret, which all simply wake the follow loop for another drain pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitEvent {
    /// The timeout elapsed without any change.
    Nop,
    /// One or more entries were appended.
    Append,
    /// The store was rotated, vacuumed or otherwise restructured; cursors
    /// remain usable but previously read positions may have been reclaimed.
    Invalidate,
    /// A change code the reader does not recognize.
    Other(i32),
}

impl WaitEvent {
    /// Maps a raw change code (`sd_journal_wait` numbering) to an event.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => WaitEvent::Nop,
            1 => WaitEvent::Append,
            2 => WaitEvent::Invalidate,
            other => WaitEvent::Other(other),
        }
    }
}

/// A handle to an append-only, timestamp-ordered record store.
///
/// The handle owns a single internal read cursor. It is not safe to advance
/// one handle from two call sites; a [`JournalReader`](crate::JournalReader)
/// takes exclusive ownership of its handle for exactly this reason.
///
/// Field data accessors (`get_data`, `get_all_data`, `get_realtime_usec`)
/// address the record the cursor currently references, which is only valid
/// after a `next` call that returned `true`.
pub trait Journal: Send {
    /// Adds a `FIELD=value` match filter restricting which records the
    /// cursor will expose. Cumulative; an empty filter set means unfiltered.
    /// Composition of multiple filters follows the store's own rules.
    fn add_match(&mut self, expr: &str) -> io::Result<()>;

    /// Seeks so the next advance yields the first record with a realtime
    /// timestamp at or after `usec` (microseconds since the Unix epoch).
    fn seek_realtime_usec(&mut self, usec: u64) -> io::Result<()>;

    /// Seeks past the most recent record; the next advance yields nothing
    /// until new records arrive.
    fn seek_tail(&mut self) -> io::Result<()>;

    /// Steps the cursor backward over up to `count` exposed records,
    /// returning how many records it actually stepped. Stepping past the
    /// oldest record parks the cursor before it, so the next advance yields
    /// the very first exposed record.
    fn previous_skip(&mut self, count: u64) -> io::Result<u64>;

    /// Advances the cursor by one record. Returns `false` when the tail has
    /// been reached; that is not an error, and repeated calls at the tail
    /// leave the cursor in place.
    fn next(&mut self) -> io::Result<bool>;

    /// Returns the value of a single field of the current record.
    fn get_data(&mut self, field: &str) -> io::Result<String>;

    /// Returns all fields of the current record. All-or-nothing: a failure
    /// mid-enumeration yields an error, never a partial mapping.
    fn get_all_data(&mut self) -> io::Result<BTreeMap<String, String>>;

    /// Returns the realtime timestamp of the current record in microseconds
    /// since the Unix epoch.
    fn get_realtime_usec(&mut self) -> io::Result<u64>;

    /// Blocks until the store changes or `timeout` elapses, whichever comes
    /// first. Must always return within `timeout`.
    fn wait(&mut self, timeout: Duration) -> io::Result<WaitEvent>;
}
