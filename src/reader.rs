//! Journal reader sessions: construction, start positioning and reads.

use crate::entry::{JournalEntry, read_entry, read_line};
use crate::error::Result;
use crate::follow::{DEFAULT_POLL_INTERVAL, run_follow};
use crate::journal::Journal;
use chrono::{TimeDelta, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

/// Where a reader starts within the journal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StartPosition {
    /// The store's default opened position, typically the head.
    #[default]
    Head,
    /// A signed offset from the current wall-clock time; negative means
    /// "this long ago". The first entry yielded is the first one at or
    /// after the resulting instant.
    Since(TimeDelta),
    /// The last `n` entries before the tail. `FromTail(0)` yields only
    /// entries appended after construction.
    FromTail(u64),
}

/// Options driving a [`JournalReader`], similar to `journalctl`'s iteration
/// and filtering flags.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    pub start: StartPosition,
    /// `FIELD=value` match expressions, applied in order before seeking.
    /// Empty means unfiltered; composition follows the store's own rules.
    pub matches: Vec<String>,
    /// Upper bound on a single blocking wait during a follow; cancellation
    /// is observed within this interval.
    pub poll_interval: Duration,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            start: StartPosition::Head,
            matches: Vec::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// A reading session over one journal handle.
///
/// The reader owns its handle exclusively; nothing else may advance the
/// store's cursor while the session lives. After the one-time initial seek
/// the cursor only ever moves forward.
pub struct JournalReader<J: Journal> {
    journal: Arc<Mutex<J>>,
    poll_interval: Duration,
}

impl<J: Journal + 'static> JournalReader<J> {
    /// Opens a session: applies match filters, then seeks the configured
    /// start position. Any storage failure aborts construction and the
    /// journal handle is released.
    pub fn new(mut journal: J, config: ReaderConfig) -> Result<Self> {
        for expr in &config.matches {
            journal.add_match(expr)?;
        }
        seek_start(&mut journal, config.start)?;

        Ok(JournalReader {
            journal: Arc::new(Mutex::new(journal)),
            poll_interval: config.poll_interval,
        })
    }

    /// Pulls the next entry with all of its fields. `Ok(None)` means no
    /// more entries are available right now; it is not an error and a later
    /// call may yield data again.
    pub fn next_entry(&mut self) -> Result<Option<JournalEntry>> {
        let mut guard = self.journal.lock();
        if !guard.next()? {
            return Ok(None);
        }
        read_entry(&mut *guard).map(Some)
    }

    /// Pulls the next entry rendered as a `"<timestamp> <message>\n"` line.
    pub fn next_line(&mut self) -> Result<Option<String>> {
        let mut guard = self.journal.lock();
        if !guard.next()? {
            return Ok(None);
        }
        read_line(&mut *guard).map(Some)
    }

    /// Follows the journal, sending every entry to `sink` until the
    /// shutdown signal fires ([`Error::Cancelled`](crate::Error::Cancelled))
    /// or the store fails. Blocks the calling task; entries arrive in strict
    /// cursor order.
    pub async fn follow(
        &mut self,
        shutdown: broadcast::Receiver<()>,
        sink: mpsc::UnboundedSender<JournalEntry>,
    ) -> Result<()> {
        self.follow_with(shutdown, move |entry| sink.send(entry).is_ok())
            .await
    }

    /// Follow with an arbitrary emit callback; `false` from the callback
    /// stops the loop with [`Error::SinkClosed`](crate::Error::SinkClosed).
    pub(crate) async fn follow_with<F>(
        &mut self,
        shutdown: broadcast::Receiver<()>,
        emit: F,
    ) -> Result<()>
    where
        F: FnMut(JournalEntry) -> bool,
    {
        run_follow(&self.journal, self.poll_interval, shutdown, emit).await
    }

    /// Ends the session and releases the journal handle.
    pub fn close(self) {}
}

/// Positions the cursor so the next advance yields the first wanted entry.
fn seek_start<J: Journal>(journal: &mut J, start: StartPosition) -> Result<()> {
    match start {
        StartPosition::Head => {}
        StartPosition::Since(offset) => {
            let offset_usec = offset.num_microseconds().unwrap_or_else(|| {
                if offset < TimeDelta::zero() {
                    i64::MIN
                } else {
                    i64::MAX
                }
            });
            let target = Utc::now().timestamp_micros().saturating_add(offset_usec);
            journal.seek_realtime_usec(target.max(0) as u64)?;
        }
        StartPosition::FromTail(count) => {
            journal.seek_tail()?;
            // One step further than asked: the first forward advance eats
            // that extra step, leaving exactly `count` entries in front.
            journal.previous_skip(count.saturating_add(1))?;
        }
    }
    Ok(())
}
