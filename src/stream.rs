//! Stream adapter over a following journal reader.

use crate::entry::JournalEntry;
use crate::error::{Error, Result};
use crate::journal::Journal;
use crate::reader::{JournalReader, ReaderConfig};
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

/// A stream of journal entries that drains history and then live-tails.
///
/// The follow loop runs on a background task; dropping the stream signals
/// it to shut down. A storage failure ends the stream with one final `Err`
/// item.
pub struct JournalStream {
    receiver: mpsc::UnboundedReceiver<Result<JournalEntry>>,
    _shutdown_tx: broadcast::Sender<()>,
    _task_handle: JoinHandle<()>,
}

impl JournalStream {
    /// Creates a stream over the given journal handle. Must be called from
    /// within a Tokio runtime. Construction failures (filters, the initial
    /// seek) surface here, before any task is spawned.
    pub fn new<J: Journal + 'static>(journal: J, config: ReaderConfig) -> Result<Self> {
        let mut reader = JournalReader::new(journal, config)?;

        let (tx, rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let task_handle = tokio::spawn(async move {
            let emit_tx = tx.clone();
            let result = reader
                .follow_with(shutdown_rx, move |entry| emit_tx.send(Ok(entry)).is_ok())
                .await;
            match result {
                Ok(()) | Err(Error::Cancelled) | Err(Error::SinkClosed) => {}
                Err(error) => {
                    let _ = tx.send(Err(error));
                }
            }
        });

        Ok(JournalStream {
            receiver: rx,
            _shutdown_tx: shutdown_tx,
            _task_handle: task_handle,
        })
    }

    /// Check if the stream has been closed/dropped
    #[cfg(test)]
    pub fn is_closed(&self) -> bool {
        self.receiver.is_closed()
    }
}

impl Drop for JournalStream {
    fn drop(&mut self) {
        // Signal the follow task to shut down - ignore errors if it already
        // finished on its own
        let _ = self._shutdown_tx.send(());
    }
}

impl Stream for JournalStream {
    type Item = Result<JournalEntry>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.receiver).poll_recv(cx)
    }
}
