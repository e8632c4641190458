//! The follow loop: drain the journal, wait at the tail, repeat.
//!
//! The loop alternates between two phases. While records are available it
//! advances and emits them one at a time, checking the shutdown signal
//! before every emission. At the tail it parks in a bounded wait on the
//! store's change notification, racing that wait against the shutdown
//! signal so cancellation is observed within one poll interval.

use crate::entry::{JournalEntry, read_entry};
use crate::error::{Error, Result};
use crate::journal::{Journal, WaitEvent};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{broadcast, oneshot};

/// How long a single blocking wait on the store may last before the loop
/// re-checks for cancellation.
pub(crate) const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Drives the drain/wait loop until cancellation or a storage failure.
///
/// Decoded entries are handed to `emit`; an emit returning `false` means the
/// consumer is gone and the loop stops with [`Error::SinkClosed`]. Only the
/// blocking wait runs off-task, one waiter at a time; everything else touches
/// the journal from this call alone.
pub(crate) async fn run_follow<J, F>(
    journal: &Arc<Mutex<J>>,
    poll_interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
    mut emit: F,
) -> Result<()>
where
    J: Journal + 'static,
    F: FnMut(JournalEntry) -> bool,
{
    loop {
        // Drain one record. Tail is the normal wait trigger, anything else
        // from the store is fatal.
        let entry = {
            let mut guard = journal.lock();
            if guard.next()? {
                Some(read_entry(&mut *guard)?)
            } else {
                None
            }
        };

        // The shutdown check sits between decode and emission: once the
        // signal has fired, nothing further reaches the sink even when
        // records are already buffered in the store.
        if shutdown_signalled(&mut shutdown) {
            return Err(Error::Cancelled);
        }

        match entry {
            Some(entry) => {
                if !emit(entry) {
                    return Err(Error::SinkClosed);
                }
            }
            None => match wait_for_change(journal, poll_interval, &mut shutdown).await? {
                WaitEvent::Nop | WaitEvent::Append | WaitEvent::Invalidate => {}
                WaitEvent::Other(code) => {
                    tracing::debug!(code, "unrecognized journal change event");
                }
            },
        }
    }
}

/// Non-blocking shutdown probe. Any outcome other than "no signal yet" is
/// treated as cancellation, including a dropped sender.
fn shutdown_signalled(shutdown: &mut broadcast::Receiver<()>) -> bool {
    !matches!(
        shutdown.try_recv(),
        Err(broadcast::error::TryRecvError::Empty)
    )
}

/// Runs one bounded wait against the store on a blocking worker, racing it
/// with the shutdown signal.
///
/// The worker writes its result into a single-slot channel which may be
/// dropped unread. On cancellation the worker is notified through a stop
/// flag, never joined: it finishes its poll interval on its own and its
/// result is discarded.
async fn wait_for_change<J>(
    journal: &Arc<Mutex<J>>,
    poll_interval: Duration,
    shutdown: &mut broadcast::Receiver<()>,
) -> Result<WaitEvent>
where
    J: Journal + 'static,
{
    let (event_tx, event_rx) = oneshot::channel();
    let stop = Arc::new(AtomicBool::new(false));

    let waiter_journal = Arc::clone(journal);
    let waiter_stop = Arc::clone(&stop);
    let _waiter = tokio::task::spawn_blocking(move || {
        if waiter_stop.load(Ordering::Acquire) {
            return;
        }
        let event = waiter_journal.lock().wait(poll_interval);
        let _ = event_tx.send(event);
    });

    tokio::select! {
        _ = shutdown.recv() => {
            stop.store(true, Ordering::Release);
            Err(Error::Cancelled)
        }
        event = event_rx => match event {
            Ok(event) => Ok(event?),
            // The waiter went away without reporting; treat it as an idle
            // poll and let the loop re-drain.
            Err(_) => Ok(WaitEvent::Nop),
        }
    }
}
