//! Test utilities: a journal wrapper with injectable storage failures.

#[cfg(test)]
use crate::journal::{Journal, WaitEvent};
#[cfg(test)]
use crate::mem::{MemoryJournal, MemoryJournalWriter};
#[cfg(test)]
use std::collections::BTreeMap;
#[cfg(test)]
use std::io;
#[cfg(test)]
use std::time::Duration;

/// An in-memory journal that can be told to fail at chosen operations,
/// for exercising the error paths of construction and following.
#[cfg(test)]
pub struct FlakyJournal {
    inner: MemoryJournal,
    fail_next: bool,
    fail_seek_tail: bool,
    fail_get_all: bool,
    fail_wait: bool,
    wait_event_override: Option<i32>,
}

#[cfg(test)]
impl FlakyJournal {
    fn healthy() -> Self {
        FlakyJournal {
            inner: MemoryJournal::new(),
            fail_next: false,
            fail_seek_tail: false,
            fail_get_all: false,
            fail_wait: false,
            wait_event_override: None,
        }
    }

    /// Every cursor advance fails.
    pub fn failing_next() -> Self {
        FlakyJournal {
            fail_next: true,
            ..Self::healthy()
        }
    }

    /// Seeking to the tail fails.
    pub fn failing_seek_tail() -> Self {
        FlakyJournal {
            fail_seek_tail: true,
            ..Self::healthy()
        }
    }

    /// Field enumeration fails, so decoding a record fails.
    pub fn failing_fields() -> Self {
        FlakyJournal {
            fail_get_all: true,
            ..Self::healthy()
        }
    }

    /// Waiting for changes fails.
    pub fn failing_wait() -> Self {
        FlakyJournal {
            fail_wait: true,
            ..Self::healthy()
        }
    }

    /// Waits succeed but always report the given unrecognized change code.
    pub fn odd_wait_event(code: i32) -> Self {
        FlakyJournal {
            wait_event_override: Some(code),
            ..Self::healthy()
        }
    }

    pub fn writer(&self) -> MemoryJournalWriter {
        self.inner.writer()
    }
}

#[cfg(test)]
fn injected() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "injected storage failure")
}

#[cfg(test)]
impl Journal for FlakyJournal {
    fn add_match(&mut self, expr: &str) -> io::Result<()> {
        self.inner.add_match(expr)
    }

    fn seek_realtime_usec(&mut self, usec: u64) -> io::Result<()> {
        self.inner.seek_realtime_usec(usec)
    }

    fn seek_tail(&mut self) -> io::Result<()> {
        if self.fail_seek_tail {
            return Err(injected());
        }
        self.inner.seek_tail()
    }

    fn previous_skip(&mut self, count: u64) -> io::Result<u64> {
        self.inner.previous_skip(count)
    }

    fn next(&mut self) -> io::Result<bool> {
        if self.fail_next {
            return Err(injected());
        }
        self.inner.next()
    }

    fn get_data(&mut self, field: &str) -> io::Result<String> {
        self.inner.get_data(field)
    }

    fn get_all_data(&mut self) -> io::Result<BTreeMap<String, String>> {
        if self.fail_get_all {
            return Err(injected());
        }
        self.inner.get_all_data()
    }

    fn get_realtime_usec(&mut self) -> io::Result<u64> {
        self.inner.get_realtime_usec()
    }

    fn wait(&mut self, timeout: Duration) -> io::Result<WaitEvent> {
        if self.fail_wait {
            return Err(injected());
        }
        let event = self.inner.wait(timeout)?;
        match self.wait_event_override {
            Some(code) => Ok(WaitEvent::Other(code)),
            None => Ok(event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flaky_journal_delegates_when_healthy() {
        let mut journal = FlakyJournal::odd_wait_event(7);
        journal.writer().append_at(10, &[("MESSAGE", "a")]);

        assert!(journal.next().unwrap());
        assert_eq!(journal.get_data("MESSAGE").unwrap(), "a");
        assert_eq!(journal.get_realtime_usec().unwrap(), 10);
    }

    #[test]
    fn test_flaky_journal_injects_next_failure() {
        let mut journal = FlakyJournal::failing_next();
        journal.writer().append_at(10, &[("MESSAGE", "a")]);
        assert!(journal.next().is_err());
    }

    #[test]
    fn test_flaky_journal_overrides_wait_event() {
        let mut journal = FlakyJournal::odd_wait_event(7);
        let event = journal.wait(Duration::from_millis(1)).unwrap();
        assert_eq!(event, WaitEvent::Other(7));
    }
}
