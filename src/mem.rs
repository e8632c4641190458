//! An in-memory journal store.
//!
//! `MemoryJournal` implements the [`Journal`] trait over an append-only
//! vector of records, giving the reader a concrete store for tests, demos
//! and embedding scenarios where no external journal daemon exists. Records
//! are appended through a cloneable [`MemoryJournalWriter`] handle while the
//! journal side owns the read cursor.

use crate::journal::{Journal, WaitEvent};
use parking_lot::{Condvar, Mutex};
use std::collections::BTreeMap;
use std::io;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

struct Record {
    usec: u64,
    fields: BTreeMap<String, String>,
}

#[derive(Default)]
struct Shared {
    records: Mutex<Vec<Record>>,
    appended: Condvar,
}

/// An in-memory, append-only, timestamp-ordered record store.
///
/// Match filters follow `sd_journal_add_match` composition: values for the
/// same field OR together, filters on distinct fields AND together.
pub struct MemoryJournal {
    shared: Arc<Shared>,
    matches: Vec<(String, String)>,
    /// Index of the next record candidate; the cursor sits just before it.
    head: usize,
    /// Record addressed by the data accessors, set by a successful advance.
    current: Option<usize>,
    /// Store length last observed, so `wait` can detect appends.
    seen: usize,
}

impl MemoryJournal {
    pub fn new() -> Self {
        MemoryJournal {
            shared: Arc::new(Shared::default()),
            matches: Vec::new(),
            head: 0,
            current: None,
            seen: 0,
        }
    }

    /// Returns a writer handle appending to this journal's store.
    pub fn writer(&self) -> MemoryJournalWriter {
        MemoryJournalWriter {
            shared: Arc::clone(&self.shared),
        }
    }

    fn exposed(&self, record: &Record) -> bool {
        record_matches(&self.matches, record)
    }
}

impl Default for MemoryJournal {
    fn default() -> Self {
        Self::new()
    }
}

fn record_matches(matches: &[(String, String)], record: &Record) -> bool {
    let mut checked: Vec<&str> = Vec::new();
    for (field, _) in matches {
        if checked.contains(&field.as_str()) {
            continue;
        }
        checked.push(field.as_str());
        let value = record.fields.get(field);
        let any_value_matches = matches
            .iter()
            .any(|(f, v)| f == field && value == Some(v));
        if !any_value_matches {
            return false;
        }
    }
    true
}

fn bad_cursor() -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        "cursor does not reference a record",
    )
}

impl Journal for MemoryJournal {
    fn add_match(&mut self, expr: &str) -> io::Result<()> {
        match expr.split_once('=') {
            Some((field, value)) if !field.is_empty() => {
                self.matches.push((field.to_string(), value.to_string()));
                Ok(())
            }
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("match expression must be FIELD=value, got {expr:?}"),
            )),
        }
    }

    fn seek_realtime_usec(&mut self, usec: u64) -> io::Result<()> {
        let records = self.shared.records.lock();
        self.head = records.partition_point(|r| r.usec < usec);
        self.current = None;
        Ok(())
    }

    fn seek_tail(&mut self) -> io::Result<()> {
        let records = self.shared.records.lock();
        self.head = records.len();
        self.current = None;
        Ok(())
    }

    fn previous_skip(&mut self, count: u64) -> io::Result<u64> {
        let records = self.shared.records.lock();
        let mut stepped = 0u64;
        let mut pos = self.head;
        while stepped < count {
            match records[..pos].iter().rposition(|r| self.exposed(r)) {
                Some(i) => {
                    pos = i;
                    stepped += 1;
                }
                None => {
                    // Stepped past the oldest exposed record: park the
                    // cursor before it so the next advance yields it.
                    self.head = 0;
                    self.current = None;
                    return Ok(stepped);
                }
            }
        }
        if stepped > 0 {
            self.current = Some(pos);
            self.head = pos + 1;
        }
        Ok(stepped)
    }

    fn next(&mut self) -> io::Result<bool> {
        let records = self.shared.records.lock();
        self.seen = records.len();
        for i in self.head..records.len() {
            if self.exposed(&records[i]) {
                self.head = i + 1;
                self.current = Some(i);
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn get_data(&mut self, field: &str) -> io::Result<String> {
        let records = self.shared.records.lock();
        let record = self
            .current
            .and_then(|i| records.get(i))
            .ok_or_else(bad_cursor)?;
        record.fields.get(field).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("field {field} not present in record"),
            )
        })
    }

    fn get_all_data(&mut self) -> io::Result<BTreeMap<String, String>> {
        let records = self.shared.records.lock();
        let record = self
            .current
            .and_then(|i| records.get(i))
            .ok_or_else(bad_cursor)?;
        Ok(record.fields.clone())
    }

    fn get_realtime_usec(&mut self) -> io::Result<u64> {
        let records = self.shared.records.lock();
        let record = self
            .current
            .and_then(|i| records.get(i))
            .ok_or_else(bad_cursor)?;
        Ok(record.usec)
    }

    fn wait(&mut self, timeout: Duration) -> io::Result<WaitEvent> {
        let mut records = self.shared.records.lock();
        if records.len() == self.seen {
            let _ = self.shared.appended.wait_for(&mut records, timeout);
        }
        if records.len() > self.seen {
            self.seen = records.len();
            Ok(WaitEvent::Append)
        } else {
            Ok(WaitEvent::Nop)
        }
    }
}

/// Appends records to a [`MemoryJournal`]'s store and wakes blocked waiters.
#[derive(Clone)]
pub struct MemoryJournalWriter {
    shared: Arc<Shared>,
}

impl MemoryJournalWriter {
    /// Appends a record stamped with the current wall-clock time. Returns
    /// the timestamp actually recorded.
    pub fn append(&self, fields: &[(&str, &str)]) -> u64 {
        let usec = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or(0);
        self.append_at(usec, fields)
    }

    /// Appends a record with an explicit realtime timestamp. Timestamps are
    /// clamped to keep the store ordered. Returns the timestamp recorded.
    pub fn append_at(&self, usec: u64, fields: &[(&str, &str)]) -> u64 {
        let fields: BTreeMap<String, String> = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut records = self.shared.records.lock();
        let usec = records.last().map_or(usec, |last| usec.max(last.usec));
        records.push(Record { usec, fields });
        self.shared.appended.notify_all();
        usec
    }
}
