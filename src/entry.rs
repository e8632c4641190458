//! Journal entry representation and record decoding.

use crate::error::Result;
use crate::journal::Journal;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The primary human-readable field of a journal record.
pub(crate) const MESSAGE_FIELD: &str = "MESSAGE";

/// One fetched journal record: a mapping from field name to field value.
///
/// Entries are immutable once decoded and owned by the consumer after
/// emission. Serializes as a plain JSON object of its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JournalEntry {
    fields: BTreeMap<String, String>,
}

impl JournalEntry {
    /// Returns the value of a field, if present.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Returns the `MESSAGE` field, if present.
    pub fn message(&self) -> Option<&str> {
        self.get(MESSAGE_FIELD)
    }

    /// Iterates over all fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of fields in the entry.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Consumes the entry, returning the underlying field mapping.
    pub fn into_fields(self) -> BTreeMap<String, String> {
        self.fields
    }
}

impl From<BTreeMap<String, String>> for JournalEntry {
    fn from(fields: BTreeMap<String, String>) -> Self {
        JournalEntry { fields }
    }
}

/// Decode the full current record. The cursor must reference a valid record,
/// which holds after an advance that reported data.
pub(crate) fn read_entry<J: Journal>(journal: &mut J) -> Result<JournalEntry> {
    let fields = journal.get_all_data()?;
    Ok(JournalEntry { fields })
}

/// Decode the current record as a single rendered line of timestamp and
/// message. A record without a `MESSAGE` field is a storage error.
pub(crate) fn read_line<J: Journal>(journal: &mut J) -> Result<String> {
    let message = journal.get_data(MESSAGE_FIELD)?;
    let usec = journal.get_realtime_usec()?;
    Ok(format_line(usec, &message))
}

/// Render a `"<timestamp> <message>\n"` line.
pub(crate) fn format_line(usec: u64, message: &str) -> String {
    format!("{} {}\n", format_timestamp(usec), message)
}

/// Format a realtime timestamp (microseconds since the Unix epoch) as
/// RFC 3339 UTC with microsecond precision.
fn format_timestamp(usec: u64) -> String {
    let timestamp = i64::try_from(usec)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_micros)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}
