//! Append-only activity log shown to the user while a run progresses.

use serde::{Deserialize, Serialize};
use std::fmt;
use time::macros::format_description;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Info,
    Success,
    Error,
    Critical,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Info => "Info",
            LogLevel::Success => "Success",
            LogLevel::Error => "Error",
            LogLevel::Critical => "Critical",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Time of day, `HH:MM:SS`.
    pub time: String,
    /// Unix epoch milliseconds, used for ordering.
    pub at_ms: i64,
    pub level: LogLevel,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.time, self.level, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityLog {
    entries: Vec<LogEntry>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp with the current wall clock and push. Stamps never go backwards
    /// even if the system clock does.
    pub fn append(&mut self, level: LogLevel, message: impl Into<String>) -> &LogEntry {
        let now = now();
        let at_ms = (now.unix_timestamp_nanos() / 1_000_000) as i64;
        let (time, at_ms) = match self.entries.last() {
            Some(last) if at_ms < last.at_ms => (last.time.clone(), last.at_ms),
            _ => (now.format(format_description!("[hour]:[minute]:[second]")).unwrap_or_default(), at_ms),
        };
        self.entries.push(LogEntry { time, at_ms, level, message: message.into() });
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }
}

fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}
