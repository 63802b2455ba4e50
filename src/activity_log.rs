use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;

use crate::constants::ACTIVITY_LOG_CAPACITY;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityEntry {
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Bounded, newest-first log of human-readable activity.
///
/// Appending beyond the capacity discards the oldest entries. The log never
/// looks at message content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
    #[serde(skip)]
    capacity: usize,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::with_capacity(ACTIVITY_LOG_CAPACITY)
    }

    fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Return the log with `message` prepended and truncated to capacity.
    pub fn append(mut self, message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        self.push(message, timestamp);
        self
    }

    pub(crate) fn push(&mut self, message: impl Into<String>, timestamp: DateTime<Utc>) {
        self.entries.push_front(ActivityEntry {
            message: message.into(),
            timestamp,
        });
        self.entries.truncate(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries, newest first
    pub fn entries(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&ActivityEntry> {
        self.entries.front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 10, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_append_prepends() {
        let log = ActivityLog::new()
            .append("first", t0())
            .append("second", t0() + Duration::minutes(1));

        let messages: Vec<&str> = log.entries().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["second", "first"]);
        assert_eq!(log.latest().map(|e| e.timestamp), Some(t0() + Duration::minutes(1)));
    }

    #[test]
    fn test_bounded_to_fifty_entries() {
        let mut log = ActivityLog::new();
        for i in 0..60 {
            log = log.append(format!("entry {}", i), t0() + Duration::seconds(i));
        }

        assert_eq!(log.capacity(), 50);
        assert_eq!(log.len(), 50);
        assert_eq!(log.latest().map(|e| e.message.as_str()), Some("entry 59"));
        assert_eq!(log.entries().last().map(|e| e.message.as_str()), Some("entry 10"));
    }

    #[test]
    fn test_message_is_opaque() {
        let log = ActivityLog::new().append("", t0());
        assert_eq!(log.len(), 1);
        assert_eq!(log.latest().map(|e| e.message.as_str()), Some(""));
    }
}
