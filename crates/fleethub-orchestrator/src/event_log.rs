use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::{info, warn};

/// Number of events kept for reads.
pub const DEFAULT_EVENT_CAPACITY: usize = 200;

/// One line of hub activity.
#[derive(Debug, Clone, Serialize)]
pub struct EventLogEntry {
    pub timestamp: DateTime<Utc>,
    pub text: String,
}

impl std::fmt::Display for EventLogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.text
        )
    }
}

/// Bounded, append-only log of hub activity.
///
/// Only the newest `capacity` events survive; older ones are dropped on
/// append. Every event is mirrored to `tracing`.
pub struct EventLog {
    entries: Mutex<VecDeque<EventLogEntry>>,
    capacity: usize,
}

impl EventLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Append an informational event.
    pub fn record(&self, text: impl Into<String>) {
        let text = text.into();
        info!(event = %text, "hub event");
        self.push(text);
    }

    /// Append an event that signals trouble in the fleet.
    pub fn record_warning(&self, text: impl Into<String>) {
        let text = text.into();
        warn!(event = %text, "hub event");
        self.push(text);
    }

    fn push(&self, text: String) {
        let mut entries = self.entries.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(EventLogEntry {
            timestamp: Utc::now(),
            text,
        });
    }

    /// All retained events, oldest first.
    pub fn all(&self) -> Vec<EventLogEntry> {
        self.entries.lock().iter().cloned().collect()
    }

    /// Retained events as newline-separated text.
    pub fn render(&self) -> String {
        self.entries
            .lock()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_record_in_arrival_order() {
        let log = EventLog::new();
        log.record("first");
        log.record_warning("second");
        let texts: Vec<String> = log.all().into_iter().map(|e| e.text).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let log = EventLog::new();
        for i in 0..250 {
            log.record(format!("event {i}"));
        }
        assert_eq!(log.len(), DEFAULT_EVENT_CAPACITY);
        let all = log.all();
        assert_eq!(all.first().unwrap().text, "event 50");
        assert_eq!(all.last().unwrap().text, "event 249");
    }

    #[test]
    fn test_render_lines() {
        let log = EventLog::new();
        assert_eq!(log.render(), "");
        log.record("data-agent marked unhealthy");
        log.record("repair attempted for data-agent");
        let text = log.render();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("data-agent marked unhealthy"));
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let log = EventLog::with_capacity(0);
        log.record("a");
        log.record("b");
        assert_eq!(log.len(), 1);
        assert_eq!(log.all()[0].text, "b");
    }
}
