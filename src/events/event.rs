//! # Events carried by the bus.
//!
//! [`GenericEvent`] is the payload every listener receives: an optional
//! `subject` used for exact-match filtering and an `arguments` mapping that
//! conditions are evaluated against.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use hookbind::GenericEvent;
//!
//! let ev = GenericEvent::new()
//!     .with_subject("article")
//!     .with_argument("id", 42)
//!     .with_argument("status", "published");
//!
//! assert_eq!(ev.subject(), Some("article"));
//! assert_eq!(ev.argument("id"), Some(&serde_json::json!(42)));
//! ```

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use serde_json::Value;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Named event arguments.
pub type Arguments = BTreeMap<String, Value>;

/// Event published on a bus channel.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
#[derive(Clone, Debug)]
pub struct GenericEvent {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// What the event is about (e.g. an object key).
    pub subject: Option<String>,
    /// Named arguments; conditions are evaluated against these.
    pub arguments: Arguments,
}

impl GenericEvent {
    /// Creates an event without subject and with no arguments.
    pub fn new() -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            subject: None,
            arguments: Arguments::new(),
        }
    }

    /// Sets the subject.
    #[inline]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Adds (or replaces) one argument.
    #[inline]
    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    /// Replaces all arguments.
    #[inline]
    pub fn with_arguments(mut self, arguments: Arguments) -> Self {
        self.arguments = arguments;
        self
    }

    /// Returns the subject, if any.
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Returns one argument by name.
    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name)
    }
}

impl Default for GenericEvent {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_increases() {
        let a = GenericEvent::new();
        let b = GenericEvent::new();
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_with_arguments_replaces() {
        let mut args = Arguments::new();
        args.insert("x".into(), Value::from(1));
        let ev = GenericEvent::new()
            .with_argument("y", 2)
            .with_arguments(args);
        assert!(ev.argument("y").is_none());
        assert_eq!(ev.argument("x"), Some(&Value::from(1)));
        assert_eq!(ev.subject(), None);
    }
}
