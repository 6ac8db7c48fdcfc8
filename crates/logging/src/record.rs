//! crates/logging/src/record.rs
//! Log records and the sink capability the messenger writes through.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use super::config::ROOT_DOMAIN;
use super::fork::HeldLock;
use super::levels::Severity;

/// Opaque key/value side-channel data forwarded with a record.
pub type Metadata = BTreeMap<String, String>;

/// Dotted hierarchical logger name such as `BitBake.Fetcher`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoggerName(Arc<str>);

impl LoggerName {
    /// Logger used by the module-level messaging calls.
    pub const MAIN: &'static str = "BitBake.Main";

    /// Wraps a logger name.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The full dotted name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reports whether the first path segment is the controlled subsystem.
    ///
    /// # Examples
    ///
    /// ```
    /// use logging::LoggerName;
    ///
    /// assert!(LoggerName::new("BitBake.Fetcher").is_controlled());
    /// assert!(LoggerName::new("BitBake").is_controlled());
    /// assert!(!LoggerName::new("BitBakeHash.Client").is_controlled());
    /// ```
    #[must_use]
    pub fn is_controlled(&self) -> bool {
        self.0.split('.').next() == Some(ROOT_DOMAIN)
    }
}

impl Default for LoggerName {
    fn default() -> Self {
        Self::new(Self::MAIN)
    }
}

impl fmt::Display for LoggerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One emitted diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogRecord {
    /// Severity the record was emitted at.
    pub severity: Severity,
    /// Logger that emitted it.
    pub logger: LoggerName,
    /// Concatenated message text.
    pub message: String,
    /// Side-channel data supplied by `error`/`fatal` callers.
    pub metadata: Option<Metadata>,
}

/// Write-only destination for emitted records.
///
/// Implementations must tolerate concurrent callers and must not fail the
/// caller; transport errors stay inside the sink.
pub trait RecordSink: Send + Sync {
    /// Accepts a record that already passed every filter.
    fn emit(&self, record: &LogRecord);

    /// Holds the sink's internal lock until the returned value is dropped.
    ///
    /// Used by [`Messenger::fork_guard`](crate::Messenger::fork_guard). Sinks
    /// without a lock keep the default.
    fn hold(&self) -> Option<Box<dyn HeldLock + '_>> {
        None
    }
}

impl<S: RecordSink + ?Sized> RecordSink for Arc<S> {
    fn emit(&self, record: &LogRecord) {
        (**self).emit(record);
    }

    fn hold(&self) -> Option<Box<dyn HeldLock + '_>> {
        (**self).hold()
    }
}

/// Sink that drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl RecordSink for NullSink {
    fn emit(&self, _record: &LogRecord) {}
}

/// Sink that keeps records in memory in emission order.
#[derive(Debug, Default)]
pub struct CollectingSink {
    records: Mutex<Vec<LogRecord>>,
}

impl CollectingSink {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain all collected records, clearing the internal buffer.
    pub fn drain(&self) -> Vec<LogRecord> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        records.drain(..).collect()
    }

    /// Copies the collected records without clearing them.
    #[must_use]
    pub fn snapshot(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of records collected so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Reports whether no record was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordSink for CollectingSink {
    fn emit(&self, record: &LogRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
    }

    fn hold(&self) -> Option<Box<dyn HeldLock + '_>> {
        Some(Box::new(
            self.records.lock().unwrap_or_else(PoisonError::into_inner),
        ))
    }
}
