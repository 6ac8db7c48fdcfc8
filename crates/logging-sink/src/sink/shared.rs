use std::fmt;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use logging::{HeldLock, LogRecord, RecordSink};

use super::MessageSink;
use crate::line_mode::LineMode;

/// Thread-safe [`RecordSink`] around a [`MessageSink`].
///
/// Writes are serialized through a mutex, so records from one thread keep
/// their order and lines from different threads never interleave. Write and
/// flush errors are dropped.
pub struct SharedSink<W> {
    inner: Mutex<MessageSink<W>>,
}

impl<W> SharedSink<W> {
    /// Wraps `writer` in a newline-terminated sink.
    pub const fn new(writer: W) -> Self {
        Self::from_sink(MessageSink::new(writer))
    }

    /// Wraps an already configured sink.
    pub const fn from_sink(sink: MessageSink<W>) -> Self {
        Self {
            inner: Mutex::new(sink),
        }
    }

    /// Changes the line mode for later records.
    pub fn set_line_mode(&self, line_mode: LineMode) {
        self.lock().set_line_mode(line_mode);
    }

    /// Runs `f` with exclusive access to the wrapped writer.
    pub fn with_writer<R>(&self, f: impl FnOnce(&mut W) -> R) -> R {
        f(self.lock().writer_mut())
    }

    /// Consumes the shared sink and returns the inner sink.
    pub fn into_inner(self) -> MessageSink<W> {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MessageSink<W>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Default> SharedSink<W> {
    /// Takes everything written so far, leaving a fresh writer behind.
    pub fn take_writer(&self) -> W {
        self.lock().replace_writer(W::default())
    }
}

impl SharedSink<io::Stderr> {
    /// Console sink writing to standard error.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W> RecordSink for SharedSink<W>
where
    W: Write + Send,
{
    fn emit(&self, record: &LogRecord) {
        let mut sink = self.lock();
        if sink.write(record).is_ok() {
            let _ = sink.flush();
        }
    }

    fn hold(&self) -> Option<Box<dyn HeldLock + '_>> {
        Some(Box::new(self.lock()))
    }
}

impl<W: fmt::Debug> fmt::Debug for SharedSink<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSink")
            .field("inner", &self.inner)
            .finish()
    }
}
