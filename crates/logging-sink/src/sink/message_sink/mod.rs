use std::fmt;

use crate::line_mode::LineMode;

/// Streaming sink that renders [`logging::LogRecord`] values into an
/// [`std::io::Write`] target.
///
/// The sink owns the underlying writer together with a reusable scratch
/// buffer. Each call to [`write`](Self::write) renders the record as
/// `LABEL: message` using the configured [`LineMode`].
///
/// # Examples
///
/// ```
/// use logging::{LogRecord, LoggerName, Severity};
/// use logging_sink::{LineMode, MessageSink};
///
/// let record = LogRecord {
///     severity: Severity::ErrorOnce,
///     logger: LoggerName::default(),
///     message: "Task failed".to_owned(),
///     metadata: None,
/// };
///
/// let mut sink = MessageSink::with_line_mode(Vec::new(), LineMode::WithoutNewline);
/// sink.write(&record)?;
/// assert_eq!(sink.into_inner(), b"ERROR: Task failed".to_vec());
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Clone)]
pub struct MessageSink<W> {
    writer: W,
    scratch: String,
    line_mode: LineMode,
}

mod constructors;
mod writing;

impl<W> fmt::Debug for MessageSink<W>
where
    W: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageSink")
            .field("writer", &self.writer)
            .field("line_mode", &self.line_mode)
            .finish()
    }
}
