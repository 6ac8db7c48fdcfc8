use super::MessageSink;
use crate::line_mode::LineMode;
use logging::{LogRecord, Severity};
use std::io::{self, Write};

impl<W> MessageSink<W>
where
    W: Write,
{
    fn render_record(&mut self, record: &LogRecord, append_newline: bool) -> io::Result<()> {
        self.scratch.clear();
        let label = record.severity.label();
        if !label.is_empty() {
            self.scratch.push_str(label);
            self.scratch.push_str(": ");
        }
        self.scratch.push_str(&record.message);
        if append_newline {
            self.scratch.push('\n');
        }
        self.writer.write_all(self.scratch.as_bytes())
    }

    /// Writes a single record using the sink's current [`LineMode`].
    pub fn write(&mut self, record: &LogRecord) -> io::Result<()> {
        self.render_record(record, self.line_mode.append_newline())
    }

    /// Writes `record` using an explicit [`LineMode`] without mutating the sink.
    pub fn write_with_mode(&mut self, record: &LogRecord, line_mode: LineMode) -> io::Result<()> {
        self.render_record(record, line_mode.append_newline())
    }

    /// Writes each record from the iterator to the underlying writer.
    pub fn write_all<'a, I>(&mut self, records: I) -> io::Result<()>
    where
        I: IntoIterator<Item = &'a LogRecord>,
    {
        let append_newline = self.line_mode.append_newline();
        for record in records {
            self.render_record(record, append_newline)?;
        }
        Ok(())
    }

    /// Writes a record assembled from a severity and message text.
    pub fn write_message(&mut self, severity: Severity, message: &str) -> io::Result<()> {
        self.write(&LogRecord {
            severity,
            logger: logging::LoggerName::default(),
            message: message.to_owned(),
            metadata: None,
        })
    }

    /// Flushes the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
