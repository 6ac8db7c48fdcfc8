use super::MessageSink;
use crate::line_mode::LineMode;

impl<W> MessageSink<W> {
    /// Creates a sink that appends a newline after each record.
    pub const fn new(writer: W) -> Self {
        Self::with_line_mode(writer, LineMode::WithNewline)
    }

    /// Creates a sink with an explicit [`LineMode`].
    pub const fn with_line_mode(writer: W, line_mode: LineMode) -> Self {
        Self {
            writer,
            scratch: String::new(),
            line_mode,
        }
    }

    /// Consumes the sink and returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Borrows the wrapped writer.
    pub const fn writer(&self) -> &W {
        &self.writer
    }

    /// Mutably borrows the wrapped writer.
    pub const fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Replaces the wrapped writer, returning the previous one.
    pub fn replace_writer(&mut self, writer: W) -> W {
        std::mem::replace(&mut self.writer, writer)
    }

    /// Returns the current [`LineMode`].
    pub const fn line_mode(&self) -> LineMode {
        self.line_mode
    }

    /// Sets the [`LineMode`] used by subsequent writes.
    pub const fn set_line_mode(&mut self, line_mode: LineMode) {
        self.line_mode = line_mode;
    }
}

impl<W: Default> Default for MessageSink<W> {
    fn default() -> Self {
        Self::new(W::default())
    }
}
