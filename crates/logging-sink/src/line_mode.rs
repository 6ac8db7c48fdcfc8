//! crates/logging-sink/src/line_mode.rs

/// Controls whether a [`MessageSink`](crate::MessageSink) appends a trailing
/// newline when writing records.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LineMode {
    /// Append a newline terminator after each rendered record.
    #[default]
    WithNewline,
    /// Emit the rendered record without a trailing newline.
    WithoutNewline,
}

impl LineMode {
    pub(crate) const fn append_newline(self) -> bool {
        matches!(self, Self::WithNewline)
    }
}
