#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! crates/logging-sink/src/lib.rs
//!
//! # Overview
//!
//! `logging-sink` renders [`logging::LogRecord`] values into arbitrary
//! writers using the console format of the orchestrator: the severity label,
//! a colon, and the message (`WARNING: disk nearly full`). Plain records are
//! written without a label.
//!
//! # Design
//!
//! [`MessageSink`] wraps an [`std::io::Write`] implementor and reuses one
//! scratch buffer for every rendered line. [`SharedSink`] puts a
//! `MessageSink` behind a mutex so it can serve as the
//! [`logging::RecordSink`] of a [`logging::Messenger`]. Callers choose
//! whether lines end with a newline by selecting a [`LineMode`], either for
//! the whole sink or for a single record with
//! [`MessageSink::write_with_mode`].
//!
//! # Errors
//!
//! `MessageSink` surfaces [`std::io::Error`] values from the underlying
//! writer. `SharedSink` swallows them: messaging never fails because of its
//! transport.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use logging::{Messenger, MessagingContext};
//! use logging_sink::SharedSink;
//!
//! let sink = Arc::new(SharedSink::new(Vec::new()));
//! let messenger = Messenger::new(Arc::new(MessagingContext::default()), sink.clone());
//!
//! messenger.note(["Executing tasks"]);
//! messenger.plain(["Summary: all tasks succeeded"]);
//!
//! let output = String::from_utf8(sink.take_writer()).unwrap();
//! assert_eq!(output, "NOTE: Executing tasks\nSummary: all tasks succeeded\n");
//! ```

mod line_mode;
mod sink;

pub use line_mode::LineMode;
pub use sink::{MessageSink, SharedSink};
