#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! crates/logging/src/lib.rs
//!
//! # Overview
//!
//! `logging` is the messaging layer of the build orchestrator. It owns the
//! severity scale, the per-domain debug caps, "once" deduplication, the
//! handled-failure marker and the [`Messenger`] facade every other
//! subsystem calls to emit diagnostics.
//!
//! # Design
//!
//! - [`Severity`] places every message on one numeric scale. The debug family
//!   counts down from `DEBUG` (`debug1 = 10`, `debug2 = 9`, ...), so a higher
//!   debug level is numerically lower and more verbose.
//! - [`MessagingConfig`] holds the global floor and the table of domain caps.
//!   It lives inside a [`MessagingContext`], together with the process-local
//!   [`OnceCache`] and the [`ProcessRole`].
//! - [`Messenger`] binds a logger name to a context and a [`RecordSink`].
//!   Records that pass every filter are handed to the sink synchronously.
//! - [`Failure`] carries a `reported` marker so a diagnostic is printed
//!   exactly once no matter how many layers the failure passes through.
//!
//! # Invariants
//!
//! - Records from one thread reach the sink in call order.
//! - A "once" body is emitted at most once per family and process, including
//!   under concurrent callers.
//! - Workers skip domain filtering entirely; the controller filters what it
//!   receives from them.
//! - Messaging calls never panic and never fail because of the sink.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use logging::{CollectingSink, Messenger, MessagingConfig, MessagingContext};
//!
//! let config = MessagingConfig::from_options(false, 2, &["Fetcher"]);
//! let sink = Arc::new(CollectingSink::new());
//! let messenger = Messenger::new(Arc::new(MessagingContext::new(config)), sink.clone());
//!
//! let fetcher = messenger.for_logger("BitBake.Fetcher");
//! fetcher.debug(1, ["checking mirrors"]);
//! fetcher.debug(2, ["suppressed by the Fetcher cap"]);
//! messenger.debug(2, ["the main logger has no cap"]);
//!
//! let messages: Vec<_> = sink.drain().into_iter().map(|r| r.message).collect();
//! assert_eq!(messages, ["checking mirrors", "the main logger has no cap"]);
//! ```
//!
//! # See also
//!
//! - `logging-sink` for writer-backed sinks that render `LABEL: message` lines.
//! - `platform` for the process factory used to create workers.

mod config;
mod context;
mod dedup;
mod deprecation;
mod failure;
mod fork;
mod levels;
mod macros;
mod messenger;
mod record;
#[cfg(feature = "tracing")]
mod tracing_bridge;

pub use config::{MessagingConfig, ParseDomainError, ROOT_DOMAIN};
pub use context::{MessagingContext, ProcessRole, RoleError};
pub use dedup::{OnceCache, OnceFamily};
pub use deprecation::Deprecation;
pub use failure::{Failure, FailureContext, IntoFailure};
pub use fork::{ForkGuard, HeldLock};
pub use levels::{
    CRITICAL, DEBUG, DebugLevel, ERROR, ERRORONCE, InvalidDebugLevel, NOTE, PLAIN,
    ParseSeverityError, Severity, VERBNOTE, VERBOSE, WARNING, WARNONCE,
};
pub use messenger::Messenger;
pub use record::{CollectingSink, LogRecord, LoggerName, Metadata, NullSink, RecordSink};
#[cfg(feature = "tracing")]
pub use tracing_bridge::{
    MessengerLayer, RECORD_TARGET, TracingSink, init_tracing, init_tracing_with_filter,
};
