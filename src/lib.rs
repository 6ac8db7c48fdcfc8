#![deny(unsafe_code)]
#![deny(missing_docs)]

//! # Overview
//!
//! `bbcore` bundles the messaging and process plumbing of the build
//! orchestrator: the severity model and [`Messenger`] facade from `logging`,
//! the console sinks from `logging-sink`, and the fork-context factory from
//! `platform`.
//!
//! The crate adds the glue that needs all three: [`spawn_worker`] forks a
//! worker whose messaging context switches to the worker role before the job
//! runs, and [`run`] turns the outcome of an entry point into a process exit
//! code while honouring the handled-failure marker.
//!
//! # Examples
//!
//! ```
//! use std::process::ExitCode;
//! use bbcore::{console_messenger, run, MessagingConfig};
//!
//! let messenger = console_messenger(MessagingConfig::default());
//! let code = run(&messenger, || {
//!     messenger.note(["nothing to do"]);
//!     Ok(())
//! });
//! assert_eq!(code, ExitCode::SUCCESS);
//! ```

mod worker;

use std::sync::Arc;

pub use logging::{
    CollectingSink, DebugLevel, Deprecation, Failure, FailureContext, IntoFailure, LogRecord,
    LoggerName, Messenger, MessagingConfig, MessagingContext, Metadata, OnceFamily, ProcessRole,
    RecordSink, Severity, bbdebug, bberror, bbfatal, bbnote, bbplain, bbwarn,
};
pub use logging_sink::{LineMode, MessageSink, SharedSink};
pub use platform::{
    ContextError, ForkContext, Primitive, ProviderKind, StartMethod, WorkerExit, WorkerHandle,
    multiprocessing,
};
pub use worker::{WORKER_FAILURE_CODE, exit_status, run, spawn_worker};

/// Creates a main-logger messenger that prints to standard error.
#[must_use]
pub fn console_messenger(config: MessagingConfig) -> Messenger {
    Messenger::new(
        Arc::new(MessagingContext::new(config)),
        Arc::new(SharedSink::stderr()),
    )
}
