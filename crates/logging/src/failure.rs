//! crates/logging/src/failure.rs
//! Failures that remember whether the user has already been told.
//!
//! Generic code has a dilemma when an operation fails deep in a call stack:
//! print something, or let an outer layer do it. [`Failure`] settles it with a
//! `reported` flag. The first layer that emits a diagnostic flips the flag;
//! every layer above only forwards. A terminal handler then stays silent for
//! reported failures and prints full detail for the rest.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error as StdError;
use std::fmt::Write as _;
use std::sync::Arc;

use thiserror::Error;

use super::messenger::Messenger;

type BoxedSource = Box<dyn StdError + Send + Sync + 'static>;

/// An operation failure carrying the handled-failure marker.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct Failure {
    message: String,
    reported: bool,
    context: Vec<String>,
    #[source]
    source: Option<BoxedSource>,
    // Set when `message` is the source's own text.
    message_from_source: bool,
    backtrace: Arc<Backtrace>,
}

impl Failure {
    /// Creates an unreported failure.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            reported: false,
            context: Vec::new(),
            source: None,
            message_from_source: false,
            backtrace: Arc::new(Backtrace::capture()),
        }
    }

    /// Creates a failure whose diagnostic was already shown to the user.
    pub fn handled(message: impl Into<String>) -> Self {
        Self::new(message).mark_reported()
    }

    /// Wraps an arbitrary error as an unreported failure.
    pub fn from_error<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: error.to_string(),
            reported: false,
            context: Vec::new(),
            source: Some(Box::new(error)),
            message_from_source: true,
            backtrace: Arc::new(Backtrace::capture()),
        }
    }

    /// Whether a diagnostic has already been surfaced for this failure.
    #[must_use]
    pub const fn is_reported(&self) -> bool {
        self.reported
    }

    /// Sets the marker without emitting anything.
    ///
    /// For callers that surfaced the problem through another channel.
    #[must_use]
    pub fn mark_reported(mut self) -> Self {
        self.reported = true;
        self
    }

    /// Emits the failure as an error through `messenger` unless it was
    /// already reported, then marks it.
    #[must_use]
    pub fn report(self, messenger: &Messenger) -> Self {
        if self.reported {
            return self;
        }
        messenger.error([self.message.as_str()]);
        self.mark_reported()
    }

    /// Adds a description of the layer the failure is passing through.
    /// The marker is preserved.
    #[must_use]
    pub fn context(mut self, layer: impl Into<String>) -> Self {
        self.context.push(layer.into());
        self
    }

    /// The original failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Layers added by [`context`](Self::context), innermost first.
    #[must_use]
    pub fn context_chain(&self) -> &[String] {
        &self.context
    }

    /// Captured call stack; empty unless `RUST_BACKTRACE` enables capture.
    #[must_use]
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    /// Full diagnostic text: message, context layers, source chain and the
    /// captured backtrace when there is one.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        let mut text = self.message.clone();
        for layer in self.context.iter().rev() {
            let _ = write!(text, "\n  while {layer}");
        }

        let mut source = self
            .source
            .as_deref()
            .map(|s| s as &(dyn StdError + 'static));
        if self.message_from_source {
            source = source.and_then(StdError::source);
        }
        while let Some(cause) = source {
            let _ = write!(text, "\n  caused by: {cause}");
            source = cause.source();
        }

        if self.backtrace.status() == BacktraceStatus::Captured {
            let _ = write!(text, "\nbacktrace:\n{}", self.backtrace);
        }
        text
    }
}

/// Failure-aware combinators for `Result<T, Failure>`.
pub trait FailureContext<T> {
    /// Adds a context layer to the error, keeping its marker.
    fn context(self, layer: impl Into<String>) -> Result<T, Failure>;

    /// Reports the error through `messenger` if nobody has yet.
    fn reported_by(self, messenger: &Messenger) -> Result<T, Failure>;
}

impl<T> FailureContext<T> for Result<T, Failure> {
    fn context(self, layer: impl Into<String>) -> Self {
        self.map_err(|failure| failure.context(layer))
    }

    fn reported_by(self, messenger: &Messenger) -> Self {
        self.map_err(|failure| failure.report(messenger))
    }
}

/// Converts results with foreign errors into unreported failures.
pub trait IntoFailure<T> {
    /// Wraps the error with [`Failure::from_error`].
    fn into_failure(self) -> Result<T, Failure>;
}

impl<T, E> IntoFailure<T> for Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn into_failure(self) -> Result<T, Failure> {
        self.map_err(Failure::from_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CollectingSink, MessagingContext, Severity};
    use std::io;
    use std::sync::Arc;

    fn messenger() -> (Messenger, Arc<CollectingSink>) {
        let sink = Arc::new(CollectingSink::new());
        let messenger = Messenger::new(Arc::new(MessagingContext::default()), sink.clone());
        (messenger, sink)
    }

    #[test]
    fn new_failures_are_unreported() {
        let failure = Failure::new("cannot parse");
        assert!(!failure.is_reported());
        assert_eq!(failure.to_string(), "cannot parse");
    }

    #[test]
    fn handled_failures_are_reported() {
        assert!(Failure::handled("already said").is_reported());
    }

    #[test]
    fn marker_survives_rewrapping() {
        let failure = Failure::handled("inner")
            .context("parsing recipe")
            .context("building target");
        assert!(failure.is_reported());
        assert_eq!(
            failure.context_chain(),
            ["parsing recipe", "building target"]
        );
        assert_eq!(failure.message(), "inner");
    }

    #[test]
    fn report_emits_once() {
        let (messenger, sink) = messenger();
        let failure = Failure::new("fetch failed").report(&messenger);
        assert!(failure.is_reported());

        let failure = failure.context("outer").report(&messenger);
        assert!(failure.is_reported());

        let records = sink.drain();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity, Severity::Error);
        assert_eq!(records[0].message, "fetch failed");
    }

    #[test]
    fn diagnostic_lists_context_and_sources() {
        let err = io::Error::new(io::ErrorKind::NotFound, "no such recipe");
        let failure = Failure::from_error(err)
            .context("loading layer")
            .context("starting build");
        let text = failure.diagnostic();

        assert!(text.starts_with("no such recipe"));
        let start = text.find("while starting build").unwrap();
        let load = text.find("while loading layer").unwrap();
        assert!(start < load);
        assert!(!text.contains("caused by"));
    }

    #[derive(Debug, Error)]
    #[error("recipe parse failed")]
    struct ParseError {
        #[source]
        cause: io::Error,
    }

    #[test]
    fn diagnostic_starts_the_chain_below_the_wrapped_error() {
        let failure = Failure::from_error(ParseError {
            cause: io::Error::other("unexpected token"),
        });
        let text = failure.diagnostic();

        assert_eq!(text.matches("recipe parse failed").count(), 1);
        assert!(text.contains("\n  caused by: unexpected token"));
    }

    #[test]
    fn failure_is_a_standard_error() {
        fn assert_error<E: StdError + Send + Sync + 'static>(_: &E) {}
        let failure = Failure::new("x");
        assert_error(&failure);
        let boxed: Box<dyn StdError + Send + Sync> = Box::new(failure);
        assert_eq!(boxed.to_string(), "x");
    }

    #[test]
    fn result_combinators_keep_marker() {
        let (messenger, sink) = messenger();
        let result: Result<(), Failure> = Err(Failure::new("broken"));
        let result = result.reported_by(&messenger).context("outer layer");
        let failure = result.unwrap_err();
        assert!(failure.is_reported());
        assert_eq!(failure.context_chain(), ["outer layer"]);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn into_failure_wraps_foreign_errors() {
        let result: Result<(), io::Error> = Err(io::Error::other("pipe closed"));
        let failure = result.into_failure().unwrap_err();
        assert!(!failure.is_reported());
        assert!(failure.source().is_some());
    }
}
