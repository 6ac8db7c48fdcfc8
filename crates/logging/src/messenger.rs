//! crates/logging/src/messenger.rs
//! The messaging facade used by the rest of the orchestrator.

use std::fmt;
use std::sync::Arc;

use super::context::MessagingContext;
use super::dedup::OnceFamily;
use super::failure::Failure;
use super::fork::ForkGuard;
use super::levels::{DebugLevel, Severity};
use super::record::{LogRecord, LoggerName, Metadata, RecordSink};

/// Call surface for notes, warnings, errors and leveled debug output.
///
/// A messenger binds a logger name to the process-wide
/// [`MessagingContext`] and a [`RecordSink`]. It is cheap to clone; derived
/// messengers for other loggers share the same context and sink.
///
/// Every call takes one or more text fragments and concatenates them
/// verbatim, without separators.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use logging::{CollectingSink, Messenger, MessagingContext, Severity};
///
/// let sink = Arc::new(CollectingSink::new());
/// let messenger = Messenger::new(Arc::new(MessagingContext::default()), sink.clone());
///
/// messenger.note(["parsing ", "recipes"]);
/// messenger.warnonce(["disk nearly full"]);
/// messenger.warnonce(["disk nearly full"]);
///
/// let records = sink.drain();
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[0].message, "parsing recipes");
/// assert_eq!(records[1].severity, Severity::WarnOnce);
/// ```
#[derive(Clone)]
pub struct Messenger {
    context: Arc<MessagingContext>,
    sink: Arc<dyn RecordSink>,
    logger: LoggerName,
    prefix: Option<Arc<str>>,
}

impl fmt::Debug for Messenger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Messenger")
            .field("logger", &self.logger)
            .field("prefix", &self.prefix)
            .field("role", &self.context.role())
            .finish_non_exhaustive()
    }
}

impl Messenger {
    /// Creates a messenger for the main logger (`BitBake.Main`).
    pub fn new(context: Arc<MessagingContext>, sink: Arc<dyn RecordSink>) -> Self {
        Self {
            context,
            sink,
            logger: LoggerName::default(),
            prefix: None,
        }
    }

    /// Holds every lock a messaging call through this messenger can take.
    ///
    /// Take the guard right before `fork` and drop it in the parent and in
    /// the child right after. Other messengers sharing the context are
    /// covered as well, except for their own sinks.
    pub fn fork_guard(&self) -> ForkGuard<'_> {
        let mut held = self.context.hold_locks();
        held.extend(self.sink.hold());
        ForkGuard::new(held)
    }

    /// Derives a messenger for another logger sharing context and sink.
    #[must_use]
    pub fn for_logger(&self, name: impl AsRef<str>) -> Self {
        Self {
            logger: LoggerName::new(name),
            ..self.clone()
        }
    }

    /// Derives a messenger that puts `prefix` in front of every message.
    /// Prefixes stack when applied repeatedly.
    #[must_use]
    pub fn with_prefix(&self, prefix: impl AsRef<str>) -> Self {
        let combined = match &self.prefix {
            Some(existing) => format!("{existing}{}", prefix.as_ref()),
            None => prefix.as_ref().to_owned(),
        };
        Self {
            prefix: Some(Arc::from(combined)),
            ..self.clone()
        }
    }

    /// Logger this messenger emits as.
    #[must_use]
    pub const fn logger(&self) -> &LoggerName {
        &self.logger
    }

    /// The shared messaging context.
    #[must_use]
    pub const fn context(&self) -> &Arc<MessagingContext> {
        &self.context
    }

    /// Emit at PLAIN severity.
    pub fn plain<P>(&self, parts: P)
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        self.log(Severity::Plain, parts, None);
    }

    /// Emit a leveled debug message. `level` must be a positive integer;
    /// anything else is reported as a warning and treated as `1`.
    pub fn debug<P>(&self, level: i64, parts: P)
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let level = DebugLevel::coerce(level).unwrap_or_else(|misuse| {
            self.emit_unfiltered(
                Severity::Warning,
                &LoggerName::default(),
                misuse.to_string(),
                None,
            );
            DebugLevel::ONE
        });
        self.log(Severity::Debug(level), parts, None);
    }

    /// The plain `debug` call of a logger.
    ///
    /// Loggers of the controlled subsystem route it through the leveled API
    /// as `debug(1, ..)`. Other loggers emit an ordinary DEBUG record that is
    /// only subject to the floor.
    pub fn debug_default<P>(&self, parts: P)
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let severity = Severity::Debug(DebugLevel::ONE);
        if self.logger.is_controlled() {
            self.log(severity, parts, None);
        } else if self.context.should_emit(severity) {
            self.emit(severity, self.join(parts), None);
        }
    }

    /// Emit at NOTE severity.
    pub fn note<P>(&self, parts: P)
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        self.log(Severity::Note, parts, None);
    }

    /// Emit at VERBOSE severity.
    pub fn verbose<P>(&self, parts: P)
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        self.log(Severity::Verbose, parts, None);
    }

    /// Emit a higher priority note that is shown on the console without
    /// being a warning.
    pub fn verbnote<P>(&self, parts: P)
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        self.log(Severity::VerbNote, parts, None);
    }

    /// Emit at WARNING severity.
    pub fn warn<P>(&self, parts: P)
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        self.log(Severity::Warning, parts, None);
    }

    /// Emit a warning at most once per distinct body in this process.
    pub fn warnonce<P>(&self, parts: P)
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        self.log(Severity::WarnOnce, parts, None);
    }

    /// Emit at ERROR severity.
    pub fn error<P>(&self, parts: P)
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        self.log(Severity::Error, parts, None);
    }

    /// Emit at ERROR severity with side-channel metadata for the sink.
    pub fn error_with<P>(&self, parts: P, metadata: Metadata)
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        self.log(Severity::Error, parts, Some(metadata));
    }

    /// Emit an error at most once per distinct body in this process.
    pub fn erroronce<P>(&self, parts: P)
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        self.log(Severity::ErrorOnce, parts, None);
    }

    /// Emit at CRITICAL severity and stop the current operation.
    ///
    /// Always returns `Err` with a failure that is already marked as
    /// reported, so callers propagate it with `?` and no outer layer prints
    /// it again.
    pub fn fatal<T, P>(&self, parts: P) -> Result<T, Failure>
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        self.fatal_inner(parts, None)
    }

    /// [`fatal`](Self::fatal) with side-channel metadata for the sink.
    pub fn fatal_with<T, P>(&self, parts: P, metadata: Metadata) -> Result<T, Failure>
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        self.fatal_inner(parts, Some(metadata))
    }

    fn fatal_inner<T, P>(&self, parts: P, metadata: Option<Metadata>) -> Result<T, Failure>
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let message = self.join(parts);
        self.emit(Severity::Critical, message.clone(), metadata);
        Err(Failure::handled(message))
    }

    /// Terminal handling of a failure that reached the top of a process.
    ///
    /// Reported failures are swallowed. Unreported ones are emitted once
    /// with their full diagnostic. Returns whether anything was emitted.
    pub fn report_terminal(&self, failure: &Failure) -> bool {
        if failure.is_reported() {
            return false;
        }
        self.emit(Severity::Error, failure.diagnostic(), None);
        true
    }

    /// Routes a record through the filters for its severity.
    pub fn log<P>(&self, severity: Severity, parts: P, metadata: Option<Metadata>)
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let allowed = match severity {
            Severity::Debug(level) => {
                self.context.should_emit_debug(self.logger.as_str(), level)
            }
            Severity::Warning | Severity::Error | Severity::Critical => true,
            _ => self.context.should_emit(severity),
        };
        if !allowed {
            return;
        }

        let message = self.join(parts);
        if let Some(family) = OnceFamily::of(severity) {
            if !self.context.should_emit_once(family, &message) {
                return;
            }
        }

        self.emit(severity, message, metadata);
    }

    fn join<P>(&self, parts: P) -> String
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let mut message = self.prefix.as_deref().unwrap_or_default().to_owned();
        for part in parts {
            message.push_str(part.as_ref());
        }
        message
    }

    fn emit(&self, severity: Severity, message: String, metadata: Option<Metadata>) {
        let logger = self.logger.clone();
        self.emit_unfiltered(severity, &logger, message, metadata);
    }

    fn emit_unfiltered(
        &self,
        severity: Severity,
        logger: &LoggerName,
        message: String,
        metadata: Option<Metadata>,
    ) {
        self.sink.emit(&LogRecord {
            severity,
            logger: logger.clone(),
            message,
            metadata,
        });
    }
}
