//! crates/logging/src/tracing_bridge.rs
//! Bridge between the tracing crate and the messenger.
//!
//! Two directions are supported:
//!
//! - [`MessengerLayer`] is a tracing-subscriber layer that routes tracing
//!   events into a [`Messenger`], so libraries instrumented with `tracing`
//!   obey the same floor, domain caps and role gating as direct calls.
//! - [`TracingSink`] is a [`RecordSink`] that re-emits accepted records as
//!   tracing events for deployments that already run a subscriber.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use logging::{init_tracing, Messenger, MessagingContext, NullSink};
//!
//! let messenger = Messenger::new(Arc::new(MessagingContext::default()), Arc::new(NullSink));
//! init_tracing(messenger).unwrap();
//!
//! tracing::info!(target: "BitBake::Fetcher", "fetching sources");
//! ```

use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::TryInitError;

use super::levels::{DebugLevel, Severity};
use super::messenger::Messenger;
use super::record::{LogRecord, RecordSink};

/// Target used by [`TracingSink`]; [`MessengerLayer`] ignores it so the two
/// can be installed together without looping.
pub const RECORD_TARGET: &str = "bbcore::record";

/// A tracing layer that forwards events to a [`Messenger`].
///
/// The event target becomes the logger name, with `::` separators turned
/// into dots (`BitBake::Fetcher` is logged as `BitBake.Fetcher`).
pub struct MessengerLayer {
    messenger: Messenger,
}

impl MessengerLayer {
    /// Create a layer writing through `messenger`.
    #[must_use]
    pub const fn new(messenger: Messenger) -> Self {
        Self { messenger }
    }

    /// Map a tracing level to a severity.
    const fn level_to_severity(level: &Level) -> Severity {
        match *level {
            Level::ERROR => Severity::Error,
            Level::WARN => Severity::Warning,
            Level::INFO => Severity::Note,
            Level::DEBUG => Severity::Debug(DebugLevel::ONE),
            Level::TRACE => Severity::Debug(DebugLevel::TWO),
        }
    }

    fn target_to_logger(target: &str) -> String {
        target.replace("::", ".")
    }
}

impl<S> Layer<S> for MessengerLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if metadata.target() == RECORD_TARGET {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let Some(message) = visitor.message else {
            return;
        };

        let severity = Self::level_to_severity(metadata.level());
        self.messenger
            .for_logger(Self::target_to_logger(metadata.target()))
            .log(severity, [message], None);
    }
}

/// Visitor to extract message from tracing event.
#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_owned());
        }
    }
}

/// Sink that re-emits records as tracing events under [`RECORD_TARGET`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl RecordSink for TracingSink {
    fn emit(&self, record: &LogRecord) {
        let logger = record.logger.as_str();
        let message = record.message.as_str();
        match record.severity {
            Severity::Debug(level) if level.get() > 1 => {
                tracing::trace!(target: RECORD_TARGET, logger, depth = level.get(), "{message}");
            }
            Severity::Debug(_) => {
                tracing::debug!(target: RECORD_TARGET, logger, "{message}");
            }
            Severity::Verbose | Severity::Note | Severity::Plain | Severity::VerbNote => {
                tracing::info!(target: RECORD_TARGET, logger, "{message}");
            }
            Severity::WarnOnce | Severity::Warning => {
                tracing::warn!(target: RECORD_TARGET, logger, "{message}");
            }
            Severity::ErrorOnce | Severity::Error | Severity::Critical => {
                tracing::error!(
                    target: RECORD_TARGET,
                    logger,
                    severity = %record.severity,
                    "{message}"
                );
            }
        }
    }
}

/// Installs a global subscriber that routes tracing events to `messenger`.
///
/// # Errors
///
/// Fails when a global subscriber is already installed.
pub fn init_tracing(messenger: Messenger) -> Result<(), TryInitError> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(MessengerLayer::new(messenger))
        .try_init()
}

/// Like [`init_tracing`], with an additional filter layer in front
/// (for example an `EnvFilter`).
///
/// # Errors
///
/// Fails when a global subscriber is already installed.
pub fn init_tracing_with_filter<F>(messenger: Messenger, filter: F) -> Result<(), TryInitError>
where
    F: Layer<tracing_subscriber::Registry> + Send + Sync + 'static,
{
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(filter)
        .with(MessengerLayer::new(messenger))
        .try_init()
}
