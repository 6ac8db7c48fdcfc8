//! crates/logging/src/macros.rs
//! `format!`-style shorthands for the messenger calls.
//!
//! Each macro takes the messenger as its first argument followed by
//! ordinary format arguments:
//!
//! ```
//! use std::sync::Arc;
//! use logging::{bbnote, bbwarn, CollectingSink, Messenger, MessagingContext};
//!
//! let sink = Arc::new(CollectingSink::new());
//! let messenger = Messenger::new(Arc::new(MessagingContext::default()), sink.clone());
//!
//! bbnote!(messenger, "parsed {} recipes", 42);
//! bbwarn!(messenger, "layer {:?} is empty", "meta-extra");
//!
//! let records = sink.drain();
//! assert_eq!(records[0].message, "parsed 42 recipes");
//! assert_eq!(records[1].message, "layer \"meta-extra\" is empty");
//! ```

/// Emit a PLAIN message.
#[macro_export]
macro_rules! bbplain {
    ($messenger:expr, $($arg:tt)*) => {
        $messenger.plain([::std::format!($($arg)*)])
    };
}

/// Emit a NOTE.
#[macro_export]
macro_rules! bbnote {
    ($messenger:expr, $($arg:tt)*) => {
        $messenger.note([::std::format!($($arg)*)])
    };
}

/// Emit a WARNING.
#[macro_export]
macro_rules! bbwarn {
    ($messenger:expr, $($arg:tt)*) => {
        $messenger.warn([::std::format!($($arg)*)])
    };
}

/// Emit an ERROR.
#[macro_export]
macro_rules! bberror {
    ($messenger:expr, $($arg:tt)*) => {
        $messenger.error([::std::format!($($arg)*)])
    };
}

/// Emit a leveled debug message: `bbdebug!(messenger, 2, "fetching {}", url)`.
///
/// The message is only formatted after the level was validated by
/// [`Messenger::debug`](crate::Messenger::debug).
#[macro_export]
macro_rules! bbdebug {
    ($messenger:expr, $level:expr, $($arg:tt)*) => {
        $messenger.debug($level, [::std::format!($($arg)*)])
    };
}

/// Emit a CRITICAL message and evaluate to the `Err` returned by
/// [`Messenger::fatal`](crate::Messenger::fatal).
///
/// Intended for use with `?` or `return`:
///
/// ```
/// use std::sync::Arc;
/// use logging::{bbfatal, CollectingSink, Failure, Messenger, MessagingContext};
///
/// fn load(messenger: &Messenger, path: &str) -> Result<(), Failure> {
///     bbfatal!(messenger, "cannot open {path}")
/// }
///
/// let sink = Arc::new(CollectingSink::new());
/// let messenger = Messenger::new(Arc::new(MessagingContext::default()), sink.clone());
/// let failure = load(&messenger, "conf/local.conf").unwrap_err();
/// assert!(failure.is_reported());
/// assert_eq!(sink.drain()[0].message, "cannot open conf/local.conf");
/// ```
#[macro_export]
macro_rules! bbfatal {
    ($messenger:expr, $($arg:tt)*) => {
        $messenger.fatal([::std::format!($($arg)*)])
    };
}

#[cfg(test)]
mod tests {
    use crate::{CollectingSink, Messenger, MessagingConfig, MessagingContext, Severity};
    use std::sync::Arc;

    fn debug_messenger() -> (Messenger, Arc<CollectingSink>) {
        let sink = Arc::new(CollectingSink::new());
        let config = MessagingConfig::from_options::<&str>(false, 2, &[]);
        let messenger = Messenger::new(Arc::new(MessagingContext::new(config)), sink.clone());
        (messenger, sink)
    }

    #[test]
    fn macros_map_to_severities() {
        let (messenger, sink) = debug_messenger();
        bbplain!(messenger, "plain {}", 1);
        bbnote!(messenger, "note {}", 2);
        bbwarn!(messenger, "warn {}", 3);
        bberror!(messenger, "error {}", 4);
        bbdebug!(messenger, 2, "debug {}", 5);

        let severities: Vec<_> = sink.drain().into_iter().map(|r| r.severity).collect();
        assert_eq!(
            severities,
            [
                Severity::Plain,
                Severity::Note,
                Severity::Warning,
                Severity::Error,
                "debug2".parse().unwrap(),
            ]
        );
    }

    #[test]
    fn bbfatal_yields_err() {
        let (messenger, sink) = debug_messenger();
        let result: Result<(), _> = bbfatal!(messenger, "stop at {}", "parse");
        assert_eq!(result.unwrap_err().message(), "stop at parse");
        assert_eq!(sink.drain()[0].severity, Severity::Critical);
    }
}
