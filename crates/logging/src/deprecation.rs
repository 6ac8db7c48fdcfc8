//! crates/logging/src/deprecation.rs
//! Notices for callers of retired entry points.

use std::borrow::Cow;
use std::fmt;

use super::messenger::Messenger;

/// Describes a deprecated function and what to use instead.
///
/// # Examples
///
/// ```
/// use logging::Deprecation;
///
/// let plain = Deprecation::new("bb.data.getVar");
/// assert_eq!(plain.to_string(), "Call to deprecated function bb.data.getVar.");
///
/// let advised = Deprecation::new("bb.data.getVar").with_advice("use d.getVar instead");
/// assert_eq!(
///     advised.to_string(),
///     "Call to deprecated function bb.data.getVar: use d.getVar instead."
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deprecation {
    name: Cow<'static, str>,
    advice: Option<Cow<'static, str>>,
}

impl Deprecation {
    /// Creates a notice for `name` without advice.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            advice: None,
        }
    }

    /// Attaches a hint about the replacement.
    #[must_use]
    pub fn with_advice(mut self, advice: impl Into<Cow<'static, str>>) -> Self {
        let advice = advice.into();
        self.advice = (!advice.is_empty()).then_some(advice);
        self
    }

    /// Name of the deprecated function.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Emits the notice once per process through `messenger`, then runs `call`.
    pub fn call<R>(&self, messenger: &Messenger, call: impl FnOnce() -> R) -> R {
        messenger.warnonce([self.to_string()]);
        call()
    }
}

impl fmt::Display for Deprecation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Call to deprecated function {}", self.name)?;
        if let Some(advice) = &self.advice {
            write!(f, ": {advice}")?;
        }
        f.write_str(".")
    }
}

impl Messenger {
    /// Runs `call` after announcing that `name` is deprecated.
    ///
    /// An empty `advice` is omitted from the notice.
    pub fn call_deprecated<R>(
        &self,
        name: impl Into<Cow<'static, str>>,
        advice: impl Into<Cow<'static, str>>,
        call: impl FnOnce() -> R,
    ) -> R {
        Deprecation::new(name).with_advice(advice).call(self, call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CollectingSink, MessagingContext, Severity};
    use std::sync::Arc;

    #[test]
    fn empty_advice_is_dropped() {
        let notice = Deprecation::new("old_api").with_advice("");
        assert_eq!(notice.to_string(), "Call to deprecated function old_api.");
        assert_eq!(notice.name(), "old_api");
    }

    #[test]
    fn call_forwards_result_and_warns_once() {
        let sink = Arc::new(CollectingSink::new());
        let messenger = Messenger::new(Arc::new(MessagingContext::default()), sink.clone());

        let first = messenger.call_deprecated("old_api", "use new_api", || 1 + 1);
        let second = messenger.call_deprecated("old_api", "use new_api", || 40 + 2);
        assert_eq!((first, second), (2, 42));

        let records = sink.drain();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity, Severity::WarnOnce);
        assert_eq!(
            records[0].message,
            "Call to deprecated function old_api: use new_api."
        );
    }
}
