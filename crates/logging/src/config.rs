//! crates/logging/src/config.rs
//! Process-wide verbosity floor and per-domain debug caps.

use std::collections::BTreeMap;

use thiserror::Error;

use super::levels::{DEBUG, DebugLevel, NOTE, Severity, VERBOSE};

/// First segment of every logger that belongs to the controlled subsystem.
pub const ROOT_DOMAIN: &str = "BitBake";

/// Verbosity settings consulted by the controller process.
///
/// `floor` is the global knob: nothing numerically below it is emitted.
/// `domains` caps how deep debug output may go for individual loggers; a
/// logger without an entry is limited by the floor alone.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MessagingConfig {
    /// Lowest numeric severity that is emitted.
    pub floor: i64,
    /// Logger name to the deepest debug level allowed for it.
    pub domains: BTreeMap<String, DebugLevel>,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            floor: NOTE,
            domains: BTreeMap::new(),
        }
    }
}

impl MessagingConfig {
    /// Builds a configuration from the orchestrator's command-line switches.
    ///
    /// `debug` counts `-D` occurrences and lowers the floor to `Debug(debug)`;
    /// otherwise `verbose` lowers it to verbose notes. Each entry of
    /// `debug_domains` names a domain under [`ROOT_DOMAIN`]; repeating a name
    /// raises its cap by one.
    ///
    /// # Examples
    ///
    /// ```
    /// use logging::MessagingConfig;
    ///
    /// let config = MessagingConfig::from_options(false, 2, &["Fetcher", "Fetcher", "Parsing"]);
    /// assert_eq!(config.floor, 9);
    /// assert_eq!(config.domain_cap("BitBake.Fetcher").map(|l| l.get()), Some(2));
    /// assert_eq!(config.domain_cap("BitBake.Parsing").map(|l| l.get()), Some(1));
    /// ```
    pub fn from_options<S: AsRef<str>>(verbose: bool, debug: u32, debug_domains: &[S]) -> Self {
        let floor = if debug > 0 {
            DEBUG - i64::from(debug) + 1
        } else if verbose {
            VERBOSE
        } else {
            NOTE
        };

        let mut counts: BTreeMap<String, u32> = BTreeMap::new();
        for domain in debug_domains {
            *counts.entry(qualify(domain.as_ref())).or_default() += 1;
        }

        let domains = counts
            .into_iter()
            .filter_map(|(name, count)| {
                DebugLevel::coerce(i64::from(count))
                    .ok()
                    .map(|level| (name, level))
            })
            .collect();

        Self { floor, domains }
    }

    /// Sets the debug cap for a fully qualified logger name.
    pub fn set_domain(&mut self, logger: impl Into<String>, cap: DebugLevel) {
        self.domains.insert(logger.into(), cap);
    }

    /// Returns the debug cap configured for `logger`, if any.
    #[must_use]
    pub fn domain_cap(&self, logger: &str) -> Option<DebugLevel> {
        self.domains.get(logger).copied()
    }

    /// Apply a single domain token (e.g., "Fetcher=2", "BitBake.RunQueue").
    ///
    /// Names without the [`ROOT_DOMAIN`] prefix are qualified with it. A
    /// missing `=N` suffix raises the existing cap by one.
    pub fn apply_domain_token(&mut self, token: &str) -> Result<(), ParseDomainError> {
        let (name, level) = parse_domain_token(token)?;
        let name = qualify(name);

        let cap = match level {
            Some(level) => level,
            None => {
                let next = self
                    .domain_cap(&name)
                    .map_or(1, |cap| i64::from(cap.get()) + 1);
                DebugLevel::coerce(next).map_err(|_| ParseDomainError::InvalidLevel {
                    token: token.to_owned(),
                })?
            }
        };

        self.domains.insert(name, cap);
        Ok(())
    }

    /// Decides whether a debug record for `logger` passes the domain cap and
    /// the floor. Role gating happens in the caller.
    #[must_use]
    pub fn allows_debug(&self, logger: &str, level: DebugLevel) -> bool {
        if let Some(cap) = self.domain_cap(logger) {
            if level.effective_level() < cap.effective_level() {
                return false;
            }
        }
        level.effective_level() >= self.floor
    }

    /// Reports whether a non-debug severity clears the floor.
    #[must_use]
    pub const fn allows(&self, severity: Severity) -> bool {
        severity.passes(self.floor)
    }
}

/// Errors produced while parsing a domain token.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ParseDomainError {
    /// The token was empty or named no domain.
    #[error("empty debug domain token")]
    Empty,
    /// The `=N` suffix was not a positive integer.
    #[error("invalid level in debug domain: {token}")]
    InvalidLevel {
        /// The offending token.
        token: String,
    },
}

fn qualify(name: &str) -> String {
    let is_qualified = name
        .split('.')
        .next()
        .is_some_and(|first| first == ROOT_DOMAIN);
    if is_qualified {
        name.to_owned()
    } else {
        format!("{ROOT_DOMAIN}.{name}")
    }
}

/// Parse a token like "Fetcher=2" into ("Fetcher", Some(2)) or "Fetcher" into ("Fetcher", None).
fn parse_domain_token(token: &str) -> Result<(&str, Option<DebugLevel>), ParseDomainError> {
    let token_trimmed = token.trim();
    let (name, level) = match token_trimmed.split_once('=') {
        Some((name, level)) => (name.trim(), Some(level.trim())),
        None => (token_trimmed, None),
    };

    if name.is_empty() {
        return Err(ParseDomainError::Empty);
    }

    let level = level
        .map(|text| {
            text.parse::<i64>()
                .ok()
                .and_then(|raw| DebugLevel::coerce(raw).ok())
                .ok_or_else(|| ParseDomainError::InvalidLevel {
                    token: token.to_owned(),
                })
        })
        .transpose()?;

    Ok((name, level))
}
