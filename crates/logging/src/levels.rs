//! crates/logging/src/levels.rs
//! Extended severity scale and the leveled debug family.
//!
//! Severities sit on the conventional numeric scale (`DEBUG = 10` up to
//! `CRITICAL = 50`) with extra rungs squeezed in next to the standard ones.
//! `Debug(n)` maps to `DEBUG - n + 1`, so a larger `n` is more verbose and
//! numerically lower. Ordering and threshold checks use [`Severity::level`]
//! only.

use std::cmp::Ordering;
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use thiserror::Error;

/// Numeric level of `Debug(1)`; deeper debug levels count down from here.
pub const DEBUG: i64 = 10;
/// Numeric level of verbose notes, just below [`NOTE`].
pub const VERBOSE: i64 = NOTE - 1;
/// Numeric level of ordinary notes (the conventional "info").
pub const NOTE: i64 = 20;
/// Numeric level of plain output, just above [`NOTE`].
pub const PLAIN: i64 = NOTE + 1;
/// Numeric level of verbose-but-visible notes.
pub const VERBNOTE: i64 = NOTE + 2;
/// Numeric level of warnings that are shown once per body.
pub const WARNONCE: i64 = WARNING - 1;
/// Numeric level of warnings.
pub const WARNING: i64 = 30;
/// Numeric level of errors that are shown once per body.
pub const ERRORONCE: i64 = ERROR - 1;
/// Numeric level of errors.
pub const ERROR: i64 = 40;
/// Numeric level of fatal diagnostics.
pub const CRITICAL: i64 = 50;

/// Verbosity rung inside the debug family. `1` is the least verbose.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DebugLevel(NonZeroU32);

impl DebugLevel {
    /// Least verbose debug level, also the fallback for malformed requests.
    pub const ONE: Self = Self(NonZeroU32::MIN);
    /// Second debug rung, used for trace-level events.
    pub const TWO: Self = Self(NonZeroU32::MIN.saturating_add(1));

    /// Builds a debug level from an already validated count.
    #[must_use]
    pub const fn new(level: NonZeroU32) -> Self {
        Self(level)
    }

    /// Validates a raw debug level supplied by a caller.
    ///
    /// Only positive integers are accepted. Callers on the messaging path do
    /// not surface the error; they warn and fall back to [`DebugLevel::ONE`].
    pub fn coerce(raw: i64) -> Result<Self, InvalidDebugLevel> {
        u32::try_from(raw)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Self)
            .ok_or(InvalidDebugLevel { raw })
    }

    /// Returns the verbosity count.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Numeric severity of this debug level: `DEBUG - n + 1`.
    #[must_use]
    pub const fn effective_level(self) -> i64 {
        DEBUG - self.0.get() as i64 + 1
    }
}

impl fmt::Display for DebugLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Debug level that is not a positive integer.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("Passed invalid debug level '{raw}' to debug")]
pub struct InvalidDebugLevel {
    /// The rejected value.
    pub raw: i64,
}

/// Severity of a diagnostic record.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    /// Leveled debug output.
    Debug(DebugLevel),
    /// Verbose note, hidden unless verbose output is requested.
    Verbose,
    /// Ordinary note.
    Note,
    /// Unprefixed output, above notes.
    Plain,
    /// Note that is shown even when notes are quiet.
    VerbNote,
    /// Warning shown once per distinct body.
    WarnOnce,
    /// Warning.
    Warning,
    /// Error shown once per distinct body.
    ErrorOnce,
    /// Error.
    Error,
    /// Fatal diagnostic that ends the current operation.
    Critical,
}

impl Severity {
    /// Returns the numeric level used for every ordering decision.
    #[must_use]
    pub const fn level(self) -> i64 {
        match self {
            Self::Debug(level) => level.effective_level(),
            Self::Verbose => VERBOSE,
            Self::Note => NOTE,
            Self::Plain => PLAIN,
            Self::VerbNote => VERBNOTE,
            Self::WarnOnce => WARNONCE,
            Self::Warning => WARNING,
            Self::ErrorOnce => ERRORONCE,
            Self::Error => ERROR,
            Self::Critical => CRITICAL,
        }
    }

    /// Console label rendered in front of the message.
    ///
    /// Plain output carries no label. The "once" variants and `Critical`
    /// share the label of their base severity.
    ///
    /// # Examples
    ///
    /// ```
    /// use logging::Severity;
    ///
    /// assert_eq!(Severity::VerbNote.label(), "NOTE");
    /// assert_eq!(Severity::WarnOnce.label(), "WARNING");
    /// assert_eq!(Severity::Critical.label(), "ERROR");
    /// assert_eq!(Severity::Plain.label(), "");
    /// ```
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Debug(_) => "DEBUG",
            Self::Verbose | Self::Note | Self::VerbNote => "NOTE",
            Self::Plain => "",
            Self::WarnOnce | Self::Warning => "WARNING",
            Self::ErrorOnce | Self::Error | Self::Critical => "ERROR",
        }
    }

    /// Returns the debug level for members of the debug family.
    #[must_use]
    pub const fn debug_level(self) -> Option<DebugLevel> {
        match self {
            Self::Debug(level) => Some(level),
            _ => None,
        }
    }

    /// Reports whether this severity is at or above [`WARNING`]'s family.
    #[must_use]
    pub const fn is_warning_or_worse(self) -> bool {
        self.level() >= WARNONCE
    }

    /// Reports whether records at this severity pass a numeric threshold.
    #[must_use]
    pub const fn passes(self, threshold: i64) -> bool {
        self.level() >= threshold
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.level().cmp(&other.level())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug(level) => write!(f, "debug{level}"),
            Self::Verbose => f.write_str("verbose"),
            Self::Note => f.write_str("note"),
            Self::Plain => f.write_str("plain"),
            Self::VerbNote => f.write_str("verbnote"),
            Self::WarnOnce => f.write_str("warnonce"),
            Self::Warning => f.write_str("warning"),
            Self::ErrorOnce => f.write_str("erroronce"),
            Self::Error => f.write_str("error"),
            Self::Critical => f.write_str("critical"),
        }
    }
}

/// Error returned when parsing a [`Severity`] from a string fails.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("unrecognised message severity: {input}")]
pub struct ParseSeverityError {
    input: String,
}

impl FromStr for Severity {
    type Err = ParseSeverityError;

    /// Parses the lowercase names produced by [`Display`](fmt::Display).
    /// `"debug"` alone means `debug1`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let err = || ParseSeverityError {
            input: input.to_owned(),
        };
        match input {
            "debug" => Ok(Self::Debug(DebugLevel::ONE)),
            "verbose" => Ok(Self::Verbose),
            "note" => Ok(Self::Note),
            "plain" => Ok(Self::Plain),
            "verbnote" => Ok(Self::VerbNote),
            "warnonce" => Ok(Self::WarnOnce),
            "warning" => Ok(Self::Warning),
            "erroronce" => Ok(Self::ErrorOnce),
            "error" => Ok(Self::Error),
            "critical" => Ok(Self::Critical),
            other => {
                let digits = other.strip_prefix("debug").ok_or_else(err)?;
                let raw = digits.parse::<i64>().map_err(|_| err())?;
                DebugLevel::coerce(raw).map(Self::Debug).map_err(|_| err())
            }
        }
    }
}
