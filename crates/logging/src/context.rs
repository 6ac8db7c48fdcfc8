//! crates/logging/src/context.rs
//! Process-wide messaging state: verbosity configuration, once-cache and role.

use std::fmt;
use std::sync::{OnceLock, PoisonError, RwLock};

use thiserror::Error;

use super::config::MessagingConfig;
use super::dedup::{OnceCache, OnceFamily};
use super::fork::HeldLock;
use super::levels::{DebugLevel, Severity};

/// Whether this process is the controller or a worker forked from it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ProcessRole {
    /// The original controller process.
    Primary,
    /// A worker created from the controller.
    Worker,
}

impl fmt::Display for ProcessRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Primary => "primary",
            Self::Worker => "worker",
        })
    }
}

/// Returned when a process tries to become a worker twice.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("process already runs as worker {pid}")]
pub struct RoleError {
    /// Pid recorded by the first transition.
    pub pid: u32,
}

/// Messaging state shared by every messenger of one process.
///
/// Construct one at process start and hand it to each
/// [`Messenger`](crate::Messenger) behind an `Arc`. A worker created by
/// `fork` inherits a copy and calls [`enter_worker`](Self::enter_worker)
/// before doing anything else; from then on domain filtering is skipped.
#[derive(Debug, Default)]
pub struct MessagingContext {
    config: RwLock<MessagingConfig>,
    once: OnceCache,
    worker_pid: OnceLock<u32>,
}

impl MessagingContext {
    /// Creates a controller-side context with the given configuration.
    #[must_use]
    pub fn new(config: MessagingConfig) -> Self {
        Self {
            config: RwLock::new(config),
            once: OnceCache::new(),
            worker_pid: OnceLock::new(),
        }
    }

    /// Returns a snapshot of the current configuration.
    #[must_use]
    pub fn config(&self) -> MessagingConfig {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the configuration.
    pub fn set_config(&self, config: MessagingConfig) {
        let mut current = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *current = config;
    }

    /// Edits the configuration in place under the write lock.
    pub fn update_config<R>(&self, edit: impl FnOnce(&mut MessagingConfig) -> R) -> R {
        let mut guard = self.config.write().unwrap_or_else(PoisonError::into_inner);
        edit(&mut guard)
    }

    /// Current role of this process.
    #[must_use]
    pub fn role(&self) -> ProcessRole {
        if self.worker_pid.get().is_some() {
            ProcessRole::Worker
        } else {
            ProcessRole::Primary
        }
    }

    /// Pid recorded when this process became a worker.
    #[must_use]
    pub fn worker_pid(&self) -> Option<u32> {
        self.worker_pid.get().copied()
    }

    /// Switches this process to the worker role. Irreversible.
    pub fn enter_worker(&self, pid: u32) -> Result<(), RoleError> {
        self.worker_pid.set(pid).map_err(|_| RoleError {
            pid: self.worker_pid().unwrap_or(pid),
        })
    }

    /// Domain filter decision for a leveled debug record.
    ///
    /// Workers never look at the domain table or the floor; filtering is a
    /// controller concern.
    #[must_use]
    pub fn should_emit_debug(&self, logger: &str, level: DebugLevel) -> bool {
        match self.role() {
            ProcessRole::Worker => true,
            ProcessRole::Primary => self
                .config
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .allows_debug(logger, level),
        }
    }

    /// Floor check for records outside the leveled debug path.
    ///
    /// Workers pass every severity, including the ones below the floor.
    /// Their records are forwarded to the controller, which applies its own
    /// floor when it receives them, so filtering twice would only lose
    /// records the controller was configured to show.
    #[must_use]
    pub fn should_emit(&self, severity: Severity) -> bool {
        match self.role() {
            ProcessRole::Worker => true,
            ProcessRole::Primary => self
                .config
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .allows(severity),
        }
    }

    /// Dedup decision for the "once" severities.
    pub fn should_emit_once(&self, family: OnceFamily, body: &str) -> bool {
        self.once.should_emit_once(family, body)
    }

    /// The process-local once-cache.
    #[must_use]
    pub const fn once_cache(&self) -> &OnceCache {
        &self.once
    }

    /// Takes the configuration lock and the once-cache gate exclusively.
    pub(crate) fn hold_locks(&self) -> Vec<Box<dyn HeldLock + '_>> {
        let config: Box<dyn HeldLock + '_> =
            Box::new(self.config.write().unwrap_or_else(PoisonError::into_inner));
        let once: Box<dyn HeldLock + '_> = Box::new(self.once.hold());
        vec![config, once]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroU32;

    fn level(n: u32) -> DebugLevel {
        DebugLevel::new(NonZeroU32::new(n).unwrap())
    }

    fn capped_context() -> MessagingContext {
        let mut config = MessagingConfig::from_options::<&str>(false, 3, &[]);
        config.set_domain("BitBake.Fetcher", level(1));
        MessagingContext::new(config)
    }

    #[test]
    fn starts_as_primary() {
        let context = MessagingContext::default();
        assert_eq!(context.role(), ProcessRole::Primary);
        assert_eq!(context.worker_pid(), None);
    }

    #[test]
    fn enter_worker_is_one_way() {
        let context = MessagingContext::default();
        context.enter_worker(4242).unwrap();
        assert_eq!(context.role(), ProcessRole::Worker);
        assert_eq!(context.enter_worker(7), Err(RoleError { pid: 4242 }));
        assert_eq!(context.worker_pid(), Some(4242));
    }

    #[test]
    fn primary_consults_domain_table() {
        let context = capped_context();
        assert!(context.should_emit_debug("BitBake.Fetcher", level(1)));
        assert!(!context.should_emit_debug("BitBake.Fetcher", level(2)));
        assert!(context.should_emit_debug("BitBake.Parsing", level(3)));
    }

    #[test]
    fn worker_skips_domain_table_and_floor() {
        let context = capped_context();
        context.enter_worker(1).unwrap();
        assert!(context.should_emit_debug("BitBake.Fetcher", level(3)));
        assert!(context.should_emit_debug("BitBake.Parsing", level(9)));
        assert!(context.should_emit(Severity::Verbose));
    }

    #[test]
    fn update_config_is_visible_to_decisions() {
        let context = MessagingContext::default();
        assert!(!context.should_emit(Severity::Verbose));
        context.update_config(|config| config.floor = crate::levels::VERBOSE);
        assert!(context.should_emit(Severity::Verbose));
        assert_eq!(context.config().floor, crate::levels::VERBOSE);
    }

    #[test]
    fn set_config_replaces_domains() {
        let context = capped_context();
        context.set_config(MessagingConfig::from_options::<&str>(false, 3, &[]));
        assert!(context.should_emit_debug("BitBake.Fetcher", level(3)));
    }

    #[test]
    fn once_cache_is_shared_through_context() {
        let context = MessagingContext::default();
        assert!(context.should_emit_once(OnceFamily::Warning, "x"));
        assert!(!context.should_emit_once(OnceFamily::Warning, "x"));
        assert_eq!(context.once_cache().len(), 1);
    }
}
