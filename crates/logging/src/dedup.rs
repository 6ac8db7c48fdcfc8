//! crates/logging/src/dedup.rs
//! Process-local memory of bodies already emitted by the "once" severities.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use dashmap::DashSet;

use super::levels::Severity;

/// Namespace of a once-only message. Warnings and errors never share entries.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OnceFamily {
    /// Bodies emitted through `warnonce`.
    Warning,
    /// Bodies emitted through `erroronce`.
    Error,
}

impl OnceFamily {
    /// Family of a "once" severity, `None` for everything else.
    #[must_use]
    pub const fn of(severity: Severity) -> Option<Self> {
        match severity {
            Severity::WarnOnce => Some(Self::Warning),
            Severity::ErrorOnce => Some(Self::Error),
            _ => None,
        }
    }
}

/// Set of `(family, body)` pairs that have already been emitted.
///
/// The check-and-insert is a single [`DashSet::insert`], so concurrent callers
/// racing on the same body see exactly one winner. Entries are never evicted.
/// A forked worker starts from a copy of the parent's set and diverges.
#[derive(Debug, Default)]
pub struct OnceCache {
    seen: DashSet<(OnceFamily, String)>,
    // Shared by every set operation, exclusive while a fork is prepared.
    gate: RwLock<()>,
}

impl OnceCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` exactly once per distinct `(family, body)`.
    pub fn should_emit_once(&self, family: OnceFamily, body: &str) -> bool {
        let _pass = self.pass();
        self.seen.insert((family, body.to_owned()))
    }

    /// Number of remembered bodies across both families.
    #[must_use]
    pub fn len(&self) -> usize {
        let _pass = self.pass();
        self.seen.len()
    }

    /// Reports whether nothing has been remembered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let _pass = self.pass();
        self.seen.is_empty()
    }

    /// Waits until no set operation is running and blocks new ones until the
    /// guard is dropped.
    pub(crate) fn hold(&self) -> RwLockWriteGuard<'_, ()> {
        self.gate.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn pass(&self) -> RwLockReadGuard<'_, ()> {
        self.gate.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn first_occurrence_wins() {
        let cache = OnceCache::new();
        assert!(cache.should_emit_once(OnceFamily::Warning, "disk full"));
        assert!(!cache.should_emit_once(OnceFamily::Warning, "disk full"));
        assert!(!cache.should_emit_once(OnceFamily::Warning, "disk full"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn families_are_independent() {
        let cache = OnceCache::new();
        assert!(cache.should_emit_once(OnceFamily::Warning, "disk full"));
        assert!(cache.should_emit_once(OnceFamily::Error, "disk full"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn bodies_compare_exactly() {
        let cache = OnceCache::new();
        assert!(cache.should_emit_once(OnceFamily::Error, "disk full"));
        assert!(cache.should_emit_once(OnceFamily::Error, "disk full "));
        assert!(cache.should_emit_once(OnceFamily::Error, "Disk full"));
    }

    #[test]
    fn family_of_once_severities() {
        assert_eq!(
            OnceFamily::of(Severity::WarnOnce),
            Some(OnceFamily::Warning)
        );
        assert_eq!(OnceFamily::of(Severity::ErrorOnce), Some(OnceFamily::Error));
        assert_eq!(OnceFamily::of(Severity::Warning), None);
        assert_eq!(OnceFamily::of(Severity::Error), None);
    }

    #[test]
    fn concurrent_inserts_have_one_winner() {
        let cache = OnceCache::new();
        let winners = AtomicUsize::new(0);

        thread::scope(|scope| {
            for _ in 0..16 {
                scope.spawn(|| {
                    if cache.should_emit_once(OnceFamily::Warning, "racing body") {
                        winners.fetch_add(1, Ordering::SeqCst);
                    }
                });
            }
        });

        assert_eq!(winners.load(Ordering::SeqCst), 1);
        assert!(!cache.is_empty());
    }
}
