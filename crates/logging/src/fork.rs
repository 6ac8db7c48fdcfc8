//! crates/logging/src/fork.rs
//! Holding messaging locks across `fork`.
//!
//! A child created by `fork` starts with a copy of every lock in the state it
//! had at that instant, but with only the forking thread running. A lock that
//! another thread held at that moment stays held forever in the child, and
//! the child hangs on its first message. [`ForkGuard`] takes every lock a
//! messaging call can touch, so no other thread is inside one while the
//! process is copied.

use std::fmt;

/// A value whose drop releases a lock.
pub trait HeldLock {}

impl<T> HeldLock for T {}

/// The locks of one [`Messenger`](crate::Messenger), held until dropped.
///
/// Take it right before `fork` and drop it in both processes right after;
/// the child then starts with every lock released. Messaging calls on other
/// threads wait while the guard lives, and a call from the thread holding
/// it deadlocks.
///
/// Created by [`Messenger::fork_guard`](crate::Messenger::fork_guard).
#[must_use = "the locks are released as soon as the guard is dropped"]
pub struct ForkGuard<'a> {
    held: Vec<Box<dyn HeldLock + 'a>>,
}

impl<'a> ForkGuard<'a> {
    pub(crate) fn new(held: Vec<Box<dyn HeldLock + 'a>>) -> Self {
        Self { held }
    }
}

impl fmt::Debug for ForkGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForkGuard")
            .field("locks", &self.held.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::{CollectingSink, Messenger, MessagingContext};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn messaging_waits_for_the_guard() {
        let sink = Arc::new(CollectingSink::new());
        let messenger = Messenger::new(Arc::new(MessagingContext::default()), sink.clone());
        let emitted = AtomicBool::new(false);

        thread::scope(|scope| {
            let guard = messenger.fork_guard();
            scope.spawn(|| {
                messenger.warnonce(["after the fork"]);
                emitted.store(true, Ordering::SeqCst);
            });
            thread::sleep(Duration::from_millis(100));
            assert!(!emitted.load(Ordering::SeqCst));
            drop(guard);
        });

        assert!(emitted.load(Ordering::SeqCst));
        assert_eq!(sink.drain()[0].message, "after the fork");
    }

    #[test]
    fn guard_covers_context_and_sink() {
        let messenger = Messenger::new(
            Arc::new(MessagingContext::default()),
            Arc::new(CollectingSink::new()),
        );
        let guard = messenger.fork_guard();
        assert_eq!(format!("{guard:?}"), "ForkGuard { locks: 3 }");
        drop(guard);
        messenger.note(["released"]);
    }
}
