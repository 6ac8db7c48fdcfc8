//! crates/platform/src/multiprocessing/lock.rs
//! Advisory file locks shared across threads and forked processes.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Arc;

use fs2::FileExt;
use tempfile::TempPath;

/// A mutual-exclusion lock that works between threads and between a
/// controller and the workers it forked.
///
/// Every acquisition opens the backing file anew and takes an exclusive
/// `flock` on that descriptor, so two holders never share a lock state.
/// Clones and forked copies refer to the same backing file. The file is
/// removed when the last handle in the creating process is dropped.
#[derive(Clone, Debug)]
pub struct ProcessLock {
    path: Arc<TempPath>,
}

impl ProcessLock {
    /// Creates a lock backed by a fresh temporary file.
    ///
    /// # Errors
    ///
    /// Fails when the temporary file cannot be created.
    pub fn new() -> io::Result<Self> {
        let path = tempfile::Builder::new()
            .prefix("bbcore-lock-")
            .tempfile()?
            .into_temp_path();
        Ok(Self {
            path: Arc::new(path),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Blocks until the lock is held.
    ///
    /// # Errors
    ///
    /// Fails when the backing file cannot be opened or locked.
    pub fn acquire(&self) -> io::Result<LockGuard> {
        let file = self.open_file()?;
        file.lock_exclusive()?;
        Ok(LockGuard { file })
    }

    /// Takes the lock if nobody holds it.
    ///
    /// # Errors
    ///
    /// Fails when the backing file cannot be opened or locked for a reason
    /// other than contention.
    pub fn try_acquire(&self) -> io::Result<Option<LockGuard>> {
        let file = self.open_file()?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(LockGuard { file })),
            Err(error) if error.kind() == fs2::lock_contended_error().kind() => Ok(None),
            Err(error) => Err(error),
        }
    }

    fn open_file(&self) -> io::Result<File> {
        OpenOptions::new().read(true).write(true).open(self.path())
    }
}

/// Holds a [`ProcessLock`] until dropped.
#[derive(Debug)]
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct LockGuard {
    file: File,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn try_acquire_reports_contention() {
        let lock = ProcessLock::new().unwrap();
        let held = lock.acquire().unwrap();
        assert!(lock.try_acquire().unwrap().is_none());
        drop(held);
        assert!(lock.try_acquire().unwrap().is_some());
    }

    #[test]
    fn clones_share_the_lock() {
        let lock = ProcessLock::new().unwrap();
        let clone = lock.clone();
        assert_eq!(lock.path(), clone.path());
        let _held = clone.acquire().unwrap();
        assert!(lock.try_acquire().unwrap().is_none());
    }

    #[test]
    fn excludes_threads() {
        let lock = ProcessLock::new().unwrap();
        let inside = AtomicUsize::new(0);
        let max_inside = AtomicUsize::new(0);

        thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..20 {
                        let _guard = lock.acquire().unwrap();
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_inside.fetch_max(now, Ordering::SeqCst);
                        inside.fetch_sub(1, Ordering::SeqCst);
                    }
                });
            }
        });

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn backing_file_is_removed_with_last_handle() {
        let lock = ProcessLock::new().unwrap();
        let path = lock.path().to_path_buf();
        let clone = lock.clone();
        drop(lock);
        assert!(path.exists());
        drop(clone);
        assert!(!path.exists());
    }
}
