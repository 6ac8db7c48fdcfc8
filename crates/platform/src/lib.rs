#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! crates/platform/src/lib.rs
//!
//! # Overview
//!
//! `platform` isolates the process-level plumbing of the orchestrator. Its
//! centerpiece is the fork-context process factory: one process-wide
//! [`ForkContext`] that hands out process, lock, queue and pipe primitives
//! bound to copy-on-write child creation (`fork`), falling back to a
//! generic provider for anything the fork provider does not define.
//!
//! # Design
//!
//! - [`PrimitiveProvider`] is the seam between the factory and a strategy.
//!   [`ForkProvider`] and [`GenericProvider`] are the two built-in ones.
//! - [`ForkContext::get`] asks the fork provider first and the generic
//!   provider second, returning a [`Binding`] that records which provider
//!   answered. Unknown names fail with [`ContextError::UnknownPrimitive`].
//! - The factory has no setters. [`ForkContext::bind`] exists only to reject
//!   rebinding with [`ContextError::ImmutableTarget`].
//! - [`multiprocessing()`] returns the single instance of the process.
//!
//! # Safety
//!
//! `fork` and the child's `_exit` are the only unsafe operations. The child
//! runs the supplied job and terminates with `_exit`, so it never returns
//! into the caller's stack.
//!
//! # Examples
//!
//! ```
//! use platform::{ContextError, ProviderKind, StartMethod};
//!
//! let context = platform::multiprocessing();
//!
//! let lock = context.get("Lock")?;
//! assert_eq!(lock.provider, ProviderKind::Fork);
//!
//! let cpus = context.get("cpu_count")?;
//! assert_eq!(cpus.provider, ProviderKind::Generic);
//!
//! assert_eq!(context.start_method()?, StartMethod::Fork);
//! assert!(matches!(
//!     context.get("NoSuchThing"),
//!     Err(ContextError::UnknownPrimitive { .. })
//! ));
//! # Ok::<(), ContextError>(())
//! ```

mod error;
#[cfg(unix)]
pub mod multiprocessing;
#[cfg(unix)]
mod trace;

pub use error::{ContextError, QueueError, SpawnError};
#[cfg(unix)]
pub use multiprocessing::{
    Binding, ForkContext, ForkProvider, GenericProvider, LockGuard, PANIC_EXIT_CODE, Pipe,
    Primitive, PrimitiveProvider, ProcessInfo, ProcessLock, ProviderKind, Queue, Spawner,
    StartMethod, WorkerExit, WorkerHandle, cpu_count, current_process, multiprocessing,
    parent_process,
};
