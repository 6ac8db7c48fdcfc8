//! crates/platform/src/error.rs

use std::io;

use thiserror::Error;

/// Failures of the fork-context factory.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContextError {
    /// Neither the fork provider nor the generic provider defines the name.
    #[error("unknown multiprocessing primitive '{name}'")]
    UnknownPrimitive {
        /// The requested name.
        name: String,
    },
    /// Something tried to rebind a name on the factory.
    #[error("cannot rebind '{name}': the multiprocessing context is immutable")]
    ImmutableTarget {
        /// The name that was to be rebound.
        name: String,
    },
    /// Creating the resolved primitive failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Failures while creating or reaping worker processes.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SpawnError {
    /// The start method cannot run an in-process closure.
    #[error("start method '{method}' cannot run a closure; use spawn_command")]
    Unsupported {
        /// Name of the start method.
        method: &'static str,
    },
    /// `fork` failed.
    #[cfg(unix)]
    #[error("failed to fork: {0}")]
    Fork(#[source] nix::errno::Errno),
    /// `waitpid` failed.
    #[cfg(unix)]
    #[error("failed to wait for pid {pid}: {source}")]
    Wait {
        /// The worker being waited for.
        pid: u32,
        /// The underlying error.
        #[source]
        source: nix::errno::Errno,
    },
    /// The worker changed state without terminating.
    #[error("worker {pid} did not terminate")]
    NotTerminated {
        /// The worker being waited for.
        pid: u32,
    },
    /// Launching or waiting for a command failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Failures of [`Queue`](crate::Queue) operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QueueError {
    /// Reading or writing the underlying pipe failed.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// A value could not be encoded or decoded.
    #[error("queue payload is not valid JSON: {0}")]
    Codec(#[from] serde_json::Error),
    /// The payload does not fit in a frame.
    #[error("queue payload of {len} bytes exceeds the frame limit of {limit} bytes")]
    TooLarge {
        /// Payload length in bytes.
        len: usize,
        /// Largest payload the queue accepts.
        limit: usize,
    },
}
