//! crates/platform/src/multiprocessing/mod.rs
//! The fork-context process factory.

use std::fmt;
use std::sync::OnceLock;

use crate::error::ContextError;
use crate::trace::trace_lookup;

mod lock;
mod pipe;
mod process;
mod provider;
mod queue;

pub use lock::{LockGuard, ProcessLock};
pub use pipe::Pipe;
pub use process::{
    PANIC_EXIT_CODE, ProcessInfo, Spawner, StartMethod, WorkerExit, WorkerHandle, cpu_count,
    current_process, parent_process,
};
pub use provider::{ForkProvider, GenericProvider, Primitive, PrimitiveProvider};
pub use queue::Queue;

/// Which provider answered a lookup.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// The copy-on-write (`fork`) provider.
    Fork,
    /// The fallback provider.
    Generic,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fork => "fork",
            Self::Generic => "generic",
        })
    }
}

/// Result of a successful [`ForkContext::get`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    /// Provider that defined the name.
    pub provider: ProviderKind,
    /// The primitive itself.
    pub primitive: Primitive,
}

/// Process-wide factory for process and synchronization primitives.
///
/// Lookups try the fork provider first and fall back to the generic one.
/// The providers are fixed at construction; there is no way to replace or
/// rebind them afterwards.
pub struct ForkContext {
    fast: Box<dyn PrimitiveProvider>,
    generic: Box<dyn PrimitiveProvider>,
}

impl fmt::Debug for ForkContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForkContext")
            .field("fast", &self.fast.names())
            .field("generic", &self.generic.names())
            .finish()
    }
}

impl Default for ForkContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ForkContext {
    /// Builds a context from the built-in fork and generic providers.
    #[must_use]
    pub fn new() -> Self {
        Self::with_providers(Box::new(ForkProvider), Box::new(GenericProvider))
    }

    /// Builds a context from custom providers.
    #[must_use]
    pub fn with_providers(
        fast: Box<dyn PrimitiveProvider>,
        generic: Box<dyn PrimitiveProvider>,
    ) -> Self {
        Self { fast, generic }
    }

    /// Looks `name` up on the fork provider only.
    #[must_use]
    pub fn try_fast(&self, name: &str) -> Option<Primitive> {
        self.fast.lookup(name)
    }

    /// Looks `name` up on the generic provider only.
    #[must_use]
    pub fn try_generic(&self, name: &str) -> Option<Primitive> {
        self.generic.lookup(name)
    }

    /// Resolves `name`, preferring the fork provider.
    ///
    /// # Errors
    ///
    /// [`ContextError::UnknownPrimitive`] when neither provider defines it.
    pub fn get(&self, name: &str) -> Result<Binding, ContextError> {
        let binding = if let Some(primitive) = self.try_fast(name) {
            Binding {
                provider: ProviderKind::Fork,
                primitive,
            }
        } else if let Some(primitive) = self.try_generic(name) {
            Binding {
                provider: ProviderKind::Generic,
                primitive,
            }
        } else {
            return Err(ContextError::UnknownPrimitive {
                name: name.to_owned(),
            });
        };
        trace_lookup(name, &binding.provider.to_string());
        Ok(binding)
    }

    /// Rejects every attempt to rebind a name on the factory.
    ///
    /// # Errors
    ///
    /// Always [`ContextError::ImmutableTarget`].
    pub fn bind(&self, name: &str, _primitive: Primitive) -> Result<(), ContextError> {
        Err(ContextError::ImmutableTarget {
            name: name.to_owned(),
        })
    }

    /// Spawner bound to the resolved `Process` primitive.
    ///
    /// # Errors
    ///
    /// Fails when no provider defines a process primitive.
    pub fn process(&self) -> Result<Spawner, ContextError> {
        match self.get("Process")?.primitive {
            Primitive::Process(spawner) => Ok(spawner),
            _ => Err(unknown("Process")),
        }
    }

    /// Start method of the resolved context.
    ///
    /// # Errors
    ///
    /// Fails when no provider defines a start method.
    pub fn start_method(&self) -> Result<StartMethod, ContextError> {
        match self.get("get_start_method")?.primitive {
            Primitive::StartMethod(method) => Ok(method),
            _ => Err(unknown("get_start_method")),
        }
    }

    /// Creates a lock that excludes threads and processes alike.
    ///
    /// # Errors
    ///
    /// Fails when no provider defines locks or the lock file cannot be
    /// created.
    pub fn lock(&self) -> Result<ProcessLock, ContextError> {
        match self.get("Lock")?.primitive {
            Primitive::Lock => Ok(ProcessLock::new()?),
            _ => Err(unknown("Lock")),
        }
    }

    /// Creates a framed queue usable across a fork.
    ///
    /// # Errors
    ///
    /// Fails when no provider defines queues or its pipe and locks cannot be
    /// created.
    pub fn queue(&self) -> Result<Queue, ContextError> {
        match self.get("Queue")?.primitive {
            Primitive::Queue => Ok(Queue::new()?),
            _ => Err(unknown("Queue")),
        }
    }

    /// Creates an anonymous pipe.
    ///
    /// # Errors
    ///
    /// Fails when no provider defines pipes or the pipe cannot be created.
    pub fn pipe(&self) -> Result<Pipe, ContextError> {
        match self.get("Pipe")?.primitive {
            Primitive::Pipe => Ok(Pipe::new()?),
            _ => Err(unknown("Pipe")),
        }
    }
}

fn unknown(name: &str) -> ContextError {
    ContextError::UnknownPrimitive {
        name: name.to_owned(),
    }
}

/// The process-wide factory, constructed on first use.
pub fn multiprocessing() -> &'static ForkContext {
    static CONTEXT: OnceLock<ForkContext> = OnceLock::new();
    CONTEXT.get_or_init(ForkContext::new)
}
