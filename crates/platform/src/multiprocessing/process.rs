//! crates/platform/src/multiprocessing/process.rs
//! Worker creation, reaping and process introspection.

use std::fmt;
use std::num::NonZeroUsize;
use std::os::unix::process::ExitStatusExt;
use std::panic::{self, AssertUnwindSafe};
use std::process::{Child, Command};
use std::sync::atomic::{AtomicU32, Ordering};

use nix::errno::Errno;
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, fork};

use crate::error::SpawnError;
use crate::trace::{trace_fork, trace_spawn, trace_wait};

/// Exit status of a forked job that panicked.
pub const PANIC_EXIT_CODE: i32 = 101;

static NEXT_WORKER: AtomicU32 = AtomicU32::new(1);
static WORKER_NUMBER: AtomicU32 = AtomicU32::new(0);
static PARENT_PID: AtomicU32 = AtomicU32::new(0);

/// How a provider creates children.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StartMethod {
    /// Copy-on-write duplication of the calling process.
    Fork,
    /// A fresh program image; only commands can be started.
    Exec,
}

impl StartMethod {
    /// Lowercase name of the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fork => "fork",
            Self::Exec => "exec",
        }
    }
}

impl fmt::Display for StartMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a process as seen by the factory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessInfo {
    /// Operating-system process id.
    pub pid: u32,
    /// `MainProcess` for the controller, `Process-N` for forked workers.
    pub name: String,
}

/// The calling process.
#[must_use]
pub fn current_process() -> ProcessInfo {
    let number = WORKER_NUMBER.load(Ordering::Relaxed);
    ProcessInfo {
        pid: std::process::id(),
        name: if number == 0 {
            "MainProcess".to_owned()
        } else {
            worker_name(number)
        },
    }
}

/// The process that forked this one through a [`Spawner`], or `None` in the
/// controller.
#[must_use]
pub fn parent_process() -> Option<ProcessInfo> {
    match PARENT_PID.load(Ordering::Relaxed) {
        0 => None,
        pid => Some(ProcessInfo {
            pid,
            name: "MainProcess".to_owned(),
        }),
    }
}

/// Number of CPUs available to this process, at least one.
#[must_use]
pub fn cpu_count() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

fn worker_name(number: u32) -> String {
    format!("Process-{number}")
}

/// Creates workers using one [`StartMethod`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Spawner {
    method: StartMethod,
}

impl Spawner {
    /// Spawner for `method`.
    #[must_use]
    pub const fn new(method: StartMethod) -> Self {
        Self { method }
    }

    /// The start method this spawner uses.
    #[must_use]
    pub const fn method(self) -> StartMethod {
        self.method
    }

    /// Runs `job` in a forked child and returns a handle to it.
    ///
    /// The child starts as a copy of the caller and sees everything the
    /// caller had in memory at the time of the call. Its exit status is the
    /// value returned by `job`, or [`PANIC_EXIT_CODE`] if `job` panics. The
    /// child never returns from this function, and buffered writers are not
    /// flushed on its behalf.
    ///
    /// # Errors
    ///
    /// [`SpawnError::Unsupported`] for [`StartMethod::Exec`];
    /// [`SpawnError::Fork`] when the system refuses to fork.
    #[allow(unsafe_code)]
    pub fn spawn<F>(&self, job: F) -> Result<WorkerHandle, SpawnError>
    where
        F: FnOnce() -> i32,
    {
        if self.method != StartMethod::Fork {
            return Err(SpawnError::Unsupported {
                method: self.method.as_str(),
            });
        }

        let number = NEXT_WORKER.fetch_add(1, Ordering::Relaxed);
        let parent = std::process::id();

        // SAFETY: the child only runs `job` and then terminates with `_exit`,
        // so it never unwinds into or returns through the parent's frames.
        let forked = unsafe { fork() }.map_err(SpawnError::Fork)?;

        match forked {
            ForkResult::Child => {
                PARENT_PID.store(parent, Ordering::Relaxed);
                WORKER_NUMBER.store(number, Ordering::Relaxed);
                NEXT_WORKER.store(1, Ordering::Relaxed);
                let code = panic::catch_unwind(AssertUnwindSafe(job)).unwrap_or(PANIC_EXIT_CODE);
                // SAFETY: `_exit` skips atexit handlers and destructors, which
                // belong to the parent's copy of this process.
                unsafe { nix::libc::_exit(code) }
            }
            ForkResult::Parent { child } => {
                let name = worker_name(number);
                let pid = pid_to_u32(child);
                trace_fork(pid, &name);
                Ok(WorkerHandle {
                    pid,
                    name,
                    inner: HandleKind::Forked(child),
                })
            }
        }
    }

    /// Starts `command` as a child process. Works with every start method.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from launching the command.
    pub fn spawn_command(&self, command: &mut Command) -> Result<WorkerHandle, SpawnError> {
        let child = command.spawn()?;
        let pid = child.id();
        let name = command.get_program().to_string_lossy().into_owned();
        trace_spawn(pid, &name);
        Ok(WorkerHandle {
            pid,
            name,
            inner: HandleKind::Command(child),
        })
    }
}

fn pid_to_u32(pid: Pid) -> u32 {
    u32::try_from(pid.as_raw()).unwrap_or_default()
}

/// How a worker ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WorkerExit {
    /// Normal termination with an exit status.
    Code(i32),
    /// Termination by a signal.
    Signal(i32),
}

impl WorkerExit {
    /// Reports whether the worker exited with status zero.
    #[must_use]
    pub const fn success(self) -> bool {
        matches!(self, Self::Code(0))
    }

    /// The exit status, if the worker exited normally.
    #[must_use]
    pub const fn code(self) -> Option<i32> {
        match self {
            Self::Code(code) => Some(code),
            Self::Signal(_) => None,
        }
    }
}

impl fmt::Display for WorkerExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "exit status {code}"),
            Self::Signal(signal) => write!(f, "signal {signal}"),
        }
    }
}

#[derive(Debug)]
enum HandleKind {
    Forked(Pid),
    Command(Child),
}

/// A running worker. Call [`join`](Self::join) to reap it.
#[derive(Debug)]
#[must_use = "workers that are never joined stay behind as zombies"]
pub struct WorkerHandle {
    pid: u32,
    name: String,
    inner: HandleKind,
}

impl WorkerHandle {
    /// Process id of the worker.
    #[must_use]
    pub const fn pid(&self) -> u32 {
        self.pid
    }

    /// Worker name (`Process-N` or the command's program).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Waits for the worker to terminate.
    ///
    /// # Errors
    ///
    /// Fails when the wait itself fails.
    pub fn join(self) -> Result<WorkerExit, SpawnError> {
        let pid = self.pid;
        let exit = match self.inner {
            HandleKind::Forked(child) => wait_forked(pid, child)?,
            HandleKind::Command(mut child) => {
                let status = child.wait()?;
                match (status.code(), status.signal()) {
                    (Some(code), _) => WorkerExit::Code(code),
                    (None, Some(signal)) => WorkerExit::Signal(signal),
                    (None, None) => return Err(SpawnError::NotTerminated { pid }),
                }
            }
        };
        trace_wait(pid, &exit);
        Ok(exit)
    }
}

fn wait_forked(pid: u32, child: Pid) -> Result<WorkerExit, SpawnError> {
    loop {
        match waitpid(child, None) {
            Ok(WaitStatus::Exited(_, code)) => return Ok(WorkerExit::Code(code)),
            Ok(WaitStatus::Signaled(_, signal, _)) => return Ok(WorkerExit::Signal(signal as i32)),
            Ok(_) => return Err(SpawnError::NotTerminated { pid }),
            Err(Errno::EINTR) => {}
            Err(source) => return Err(SpawnError::Wait { pid, source }),
        }
    }
}
