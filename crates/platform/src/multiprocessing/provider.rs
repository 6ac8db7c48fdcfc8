//! crates/platform/src/multiprocessing/provider.rs
//! Providers behind the fork-context factory.

use super::process::{ProcessInfo, Spawner, StartMethod, cpu_count, current_process, parent_process};

/// A primitive handed out by a provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Primitive {
    /// Worker creation bound to a start method.
    Process(Spawner),
    /// Mutual exclusion across threads and processes ([`ProcessLock`](super::ProcessLock)).
    Lock,
    /// Framed message queue ([`Queue`](super::Queue)).
    Queue,
    /// Anonymous pipe ([`Pipe`](super::Pipe)).
    Pipe,
    /// The provider's start method.
    StartMethod(StartMethod),
    /// Number of usable CPUs.
    CpuCount(usize),
    /// The calling process.
    CurrentProcess(ProcessInfo),
    /// The process that forked this one, if any.
    ParentProcess(Option<ProcessInfo>),
}

/// A named set of primitives.
///
/// Implementations return `None` for names they do not define, which lets
/// the factory fall back to the next provider.
pub trait PrimitiveProvider: Send + Sync {
    /// Every name this provider defines.
    fn names(&self) -> &'static [&'static str];

    /// Resolves `name`, or returns `None` when it is not defined here.
    fn lookup(&self, name: &str) -> Option<Primitive>;

    /// Reports whether `name` is defined here.
    fn defines(&self, name: &str) -> bool {
        self.names().contains(&name)
    }
}

/// Copy-on-write provider: everything that is bound to `fork`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ForkProvider;

impl PrimitiveProvider for ForkProvider {
    fn names(&self) -> &'static [&'static str] {
        &["Process", "Lock", "Queue", "Pipe", "get_start_method"]
    }

    fn lookup(&self, name: &str) -> Option<Primitive> {
        Some(match name {
            "Process" => Primitive::Process(Spawner::new(StartMethod::Fork)),
            "Lock" => Primitive::Lock,
            "Queue" => Primitive::Queue,
            "Pipe" => Primitive::Pipe,
            "get_start_method" => Primitive::StartMethod(StartMethod::Fork),
            _ => return None,
        })
    }
}

/// Fallback provider, including process introspection.
#[derive(Clone, Copy, Debug, Default)]
pub struct GenericProvider;

impl PrimitiveProvider for GenericProvider {
    fn names(&self) -> &'static [&'static str] {
        &[
            "Process",
            "Lock",
            "Queue",
            "Pipe",
            "get_start_method",
            "cpu_count",
            "current_process",
            "parent_process",
        ]
    }

    fn lookup(&self, name: &str) -> Option<Primitive> {
        Some(match name {
            "Process" => Primitive::Process(Spawner::new(StartMethod::Exec)),
            "Lock" => Primitive::Lock,
            "Queue" => Primitive::Queue,
            "Pipe" => Primitive::Pipe,
            "get_start_method" => Primitive::StartMethod(StartMethod::Exec),
            "cpu_count" => Primitive::CpuCount(cpu_count()),
            "current_process" => Primitive::CurrentProcess(current_process()),
            "parent_process" => Primitive::ParentProcess(parent_process()),
            _ => return None,
        })
    }
}
