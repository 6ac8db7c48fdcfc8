//! Debug events for the process factory. No-ops without the `tracing` feature.

#[cfg(feature = "tracing")]
use tracing::debug;

#[cfg(feature = "tracing")]
#[inline]
pub fn trace_lookup(name: &str, provider: &str) {
    debug!(target: "platform::multiprocessing", name, provider, "resolved {name} via {provider}");
}

#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_lookup(_name: &str, _provider: &str) {}

#[cfg(feature = "tracing")]
#[inline]
pub fn trace_fork(pid: u32, name: &str) {
    debug!(target: "platform::multiprocessing", pid, name, "forked worker {name} as {pid}");
}

#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_fork(_pid: u32, _name: &str) {}

#[cfg(feature = "tracing")]
#[inline]
pub fn trace_spawn(pid: u32, program: &str) {
    debug!(target: "platform::multiprocessing", pid, program, "spawned {program} as {pid}");
}

#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_spawn(_pid: u32, _program: &str) {}

#[cfg(feature = "tracing")]
#[inline]
pub fn trace_wait(pid: u32, exit: &crate::WorkerExit) {
    debug!(target: "platform::multiprocessing", pid, "worker {pid} finished: {exit}");
}

#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_wait(_pid: u32, _exit: &crate::WorkerExit) {}
