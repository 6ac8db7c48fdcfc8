//! Worker creation and terminal failure handling.

use std::process::ExitCode;

use logging::{Failure, IntoFailure, Messenger};
use platform::{WorkerHandle, multiprocessing};

/// Exit status of a worker whose job failed.
pub const WORKER_FAILURE_CODE: i32 = 1;

/// Reports an unhandled failure and maps the outcome to an exit status.
///
/// Failures that were already reported stay silent; the rest are emitted
/// once with their full diagnostic.
pub fn exit_status(messenger: &Messenger, outcome: Result<(), Failure>) -> i32 {
    match outcome {
        Ok(()) => 0,
        Err(failure) => {
            messenger.report_terminal(&failure);
            WORKER_FAILURE_CODE
        }
    }
}

/// Runs an entry point and converts its outcome into an [`ExitCode`].
pub fn run<F>(messenger: &Messenger, entry: F) -> ExitCode
where
    F: FnOnce() -> Result<(), Failure>,
{
    match exit_status(messenger, entry()) {
        0 => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}

/// Forks a worker that runs `job` with its own copy of `messenger`.
///
/// Inside the worker the messaging context enters the worker role before
/// `job` starts, so domain filtering is skipped there. The worker inherits
/// the once-cache as it was at the time of the call.
///
/// The messenger's locks are held across the fork (see
/// [`Messenger::fork_guard`]), so the call waits for messages other threads
/// are emitting at that moment, and the worker never starts with one of
/// them locked.
///
/// # Errors
///
/// Fails when the factory has no process primitive or the fork fails. The
/// failure is not reported yet.
pub fn spawn_worker<F>(messenger: &Messenger, job: F) -> Result<WorkerHandle, Failure>
where
    F: FnOnce(&Messenger) -> Result<(), Failure>,
{
    let spawner = multiprocessing().process().into_failure()?;
    // The parent releases its copy when `spawn` drops the closure.
    let held = messenger.fork_guard();
    spawner
        .spawn(move || {
            drop(held);
            // A worker forking again is already in the worker role.
            let _ = messenger.context().enter_worker(std::process::id());
            exit_status(messenger, job(messenger))
        })
        .into_failure()
}

#[cfg(test)]
mod tests {
    use super::*;
    use logging::{CollectingSink, MessagingContext, Severity};
    use std::sync::Arc;

    fn messenger() -> (Messenger, Arc<CollectingSink>) {
        let sink = Arc::new(CollectingSink::new());
        let messenger = Messenger::new(Arc::new(MessagingContext::default()), sink.clone());
        (messenger, sink)
    }

    #[test]
    fn success_maps_to_zero() {
        let (messenger, sink) = messenger();
        assert_eq!(exit_status(&messenger, Ok(())), 0);
        assert!(sink.is_empty());
    }

    #[test]
    fn reported_failure_is_silent() {
        let (messenger, sink) = messenger();
        let outcome = messenger.fatal(["stop"]);
        assert_eq!(exit_status(&messenger, outcome), WORKER_FAILURE_CODE);
        let records = sink.drain();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity, Severity::Critical);
    }

    #[test]
    fn unreported_failure_is_reported_once() {
        let (messenger, sink) = messenger();
        assert_eq!(
            run(&messenger, || Err(Failure::new("boom"))),
            ExitCode::FAILURE
        );
        let records = sink.drain();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity, Severity::Error);
        assert!(records[0].message.starts_with("boom"));
    }

    #[test]
    fn run_succeeds_quietly() {
        let (messenger, sink) = messenger();
        assert_eq!(run(&messenger, || Ok(())), ExitCode::SUCCESS);
        assert!(sink.is_empty());
    }
}
