//! Integration tests for `fatal` and the handled-failure marker.
//!
//! A failure is printed by the first layer that reports it. Layers above it
//! forward it unchanged and the terminal handler stays quiet.

use std::io;
use std::sync::Arc;

use logging::{
    CollectingSink, Failure, FailureContext, IntoFailure, Messenger, MessagingContext, Severity,
};

fn messenger() -> (Messenger, Arc<CollectingSink>) {
    let sink = Arc::new(CollectingSink::new());
    let messenger = Messenger::new(Arc::new(MessagingContext::default()), sink.clone());
    (messenger, sink)
}

fn parse_recipe(messenger: &Messenger) -> Result<u32, Failure> {
    messenger.fatal(["cannot parse"])
}

fn build(messenger: &Messenger, steps: &mut Vec<&'static str>) -> Result<u32, Failure> {
    steps.push("before");
    let value = parse_recipe(messenger).context("building busybox")?;
    steps.push("after");
    Ok(value)
}

#[test]
fn fatal_emits_one_critical_record_and_stops_the_caller() {
    let (messenger, sink) = messenger();
    let mut steps = Vec::new();

    let failure = build(&messenger, &mut steps).unwrap_err();

    assert_eq!(steps, ["before"]);
    assert!(failure.is_reported());
    let records = sink.drain();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].severity, Severity::Critical);
    assert!(records[0].message.contains("cannot parse"));
}

#[test]
fn terminal_handler_is_silent_for_marked_failures() {
    let (messenger, sink) = messenger();
    let failure = build(&messenger, &mut Vec::new()).unwrap_err();
    sink.drain();

    assert!(!messenger.report_terminal(&failure));
    assert!(sink.is_empty());
}

#[test]
fn terminal_handler_reports_unmarked_failures_once_with_context() {
    let (messenger, sink) = messenger();
    let denied = io::Error::new(io::ErrorKind::PermissionDenied, "tmp not writable");
    let failure = Err::<(), _>(denied)
        .into_failure()
        .context("creating stamp directory")
        .unwrap_err();

    assert!(messenger.report_terminal(&failure));
    let records = sink.drain();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].severity, Severity::Error);
    assert!(records[0].message.contains("tmp not writable"));
    assert!(records[0].message.contains("while creating stamp directory"));
}

#[test]
fn reporting_midway_suppresses_the_terminal_handler() {
    let (messenger, sink) = messenger();
    let failure = Err::<(), _>(Failure::new("checksum mismatch"))
        .reported_by(&messenger)
        .context("fetching")
        .unwrap_err();

    assert!(!messenger.report_terminal(&failure));
    let records = sink.drain();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].message, "checksum mismatch");
}

#[test]
fn fatal_with_carries_metadata() {
    let (messenger, sink) = messenger();
    let mut metadata = logging::Metadata::new();
    metadata.insert("task".to_owned(), "do_compile".to_owned());

    let result: Result<(), Failure> = messenger.fatal_with(["compile failed"], metadata.clone());
    assert!(result.is_err());
    assert_eq!(sink.drain()[0].metadata, Some(metadata));
}
