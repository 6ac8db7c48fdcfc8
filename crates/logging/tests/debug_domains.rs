//! Integration tests for leveled debug output and per-domain caps.
//!
//! A domain cap of `T` lets `debug(n)` through for `n <= T`; deeper levels
//! are dropped for that logger only. Loggers without a cap are limited by
//! the floor alone.

use std::num::NonZeroU32;
use std::sync::Arc;

use logging::{CollectingSink, DebugLevel, Messenger, MessagingConfig, MessagingContext, Severity};

fn level(n: u32) -> DebugLevel {
    DebugLevel::new(NonZeroU32::new(n).unwrap())
}

fn messenger_with(config: MessagingConfig) -> (Messenger, Arc<CollectingSink>) {
    let sink = Arc::new(CollectingSink::new());
    let messenger = Messenger::new(Arc::new(MessagingContext::new(config)), sink.clone());
    (messenger, sink)
}

// ============================================================================
// Domain caps
// ============================================================================

#[test]
fn cap_of_two_hides_level_three() {
    let mut config = MessagingConfig::from_options::<&str>(false, 3, &[]);
    config.set_domain("BitBake.Fetcher", level(2));
    let (messenger, sink) = messenger_with(config);
    let fetcher = messenger.for_logger("BitBake.Fetcher");

    fetcher.debug(3, ["x"]);
    assert!(sink.is_empty());

    fetcher.debug(1, ["x"]);
    fetcher.debug(2, ["y"]);
    let records = sink.drain();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].severity, Severity::Debug(level(1)));
    assert_eq!(records[1].severity, Severity::Debug(level(2)));
}

#[test]
fn cap_applies_only_to_its_logger() {
    let config = MessagingConfig::from_options(false, 3, &["Fetcher"]);
    let (messenger, sink) = messenger_with(config);

    messenger.for_logger("BitBake.Fetcher").debug(3, ["capped"]);
    messenger
        .for_logger("BitBake.RunQueue")
        .debug(3, ["uncapped"]);

    let records = sink.drain();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].logger.as_str(), "BitBake.RunQueue");
}

#[test]
fn floor_still_applies_under_a_generous_cap() {
    let mut config = MessagingConfig::from_options::<&str>(false, 1, &[]);
    config.set_domain("BitBake.Fetcher", level(5));
    let (messenger, sink) = messenger_with(config);

    messenger
        .for_logger("BitBake.Fetcher")
        .debug(2, ["below floor"]);
    assert!(sink.is_empty());
}

#[test]
fn repeated_domain_options_raise_the_cap() {
    let config = MessagingConfig::from_options(false, 3, &["Fetcher", "Fetcher"]);
    let (messenger, sink) = messenger_with(config);
    let fetcher = messenger.for_logger("BitBake.Fetcher");

    fetcher.debug(2, ["second rung"]);
    fetcher.debug(3, ["third rung"]);

    let messages: Vec<_> = sink.drain().into_iter().map(|r| r.message).collect();
    assert_eq!(messages, ["second rung"]);
}

#[test]
fn domain_tokens_update_a_live_context() {
    let (messenger, sink) = messenger_with(MessagingConfig::from_options::<&str>(false, 3, &[]));
    messenger
        .context()
        .update_config(|config| config.apply_domain_token("Parsing=1"))
        .unwrap();

    let parsing = messenger.for_logger("BitBake.Parsing");
    parsing.debug(2, ["hidden"]);
    parsing.debug(1, ["shown"]);
    assert_eq!(sink.drain().len(), 1);
}

// ============================================================================
// Malformed levels
// ============================================================================

#[test]
fn negative_level_is_coerced_after_a_warning() {
    let (messenger, sink) = messenger_with(MessagingConfig::from_options::<&str>(false, 1, &[]));
    messenger
        .for_logger("BitBake.Fetcher")
        .debug(-4, ["coerced"]);

    let records = sink.drain();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].severity, Severity::Warning);
    assert_eq!(records[0].logger.as_str(), "BitBake.Main");
    assert!(records[0].message.contains("'-4'"));
    assert_eq!(records[1].severity, Severity::Debug(DebugLevel::ONE));
    assert_eq!(records[1].logger.as_str(), "BitBake.Fetcher");
}

#[test]
fn verbose_option_shows_verbose_but_not_debug() {
    let (messenger, sink) = messenger_with(MessagingConfig::from_options::<&str>(true, 0, &[]));
    messenger.verbose(["shown"]);
    messenger.debug(1, ["hidden"]);

    let records = sink.drain();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].severity, Severity::Verbose);
}
