//! Serialization of messaging configuration and records.

#![cfg(feature = "serde")]

use logging::{LogRecord, LoggerName, MessagingConfig, Severity};

#[test]
fn config_survives_json() {
    let config = MessagingConfig::from_options(true, 2, &["Fetcher", "Fetcher", "RunQueue"]);
    let json = serde_json::to_string(&config).unwrap();
    let back: MessagingConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn record_serializes_logger_as_string() {
    let record = LogRecord {
        severity: Severity::Warning,
        logger: LoggerName::new("BitBake.Fetcher"),
        message: "mirror unreachable".to_owned(),
        metadata: None,
    };
    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["logger"], "BitBake.Fetcher");
    assert_eq!(value["message"], "mirror unreachable");
}
