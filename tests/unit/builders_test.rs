//! Tests for builder modules

use time_machine::builders::{build_http_client, ReplayBuilder};
use time_machine::config::ReplayConfig;
use time_machine::core::ReplayError;

#[test]
fn test_replay_builder_defaults() {
    let builder = ReplayBuilder::new();
    assert_eq!(builder.config(), &ReplayConfig::default());
}

#[test]
fn test_replay_builder_overrides() {
    let builder = ReplayBuilder::new()
        .with_connections(7)
        .with_timeout_secs(1.5)
        .ignore_delay(true)
        .with_url_base("http://localhost:8080");

    let config = builder.config();
    assert_eq!(config.connections, 7);
    assert!((config.timeout_secs - 1.5).abs() < f64::EPSILON);
    assert!(config.ignore_delay);
    assert_eq!(config.url_base, "http://localhost:8080");
}

#[test]
fn test_replay_builder_builds_scheduler() {
    let scheduler = ReplayBuilder::new().with_connections(3).build().unwrap();
    assert_eq!(scheduler.config().connections, 3);
    assert_eq!(scheduler.in_flight(), 0);
}

#[test]
fn test_replay_builder_rejects_invalid_config() {
    let err = ReplayBuilder::new().with_connections(0).build().err().unwrap();
    assert!(matches!(err, ReplayError::InvalidConfig(_)));
}

#[test]
fn test_http_client_builds() {
    assert!(build_http_client(&ReplayConfig::default()).is_ok());
}
