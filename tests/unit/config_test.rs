//! Tests for configuration validation

use std::time::Duration;

use time_machine::config::{ConfigError, ReplayConfig};

fn valid() -> ReplayConfig {
    ReplayConfig {
        connections: 50,
        timeout_secs: 10.0,
        ignore_delay: false,
        url_base: "https://www.scielo.br".to_string(),
    }
}

#[test]
fn test_defaults() {
    let config = ReplayConfig::default();
    assert_eq!(config.connections, 50);
    assert_eq!(config.timeout(), Duration::from_secs(10));
    assert!(!config.ignore_delay);
    assert_eq!(config.url_base, "https://new.scielo.br");
    assert!(config.validate().is_ok());
}

#[test]
fn test_replay_config_validation() {
    assert!(valid().validate().is_ok());
}

#[test]
fn test_invalid_connections() {
    let invalid = ReplayConfig {
        connections: 0,
        ..valid()
    };
    assert!(matches!(invalid.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_invalid_timeout() {
    for timeout_secs in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let invalid = ReplayConfig {
            timeout_secs,
            ..valid()
        };
        assert!(invalid.validate().is_err(), "timeout {timeout_secs} accepted");
    }
}

#[test]
fn test_oversized_timeout_rejected() {
    for timeout_secs in [1e20, f64::MAX] {
        let invalid = ReplayConfig {
            timeout_secs,
            ..valid()
        };
        assert!(
            matches!(invalid.validate(), Err(ConfigError::Invalid(_))),
            "timeout {timeout_secs} accepted"
        );
        assert_eq!(invalid.timeout(), Duration::MAX);
    }
}

#[test]
fn test_oversized_timeout_from_env_rejected() {
    let config = ReplayConfig::from_lookup(|key| {
        (key == time_machine::config::replay::ENV_TIMEOUT).then(|| "1e20".to_string())
    })
    .unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_invalid_url_base() {
    let invalid = ReplayConfig {
        url_base: "  ".to_string(),
        ..valid()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_replay_config_from_json() {
    let json = r#"{
        "connections": 15,
        "timeout_secs": 2.5,
        "ignore_delay": true,
        "url_base": "https://www.scielo.br"
    }"#;

    let config = ReplayConfig::from_json_str(json).unwrap();
    assert_eq!(config.connections, 15);
    assert_eq!(config.timeout(), Duration::from_millis(2500));
    assert!(config.ignore_delay);
}

#[test]
fn test_replay_config_from_partial_json() {
    let config = ReplayConfig::from_json_str(r#"{ "connections": 3 }"#).unwrap();
    assert_eq!(config.connections, 3);
    assert_eq!(config.url_base, "https://new.scielo.br");
}

#[test]
fn test_replay_config_from_json_rejects_invalid() {
    assert!(matches!(
        ReplayConfig::from_json_str(r#"{ "connections": 0 }"#),
        Err(ConfigError::Invalid(_))
    ));
    assert!(matches!(
        ReplayConfig::from_json_str("{ not json"),
        Err(ConfigError::Parse(_))
    ));
}
