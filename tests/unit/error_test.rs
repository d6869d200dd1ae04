//! Tests for error types

use time_machine::core::{ReplayError, SinkError, TransportError};
use time_machine::infra::LogParseError;

#[test]
fn test_invalid_config_error() {
    let err = ReplayError::InvalidConfig("connections must be greater than 0".to_string());
    assert_eq!(format!("{}", err), "invalid config: connections must be greater than 0");
}

#[test]
fn test_client_error() {
    let err = ReplayError::Client("tls backend unavailable".to_string());
    assert_eq!(format!("{}", err), "http client error: tls backend unavailable");
}

#[test]
fn test_sink_error_wraps_io() {
    let err = ReplayError::from(SinkError::Io(std::io::Error::other("disk full")));
    assert_eq!(format!("{}", err), "sink error: io error: disk full");
}

#[test]
fn test_transport_errors() {
    assert_eq!(format!("{}", TransportError::Timeout), "request timed out");
    assert_eq!(format!("{}", TransportError::TooManyRedirects), "too many redirects");
    assert_eq!(
        format!("{}", TransportError::Connect("refused".into())),
        "connect error: refused"
    );
}

#[test]
fn test_malformed_log_error() {
    let err = LogParseError::Malformed {
        line_number: 3,
        line: "garbage".to_string(),
    };
    assert_eq!(format!("{}", err), "line 3: malformed log entry: garbage");
}
