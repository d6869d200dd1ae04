//! Replay data model: what to request and what happened.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// One request to replay, extracted from an access-log entry.
///
/// Descriptors are created once by the log extractor and only read afterwards.
/// `delay` is measured from the first entry of the log; it is not guaranteed to
/// increase monotonically across descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    /// Request path, always starting with `/`.
    pub path: String,
    /// HTTP method as recorded in the log.
    pub method: String,
    /// Offset from the first log entry at which this request was observed.
    pub delay: Duration,
    /// The original log line, kept for diagnostics.
    pub raw_entry: String,
}

impl ResourceDescriptor {
    /// Build a descriptor for `path` with the given delay and a GET method.
    pub fn get(path: impl Into<String>, delay: Duration) -> Self {
        let path = path.into();
        Self {
            raw_entry: format!("GET {path}"),
            path,
            method: "GET".into(),
            delay,
        }
    }
}

/// Outcome of one replayed request that received a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestResult {
    /// Final URL of the request (after redirects).
    pub target_url: String,
    /// HTTP status code.
    pub status_code: u16,
    /// Reason phrase reported by the transport.
    ///
    /// [`ReqwestTransport`](crate::core::ReqwestTransport) reports the
    /// canonical phrase for the status code, not the text the server sent,
    /// and an empty string for unregistered codes.
    pub reason_phrase: String,
    /// True for 1xx-3xx responses.
    pub success: bool,
    /// Wall-clock time right before the request was issued.
    pub start_time: DateTime<Utc>,
    /// Wall-clock time right after response headers arrived.
    pub end_time: DateTime<Utc>,
    /// Monotonic time between issuing and receiving headers.
    pub elapsed: Duration,
}

impl RequestResult {
    /// Whether a status code counts as a successful response.
    pub const fn is_success_status(status_code: u16) -> bool {
        status_code < 400
    }
}
