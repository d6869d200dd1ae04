//! Request execution: delay, issue, time and classify one replayed request.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::time::Instant;

use crate::core::{RequestResult, ResourceDescriptor, TransportError};

/// Response metadata returned once headers have been received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Final URL after redirects.
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// Reason phrase for the status.
    pub reason: String,
}

/// Abstraction over the HTTP client shared by all execution units.
///
/// Implementations must be safe to call concurrently and must return as soon
/// as response headers are available, without consuming the body.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use time_machine::core::{HttpResponse, HttpTransport, TransportError};
///
/// struct AlwaysOk;
///
/// #[async_trait]
/// impl HttpTransport for AlwaysOk {
///     async fn get(&self, url: &str, _timeout: Duration) -> Result<HttpResponse, TransportError> {
///         Ok(HttpResponse { url: url.into(), status: 200, reason: "OK".into() })
///     }
/// }
/// ```
#[async_trait]
pub trait HttpTransport: Send + Sync + 'static {
    /// Issue a GET request bounded by `timeout`.
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, TransportError>;
}

/// Transport backed by a shared `reqwest::Client` connection pool.
///
/// reqwest does not surface the status line text, so `reason` is the
/// canonical phrase for the status code.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Wrap an existing client.
    pub const fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        Ok(HttpResponse {
            url: response.url().to_string(),
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
        })
    }
}

/// Map a reqwest failure onto the transport error taxonomy.
///
/// Timeout is checked first: connect timeouts report both flags.
pub fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_redirect() {
        TransportError::TooManyRedirects
    } else if err.is_connect() {
        TransportError::Connect(format!("{err:?}"))
    } else {
        TransportError::Other(format!("{err:?}"))
    }
}

/// Kind of transient network failure that is dropped without a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnorableKind {
    /// Per-request timeout elapsed.
    Timeout,
    /// Redirect limit exceeded.
    TooManyRedirects,
    /// Connection refused or otherwise not established.
    Connect,
}

/// Terminal state of one execution unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// A response was received (any status code).
    Completed(RequestResult),
    /// Transient network failure; no result is recorded.
    Ignorable(IgnorableKind),
    /// Anything else; logged and confined to the unit.
    Unexpected(String),
}

impl From<TransportError> for ExecutionOutcome {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => Self::Ignorable(IgnorableKind::Timeout),
            TransportError::TooManyRedirects => Self::Ignorable(IgnorableKind::TooManyRedirects),
            TransportError::Connect(_) => Self::Ignorable(IgnorableKind::Connect),
            TransportError::Other(detail) => Self::Unexpected(detail),
        }
    }
}

/// Performs one delayed, timed GET against `url_base + path`.
///
/// The recorded method of a descriptor is not used; every replayed request is
/// a GET.
#[derive(Debug)]
pub struct RequestExecutor<H> {
    transport: H,
    url_base: String,
    timeout: Duration,
}

impl<H: HttpTransport> RequestExecutor<H> {
    /// Create an executor. A trailing `/` on `url_base` is dropped.
    pub fn new(transport: H, url_base: impl Into<String>, timeout: Duration) -> Self {
        let mut url_base = url_base.into();
        while url_base.ends_with('/') {
            url_base.pop();
        }
        Self {
            transport,
            url_base,
            timeout,
        }
    }

    /// URL requested for a descriptor.
    pub fn target_url(&self, descriptor: &ResourceDescriptor) -> String {
        format!("{}{}", self.url_base, descriptor.path)
    }

    /// Per-request timeout.
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Wait `delay`, issue the request and classify what happened.
    pub async fn execute(&self, descriptor: &ResourceDescriptor, delay: Duration) -> ExecutionOutcome {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let url = self.target_url(descriptor);
        let start_time = Utc::now();
        let started = Instant::now();

        match self.transport.get(&url, self.timeout).await {
            Ok(response) => {
                let elapsed = started.elapsed();
                let end_time = Utc::now();
                tracing::info!(
                    "{:.3}s {:?} {} {}",
                    delay.as_secs_f64(),
                    elapsed,
                    response.status,
                    response.url
                );
                ExecutionOutcome::Completed(RequestResult {
                    target_url: response.url,
                    status_code: response.status,
                    reason_phrase: response.reason,
                    success: RequestResult::is_success_status(response.status),
                    start_time,
                    end_time,
                    elapsed,
                })
            }
            Err(err) => {
                let outcome = ExecutionOutcome::from(err);
                match &outcome {
                    ExecutionOutcome::Ignorable(kind) => {
                        tracing::debug!("dropped {} after {:?}: {:?}", url, started.elapsed(), kind);
                    }
                    ExecutionOutcome::Unexpected(detail) => {
                        tracing::error!(
                            delay = ?delay,
                            elapsed = ?started.elapsed(),
                            raw_entry = %descriptor.raw_entry,
                            "unhandled error requesting {}: {}",
                            url,
                            detail
                        );
                    }
                    ExecutionOutcome::Completed(_) => {}
                }
                outcome
            }
        }
    }
}
