//! Scheduler and HTTP client construction.

use reqwest::redirect::Policy;

use crate::config::ReplayConfig;
use crate::core::{HttpTransport, ReplayError, ReplayScheduler};

/// Redirects followed before a request counts as a redirect loop.
pub const MAX_REDIRECTS: usize = 10;

/// Build the `reqwest::Client` shared by all units of a run.
///
/// The idle pool is sized to the concurrency gate so that every slot can keep
/// a warm connection.
pub fn build_http_client(cfg: &ReplayConfig) -> Result<reqwest::Client, ReplayError> {
    reqwest::Client::builder()
        .redirect(Policy::limited(MAX_REDIRECTS))
        .pool_max_idle_per_host(cfg.connections)
        .user_agent(concat!("time_machine/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ReplayError::Client(e.to_string()))
}

/// Fluent construction of a [`ReplayScheduler`].
///
/// ```rust,ignore
/// let scheduler = ReplayBuilder::new()
///     .with_connections(10)
///     .with_timeout_secs(2.5)
///     .with_url_base("https://www.example.org")
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReplayBuilder {
    config: ReplayConfig,
}

impl ReplayBuilder {
    /// Start from default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub const fn from_config(config: ReplayConfig) -> Self {
        Self { config }
    }

    /// Set the concurrency gate size.
    #[must_use]
    pub const fn with_connections(mut self, connections: usize) -> Self {
        self.config.connections = connections;
        self
    }

    /// Set the per-request timeout in seconds.
    #[must_use]
    pub const fn with_timeout_secs(mut self, timeout_secs: f64) -> Self {
        self.config.timeout_secs = timeout_secs;
        self
    }

    /// Replay without honouring recorded delays.
    #[must_use]
    pub const fn ignore_delay(mut self, ignore_delay: bool) -> Self {
        self.config.ignore_delay = ignore_delay;
        self
    }

    /// Set the scheme and host prepended to every path.
    #[must_use]
    pub fn with_url_base(mut self, url_base: impl Into<String>) -> Self {
        self.config.url_base = url_base.into();
        self
    }

    /// Current configuration.
    pub const fn config(&self) -> &ReplayConfig {
        &self.config
    }

    /// Build a scheduler over a reqwest client.
    pub fn build(self) -> Result<ReplayScheduler, ReplayError> {
        ReplayScheduler::new(self.config)
    }

    /// Build a scheduler over a custom transport.
    pub fn build_with_transport<H: HttpTransport>(
        self,
        transport: H,
    ) -> Result<ReplayScheduler<H>, ReplayError> {
        ReplayScheduler::with_transport(self.config, transport)
    }
}
