//! # Time Machine
//!
//! Replays the requests recorded in an Apache access log against another host,
//! keeping the original spacing between requests while bounding how many are
//! in progress at once, and reports one result row per answered request.
//!
//! ## Pipeline
//!
//! ```text
//! access log -> ResourceDescriptor[] -> ReplayScheduler (gate) -> RequestExecutor -> ResultSink
//! ```
//!
//! - **Extraction** (`infra::access_log`): parses the combined log format and
//!   computes each request's delay relative to the first entry.
//! - **Scheduling** (`core::scheduler`): one tokio task per descriptor, all
//!   spawned up front. A task holds a semaphore slot from before its delay
//!   starts until its request finishes, so at most `connections` tasks are
//!   waiting or requesting at any instant.
//! - **Execution** (`core::executor`): waits, issues a GET, times it up to the
//!   response headers, and classifies the outcome. Timeouts, redirect loops and
//!   connect failures are dropped silently; other errors are logged.
//! - **Output** (`infra::jmeter`): JMeter-compatible CSV rows.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use time_machine::builders::ReplayBuilder;
//! use time_machine::infra::{parse_access_log, JmeterCsvSink};
//!
//! let resources = parse_access_log(std::io::BufReader::new(log_file))?;
//! let scheduler = ReplayBuilder::new()
//!     .with_connections(20)
//!     .with_url_base("https://www.example.org")
//!     .build()?;
//! let sink = Arc::new(JmeterCsvSink::create("results.csv")?);
//! let summary = scheduler.run(resources, Some(sink)).await?;
//! println!("{} answered, {} dropped", summary.completed, summary.ignored);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core replay abstractions: data model, execution, scheduling and sinks.
pub mod core;
/// Configuration models for replay runs.
pub mod config;
/// Builders to construct schedulers and HTTP clients from configuration.
pub mod builders;
/// Access-log input and result output adapters.
pub mod infra;
/// Whole-replay and sweep entry points.
pub mod runtime;
/// Shared utilities.
pub mod util;
