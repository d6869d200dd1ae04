//! Replay scheduler: bounded-concurrency fan-out of execution units.
//!
//! Every descriptor gets its own tokio task, spawned up front in log order.
//! A unit must hold a gate slot (a semaphore permit) for its whole life: the
//! delay-wait, the request and the sink write. With a small gate, units that
//! are still waiting out their delay therefore occupy slots and later units
//! queue behind them, which can stretch a replay beyond the span of the
//! original log.
//!
//! Slots are granted in descriptor order. Each unit waits for its predecessor
//! to obtain a slot before queueing on the semaphore, and the semaphore itself
//! is FIFO.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::ReplayConfig;
use crate::core::{
    ExecutionOutcome, HttpTransport, NoopSink, ReplayError, ReqwestTransport, RequestExecutor,
    ResourceDescriptor, ResultSink,
};

/// Counters describing a finished replay run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Execution units created (one per descriptor).
    pub dispatched: usize,
    /// Units that received a response.
    pub completed: usize,
    /// Completed units whose result the sink failed to record.
    pub sink_errors: usize,
    /// Units dropped on a transient network failure.
    pub ignored: usize,
    /// Units that hit an unexpected error.
    pub unexpected: usize,
    /// Highest number of units observed holding a slot at once.
    pub peak_in_flight: usize,
    /// Time from first dispatch until every unit was terminal.
    pub wall_time: Duration,
}

impl ReplaySummary {
    /// Units that reached a terminal state.
    pub const fn terminal(&self) -> usize {
        self.completed + self.ignored + self.unexpected
    }
}

/// Occupancy of one run's gate.
#[derive(Debug, Default)]
struct GateStats {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

/// A held gate slot. Dropping it releases the permit.
struct SlotGuard {
    run: Arc<GateStats>,
    total: Arc<AtomicUsize>,
    _permit: OwnedSemaphorePermit,
}

impl SlotGuard {
    fn new(run: Arc<GateStats>, total: Arc<AtomicUsize>, permit: OwnedSemaphorePermit) -> Self {
        let holders = run.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        run.peak.fetch_max(holders, Ordering::AcqRel);
        total.fetch_add(1, Ordering::AcqRel);
        Self {
            run,
            total,
            _permit: permit,
        }
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        // Runs before the permit field is dropped.
        self.run.in_flight.fetch_sub(1, Ordering::AcqRel);
        self.total.fetch_sub(1, Ordering::AcqRel);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnitOutcome {
    Completed { recorded: bool },
    Ignored,
    Unexpected,
}

/// One execution unit: everything a spawned task needs for one descriptor.
struct Unit<H> {
    index: usize,
    descriptor: ResourceDescriptor,
    delay: Duration,
    prev_turn: Option<oneshot::Receiver<()>>,
    next_turn: oneshot::Sender<()>,
    gate: Arc<Semaphore>,
    stats: Arc<GateStats>,
    total: Arc<AtomicUsize>,
    executor: Arc<RequestExecutor<H>>,
    sink: Arc<dyn ResultSink>,
}

impl<H: HttpTransport> Unit<H> {
    async fn run(self) -> UnitOutcome {
        if let Some(prev) = self.prev_turn {
            // A dropped sender means the predecessor is gone; go ahead anyway.
            let _ = prev.await;
        }
        let permit = self.gate.acquire_owned().await;
        let _ = self.next_turn.send(());

        let _slot = match permit {
            Ok(permit) => SlotGuard::new(self.stats, self.total, permit),
            Err(err) => {
                tracing::error!("unit {} could not acquire a slot: {}", self.index, err);
                return UnitOutcome::Unexpected;
            }
        };
        tracing::trace!("unit {} acquired slot", self.index);

        match self.executor.execute(&self.descriptor, self.delay).await {
            ExecutionOutcome::Completed(result) => {
                let recorded = match self.sink.write_result(&self.descriptor, &result) {
                    Ok(()) => true,
                    Err(err) => {
                        tracing::error!("failed to record result for {}: {}", result.target_url, err);
                        false
                    }
                };
                UnitOutcome::Completed { recorded }
            }
            ExecutionOutcome::Ignorable(_) => UnitOutcome::Ignored,
            ExecutionOutcome::Unexpected(_) => UnitOutcome::Unexpected,
        }
    }
}

/// Drives a replay run over a shared HTTP transport.
///
/// The transport (and with it the connection pool) lives as long as the
/// scheduler and is shared by every unit of every run.
pub struct ReplayScheduler<H = ReqwestTransport> {
    config: ReplayConfig,
    executor: Arc<RequestExecutor<H>>,
    in_flight: Arc<AtomicUsize>,
}

impl ReplayScheduler<ReqwestTransport> {
    /// Validate `config` and build a scheduler over a fresh reqwest client.
    pub fn new(config: ReplayConfig) -> Result<Self, ReplayError> {
        config
            .validate()
            .map_err(|e| ReplayError::InvalidConfig(e.to_string()))?;
        let client = crate::builders::build_http_client(&config)?;
        Self::with_transport(config, ReqwestTransport::new(client))
    }
}

impl<H: HttpTransport> ReplayScheduler<H> {
    /// Validate `config` and build a scheduler over a custom transport.
    pub fn with_transport(config: ReplayConfig, transport: H) -> Result<Self, ReplayError> {
        config
            .validate()
            .map_err(|e| ReplayError::InvalidConfig(e.to_string()))?;
        let executor = RequestExecutor::new(transport, config.url_base.clone(), config.timeout());
        Ok(Self {
            config,
            executor: Arc::new(executor),
            in_flight: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Configuration this scheduler was built with.
    pub const fn config(&self) -> &ReplayConfig {
        &self.config
    }

    /// Units currently holding a gate slot, summed over every run in
    /// progress on this scheduler.
    ///
    /// Each run has its own gate, so with concurrent runs this can reach a
    /// multiple of `connections`. [`ReplaySummary::peak_in_flight`] is per run.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Replay `resources` and return once every unit is terminal.
    ///
    /// With `Some(sink)` the sink header is written once before any unit is
    /// spawned; with `None` results are discarded and no header is written.
    /// Individual request failures never fail the run.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::Sink`] if the header cannot be written. Nothing
    /// has been dispatched in that case.
    pub async fn run(
        &self,
        resources: Vec<ResourceDescriptor>,
        sink: Option<Arc<dyn ResultSink>>,
    ) -> Result<ReplaySummary, ReplayError> {
        let sink: Arc<dyn ResultSink> = match sink {
            Some(sink) => {
                sink.write_header()?;
                sink
            }
            None => Arc::new(NoopSink),
        };

        let span = tracing::info_span!(
            "replay",
            run_id = %Uuid::new_v4(),
            connections = self.config.connections
        );
        let gate = Arc::new(Semaphore::new(self.config.connections));
        let stats = Arc::new(GateStats::default());

        let total = resources.len();
        span.in_scope(|| tracing::info!("registered {} replay units", total));

        let started = Instant::now();
        let mut handles = Vec::with_capacity(total);
        let mut turn: Option<oneshot::Receiver<()>> = None;
        for (index, descriptor) in resources.into_iter().enumerate() {
            let (next_turn, next_rx) = oneshot::channel();
            let delay = if self.config.ignore_delay {
                Duration::ZERO
            } else {
                descriptor.delay
            };
            let unit = Unit {
                index,
                descriptor,
                delay,
                prev_turn: turn.replace(next_rx),
                next_turn,
                gate: Arc::clone(&gate),
                stats: Arc::clone(&stats),
                total: Arc::clone(&self.in_flight),
                executor: Arc::clone(&self.executor),
                sink: Arc::clone(&sink),
            };
            handles.push(tokio::spawn(unit.run().instrument(span.clone())));
        }

        let mut summary = ReplaySummary {
            dispatched: total,
            ..ReplaySummary::default()
        };
        for handle in handles {
            match handle.await {
                Ok(UnitOutcome::Completed { recorded }) => {
                    summary.completed += 1;
                    if !recorded {
                        summary.sink_errors += 1;
                    }
                }
                Ok(UnitOutcome::Ignored) => summary.ignored += 1,
                Ok(UnitOutcome::Unexpected) => summary.unexpected += 1,
                Err(err) => {
                    span.in_scope(|| tracing::error!("replay unit aborted: {}", err));
                    summary.unexpected += 1;
                }
            }
        }

        if let Err(err) = sink.flush() {
            span.in_scope(|| tracing::error!("failed to flush results: {}", err));
        }

        summary.peak_in_flight = stats.peak.load(Ordering::Acquire);
        summary.wall_time = started.elapsed();
        span.in_scope(|| {
            tracing::info!(
                "replay finished in {:?}: {} completed, {} ignored, {} unexpected (peak {} slots)",
                summary.wall_time,
                summary.completed,
                summary.ignored,
                summary.unexpected,
                summary.peak_in_flight
            );
        });
        Ok(summary)
    }
}
