//! Entry points used by the CLI and by embedders.

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use crate::config::ReplayConfig;
use crate::core::{AppResult, ReplayScheduler, ReplaySummary, ResourceDescriptor, ResultSink};
use crate::infra::{parse_access_log, JmeterCsvSink};

/// Parse an access log and replay it.
///
/// The log is parsed completely before the scheduler or the sink is touched,
/// so a malformed line aborts without any network activity or output.
pub async fn replay_log<R: BufRead>(
    reader: R,
    config: ReplayConfig,
    sink: Option<Arc<dyn ResultSink>>,
) -> AppResult<ReplaySummary> {
    let resources = parse_access_log(reader).context("failed to parse access log")?;
    let scheduler = ReplayScheduler::new(config).context("failed to start replay")?;
    let summary = scheduler.run(resources, sink).await?;
    Ok(summary)
}

/// Repeated replays of one log at increasing concurrency.
#[derive(Debug, Clone)]
pub struct SweepPlan {
    /// Gate size for each run, in order.
    pub connections: Vec<usize>,
    /// Cool-down between consecutive runs.
    pub pause: Duration,
    /// Directory receiving one CSV per run.
    pub output_dir: PathBuf,
}

/// Outcome of one sweep run.
#[derive(Debug, Clone)]
pub struct SweepRun {
    /// Gate size used.
    pub connections: usize,
    /// CSV written for this run.
    pub output: PathBuf,
    /// Run counters.
    pub summary: ReplaySummary,
}

/// CSV path for a sweep run with `connections` slots.
pub fn sweep_output_path(dir: &Path, connections: usize) -> PathBuf {
    dir.join(format!("{connections}-connections.csv"))
}

/// Convert a cool-down given in seconds, rejecting negative, non-finite and
/// out-of-range values.
pub fn sweep_pause(secs: f64) -> AppResult<Duration> {
    if secs < 0.0 {
        anyhow::bail!("sweep pause must be a non-negative number of seconds, got {secs}");
    }
    Duration::try_from_secs_f64(secs)
        .with_context(|| format!("sweep pause of {secs} seconds is out of range"))
}

/// Replay `resources` once per entry of `plan.connections`, ignoring delays.
///
/// Every configuration is validated before the first run starts.
pub async fn run_sweep(
    resources: &[ResourceDescriptor],
    base: &ReplayConfig,
    plan: &SweepPlan,
) -> AppResult<Vec<SweepRun>> {
    let configs = plan
        .connections
        .iter()
        .map(|&connections| -> AppResult<ReplayConfig> {
            let cfg = ReplayConfig {
                connections,
                ignore_delay: true,
                ..base.clone()
            };
            cfg.validate()
                .with_context(|| format!("invalid sweep step {connections}"))?;
            Ok(cfg)
        })
        .collect::<AppResult<Vec<_>>>()?;

    let mut runs = Vec::with_capacity(configs.len());
    for (step, cfg) in configs.into_iter().enumerate() {
        if step > 0 && !plan.pause.is_zero() {
            tracing::info!("sleeping {:?} before the next sweep run", plan.pause);
            tokio::time::sleep(plan.pause).await;
        }

        let connections = cfg.connections;
        let output = sweep_output_path(&plan.output_dir, connections);
        tracing::info!("starting sweep run with {} connections", connections);

        let sink: Arc<dyn ResultSink> = Arc::new(
            JmeterCsvSink::create(&output)
                .with_context(|| format!("failed to create {}", output.display()))?,
        );
        let scheduler = ReplayScheduler::new(cfg)?;
        let summary = scheduler.run(resources.to_vec(), Some(sink)).await?;
        runs.push(SweepRun {
            connections,
            output,
            summary,
        });
    }
    Ok(runs)
}
