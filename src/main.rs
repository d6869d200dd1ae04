//! `time_machine` command-line entry point.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use time_machine::config::ReplayConfig;
use time_machine::core::{ReplayScheduler, ResultSink};
use time_machine::infra::{parse_access_log, JmeterCsvSink};
use time_machine::runtime::{run_sweep, sweep_pause, SweepPlan};
use time_machine::util::init_tracing;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Jmeter,
}

#[derive(Parser)]
#[command(name = "time_machine")]
#[command(about = "Replay an Apache access log against a website")]
#[command(version)]
struct Cli {
    /// Access log in Apache combined format
    log_file: PathBuf,

    /// Website receiving the requests (scheme + host), e.g. https://www.scielo.br
    url_base: Option<String>,

    /// Maximum number of concurrent connections [default: 50]
    #[arg(long)]
    connections: Option<usize>,

    /// Seconds to wait for each response [default: 10]
    #[arg(long)]
    timeout: Option<f64>,

    /// File receiving one row per answered request
    #[arg(long)]
    output_file: Option<PathBuf>,

    /// Format of the output file
    #[arg(long, value_enum, default_value = "jmeter")]
    output_format: OutputFormat,

    /// Send requests as fast as the connection limit allows instead of
    /// replaying the original timing
    #[arg(long)]
    dont_wait_until_request_time: bool,

    /// Run once per connection count, e.g. 10,20,30
    #[arg(long, value_delimiter = ',')]
    sweep: Vec<usize>,

    /// Seconds to pause between sweep runs
    #[arg(long, default_value_t = 60.0)]
    sweep_pause: f64,

    /// Directory for sweep output files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

impl Cli {
    fn config(&self) -> Result<ReplayConfig> {
        let mut cfg = ReplayConfig::from_env()?;
        if let Some(url_base) = &self.url_base {
            cfg.url_base.clone_from(url_base);
        }
        if let Some(connections) = self.connections {
            cfg.connections = connections;
        }
        if let Some(timeout) = self.timeout {
            cfg.timeout_secs = timeout;
        }
        cfg.ignore_delay |= self.dont_wait_until_request_time;
        cfg.validate()?;
        Ok(cfg)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = cli.config()?;

    let file = File::open(&cli.log_file)
        .with_context(|| format!("failed to open {}", cli.log_file.display()))?;
    let resources = parse_access_log(BufReader::new(file))
        .with_context(|| format!("failed to parse {}", cli.log_file.display()))?;

    if !cli.sweep.is_empty() {
        let plan = SweepPlan {
            connections: cli.sweep.clone(),
            pause: sweep_pause(cli.sweep_pause).context("invalid --sweep-pause")?,
            output_dir: cli.output_dir.clone(),
        };
        for run in run_sweep(&resources, &config, &plan).await? {
            tracing::info!(
                "{} connections: {} completed, {} ignored, {} unexpected in {:?} -> {}",
                run.connections,
                run.summary.completed,
                run.summary.ignored,
                run.summary.unexpected,
                run.summary.wall_time,
                run.output.display()
            );
        }
        return Ok(());
    }

    let sink = match (&cli.output_file, cli.output_format) {
        (Some(path), OutputFormat::Jmeter) => {
            let sink: Arc<dyn ResultSink> = Arc::new(
                JmeterCsvSink::create(path)
                    .with_context(|| format!("failed to create {}", path.display()))?,
            );
            Some(sink)
        }
        (None, _) => None,
    };

    let scheduler = ReplayScheduler::new(config)?;
    scheduler.run(resources, sink).await?;
    Ok(())
}
