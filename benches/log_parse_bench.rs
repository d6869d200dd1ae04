//! Benchmarks for access-log extraction and scheduler overhead.
//!
//! Benchmarks cover:
//! - Parsing combined-format lines into descriptors
//! - Path normalisation
//! - Scheduling many zero-delay units through a small gate

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::time::Duration;

use async_trait::async_trait;
use time_machine::config::ReplayConfig;
use time_machine::core::{
    HttpResponse, HttpTransport, ReplayScheduler, ResourceDescriptor, TransportError,
};
use time_machine::infra::{normalize_path, parse_access_log};
use tokio::runtime::Runtime;

// ============================================================================
// Fixtures
// ============================================================================

fn make_log(lines: usize) -> String {
    (0..lines)
        .map(|i| {
            format!(
                r#"10.0.{}.{} - - [05/Mar/2020:10:{:02}:{:02} -0300] "GET https://www.scielo.br/j/abc/a/{i}?lang=en HTTP/1.1" 200 {} "-" "Mozilla/5.0""#,
                i / 256 % 256,
                i % 256,
                i / 60 % 60,
                i % 60,
                i * 7
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Clone)]
struct InstantTransport;

#[async_trait]
impl HttpTransport for InstantTransport {
    async fn get(&self, url: &str, _timeout: Duration) -> Result<HttpResponse, TransportError> {
        Ok(HttpResponse {
            url: url.to_string(),
            status: 200,
            reason: "OK".into(),
        })
    }
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_access_log");
    for lines in [100, 1_000, 10_000] {
        let log = make_log(lines);
        group.throughput(Throughput::Elements(lines as u64));
        group.bench_with_input(BenchmarkId::from_parameter(lines), &log, |b, log| {
            b.iter(|| parse_access_log(black_box(log.as_bytes())).unwrap());
        });
    }
    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("normalize_path", |b| {
        b.iter(|| normalize_path(black_box("https://www.scielo.br/scielo.php?script=sci_arttext")));
    });
}

fn bench_schedule(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("replay_scheduler");
    for units in [100, 1_000] {
        let resources: Vec<_> = (0..units)
            .map(|i| ResourceDescriptor::get(format!("/r{i}"), Duration::ZERO))
            .collect();
        group.throughput(Throughput::Elements(units as u64));
        group.bench_with_input(BenchmarkId::from_parameter(units), &resources, |b, resources| {
            let config = ReplayConfig {
                connections: 8,
                url_base: "http://bench.local".into(),
                ..ReplayConfig::default()
            };
            let scheduler = ReplayScheduler::with_transport(config, InstantTransport).unwrap();
            b.to_async(&rt)
                .iter(|| async { scheduler.run(resources.clone(), None).await.unwrap() });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_normalize, bench_schedule);
criterion_main!(benches);
