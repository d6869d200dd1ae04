//! Tests for result sinks

use std::time::Duration;

use chrono::Utc;
use time_machine::core::{
    InMemorySink, NoopSink, RequestResult, ResourceDescriptor, ResultSink, SinkEvent,
};

fn result(status_code: u16) -> RequestResult {
    let now = Utc::now();
    RequestResult {
        target_url: "http://host/a".to_string(),
        status_code,
        reason_phrase: "OK".to_string(),
        success: RequestResult::is_success_status(status_code),
        start_time: now,
        end_time: now,
        elapsed: Duration::from_millis(3),
    }
}

#[test]
fn test_in_memory_sink_records_calls_in_order() {
    let sink = InMemorySink::new();
    let descriptor = ResourceDescriptor::get("/a", Duration::ZERO);

    sink.write_header().unwrap();
    sink.write_result(&descriptor, &result(200)).unwrap();
    sink.flush().unwrap();

    let events = sink.events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0], SinkEvent::Header);
    assert!(matches!(&events[1], SinkEvent::Result { path, .. } if path == "/a"));
    assert_eq!(events[2], SinkEvent::Flush);
    assert_eq!(sink.header_count(), 1);
}

#[test]
fn test_in_memory_sink_results() {
    let sink = InMemorySink::new();
    sink.write_result(&ResourceDescriptor::get("/a", Duration::ZERO), &result(200))
        .unwrap();
    sink.write_result(&ResourceDescriptor::get("/b", Duration::ZERO), &result(404))
        .unwrap();

    let results = sink.results();
    assert_eq!(results.len(), 2);
    assert_eq!(results[1].0, "/b");
    assert!(!results[1].1.success);
    assert_eq!(sink.header_count(), 0);
}

#[test]
fn test_noop_sink_accepts_everything() {
    let sink = NoopSink;
    assert!(sink.write_header().is_ok());
    assert!(sink
        .write_result(&ResourceDescriptor::get("/", Duration::ZERO), &result(500))
        .is_ok());
    assert!(sink.flush().is_ok());
}
