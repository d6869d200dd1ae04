//! Tests for utility functions

use time_machine::util::{init_tracing, DEFAULT_FILTER};

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
    assert!(tracing::dispatcher::has_been_set());
}

#[test]
fn test_default_filter_parses() {
    assert!(DEFAULT_FILTER.parse::<tracing_subscriber::filter::Directive>().is_ok());
}
