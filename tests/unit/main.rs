//! Unit tests for individual components

mod access_log_test;
mod builders_test;
mod config_test;
mod error_test;
mod sink_test;
mod util_test;
