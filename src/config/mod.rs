//! Configuration models for replay runs.

pub mod replay;

pub use replay::{ConfigError, ReplayConfig};
