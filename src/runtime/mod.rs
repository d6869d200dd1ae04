//! Application surface: whole replays and connection sweeps.

pub mod api;

pub use api::{replay_log, run_sweep, sweep_output_path, sweep_pause, SweepPlan, SweepRun};
