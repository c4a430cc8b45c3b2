//! Training runs: evolve a population against the flappy world and report
//! how it went.
//!
//! The runner is frontend-agnostic, so the same code drives the interactive
//! terminal view and headless batch runs.

mod config;
mod report;
mod runner;

pub use config::TrainConfig;
pub use report::TrainReport;
pub use runner::{replay, run_training, ReplaySummary, TrainOutcome};
