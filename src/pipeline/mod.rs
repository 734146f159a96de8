//! Simulation pipeline
//!
//! This module provides:
//! - The [`Simulator`] that runs training and testing trials
//! - Trial and run records for reporting
//! - Observers that record what happens during a run

pub mod observers;
pub mod simulator;

pub use observers::{CsvTrialObserver, MetricsObserver, ProgressObserver, TraceObserver};
pub use simulator::{
    MIN_TRAINING_TRIALS, PhaseSummary, SimulationConfig, SimulationReport, Simulator, TrialRecord,
    TrialStart,
};

pub use crate::ports::Observer;
