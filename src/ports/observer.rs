//! Observer port - abstraction for simulation observation and data collection
//!
//! This port defines the interface for observing simulation events,
//! allowing composable data collection without coupling the simulator
//! to specific output formats or metrics.

use crate::{
    Result,
    pipeline::{TrialRecord, TrialStart},
    ports::StepRecord,
    q_learning::QTable,
};

/// Observer trait for monitoring a simulation run
///
/// # Event Sequence
///
/// 1. `on_run_start(label)` - Once at the beginning
/// 2. For each trial:
///    - `on_trial_start(start)`
///    - `on_step(...)` - For each step in the trial
///    - `on_trial_end(record)`
/// 3. `on_run_end(table)` - Once at the end
///
/// # Examples
///
/// ```no_run
/// use smartcab::{pipeline::TrialRecord, ports::Observer};
///
/// struct SuccessCounter {
///     successes: usize,
/// }
///
/// impl Observer for SuccessCounter {
///     fn on_trial_end(&mut self, record: &TrialRecord) -> smartcab::Result<()> {
///         if record.success {
///             self.successes += 1;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    /// Called when the run starts.
    ///
    /// # Parameters
    ///
    /// * `label` - Variant label of the run (used for output naming)
    fn on_run_start(&mut self, _label: &str) -> Result<()> {
        Ok(())
    }

    /// Called after the world and the driver have been reset for a trial.
    fn on_trial_start(&mut self, _start: &TrialStart) -> Result<()> {
        Ok(())
    }

    /// Called after every driver step.
    ///
    /// # Parameters
    ///
    /// * `trial` - 1-based trial number within its phase
    /// * `step` - 0-based step number within the trial
    /// * `record` - What the driver sensed, chose and earned
    fn on_step(&mut self, _trial: usize, _step: usize, _record: &StepRecord) -> Result<()> {
        Ok(())
    }

    /// Called when a trial reaches an outcome.
    fn on_trial_end(&mut self, _record: &TrialRecord) -> Result<()> {
        Ok(())
    }

    /// Called once the last testing trial finished.
    ///
    /// # Parameters
    ///
    /// * `table` - The driver's learned values, if it keeps any
    fn on_run_end(&mut self, _table: Option<&QTable>) -> Result<()> {
        Ok(())
    }
}
