//! Driver port - the surface the simulator drives
//!
//! A driver has exactly two entry points the simulator calls: `reset` at the
//! start of every trial and `update` once per step. The remaining methods are
//! read-only accessors used for reporting.

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    geometry::Location,
    ports::Environment,
    q_learning::{DrivingState, QTable},
    types::Action,
};

/// What happened during one `update` call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Encoded state the action was chosen in
    pub state: DrivingState,
    /// Action submitted to the environment
    pub action: Action,
    /// Reward the environment returned
    pub reward: f64,
    /// Deadline observed before acting
    pub deadline: i64,
    /// Whether the action came from the exploration branch
    pub explored: bool,
}

/// Driver trait - what a simulated vehicle controller must provide
///
/// # Examples
///
/// ```no_run
/// use smartcab::ports::{Driver, Environment};
///
/// fn one_trial<D: Driver, E: Environment>(driver: &mut D, env: &mut E) -> smartcab::Result<()> {
///     driver.reset(env, None, false)?;
///     driver.update(env)?;
///     Ok(())
/// }
/// ```
pub trait Driver {
    /// Get the driver's name.
    fn name(&self) -> &str;

    /// Prepare for a new trial.
    ///
    /// Routes toward `destination`, or toward one the environment draws when
    /// `None`, then moves the exploration schedule to the next episode.
    fn reset(
        &mut self,
        env: &mut dyn Environment,
        destination: Option<Location>,
        testing: bool,
    ) -> Result<()>;

    /// Sense, choose, act and learn for one step.
    fn update(&mut self, env: &mut dyn Environment) -> Result<StepRecord>;

    /// Whether the driver updates value estimates.
    fn learning(&self) -> bool;

    /// Exploration probability for the current trial.
    fn epsilon(&self) -> f64;

    /// Learning rate for the current trial.
    fn alpha(&self) -> f64;

    /// Learned values, for drivers that keep a table.
    ///
    /// # Default Implementation
    ///
    /// Returns `None`.
    fn q_table(&self) -> Option<&QTable> {
        None
    }
}
