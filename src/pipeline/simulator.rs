//! Simulation pipeline: training trials, then testing trials

use std::{path::PathBuf, thread, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    Error, Result,
    geometry::{Location, Pose},
    ports::{Driver, Environment, Observer},
    utils::{mean, rate},
    world::{GridWorld, TrialOutcome, Violation},
};

/// Training trials run before the exploration tolerance is consulted.
pub const MIN_TRAINING_TRIALS: usize = 20;

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Seconds to pause after every step
    pub update_delay: f64,

    /// Emit a trace line per step
    pub display: bool,

    /// Write the per-trial CSV log and the Q-table dump
    pub log_metrics: bool,

    /// Label the run as the improved learning variant
    pub optimized: bool,

    /// Number of testing trials
    pub n_test: usize,

    /// Training stops once epsilon falls to this value
    pub tolerance: f64,

    /// Upper bound on training trials for schedules that never reach the tolerance
    pub max_training_trials: usize,

    /// Directory for log files
    pub output_dir: PathBuf,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            update_delay: 0.0,
            display: false,
            log_metrics: false,
            optimized: false,
            n_test: 10,
            tolerance: 0.05,
            max_training_trials: 100_000,
            output_dir: PathBuf::from("logs"),
        }
    }
}

impl SimulationConfig {
    pub fn with_n_test(mut self, n_test: usize) -> Self {
        self.n_test = n_test;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_optimized(mut self, optimized: bool) -> Self {
        self.optimized = optimized;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_max_training_trials(mut self, trials: usize) -> Self {
        self.max_training_trials = trials;
        self
    }

    /// Variant label used to name log files.
    pub fn variant(&self, learning: bool) -> &'static str {
        if !learning {
            "no-learning"
        } else if self.optimized {
            "improved-learning"
        } else {
            "default-learning"
        }
    }

    /// Pause inserted after every step.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] when `update_delay` is negative,
    /// not finite or too large for a [`Duration`].
    pub fn step_delay(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(self.update_delay).map_err(|err| {
            Error::invalid_config(format!(
                "update delay must be a non-negative number of seconds, got {}: {err}",
                self.update_delay
            ))
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.step_delay()?;
        if !(0.0..=1.0).contains(&self.tolerance) {
            return Err(Error::invalid_config(format!(
                "tolerance must lie in [0, 1], got {}",
                self.tolerance
            )));
        }
        if self.max_training_trials < MIN_TRAINING_TRIALS {
            return Err(Error::invalid_config(format!(
                "max training trials must be at least {MIN_TRAINING_TRIALS}, got {}",
                self.max_training_trials
            )));
        }
        Ok(())
    }
}

/// Trial parameters observers see before the first step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialStart {
    pub trial: usize,
    pub testing: bool,
    pub epsilon: f64,
    pub alpha: f64,
    pub start: Pose,
    pub destination: Location,
    pub deadline: i64,
}

/// One row of the trial log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    /// 1-based trial number within its phase
    pub trial: usize,
    pub testing: bool,
    pub epsilon: f64,
    pub alpha: f64,
    pub initial_deadline: i64,
    pub final_deadline: i64,
    pub net_reward: f64,
    pub steps: u64,
    pub legal_actions: u32,
    pub minor_violations: u32,
    pub major_violations: u32,
    pub minor_accidents: u32,
    pub major_accidents: u32,
    pub arrived: bool,
    pub success: bool,
}

impl TrialRecord {
    /// Rule violations of any class.
    pub fn violations(&self) -> u32 {
        self.minor_violations + self.major_violations + self.minor_accidents + self.major_accidents
    }

    pub fn accidents(&self) -> u32 {
        self.minor_accidents + self.major_accidents
    }
}

/// Aggregates over the trials of one phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseSummary {
    pub trials: usize,
    pub successes: usize,
    pub success_rate: f64,
    pub mean_net_reward: f64,
    pub mean_reward_per_step: f64,
    pub violations: u32,
    pub accidents: u32,
    /// Running sums the means are derived from
    pub total_reward: f64,
    pub total_steps: u64,
}

impl PhaseSummary {
    pub fn record(&mut self, record: &TrialRecord) {
        self.trials += 1;
        if record.success {
            self.successes += 1;
        }
        self.violations += record.violations();
        self.accidents += record.accidents();
        self.total_reward += record.net_reward;
        self.total_steps += record.steps;

        self.success_rate = rate(self.successes, self.trials);
        self.mean_net_reward = self.total_reward / self.trials as f64;
        self.mean_reward_per_step = if self.total_steps == 0 {
            0.0
        } else {
            self.total_reward / self.total_steps as f64
        };
    }

    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a TrialRecord>) -> Self {
        let mut summary = Self::default();
        for record in records {
            summary.record(record);
        }
        summary
    }
}

/// Result of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub variant: String,
    pub driver: String,
    pub learning: bool,
    pub config: SimulationConfig,
    pub training: PhaseSummary,
    pub testing: PhaseSummary,
    /// Exploration rate after the last training trial
    pub final_training_epsilon: f64,
    /// Rows held by the driver's table, if it keeps one
    pub states_learned: Option<usize>,
    /// Mean per-trial net reward of the last ten training trials
    pub recent_training_reward: Option<f64>,
}

impl SimulationReport {
    /// Save report to JSON file
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load report from JSON file
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let report = serde_json::from_reader(file)?;
        Ok(report)
    }
}

/// Drives a [`Driver`] through training and testing trials in a [`GridWorld`].
///
/// # Examples
///
/// ```no_run
/// use smartcab::{
///     app::{AgentConfig, App, WorldConfig},
///     pipeline::{SimulationConfig, Simulator},
/// };
///
/// let app = App::new();
/// let mut world = app.create_world(WorldConfig::default())?;
/// let mut agent = app.create_agent(&world, AgentConfig::new(true).with_alpha(0.01))?;
///
/// let mut simulator = Simulator::new(SimulationConfig::default().with_n_test(10))?;
/// let report = simulator.run(&mut world, &mut agent)?;
/// println!("testing success rate {:.2}", report.testing.success_rate);
/// # Ok::<(), smartcab::Error>(())
/// ```
pub struct Simulator {
    config: SimulationConfig,
    observers: Vec<Box<dyn Observer>>,
}

impl Simulator {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            observers: Vec::new(),
        })
    }

    /// Add an observer to the simulator
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run every training trial, then `n_test` testing trials.
    ///
    /// Training lasts at least [`MIN_TRAINING_TRIALS`] trials. A learning
    /// driver keeps training until its epsilon falls to the tolerance; a
    /// non-learning driver stops at the minimum.
    ///
    /// # Errors
    ///
    /// Any error from the driver, the world or an observer aborts the run.
    pub fn run(&mut self, world: &mut GridWorld, driver: &mut dyn Driver) -> Result<SimulationReport> {
        let learning = driver.learning();
        let variant = self.config.variant(learning);
        info!(variant, driver = driver.name(), "simulation started");

        for observer in &mut self.observers {
            observer.on_run_start(variant)?;
        }

        let mut training = Vec::new();
        loop {
            if training.len() >= MIN_TRAINING_TRIALS {
                if !learning || driver.epsilon() <= self.config.tolerance {
                    break;
                }
                if training.len() >= self.config.max_training_trials {
                    warn!(
                        trials = training.len(),
                        epsilon = driver.epsilon(),
                        tolerance = self.config.tolerance,
                        "training stopped before epsilon reached the tolerance"
                    );
                    break;
                }
            }
            let record = self.run_trial(world, driver, training.len() + 1, false)?;
            training.push(record);
        }
        let final_training_epsilon = driver.epsilon();

        let mut testing = Vec::with_capacity(self.config.n_test);
        for trial in 1..=self.config.n_test {
            testing.push(self.run_trial(world, driver, trial, true)?);
        }

        for observer in &mut self.observers {
            observer.on_run_end(driver.q_table())?;
        }

        let recent = training.len().saturating_sub(10);
        let report = SimulationReport {
            variant: variant.to_string(),
            driver: driver.name().to_string(),
            learning,
            config: self.config.clone(),
            training: PhaseSummary::from_records(&training),
            testing: PhaseSummary::from_records(&testing),
            final_training_epsilon,
            states_learned: driver.q_table().map(|table| table.len()),
            recent_training_reward: mean(training[recent..].iter().map(|r| r.net_reward)),
        };

        info!(
            training_trials = report.training.trials,
            testing_success_rate = report.testing.success_rate,
            "simulation finished"
        );
        Ok(report)
    }

    fn run_trial(
        &mut self,
        world: &mut GridWorld,
        driver: &mut dyn Driver,
        trial: usize,
        testing: bool,
    ) -> Result<TrialRecord> {
        let destination = world.begin_trial();
        driver.reset(world, Some(destination), testing)?;

        let start = TrialStart {
            trial,
            testing,
            epsilon: driver.epsilon(),
            alpha: driver.alpha(),
            start: world.pose(),
            destination,
            deadline: world.deadline(),
        };
        for observer in &mut self.observers {
            observer.on_trial_start(&start)?;
        }

        let delay = self.config.step_delay()?;
        let mut step = 0;
        while !world.is_done() {
            let record = driver.update(world)?;
            world.advance();
            for observer in &mut self.observers {
                observer.on_step(trial, step, &record)?;
            }
            step += 1;
            if !delay.is_zero() {
                thread::sleep(delay);
            }
        }

        let stats = world.stats();
        let outcome = world.outcome();
        let record = TrialRecord {
            trial,
            testing,
            epsilon: start.epsilon,
            alpha: start.alpha,
            initial_deadline: stats.initial_deadline,
            final_deadline: stats.final_deadline,
            net_reward: stats.net_reward,
            steps: stats.steps,
            legal_actions: stats.count(Violation::None),
            minor_violations: stats.count(Violation::Minor),
            major_violations: stats.count(Violation::Major),
            minor_accidents: stats.count(Violation::MinorAccident),
            major_accidents: stats.count(Violation::MajorAccident),
            arrived: matches!(outcome, Some(TrialOutcome::Arrived { .. })),
            success: outcome.is_some_and(TrialOutcome::is_success),
        };

        debug!(
            trial,
            testing,
            success = record.success,
            net_reward = record.net_reward,
            steps = record.steps,
            "trial finished"
        );
        for observer in &mut self.observers {
            observer.on_trial_end(&record)?;
        }
        Ok(record)
    }
}
