//! Configuration types for agent and world creation.

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    q_learning::{DecayStrategy, TieRule},
};

/// Configuration for creating a learning agent.
///
/// # Examples
///
/// ```
/// use smartcab::app::AgentConfig;
/// use smartcab::q_learning::DecayStrategy;
///
/// let config = AgentConfig::new(true)
///     .with_alpha(0.005)
///     .with_epsilon(1.0)
///     .with_decay(DecayStrategy::Exponential)
///     .with_seed(11_082_017);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Whether the agent updates its Q-table
    pub learning: bool,
    /// Exploration probability before the first trial
    pub epsilon: f64,
    /// Learning rate used by value updates
    pub alpha: f64,
    /// Constant driving the epsilon decay; falls back to `alpha` when unset
    pub decay_rate: Option<f64>,
    /// Epsilon decay strategy
    pub decay: DecayStrategy,
    /// Equality rule for greedy ties
    pub tie_rule: TieRule,
    /// Pre-populate every driving state at construction
    pub eager_states: bool,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl AgentConfig {
    /// Create a new agent configuration.
    ///
    /// Uses default values for other parameters:
    /// - epsilon 1.0, alpha 0.5
    /// - exponential decay driven by alpha
    /// - exact tie comparison
    /// - every driving state pre-populated
    /// - no seed (non-deterministic)
    pub fn new(learning: bool) -> Self {
        Self {
            learning,
            epsilon: 1.0,
            alpha: 0.5,
            decay_rate: None,
            decay: DecayStrategy::default(),
            tie_rule: TieRule::default(),
            eager_states: true,
            seed: None,
        }
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Decay epsilon with a constant other than alpha.
    pub fn with_decay_rate(mut self, rate: f64) -> Self {
        self.decay_rate = Some(rate);
        self
    }

    pub fn with_decay(mut self, decay: DecayStrategy) -> Self {
        self.decay = decay;
        self
    }

    pub fn with_tie_rule(mut self, tie_rule: TieRule) -> Self {
        self.tie_rule = tie_rule;
        self
    }

    pub fn with_eager_states(mut self, eager: bool) -> Self {
        self.eager_states = eager;
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Constant that drives the epsilon decay.
    pub fn effective_decay_rate(&self) -> f64 {
        self.decay_rate.unwrap_or(self.alpha)
    }

    /// Check every numeric field against its documented range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] when epsilon, alpha or the
    /// decay rate fall outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        check_unit("epsilon", self.epsilon)?;
        check_unit("alpha", self.alpha)?;
        if let Some(rate) = self.decay_rate {
            check_unit("decay rate", rate)?;
        }
        Ok(())
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Configuration for the reference grid world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Number of intersection columns and rows
    pub grid_size: (i32, i32),
    /// Number of dummy vehicles sharing the roads
    pub num_dummies: usize,
    /// End the trial as a failure when the deadline runs out
    pub enforce_deadline: bool,
    /// Deadline at which a trial is aborted regardless of enforcement
    pub hard_time_limit: i64,
    /// Random seed for traffic, lights and reward noise
    pub seed: Option<u64>,
}

impl WorldConfig {
    pub fn with_grid_size(mut self, columns: i32, rows: i32) -> Self {
        self.grid_size = (columns, rows);
        self
    }

    pub fn with_dummies(mut self, num_dummies: usize) -> Self {
        self.num_dummies = num_dummies;
        self
    }

    pub fn with_enforce_deadline(mut self, enforce: bool) -> Self {
        self.enforce_deadline = enforce;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The grid must be large enough to place start and destination at
    /// least four blocks apart.
    pub fn validate(&self) -> Result<()> {
        let (columns, rows) = self.grid_size;
        if columns < 1 || rows < 1 || columns + rows < 6 {
            return Err(Error::invalid_config(format!(
                "grid {columns}x{rows} is too small to route across"
            )));
        }
        if self.hard_time_limit > 0 {
            return Err(Error::invalid_config(format!(
                "hard time limit must not be positive, got {}",
                self.hard_time_limit
            )));
        }
        Ok(())
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            grid_size: (8, 6),
            num_dummies: 100,
            enforce_deadline: false,
            hard_time_limit: -100,
            seed: None,
        }
    }
}

fn check_unit(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::invalid_config(format!(
            "{name} must lie in [0, 1], got {value}"
        )))
    }
}
