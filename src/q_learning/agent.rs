//! Learning agent: per-step and per-trial orchestration
//!
//! The agent owns its Q-table, its exploration schedule, its route planner and
//! the one seeded random source every random choice it makes is drawn from.

use rand::rngs::StdRng;
use tracing::debug;

use crate::{
    app::AgentConfig,
    error::Result,
    geometry::Location,
    ports::{Driver, Environment, RoutePlanner, StepRecord},
    q_learning::{
        policy::{Choice, EpsilonGreedy},
        q_table::QTable,
        schedule::ExplorationState,
        state::{DrivingState, StateEncoder},
    },
    types::Action,
    utils::seeded_rng,
};

/// Tabular agent that learns the expected immediate reward of each action.
pub struct LearningAgent {
    config: AgentConfig,
    planner: Box<dyn RoutePlanner>,
    q_table: QTable,
    exploration: ExplorationState,
    encoder: StateEncoder,
    policy: EpsilonGreedy,
    rng: StdRng,
    frozen: bool,
}

impl LearningAgent {
    /// Create an agent for a world that accepts `valid_actions`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfiguration`] for out-of-range
    /// parameters and [`crate::Error::NoValidActions`] for an empty action set.
    pub fn new(
        config: AgentConfig,
        valid_actions: &[Action],
        planner: Box<dyn RoutePlanner>,
    ) -> Result<Self> {
        config.validate()?;

        let q_table = if config.eager_states {
            QTable::prepopulated(valid_actions, config.tie_rule)?
        } else {
            QTable::new(valid_actions, config.tie_rule)?
        };
        let exploration = ExplorationState::new(
            config.epsilon,
            config.alpha,
            config.effective_decay_rate(),
            config.decay,
        );
        let rng = seeded_rng(config.seed);

        Ok(Self {
            config,
            planner,
            q_table,
            exploration,
            encoder: StateEncoder,
            policy: EpsilonGreedy,
            rng,
            frozen: false,
        })
    }

    /// Build the current state from the planner and the environment.
    pub fn build_state(&self, env: &dyn Environment) -> Result<DrivingState> {
        let waypoint = self.planner.next_waypoint(&env.pose());
        self.encoder.encode(waypoint, &env.sense(), env.deadline())
    }

    /// Make sure `state` has a row.
    ///
    /// Does nothing when not learning or during a testing trial, where the
    /// table is read-only.
    pub fn ensure_row(&mut self, state: DrivingState) -> bool {
        if !self.config.learning || self.frozen {
            return false;
        }
        self.q_table.ensure(state)
    }

    /// ε-greedy choice for `state` among `valid_actions`.
    ///
    /// A state first met during a testing trial has no row; every action is
    /// tied at the default value there, so the choice is uniform.
    pub fn choose_action(
        &mut self,
        state: &DrivingState,
        valid_actions: &[Action],
    ) -> Result<(Action, Choice)> {
        let unseen = self.frozen && !self.q_table.contains(state);
        self.policy.select(
            &self.q_table,
            state,
            self.exploration.epsilon(),
            self.config.learning && !unseen,
            valid_actions,
            &mut self.rng,
        )
    }

    /// Fold `reward` into the estimate for `(state, action)`.
    ///
    /// Does nothing when not learning or during a testing trial.
    pub fn learn(&mut self, state: &DrivingState, action: Action, reward: f64) -> Result<()> {
        if !self.config.learning || self.frozen {
            return Ok(());
        }
        self.q_table
            .blend(state, action, reward, self.exploration.alpha())?;
        Ok(())
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn table(&self) -> &QTable {
        &self.q_table
    }

    pub fn exploration(&self) -> &ExplorationState {
        &self.exploration
    }

    pub fn planner(&self) -> &dyn RoutePlanner {
        self.planner.as_ref()
    }
}

impl Driver for LearningAgent {
    fn name(&self) -> &str {
        if self.config.learning {
            "Learning"
        } else {
            "Random"
        }
    }

    fn reset(
        &mut self,
        env: &mut dyn Environment,
        destination: Option<Location>,
        testing: bool,
    ) -> Result<()> {
        let destination = match destination {
            Some(destination) => destination,
            None => env.random_destination(&mut self.rng),
        };
        self.planner.route_to(destination);
        self.exploration.advance(testing);
        self.frozen = testing;

        debug!(
            %destination,
            testing,
            epsilon = self.exploration.epsilon(),
            alpha = self.exploration.alpha(),
            episodes = self.exploration.episodes(),
            "agent reset"
        );
        Ok(())
    }

    fn update(&mut self, env: &mut dyn Environment) -> Result<StepRecord> {
        let deadline = env.deadline();
        let state = self.build_state(env)?;
        self.ensure_row(state);
        let (action, choice) = self.choose_action(&state, env.valid_actions())?;
        let reward = env.act(action)?;
        self.learn(&state, action, reward)?;

        debug!(%state, %action, reward, deadline, ?choice, "agent step");

        Ok(StepRecord {
            state,
            action,
            reward,
            deadline,
            explored: choice == Choice::Explore,
        })
    }

    fn learning(&self) -> bool {
        self.config.learning
    }

    fn epsilon(&self) -> f64 {
        self.exploration.epsilon()
    }

    fn alpha(&self) -> f64 {
        self.exploration.alpha()
    }

    fn q_table(&self) -> Option<&QTable> {
        Some(&self.q_table)
    }
}
