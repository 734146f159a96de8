//! Dependency injection container for the smartcab application.
//!
//! The container wires a route planner into every agent it creates and
//! applies a default seed to agents and worlds that do not carry their own.

use super::config::{AgentConfig, WorldConfig};
use crate::{
    Result,
    ports::{Environment, RoutePlanner},
    q_learning::LearningAgent,
    world::{GridPlanner, GridWorld},
};

type PlannerFactory = Box<dyn Fn() -> Box<dyn RoutePlanner> + Send + Sync>;

fn grid_planner() -> Box<dyn RoutePlanner> {
    Box::new(GridPlanner::new())
}

/// Application with dependency injection.
///
/// # Examples
///
/// ## Production usage
///
/// ```
/// use smartcab::app::{AgentConfig, App, WorldConfig};
///
/// let app = App::new();
/// let world = app.create_world(WorldConfig::default().with_seed(7))?;
/// let agent = app.create_agent(&world, AgentConfig::new(true).with_seed(42))?;
/// # Ok::<(), smartcab::Error>(())
/// ```
///
/// ## Testing with dependency injection
///
/// ```
/// use smartcab::app::App;
/// use smartcab::world::GridPlanner;
///
/// let app = App::for_testing()
///     .with_planner(|| Box::new(GridPlanner::new()))
///     .with_default_seed(42)
///     .build();
/// ```
pub struct App {
    /// Builds the route planner handed to each new agent
    planner_factory: PlannerFactory,
    /// Default random seed (None = non-deterministic)
    default_seed: Option<u64>,
}

impl App {
    /// Create a new app with production defaults.
    ///
    /// Uses:
    /// - `GridPlanner` for routing
    /// - No default seed (non-deterministic RNG)
    pub fn new() -> Self {
        Self {
            planner_factory: Box::new(grid_planner),
            default_seed: None,
        }
    }

    /// Create a builder for constructing app with custom dependencies.
    pub fn for_testing() -> AppBuilder {
        AppBuilder::new()
    }

    /// Create a grid world.
    ///
    /// The default seed applies when the configuration has none.
    pub fn create_world(&self, mut config: WorldConfig) -> Result<GridWorld> {
        if config.seed.is_none() {
            config.seed = self.default_seed;
        }
        GridWorld::new(config)
    }

    /// Create a learning agent for `env` with the given configuration.
    ///
    /// The agent accepts the environment's declared actions and routes with
    /// a planner from the container.
    ///
    /// # Examples
    ///
    /// ```
    /// use smartcab::app::{AgentConfig, App, WorldConfig};
    /// use smartcab::ports::Driver;
    ///
    /// let app = App::new();
    /// let world = app.create_world(WorldConfig::default())?;
    /// let agent = app.create_agent(&world, AgentConfig::new(false))?;
    /// assert_eq!(agent.name(), "Random");
    /// # Ok::<(), smartcab::Error>(())
    /// ```
    pub fn create_agent(
        &self,
        env: &dyn Environment,
        mut config: AgentConfig,
    ) -> Result<LearningAgent> {
        // Apply seed from config or use container default
        if config.seed.is_none() {
            config.seed = self.default_seed;
        }
        LearningAgent::new(config, env.valid_actions(), (self.planner_factory)())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing app with custom dependencies.
pub struct AppBuilder {
    planner_factory: Option<PlannerFactory>,
    default_seed: Option<u64>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            planner_factory: None,
            default_seed: None,
        }
    }

    /// Set a custom route planner factory.
    pub fn with_planner<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn RoutePlanner> + Send + Sync + 'static,
    {
        self.planner_factory = Some(Box::new(factory));
        self
    }

    /// Set a default random seed for every agent and world the app creates.
    pub fn with_default_seed(mut self, seed: u64) -> Self {
        self.default_seed = Some(seed);
        self
    }

    /// Build the app with the configured dependencies.
    ///
    /// If no planner was specified, uses `GridPlanner` by default.
    pub fn build(self) -> App {
        App {
            planner_factory: self
                .planner_factory
                .unwrap_or_else(|| Box::new(grid_planner)),
            default_seed: self.default_seed,
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}
