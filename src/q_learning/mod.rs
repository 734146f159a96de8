//! Tabular value learning for the driving agent
//!
//! The agent keeps one value estimate per (state, action) pair and updates it
//! with a single-step weighted average of the observed reward:
//!
//! ```text
//! Q(s,a) ← α·r + (1 − α)·Q(s,a)
//! ```
//!
//! There is no discount factor and no bootstrapping from successor states, so
//! each estimate converges toward the expected immediate reward of taking `a`
//! in `s`.
//!
//! ## Components
//!
//! | Component | Type |
//! |-----------|------|
//! | State encoding | [`StateEncoder`] → [`DrivingState`] |
//! | Value table | [`QTable`] |
//! | Exploration schedule | [`ExplorationState`], [`DecayStrategy`] |
//! | Action selection | [`EpsilonGreedy`] |
//! | Step and trial orchestration | [`LearningAgent`] |
//!
//! ## Usage Example
//!
//! ```no_run
//! use smartcab::{
//!     app::AgentConfig,
//!     q_learning::LearningAgent,
//!     types::Action,
//!     world::GridPlanner,
//! };
//!
//! let config = AgentConfig::new(true).with_alpha(0.005).with_seed(7);
//! let agent = LearningAgent::new(config, &Action::ALL, Box::new(GridPlanner::new()))?;
//! # Ok::<(), smartcab::Error>(())
//! ```

pub mod agent;
pub mod policy;
pub mod q_table;
pub mod schedule;
pub mod state;

// Public re-exports
pub use agent::LearningAgent;
pub use policy::{Choice, EpsilonGreedy};
pub use q_table::{ActionValues, QTable, TieRule};
pub use schedule::{DecayStrategy, ExplorationState};
pub use state::{DrivingState, STATE_COUNT, StateEncoder};
