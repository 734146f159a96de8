//! Ports (trait boundaries) between the agent and its collaborators.
//!
//! The agent owns these traits; the grid world, the planner and the simulator
//! observers implement or consume them.

pub mod driver;
pub mod environment;
pub mod observer;

pub use driver::{Driver, StepRecord};
pub use environment::{Environment, RoutePlanner};
pub use observer::Observer;
