//! Reference grid world with signalled intersections and dummy traffic
//!
//! The world is one [`crate::ports::Environment`] implementation. It places
//! the primary vehicle and its destination, runs rule-abiding dummy vehicles
//! through the same intersections, scores every primary move against the
//! right-of-way rules in [`rules`] and ends a trial on arrival, on deadline
//! expiry (when enforced) or at the hard time limit.

pub mod grid;
pub mod lights;
pub mod planner;
pub mod rules;

pub use grid::{GridWorld, TrialOutcome, TrialStats, sense_among};
pub use lights::TrafficLight;
pub use planner::GridPlanner;
pub use rules::Violation;
