//! smartcab: a tabular learning agent for a grid-world driving simulation
//!
//! This crate provides:
//! - A value-learning driving agent with an ε-greedy policy and decaying exploration
//! - Ports for the environment, the route planner, the driver and run observers
//! - A reference grid world with traffic lights, dummy traffic and right-of-way rules
//! - A simulator that trains, tests and logs the agent

pub mod app;
pub mod cli;
pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod ports;
pub mod q_learning;
pub mod types;
pub mod utils;
pub mod world;

pub use error::{Error, Result};
pub use q_learning::{DrivingState, LearningAgent, QTable};
pub use types::{Action, Heading, Inputs, Light};
