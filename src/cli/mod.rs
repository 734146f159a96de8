//! CLI infrastructure for the smartcab simulator
//!
//! This module provides the command-line interface for running simulations
//! and inspecting the agent's state space.

pub mod commands;
pub mod output;
