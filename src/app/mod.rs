//! Application layer with dependency injection container.
//!
//! The container owns the infrastructure choices (which route planner agents
//! get, which seed applies by default) and provides factory methods for the
//! world and the agent.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │           Application Layer (app)           │
//! │  ┌──────────────────────────────────────┐   │
//! │  │            App (container)           │   │
//! │  └──────────────┬───────────────────────┘   │
//! │                 │ creates                    │
//! │                 ▼                            │
//! │  ┌──────────────────────────────────────┐   │
//! │  │  Adapters (world)                    │   │
//! │  │  - GridWorld                         │   │
//! │  │  - GridPlanner                       │   │
//! │  └──────────────┬───────────────────────┘   │
//! │                 │ implements                 │
//! │                 ▼                            │
//! │  ┌──────────────────────────────────────┐   │
//! │  │  Domain Ports (ports)                │   │
//! │  │  - Environment, RoutePlanner         │   │
//! │  └──────────────┬───────────────────────┘   │
//! │                 │ used by                    │
//! │                 ▼                            │
//! │  ┌──────────────────────────────────────┐   │
//! │  │  Domain Logic (q_learning)           │   │
//! │  │  - LearningAgent                     │   │
//! │  └──────────────────────────────────────┘   │
//! └─────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod container;

pub use config::{AgentConfig, WorldConfig};
pub use container::{App, AppBuilder};
