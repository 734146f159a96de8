//! Common test doubles for the smartcab test suite.
//!
//! A scripted environment with fixed inputs and per-action rewards, and a
//! planner that always returns the same waypoint.

#![allow(dead_code)]

use std::collections::HashMap;

use rand::{Rng, rngs::StdRng};
use smartcab::{
    Error, Result,
    geometry::{Direction, Location, Pose},
    ports::{Environment, RoutePlanner},
    types::{Action, Heading, Inputs, Light},
};

/// Environment whose senses never change.
pub struct ScriptedEnvironment {
    pub inputs: Inputs,
    pub deadline: i64,
    pub rewards: HashMap<Action, f64>,
    pub valid: Vec<Action>,
    pub taken: Vec<Action>,
    pub pose: Pose,
}

impl ScriptedEnvironment {
    pub fn new(inputs: Inputs) -> Self {
        Self {
            inputs,
            deadline: 20,
            rewards: HashMap::new(),
            valid: Action::ALL.to_vec(),
            taken: Vec::new(),
            pose: Pose::new(Location::new(1, 1), Direction::East),
        }
    }

    /// Empty red-light intersection.
    pub fn red() -> Self {
        Self::new(Inputs::clear(Light::Red))
    }

    pub fn with_reward(mut self, action: Action, reward: f64) -> Self {
        self.rewards.insert(action, reward);
        self
    }

    pub fn with_valid(mut self, valid: &[Action]) -> Self {
        self.valid = valid.to_vec();
        self
    }
}

impl Environment for ScriptedEnvironment {
    fn valid_actions(&self) -> &[Action] {
        &self.valid
    }

    fn sense(&self) -> Inputs {
        self.inputs
    }

    fn deadline(&self) -> i64 {
        self.deadline
    }

    fn act(&mut self, action: Action) -> Result<f64> {
        if !self.valid.contains(&action) {
            return Err(Error::InvalidAction {
                action: action.to_string(),
            });
        }
        self.taken.push(action);
        self.deadline -= 1;
        Ok(self.rewards.get(&action).copied().unwrap_or(0.0))
    }

    fn pose(&self) -> Pose {
        self.pose
    }

    fn random_destination(&self, rng: &mut StdRng) -> Location {
        Location::new(rng.random_range(1..=8), rng.random_range(1..=6))
    }
}

/// Planner that always suggests the same heading.
pub struct FixedPlanner {
    pub waypoint: Option<Heading>,
    pub destination: Option<Location>,
}

impl FixedPlanner {
    pub fn new(waypoint: Option<Heading>) -> Self {
        Self {
            waypoint,
            destination: None,
        }
    }

    pub fn boxed(waypoint: Option<Heading>) -> Box<dyn RoutePlanner> {
        Box::new(Self::new(waypoint))
    }
}

impl RoutePlanner for FixedPlanner {
    fn route_to(&mut self, destination: Location) {
        self.destination = Some(destination);
    }

    fn destination(&self) -> Option<Location> {
        self.destination
    }

    fn next_waypoint(&self, _pose: &Pose) -> Option<Heading> {
        self.waypoint
    }
}
