//! Exploration schedule: how epsilon and alpha evolve across episodes

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Epsilon decay as a function of completed training episodes `t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecayStrategy {
    /// ε = 1 − rate·t
    Linear,
    /// ε = exp(−rate·t)
    #[default]
    Exponential,
}

impl DecayStrategy {
    /// Exploration probability after `t` training episodes, clamped to `[0, 1]`.
    pub fn epsilon(self, t: u64, rate: f64) -> f64 {
        let t = t as f64;
        let raw = match self {
            DecayStrategy::Linear => 1.0 - rate * t,
            DecayStrategy::Exponential => (-rate * t).exp(),
        };
        raw.clamp(0.0, 1.0)
    }
}

impl fmt::Display for DecayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecayStrategy::Linear => f.write_str("linear"),
            DecayStrategy::Exponential => f.write_str("exponential"),
        }
    }
}

impl FromStr for DecayStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(DecayStrategy::Linear),
            "exponential" | "exp" => Ok(DecayStrategy::Exponential),
            _ => Err(Error::ParseDecayStrategy {
                input: s.to_string(),
            }),
        }
    }
}

/// Per-episode exploration parameters.
///
/// `rate` is fixed at construction and only drives the epsilon decay; the
/// `alpha` used by value updates stays at its configured value for every
/// training episode and drops to zero for testing episodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExplorationState {
    epsilon: f64,
    alpha: f64,
    t: u64,
    rate: f64,
    configured_alpha: f64,
    decay: DecayStrategy,
}

impl ExplorationState {
    pub fn new(epsilon: f64, alpha: f64, rate: f64, decay: DecayStrategy) -> Self {
        Self {
            epsilon,
            alpha,
            t: 0,
            rate,
            configured_alpha: alpha,
            decay,
        }
    }

    /// Move to the next episode.
    ///
    /// Testing episodes zero both epsilon and alpha and leave the counter
    /// alone. Training episodes recompute epsilon from the number of training
    /// episodes completed so far, then count this one.
    pub fn advance(&mut self, testing: bool) {
        if testing {
            self.epsilon = 0.0;
            self.alpha = 0.0;
        } else {
            self.epsilon = self.decay.epsilon(self.t, self.rate);
            self.alpha = self.configured_alpha;
            self.t += 1;
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Training episodes started so far.
    pub fn episodes(&self) -> u64 {
        self.t
    }
}
