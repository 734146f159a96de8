//! Intersection traffic lights

use rand::{Rng, rngs::StdRng, seq::IndexedRandom};

use crate::{geometry::Direction, types::Light};

const PERIODS: [u64; 3] = [3, 4, 5];

/// A two-phase light that flips every `period` steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrafficLight {
    north_south_green: bool,
    period: u64,
    last_flip: u64,
}

impl TrafficLight {
    pub fn new(north_south_green: bool, period: u64) -> Self {
        Self {
            north_south_green,
            period: period.max(1),
            last_flip: 0,
        }
    }

    /// Random phase with a period drawn from 3, 4 or 5 steps.
    pub fn random(rng: &mut StdRng) -> Self {
        let period = PERIODS.choose(rng).copied().unwrap_or(PERIODS[0]);
        Self::new(rng.random::<bool>(), period)
    }

    /// Flip once `period` steps have passed since the last flip.
    pub fn update(&mut self, t: u64) {
        if t.saturating_sub(self.last_flip) >= self.period {
            self.north_south_green = !self.north_south_green;
            self.last_flip = t;
        }
    }

    /// Restart the flip clock for a new trial.
    pub fn reset(&mut self) {
        self.last_flip = 0;
    }

    /// Colour seen by a vehicle travelling in `direction`.
    pub fn light_for(&self, direction: Direction) -> Light {
        if direction.is_north_south() == self.north_south_green {
            Light::Green
        } else {
            Light::Red
        }
    }

    pub fn period(&self) -> u64 {
        self.period
    }
}
