//! Grid world: the reference environment for the primary vehicle

use std::{collections::HashMap, iter};

use rand::{Rng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    Result,
    app::WorldConfig,
    error::Error,
    geometry::{Direction, Location, Pose},
    ports::{Environment, RoutePlanner},
    types::{Action, Heading, Inputs, Light, Traffic},
    utils::seeded_rng,
    world::{
        lights::TrafficLight,
        planner::GridPlanner,
        rules::{self, Violation},
    },
};

/// Minimum Manhattan distance between start and destination.
const MIN_ROUTE_LENGTH: i64 = 4;

/// Steps allowed per block of route length.
const DEADLINE_FACTOR: i64 = 5;

/// Reward for reaching the destination.
const ARRIVAL_BONUS: f64 = 10.0;

/// How a trial ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialOutcome {
    /// Reached the destination, on time or late
    Arrived { on_time: bool },
    /// Ran out of time with the deadline enforced
    DeadlineExpired,
    /// Hit the hard time limit
    Aborted,
}

impl TrialOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, TrialOutcome::Arrived { on_time: true })
    }
}

/// Per-trial bookkeeping for the primary vehicle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrialStats {
    pub initial_deadline: i64,
    pub final_deadline: i64,
    pub net_reward: f64,
    pub steps: u64,
    /// Tally per [`Violation::index`]
    pub violations: [u32; 5],
}

impl TrialStats {
    pub fn count(&self, violation: Violation) -> u32 {
        self.violations[violation.index()]
    }
}

#[derive(Debug, Clone, Copy)]
struct Dummy {
    pose: Pose,
    intent: Heading,
}

#[derive(Debug, Clone, Copy)]
struct Primary {
    pose: Pose,
    destination: Location,
    deadline: i64,
    intent: Traffic,
}

/// Wrap-around grid of signalled intersections shared with dummy traffic.
///
/// The world keeps its own route to the trial destination so it can reward
/// moves that follow it, independent of the driver's planner.
pub struct GridWorld {
    config: WorldConfig,
    lights: HashMap<Location, TrafficLight>,
    dummies: Vec<Dummy>,
    primary: Primary,
    route: GridPlanner,
    rng: StdRng,
    t: u64,
    stats: TrialStats,
    outcome: Option<TrialOutcome>,
}

impl GridWorld {
    /// Create a world and its lights. Call [`GridWorld::begin_trial`] before
    /// the first step.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] when the configuration fails
    /// [`WorldConfig::validate`].
    pub fn new(config: WorldConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = seeded_rng(config.seed);
        let (columns, rows) = config.grid_size;

        let mut lights = HashMap::new();
        for x in 1..=columns {
            for y in 1..=rows {
                lights.insert(Location::new(x, y), TrafficLight::random(&mut rng));
            }
        }

        let origin = Location::new(1, 1);
        Ok(Self {
            config,
            lights,
            dummies: Vec::new(),
            primary: Primary {
                pose: Pose::new(origin, Direction::East),
                destination: origin,
                deadline: 0,
                intent: None,
            },
            route: GridPlanner::new(),
            rng,
            t: 0,
            stats: TrialStats::default(),
            outcome: None,
        })
    }

    /// Place every vehicle for a new trial and return the destination.
    pub fn begin_trial(&mut self) -> Location {
        let (start, destination) = loop {
            let start = self.random_location();
            let destination = self.random_location();
            if start.manhattan(destination) >= MIN_ROUTE_LENGTH {
                break (start, destination);
            }
        };
        let deadline = DEADLINE_FACTOR * start.manhattan(destination);
        let direction = self.random_direction();

        self.primary = Primary {
            pose: Pose::new(start, direction),
            destination,
            deadline,
            intent: None,
        };
        self.route.route_to(destination);

        let dummies = (0..self.config.num_dummies)
            .map(|_| Dummy {
                pose: Pose::new(self.random_location(), self.random_direction()),
                intent: self.random_heading(),
            })
            .collect();
        self.dummies = dummies;
        for light in self.lights.values_mut() {
            light.reset();
        }

        self.t = 0;
        self.outcome = None;
        self.stats = TrialStats {
            initial_deadline: deadline,
            final_deadline: deadline,
            ..TrialStats::default()
        };

        debug!(%start, %destination, deadline, "trial placed");
        destination
    }

    /// Move dummy traffic, cycle the lights and tick the deadline.
    ///
    /// Call once after the driver has acted.
    pub fn advance(&mut self) {
        self.move_dummies();
        for light in self.lights.values_mut() {
            light.update(self.t);
        }

        if self.outcome.is_none() {
            self.primary.deadline -= 1;
            if self.primary.deadline <= self.config.hard_time_limit {
                self.finish(TrialOutcome::Aborted);
            } else if self.config.enforce_deadline && self.primary.deadline <= 0 {
                self.finish(TrialOutcome::DeadlineExpired);
            }
        }

        self.t += 1;
        self.stats.steps += 1;
    }

    pub fn outcome(&self) -> Option<TrialOutcome> {
        self.outcome
    }

    pub fn is_done(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn stats(&self) -> &TrialStats {
        &self.stats
    }

    pub fn destination(&self) -> Location {
        self.primary.destination
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    fn finish(&mut self, outcome: TrialOutcome) {
        self.outcome = Some(outcome);
        self.stats.final_deadline = self.primary.deadline;
        debug!(?outcome, deadline = self.primary.deadline, "trial finished");
    }

    fn random_location(&mut self) -> Location {
        let (columns, rows) = self.config.grid_size;
        Location::new(
            self.rng.random_range(1..=columns),
            self.rng.random_range(1..=rows),
        )
    }

    fn random_direction(&mut self) -> Direction {
        Direction::ALL[self.rng.random_range(0..Direction::ALL.len())]
    }

    fn random_heading(&mut self) -> Heading {
        Heading::ALL[self.rng.random_range(0..Heading::ALL.len())]
    }

    fn light_at(&self, pose: Pose) -> Light {
        self.lights
            .get(&pose.location)
            .map_or(Light::Red, |light| light.light_for(pose.direction))
    }

    fn drive(&self, pose: Pose, heading: Heading) -> Pose {
        let direction = pose.direction.turn(heading);
        let (dx, dy) = direction.vector();
        let (columns, rows) = self.config.grid_size;
        let location = Location::new(
            (pose.location.x + dx - 1).rem_euclid(columns) + 1,
            (pose.location.y + dy - 1).rem_euclid(rows) + 1,
        );
        Pose::new(location, direction)
    }

    fn sense_for_dummy(&self, index: usize) -> Inputs {
        let pose = self.dummies[index].pose;
        let others = self
            .dummies
            .iter()
            .enumerate()
            .filter(|(other, _)| *other != index)
            .map(|(_, dummy)| (dummy.pose, Some(dummy.intent)))
            .chain(iter::once((self.primary.pose, self.primary.intent)));
        sense_among(pose, self.light_at(pose), others)
    }

    /// Dummies take their intended turn when the rules allow it and wait
    /// otherwise.
    fn move_dummies(&mut self) {
        for index in 0..self.dummies.len() {
            let inputs = self.sense_for_dummy(index);
            let dummy = self.dummies[index];
            if rules::may_proceed(dummy.intent, &inputs) {
                let pose = self.drive(dummy.pose, dummy.intent);
                let intent = self.random_heading();
                self.dummies[index] = Dummy { pose, intent };
            }
        }
    }
}

/// What a vehicle at `pose` senses from the vehicles in `others`.
///
/// Vehicles facing the same way are ignored. An oncoming left turn, a
/// forward move from the right and a forward move from the left take
/// priority over later vehicles in the same slot.
pub fn sense_among(
    pose: Pose,
    light: Light,
    others: impl IntoIterator<Item = (Pose, Traffic)>,
) -> Inputs {
    let mut inputs = Inputs::clear(light);
    for (other, intent) in others {
        if other.location != pose.location || other.direction == pose.direction {
            continue;
        }
        if other.direction == pose.direction.opposite() {
            if inputs.oncoming != Some(Heading::Left) {
                inputs.oncoming = intent;
            }
        } else if other.direction == pose.direction.turn(Heading::Left) {
            // travelling toward our left, so it comes from our right
            if !matches!(inputs.right, Some(Heading::Forward) | Some(Heading::Left)) {
                inputs.right = intent;
            }
        } else if inputs.left != Some(Heading::Forward) {
            inputs.left = intent;
        }
    }
    inputs
}

impl Environment for GridWorld {
    fn valid_actions(&self) -> &[Action] {
        &Action::ALL
    }

    fn sense(&self) -> Inputs {
        let others = self
            .dummies
            .iter()
            .map(|dummy| (dummy.pose, Some(dummy.intent)));
        sense_among(self.primary.pose, self.light_at(self.primary.pose), others)
    }

    fn deadline(&self) -> i64 {
        self.primary.deadline
    }

    fn act(&mut self, action: Action) -> Result<f64> {
        if !self.valid_actions().contains(&action) {
            return Err(Error::InvalidAction {
                action: action.to_string(),
            });
        }

        let inputs = self.sense();
        let waypoint = self.route.next_waypoint(&self.primary.pose);
        let violation = rules::judge(action, &inputs);

        let mut reward = 2.0 * self.rng.random::<f64>() - 1.0;
        if violation == Violation::None {
            let penalty = if self.config.enforce_deadline {
                rules::deadline_penalty(self.t, self.primary.deadline)
            } else {
                0.0
            };
            reward += rules::legal_move_reward(action, &inputs, waypoint) - penalty;
            if let Some(heading) = action.heading() {
                self.primary.pose = self.drive(self.primary.pose, heading);
            }
        } else {
            reward += violation.penalty();
        }
        self.primary.intent = action.heading();
        self.stats.violations[violation.index()] += 1;

        if self.outcome.is_none() && self.primary.pose.location == self.primary.destination {
            reward += ARRIVAL_BONUS;
            self.finish(TrialOutcome::Arrived {
                on_time: self.primary.deadline >= 0,
            });
        }
        self.stats.net_reward += reward;

        trace!(%action, ?violation, reward, location = %self.primary.pose.location, "primary acted");
        Ok(reward)
    }

    fn pose(&self) -> Pose {
        self.primary.pose
    }

    fn random_destination(&self, rng: &mut StdRng) -> Location {
        let (columns, rows) = self.config.grid_size;
        Location::new(rng.random_range(1..=columns), rng.random_range(1..=rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_world(enforce: bool, seed: u64) -> GridWorld {
        let config = WorldConfig::default()
            .with_dummies(0)
            .with_enforce_deadline(enforce)
            .with_seed(seed);
        GridWorld::new(config).unwrap()
    }

    #[test]
    fn test_trial_placement() {
        let mut world = quiet_world(false, 3);
        for _ in 0..10 {
            let destination = world.begin_trial();
            let distance = world.pose().location.manhattan(destination);
            assert!(distance >= MIN_ROUTE_LENGTH);
            assert_eq!(world.deadline(), DEADLINE_FACTOR * distance);
            assert_eq!(world.stats().initial_deadline, world.deadline());
            assert!(world.outcome().is_none());
        }
    }

    #[test]
    fn test_same_seed_same_trials() {
        let mut a = quiet_world(false, 11);
        let mut b = quiet_world(false, 11);
        for _ in 0..5 {
            assert_eq!(a.begin_trial(), b.begin_trial());
            assert_eq!(a.pose(), b.pose());
        }
    }

    #[test]
    fn test_idling_hits_hard_limit() {
        let mut world = quiet_world(false, 5);
        world.begin_trial();
        let initial = world.deadline();
        while !world.is_done() {
            world.act(Action::None).unwrap();
            world.advance();
        }
        assert_eq!(world.outcome(), Some(TrialOutcome::Aborted));
        assert_eq!(world.stats().final_deadline, -100);
        assert_eq!(world.stats().steps as i64, initial + 100);
    }

    #[test]
    fn test_enforced_deadline_expires() {
        let mut world = quiet_world(true, 5);
        world.begin_trial();
        let initial = world.deadline();
        while !world.is_done() {
            world.act(Action::None).unwrap();
            world.advance();
        }
        assert_eq!(world.outcome(), Some(TrialOutcome::DeadlineExpired));
        assert_eq!(world.stats().final_deadline, 0);
        assert_eq!(world.stats().steps as i64, initial);
    }

    #[test]
    fn test_lawful_route_following_arrives() {
        let mut world = quiet_world(false, 8);
        let destination = world.begin_trial();
        let mut planner = GridPlanner::new();
        planner.route_to(destination);

        while !world.is_done() {
            let inputs = world.sense();
            let action = match planner.next_waypoint(&world.pose()) {
                Some(heading) if rules::may_proceed(heading, &inputs) => Action::from(heading),
                _ => Action::None,
            };
            world.act(action).unwrap();
            world.advance();
        }

        assert!(matches!(
            world.outcome(),
            Some(TrialOutcome::Arrived { .. })
        ));
        assert_eq!(world.pose().location, destination);
        let stats = world.stats();
        assert_eq!(u64::from(stats.count(Violation::None)), stats.steps);
    }

    #[test]
    fn test_sense_among_slots() {
        let here = Location::new(2, 2);
        let me = Pose::new(here, Direction::North);
        let sensed = sense_among(
            me,
            Light::Green,
            [
                (Pose::new(here, Direction::South), Some(Heading::Forward)),
                (Pose::new(here, Direction::West), Some(Heading::Left)),
                (Pose::new(here, Direction::East), Some(Heading::Right)),
                (Pose::new(here, Direction::North), Some(Heading::Left)),
                (Pose::new(Location::new(3, 2), Direction::South), Some(Heading::Left)),
            ],
        );
        assert_eq!(sensed.oncoming, Some(Heading::Forward));
        assert_eq!(sensed.right, Some(Heading::Left));
        assert_eq!(sensed.left, Some(Heading::Right));
    }

    #[test]
    fn test_oncoming_left_turn_is_sticky() {
        let here = Location::new(1, 1);
        let me = Pose::new(here, Direction::East);
        let sensed = sense_among(
            me,
            Light::Red,
            [
                (Pose::new(here, Direction::West), Some(Heading::Left)),
                (Pose::new(here, Direction::West), Some(Heading::Forward)),
            ],
        );
        assert_eq!(sensed.oncoming, Some(Heading::Left));
    }

    #[test]
    fn test_busy_world_keeps_dummies_on_grid() {
        let config = WorldConfig::default().with_dummies(40).with_seed(9);
        let mut world = GridWorld::new(config).unwrap();
        world.begin_trial();
        for _ in 0..30 {
            world.act(Action::None).unwrap();
            world.advance();
        }
        let (columns, rows) = world.config().grid_size;
        for dummy in &world.dummies {
            assert!((1..=columns).contains(&dummy.pose.location.x));
            assert!((1..=rows).contains(&dummy.pose.location.y));
        }
    }
}
