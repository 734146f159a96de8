//! Greedy route planner for the grid

use crate::{
    geometry::{Location, Pose},
    ports::RoutePlanner,
    types::Heading,
};

/// Closes the east-west gap first, then the north-south gap.
///
/// Wrap-around is ignored; the planner always routes across the grid.
#[derive(Debug, Clone, Default)]
pub struct GridPlanner {
    destination: Option<Location>,
}

impl GridPlanner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RoutePlanner for GridPlanner {
    fn route_to(&mut self, destination: Location) {
        self.destination = Some(destination);
    }

    fn destination(&self) -> Option<Location> {
        self.destination
    }

    fn next_waypoint(&self, pose: &Pose) -> Option<Heading> {
        let destination = self.destination?;
        let dx = destination.x - pose.location.x;
        let dy = destination.y - pose.location.y;
        let (hx, hy) = pose.direction.vector();

        let heading = if dx != 0 {
            if dx * hx > 0 {
                Heading::Forward
            } else if dx * hx < 0 {
                Heading::Right
            } else if dx * hy > 0 {
                Heading::Left
            } else {
                Heading::Right
            }
        } else if dy != 0 {
            if dy * hy > 0 {
                Heading::Forward
            } else if dy * hy < 0 {
                Heading::Right
            } else if dy * hx > 0 {
                Heading::Right
            } else {
                Heading::Left
            }
        } else {
            return None;
        };
        Some(heading)
    }
}
