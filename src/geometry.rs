//! Grid geometry: intersections, compass directions and vehicle poses.
//!
//! Coordinates follow screen convention: `x` grows eastward, `y` grows
//! southward, so north is `(0, -1)`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Heading;

/// An intersection on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub x: i32,
    pub y: i32,
}

impl Location {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance, ignoring wrap-around.
    pub fn manhattan(self, other: Location) -> i64 {
        i64::from((self.x - other.x).abs()) + i64::from((self.y - other.y).abs())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Absolute travel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    East,
    North,
    West,
    South,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::East,
        Direction::North,
        Direction::West,
        Direction::South,
    ];

    pub fn vector(self) -> (i32, i32) {
        match self {
            Direction::East => (1, 0),
            Direction::North => (0, -1),
            Direction::West => (-1, 0),
            Direction::South => (0, 1),
        }
    }

    fn from_vector(dx: i32, dy: i32) -> Self {
        match (dx, dy) {
            (1, 0) => Direction::East,
            (0, -1) => Direction::North,
            (-1, 0) => Direction::West,
            _ => Direction::South,
        }
    }

    /// Direction after turning `heading` relative to this one.
    pub fn turn(self, heading: Heading) -> Direction {
        let (dx, dy) = self.vector();
        match heading {
            Heading::Forward => self,
            Heading::Left => Direction::from_vector(dy, -dx),
            Heading::Right => Direction::from_vector(-dy, dx),
        }
    }

    pub fn opposite(self) -> Direction {
        let (dx, dy) = self.vector();
        Direction::from_vector(-dx, -dy)
    }

    pub fn is_north_south(self) -> bool {
        matches!(self, Direction::North | Direction::South)
    }
}

/// Where a vehicle is and which way it faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pose {
    pub location: Location,
    pub direction: Direction,
}

impl Pose {
    pub fn new(location: Location, direction: Direction) -> Self {
        Self {
            location,
            direction,
        }
    }
}
