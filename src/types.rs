//! Categorical vocabulary shared by the agent and the world.
//!
//! Every field the agent senses is a closed enum, so an out-of-domain value
//! cannot be constructed in Rust code. Text only enters through [`FromStr`],
//! which rejects anything outside the documented domain.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Error;

const HEADING_NAMES: &str = "left, right, forward";
const TRAFFIC_NAMES: &str = "left, right, forward, none";
const ACTION_NAMES: &str = "none, forward, left, right";
const LIGHT_NAMES: &str = "red, green";

/// A relative heading: where a vehicle wants to go next at an intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Heading {
    Left,
    Right,
    Forward,
}

impl Heading {
    /// All headings in table pre-population order.
    pub const ALL: [Heading; 3] = [Heading::Left, Heading::Right, Heading::Forward];

    pub fn as_str(self) -> &'static str {
        match self {
            Heading::Left => "left",
            Heading::Right => "right",
            Heading::Forward => "forward",
        }
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Heading {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Heading::Left),
            "right" => Ok(Heading::Right),
            "forward" => Ok(Heading::Forward),
            other => Err(Error::UnknownCategory {
                field: "heading",
                value: other.to_string(),
                expected: HEADING_NAMES,
            }),
        }
    }
}

/// Intent of another vehicle at the intersection; `None` when no vehicle is there.
pub type Traffic = Option<Heading>;

/// All traffic values in table pre-population order.
pub const ALL_TRAFFIC: [Traffic; 4] = [
    Some(Heading::Left),
    Some(Heading::Right),
    Some(Heading::Forward),
    None,
];

/// Render a traffic value the way the state labels spell it.
pub fn traffic_label(traffic: Traffic) -> &'static str {
    traffic.map_or("none", Heading::as_str)
}

/// Parse a traffic value; `"none"` means no vehicle.
pub fn parse_traffic(s: &str) -> Result<Traffic, Error> {
    match s.trim().to_ascii_lowercase().as_str() {
        "none" => Ok(None),
        other => other.parse::<Heading>().map(Some).map_err(|_| Error::UnknownCategory {
            field: "traffic",
            value: other.to_string(),
            expected: TRAFFIC_NAMES,
        }),
    }
}

/// Traffic light colour as seen by the approaching vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Light {
    Red,
    Green,
}

impl Light {
    pub const ALL: [Light; 2] = [Light::Red, Light::Green];

    pub fn as_str(self) -> &'static str {
        match self {
            Light::Red => "red",
            Light::Green => "green",
        }
    }

    pub fn is_green(self) -> bool {
        self == Light::Green
    }
}

impl fmt::Display for Light {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Light {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" => Ok(Light::Red),
            "green" => Ok(Light::Green),
            other => Err(Error::UnknownCategory {
                field: "light",
                value: other.to_string(),
                expected: LIGHT_NAMES,
            }),
        }
    }
}

/// A driving decision for one step.
///
/// The variant order matches the order in which the world declares its valid
/// actions, so tied actions come back in that order too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    None,
    Forward,
    Left,
    Right,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::None, Action::Forward, Action::Left, Action::Right];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::None => "none",
            Action::Forward => "forward",
            Action::Left => "left",
            Action::Right => "right",
        }
    }

    /// The heading this action moves toward, or `None` for waiting in place.
    pub fn heading(self) -> Option<Heading> {
        match self {
            Action::None => None,
            Action::Forward => Some(Heading::Forward),
            Action::Left => Some(Heading::Left),
            Action::Right => Some(Heading::Right),
        }
    }
}

impl From<Heading> for Action {
    fn from(heading: Heading) -> Self {
        match heading {
            Heading::Left => Action::Left,
            Heading::Right => Action::Right,
            Heading::Forward => Action::Forward,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Action::None),
            "forward" => Ok(Action::Forward),
            "left" => Ok(Action::Left),
            "right" => Ok(Action::Right),
            other => Err(Error::UnknownCategory {
                field: "action",
                value: other.to_string(),
                expected: ACTION_NAMES,
            }),
        }
    }
}

/// What the vehicle senses at its current intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Inputs {
    pub light: Light,
    pub left: Traffic,
    pub right: Traffic,
    pub oncoming: Traffic,
}

impl Inputs {
    /// An empty intersection with the given light.
    pub fn clear(light: Light) -> Self {
        Self {
            light,
            left: None,
            right: None,
            oncoming: None,
        }
    }
}
