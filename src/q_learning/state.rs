//! Driving state and the encoder that builds it from observations

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    types::{ALL_TRAFFIC, Heading, Inputs, Light, Traffic, parse_traffic, traffic_label},
};

/// Number of distinct driving states: 3 waypoints × 2 lights × 4³ traffic combinations.
pub const STATE_COUNT: usize =
    Heading::ALL.len() * Light::ALL.len() * ALL_TRAFFIC.len().pow(3);

/// Key of the Q-table: the agent's categorical view of one intersection.
///
/// Field order is `(waypoint, light, left, right, oncoming)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DrivingState {
    pub waypoint: Heading,
    pub light: Light,
    pub left: Traffic,
    pub right: Traffic,
    pub oncoming: Traffic,
}

impl DrivingState {
    pub fn new(
        waypoint: Heading,
        light: Light,
        left: Traffic,
        right: Traffic,
        oncoming: Traffic,
    ) -> Self {
        Self {
            waypoint,
            light,
            left,
            right,
            oncoming,
        }
    }

    /// Every state in pre-population order (cartesian product, last field fastest).
    pub fn all() -> impl Iterator<Item = DrivingState> {
        Heading::ALL.into_iter().flat_map(|waypoint| {
            Light::ALL.into_iter().flat_map(move |light| {
                ALL_TRAFFIC.into_iter().flat_map(move |left| {
                    ALL_TRAFFIC.into_iter().flat_map(move |right| {
                        ALL_TRAFFIC
                            .into_iter()
                            .map(move |oncoming| Self::new(waypoint, light, left, right, oncoming))
                    })
                })
            })
        })
    }
}

impl fmt::Display for DrivingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}|{}",
            self.waypoint,
            self.light,
            traffic_label(self.left),
            traffic_label(self.right),
            traffic_label(self.oncoming)
        )
    }
}

impl FromStr for DrivingState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('|').collect();
        let [waypoint, light, left, right, oncoming] = parts.as_slice() else {
            return Err(Error::InvalidStateLabel {
                label: s.to_string(),
            });
        };
        Ok(Self::new(
            waypoint.parse()?,
            light.parse()?,
            parse_traffic(left)?,
            parse_traffic(right)?,
            parse_traffic(oncoming)?,
        ))
    }
}

/// Builds [`DrivingState`]s from the planner hint and the sensed inputs.
///
/// The remaining deadline is observable but deliberately left out of the
/// state so the table stays at [`STATE_COUNT`] rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateEncoder;

impl StateEncoder {
    pub fn encode(
        &self,
        waypoint: Option<Heading>,
        inputs: &Inputs,
        _deadline: i64,
    ) -> Result<DrivingState> {
        let waypoint = waypoint.ok_or(Error::MissingWaypoint)?;
        Ok(DrivingState::new(
            waypoint,
            inputs.light,
            inputs.left,
            inputs.right,
            inputs.oncoming,
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_state_domain_size() {
        let states: Vec<_> = DrivingState::all().collect();
        assert_eq!(states.len(), STATE_COUNT);
        let unique: HashSet<_> = states.iter().collect();
        assert_eq!(unique.len(), STATE_COUNT);
    }

    #[test]
    fn test_all_starts_with_first_field_values() {
        let first = DrivingState::all().next().unwrap();
        assert_eq!(first.to_string(), "left|red|left|left|left");
        let last = DrivingState::all().last().unwrap();
        assert_eq!(last.to_string(), "forward|green|none|none|none");
    }

    #[test]
    fn test_encode_ignores_deadline() {
        let inputs = Inputs {
            light: Light::Green,
            left: None,
            right: Some(Heading::Forward),
            oncoming: Some(Heading::Left),
        };
        let a = StateEncoder.encode(Some(Heading::Right), &inputs, 25).unwrap();
        let b = StateEncoder.encode(Some(Heading::Right), &inputs, -3).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "right|green|none|forward|left");
    }

    #[test]
    fn test_encode_without_waypoint_fails() {
        let err = StateEncoder
            .encode(None, &Inputs::clear(Light::Red), 10)
            .unwrap_err();
        assert!(matches!(err, Error::MissingWaypoint));
    }

    #[test]
    fn test_label_round_trip() {
        let state: DrivingState = "forward|red|none|none|none".parse().unwrap();
        assert_eq!(state.waypoint, Heading::Forward);
        assert_eq!(state.light, Light::Red);
        assert_eq!(state.to_string(), "forward|red|none|none|none");

        assert!(matches!(
            "forward|red|none".parse::<DrivingState>(),
            Err(Error::InvalidStateLabel { .. })
        ));
        assert!(matches!(
            "forward|amber|none|none|none".parse::<DrivingState>(),
            Err(Error::UnknownCategory { .. })
        ));
    }
}
