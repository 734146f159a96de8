//! Right-of-way rules and the reward table for the primary vehicle

use serde::{Deserialize, Serialize};

use crate::types::{Action, Heading, Inputs, Light};

/// Severity of a move that breaks the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Violation {
    /// Legal move
    None,
    /// Idling on green with nothing to yield to
    Minor,
    /// Running a red light
    Major,
    /// Turning into traffic that has right of way
    MinorAccident,
    /// Running a red light into crossing traffic
    MajorAccident,
}

impl Violation {
    pub const ALL: [Violation; 5] = [
        Violation::None,
        Violation::Minor,
        Violation::Major,
        Violation::MinorAccident,
        Violation::MajorAccident,
    ];

    /// Position in tallies and CSV columns.
    pub fn index(self) -> usize {
        match self {
            Violation::None => 0,
            Violation::Minor => 1,
            Violation::Major => 2,
            Violation::MinorAccident => 3,
            Violation::MajorAccident => 4,
        }
    }

    /// Reward added for an illegal move.
    pub fn penalty(self) -> f64 {
        match self {
            Violation::None => 0.0,
            Violation::Minor => -5.0,
            Violation::Major => -10.0,
            Violation::MinorAccident => -20.0,
            Violation::MajorAccident => -40.0,
        }
    }
}

fn crossing_forward(inputs: &Inputs) -> bool {
    inputs.left == Some(Heading::Forward) || inputs.right == Some(Heading::Forward)
}

/// Classify `action` given what the vehicle senses.
pub fn judge(action: Action, inputs: &Inputs) -> Violation {
    let red = inputs.light == Light::Red;
    match action {
        Action::Forward if red && crossing_forward(inputs) => Violation::MajorAccident,
        Action::Forward if red => Violation::Major,
        Action::Forward => Violation::None,
        Action::Left if red => {
            if crossing_forward(inputs) || inputs.oncoming == Some(Heading::Right) {
                Violation::MajorAccident
            } else {
                Violation::Major
            }
        }
        Action::Left => match inputs.oncoming {
            Some(Heading::Right) | Some(Heading::Forward) => Violation::MinorAccident,
            _ => Violation::None,
        },
        Action::Right if red && inputs.left == Some(Heading::Forward) => Violation::MinorAccident,
        Action::Right => Violation::None,
        Action::None if !red && inputs.oncoming != Some(Heading::Left) => Violation::Minor,
        Action::None => Violation::None,
    }
}

/// Reward for a legal move before the deadline penalty is subtracted.
///
/// Following the route, or waiting at a red light the route cannot turn
/// through, earns 2; any other legal move earns 1.
pub fn legal_move_reward(action: Action, inputs: &Inputs, waypoint: Option<Heading>) -> f64 {
    let red = inputs.light == Light::Red;
    if waypoint.is_some() && action.heading() == waypoint {
        2.0
    } else if action == Action::None && red && waypoint == Some(Heading::Right) {
        1.0
    } else if action == Action::None && red {
        2.0
    } else {
        1.0
    }
}

/// Whether a rule-abiding vehicle may take `heading` now.
pub fn may_proceed(heading: Heading, inputs: &Inputs) -> bool {
    let red = inputs.light == Light::Red;
    match heading {
        Heading::Right => !(red && inputs.left == Some(Heading::Forward)),
        Heading::Forward => !red,
        Heading::Left => {
            !(red || matches!(inputs.oncoming, Some(Heading::Forward) | Some(Heading::Right)))
        }
    }
}

/// Time pressure penalty: 0 at the start of a trial, 1 when the deadline is spent.
pub fn deadline_penalty(t: u64, deadline: i64) -> f64 {
    const GRADIENT: f64 = 10.0;
    let elapsed = t as f64;
    let total = elapsed + deadline as f64;
    let fraction = if total <= 0.0 {
        1.0
    } else {
        (elapsed / total).clamp(0.0, 1.0)
    };
    (GRADIENT.powf(fraction) - 1.0) / (GRADIENT - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(light: Light) -> Inputs {
        Inputs::clear(light)
    }

    #[test]
    fn test_red_light_violations() {
        let mut red = inputs(Light::Red);
        assert_eq!(judge(Action::Forward, &red), Violation::Major);
        assert_eq!(judge(Action::Left, &red), Violation::Major);
        assert_eq!(judge(Action::Right, &red), Violation::None);
        assert_eq!(judge(Action::None, &red), Violation::None);

        red.left = Some(Heading::Forward);
        assert_eq!(judge(Action::Forward, &red), Violation::MajorAccident);
        assert_eq!(judge(Action::Right, &red), Violation::MinorAccident);
    }

    #[test]
    fn test_green_light_rules() {
        let mut green = inputs(Light::Green);
        assert_eq!(judge(Action::Forward, &green), Violation::None);
        assert_eq!(judge(Action::None, &green), Violation::Minor);

        green.oncoming = Some(Heading::Forward);
        assert_eq!(judge(Action::Left, &green), Violation::MinorAccident);

        green.oncoming = Some(Heading::Left);
        assert_eq!(judge(Action::None, &green), Violation::None);
        assert_eq!(judge(Action::Left, &green), Violation::None);
    }

    #[test]
    fn test_legal_move_reward() {
        let red = inputs(Light::Red);
        let green = inputs(Light::Green);
        assert_eq!(legal_move_reward(Action::Forward, &green, Some(Heading::Forward)), 2.0);
        assert_eq!(legal_move_reward(Action::Right, &green, Some(Heading::Forward)), 1.0);
        assert_eq!(legal_move_reward(Action::None, &red, Some(Heading::Forward)), 2.0);
        assert_eq!(legal_move_reward(Action::None, &red, Some(Heading::Right)), 1.0);
    }

    #[test]
    fn test_may_proceed_matches_judge_for_turns() {
        for light in Light::ALL {
            for left in crate::types::ALL_TRAFFIC {
                for oncoming in crate::types::ALL_TRAFFIC {
                    let sensed = Inputs {
                        light,
                        left,
                        right: None,
                        oncoming,
                    };
                    for heading in Heading::ALL {
                        if may_proceed(heading, &sensed) {
                            assert_eq!(judge(heading.into(), &sensed), Violation::None);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_deadline_penalty_bounds() {
        assert_eq!(deadline_penalty(0, 20), 0.0);
        assert!((deadline_penalty(20, 0) - 1.0).abs() < 1e-12);
        assert!((deadline_penalty(10, -20) - 1.0).abs() < 1e-12);
        let mid = deadline_penalty(10, 10);
        assert!(mid > 0.0 && mid < 1.0);
    }
}
