//! ε-greedy action selection over the Q-table

use rand::{Rng, rngs::StdRng, seq::IndexedRandom};

use crate::{
    error::{Error, Result},
    q_learning::{q_table::QTable, state::DrivingState},
    types::Action,
};

/// Which branch of the policy produced an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Explore,
    Exploit,
}

/// ε-greedy policy with uniform tie-breaking among the best actions.
#[derive(Debug, Clone, Copy, Default)]
pub struct EpsilonGreedy;

impl EpsilonGreedy {
    /// Pick an action for `state`.
    ///
    /// Explores uniformly over `valid_actions` when not learning or when a draw
    /// from `[0, 1)` is at most `epsilon`; otherwise picks uniformly among the
    /// actions tied for the row maximum. The row must already exist when the
    /// exploit branch is taken.
    pub fn select(
        &self,
        table: &QTable,
        state: &DrivingState,
        epsilon: f64,
        learning: bool,
        valid_actions: &[Action],
        rng: &mut StdRng,
    ) -> Result<(Action, Choice)> {
        if !learning || rng.random::<f64>() <= epsilon {
            let action = valid_actions.choose(rng).ok_or(Error::NoValidActions)?;
            return Ok((*action, Choice::Explore));
        }

        let (_, best) = table.max_and_argmax(state)?;
        let action = best.choose(rng).ok_or(Error::NoValidActions)?;
        Ok((*action, Choice::Exploit))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;

    use super::*;
    use crate::q_learning::q_table::TieRule;

    fn table_with_row() -> (QTable, DrivingState) {
        let mut table = QTable::new(&Action::ALL, TieRule::Exact).unwrap();
        let state: DrivingState = "left|green|none|none|none".parse().unwrap();
        table.ensure(state);
        (table, state)
    }

    #[test]
    fn test_greedy_picks_unique_best() {
        let (mut table, state) = table_with_row();
        table.blend(&state, Action::Left, 5.0, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..50 {
            let (action, choice) = EpsilonGreedy
                .select(&table, &state, 0.0, true, &Action::ALL, &mut rng)
                .unwrap();
            assert_eq!(action, Action::Left);
            assert_eq!(choice, Choice::Exploit);
        }
    }

    #[test]
    fn test_ties_are_all_sampled() {
        let (mut table, state) = table_with_row();
        table.blend(&state, Action::Forward, 1.0, 1.0).unwrap();
        table.blend(&state, Action::Right, 1.0, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(17);

        let seen: HashSet<Action> = (0..200)
            .map(|_| {
                EpsilonGreedy
                    .select(&table, &state, 0.0, true, &Action::ALL, &mut rng)
                    .unwrap()
                    .0
            })
            .collect();
        assert_eq!(seen, HashSet::from([Action::Forward, Action::Right]));
    }

    #[test]
    fn test_full_epsilon_always_explores() {
        let (table, state) = table_with_row();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let (_, choice) = EpsilonGreedy
                .select(&table, &state, 1.0, true, &Action::ALL, &mut rng)
                .unwrap();
            assert_eq!(choice, Choice::Explore);
        }
    }

    #[test]
    fn test_not_learning_explores_without_a_row() {
        let table = QTable::new(&Action::ALL, TieRule::Exact).unwrap();
        let state: DrivingState = "right|red|left|none|forward".parse().unwrap();
        let mut rng = StdRng::seed_from_u64(9);

        let (action, choice) = EpsilonGreedy
            .select(&table, &state, 0.0, false, &Action::ALL, &mut rng)
            .unwrap();
        assert_eq!(choice, Choice::Explore);
        assert!(Action::ALL.contains(&action));
    }

    #[test]
    fn test_same_seed_same_choices() {
        let (table, state) = table_with_row();
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..30)
                .map(|_| {
                    EpsilonGreedy
                        .select(&table, &state, 0.4, true, &Action::ALL, &mut rng)
                        .unwrap()
                        .0
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(run(11), run(11));
    }
}
