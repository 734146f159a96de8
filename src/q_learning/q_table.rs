//! Q-table keyed by driving state, one value per valid action

use std::{collections::HashMap, io::Write};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    q_learning::state::{DrivingState, STATE_COUNT},
    types::Action,
};

/// How two action values are compared when collecting the greedy set.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieRule {
    /// Bit-for-bit floating point equality.
    #[default]
    Exact,
    /// Values within this distance of the maximum count as tied.
    Tolerance(f64),
}

impl TieRule {
    fn is_tied(self, value: f64, max: f64) -> bool {
        match self {
            TieRule::Exact => value == max,
            TieRule::Tolerance(eps) => max - value <= eps,
        }
    }
}

/// One row of the table: a value for every valid action, in declared order.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionValues(Vec<(Action, f64)>);

impl ActionValues {
    fn zeroed(actions: &[Action]) -> Self {
        Self(actions.iter().map(|&action| (action, 0.0)).collect())
    }

    /// Value of `action`, if it is part of this row.
    pub fn get(&self, action: Action) -> Option<f64> {
        self.0
            .iter()
            .find(|(candidate, _)| *candidate == action)
            .map(|(_, value)| *value)
    }

    fn get_mut(&mut self, action: Action) -> Option<&mut f64> {
        self.0
            .iter_mut()
            .find(|(candidate, _)| *candidate == action)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Action, f64)> {
        self.0.iter()
    }

    pub fn actions(&self) -> impl Iterator<Item = Action> + '_ {
        self.0.iter().map(|(action, _)| *action)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Q-table mapping driving states to per-action value estimates.
///
/// A present row always holds every valid action; rows are only ever added,
/// never removed.
#[derive(Debug, Clone)]
pub struct QTable {
    rows: HashMap<DrivingState, ActionValues>,
    actions: Vec<Action>,
    tie_rule: TieRule,
}

impl QTable {
    /// Create an empty table over the given action set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoValidActions`] for an empty set and
    /// [`Error::InvalidConfiguration`] when an action is listed twice.
    pub fn new(actions: &[Action], tie_rule: TieRule) -> Result<Self> {
        if actions.is_empty() {
            return Err(Error::NoValidActions);
        }
        for (idx, action) in actions.iter().enumerate() {
            if actions[..idx].contains(action) {
                return Err(Error::invalid_config(format!(
                    "action '{action}' is declared more than once"
                )));
            }
        }
        if let TieRule::Tolerance(eps) = tie_rule {
            if !(eps >= 0.0 && eps.is_finite()) {
                return Err(Error::invalid_config(format!(
                    "tie tolerance must be non-negative and finite, got {eps}"
                )));
            }
        }
        Ok(Self {
            rows: HashMap::new(),
            actions: actions.to_vec(),
            tie_rule,
        })
    }

    /// Create a table with a zero row for every one of the [`STATE_COUNT`] driving states.
    pub fn prepopulated(actions: &[Action], tie_rule: TieRule) -> Result<Self> {
        let mut table = Self::new(actions, tie_rule)?;
        table.rows.reserve(STATE_COUNT);
        for state in DrivingState::all() {
            table.ensure(state);
        }
        Ok(table)
    }

    /// Insert a zero row for `state` unless one exists. Returns whether a row was added.
    pub fn ensure(&mut self, state: DrivingState) -> bool {
        if self.rows.contains_key(&state) {
            return false;
        }
        self.rows.insert(state, ActionValues::zeroed(&self.actions));
        true
    }

    pub fn contains(&self, state: &DrivingState) -> bool {
        self.rows.contains_key(state)
    }

    /// The row for `state`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownState`] when [`QTable::ensure`] never saw `state`.
    pub fn row(&self, state: &DrivingState) -> Result<&ActionValues> {
        self.rows.get(state).ok_or_else(|| Error::UnknownState {
            state: state.to_string(),
        })
    }

    /// Get the Q-value for a state-action pair
    pub fn value(&self, state: &DrivingState, action: Action) -> Result<f64> {
        self.row(state)?
            .get(action)
            .ok_or_else(|| Error::InvalidAction {
                action: action.to_string(),
            })
    }

    /// Maximum value in the row for `state` and every action that reaches it.
    ///
    /// Ties are all returned, in declared action order; choosing among them is
    /// left to the policy.
    pub fn max_and_argmax(&self, state: &DrivingState) -> Result<(f64, Vec<Action>)> {
        let row = self.row(state)?;
        let max = row
            .iter()
            .map(|(_, value)| *value)
            .fold(f64::NEG_INFINITY, f64::max);
        let best = row
            .iter()
            .filter(|(_, value)| self.tie_rule.is_tied(*value, max))
            .map(|(action, _)| *action)
            .collect();
        Ok((max, best))
    }

    /// Single-step weighted average of the old estimate and the observed reward.
    ///
    /// Q(s,a) ← α·r + (1 − α)·Q(s,a)
    ///
    /// There is no successor-state term: the estimate tracks expected immediate
    /// reward. Only the `(state, action)` cell changes. Returns the new value.
    pub fn blend(
        &mut self,
        state: &DrivingState,
        action: Action,
        reward: f64,
        alpha: f64,
    ) -> Result<f64> {
        let row = self.rows.get_mut(state).ok_or_else(|| Error::UnknownState {
            state: state.to_string(),
        })?;
        let cell = row.get_mut(action).ok_or_else(|| Error::InvalidAction {
            action: action.to_string(),
        })?;
        *cell = alpha * reward + (1.0 - alpha) * *cell;
        Ok(*cell)
    }

    /// The valid actions every row covers, in declared order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Get total number of rows stored
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows sorted by state, for stable reports.
    pub fn sorted_rows(&self) -> Vec<(&DrivingState, &ActionValues)> {
        let mut rows: Vec<_> = self.rows.iter().collect();
        rows.sort_by_key(|(state, _)| **state);
        rows
    }

    /// Human-readable dump of every row.
    ///
    /// Written for inspection after a run; nothing reads it back.
    pub fn write_report<W: Write>(&self, mut out: W) -> Result<()> {
        writeln!(out, "/-----------------------------------------")?;
        writeln!(out, "| State-action rewards from Q-Learning")?;
        writeln!(out, "\\-----------------------------------------")?;
        writeln!(out)?;
        for (state, row) in self.sorted_rows() {
            writeln!(out, "{state}")?;
            for (action, value) in row.iter() {
                writeln!(out, " -- {action:<8} : {value:.2}")?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}
