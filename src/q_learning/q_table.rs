//! Q-table keyed by grid position and action

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{Action, Position};

/// Q-table mapping (position, action) pairs to Q-values
///
/// Entries that were never written read as zero. Reads never insert, so the
/// table only holds pairs the learner has actually updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QTable {
    /// Q-values: (position, action) -> Q-value
    q_values: HashMap<(Position, Action), f64>,
    /// Learning rate α
    learning_rate: f64,
    /// Discount factor γ
    discount_factor: f64,
}

impl QTable {
    /// Create an empty Q-table
    pub fn new(learning_rate: f64, discount_factor: f64) -> Self {
        Self {
            q_values: HashMap::new(),
            learning_rate,
            discount_factor,
        }
    }

    /// Get Q-value for a state-action pair
    pub fn get(&self, state: Position, action: Action) -> f64 {
        self.q_values
            .get(&(state, action))
            .copied()
            .unwrap_or(0.0)
    }

    /// Set Q-value for a state-action pair
    pub fn set(&mut self, state: Position, action: Action, value: f64) {
        self.q_values.insert((state, action), value);
    }

    /// Maximum Q-value over the given actions, or 0 when there are none
    pub fn max_q(&self, state: Position, actions: &[Action]) -> f64 {
        if actions.is_empty() {
            return 0.0;
        }
        actions
            .iter()
            .map(|&action| self.get(state, action))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Greedy action among `actions`.
    ///
    /// Ties go to the action listed first, so callers passing actions in
    /// canonical order get canonical tie-breaking.
    pub fn greedy_action(&self, state: Position, actions: &[Action]) -> Option<Action> {
        let mut best: Option<(Action, f64)> = None;
        for &action in actions {
            let value = self.get(state, action);
            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((action, value)),
            }
        }
        best.map(|(action, _)| action)
    }

    /// Q-learning update: off-policy TD control
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
    ///
    /// The maximum is taken over `next_actions`; an empty slice bootstraps
    /// from zero. Returns the new value.
    pub fn q_learning_update(
        &mut self,
        state: Position,
        action: Action,
        reward: f64,
        next_state: Position,
        next_actions: &[Action],
    ) -> f64 {
        let current_q = self.get(state, action);
        let max_next_q = self.max_q(next_state, next_actions);
        let td_target = reward + self.discount_factor * max_next_q;
        let td_error = td_target - current_q;
        let new_q = current_q + self.learning_rate * td_error;
        self.set(state, action, new_q);
        new_q
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn discount_factor(&self) -> f64 {
        self.discount_factor
    }

    /// Iterate over stored entries in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (Position, Action, f64)> + '_ {
        self.q_values
            .iter()
            .map(|(&(state, action), &value)| (state, action, value))
    }

    /// Positions that have at least one stored entry
    pub fn states(&self) -> impl Iterator<Item = Position> + '_ {
        let mut seen: Vec<Position> = self.q_values.keys().map(|&(state, _)| state).collect();
        seen.sort_unstable();
        seen.dedup();
        seen.into_iter()
    }

    /// Remove all entries
    pub fn reset(&mut self) {
        self.q_values.clear();
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.q_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q_values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const S: Position = Position::new(1, 1);
    const NEXT: Position = Position::new(1, 2);

    #[test]
    fn test_unseen_entries_read_zero_without_insert() {
        let qtable = QTable::new(0.5, 0.99);
        assert_eq!(qtable.get(S, Action::Up), 0.0);
        assert_eq!(qtable.max_q(S, &Action::ALL), 0.0);
        assert!(qtable.is_empty());
    }

    #[test]
    fn test_max_q_over_empty_actions_is_zero() {
        let mut qtable = QTable::new(0.5, 0.99);
        qtable.set(S, Action::Up, -3.0);
        assert_eq!(qtable.max_q(S, &[]), 0.0);
        assert_eq!(qtable.max_q(S, &[Action::Up]), -3.0);
    }

    #[test]
    fn test_greedy_action_prefers_highest() {
        let mut qtable = QTable::new(0.5, 0.99);
        qtable.set(S, Action::Up, 0.5);
        qtable.set(S, Action::Right, 1.5);
        qtable.set(S, Action::Down, 0.8);
        assert_eq!(qtable.greedy_action(S, &Action::ALL), Some(Action::Right));
    }

    #[test]
    fn test_greedy_action_ties_take_first_listed() {
        let mut qtable = QTable::new(0.5, 0.99);
        qtable.set(S, Action::Down, 2.0);
        qtable.set(S, Action::Left, 2.0);
        assert_eq!(qtable.greedy_action(S, &Action::ALL), Some(Action::Down));
        assert_eq!(
            QTable::new(0.5, 0.99).greedy_action(S, &Action::ALL),
            Some(Action::Up)
        );
        assert_eq!(qtable.greedy_action(S, &[]), None);
    }

    #[test]
    fn test_q_learning_update() {
        let mut qtable = QTable::new(0.5, 0.99);
        qtable.set(NEXT, Action::Right, 1.0);
        qtable.set(NEXT, Action::Down, 2.0);

        let updated = qtable.q_learning_update(
            S,
            Action::Right,
            0.0,
            NEXT,
            &[Action::Right, Action::Down],
        );

        // 0.0 + 0.5 * (0.0 + 0.99 * 2.0 - 0.0)
        assert!((updated - 0.99).abs() < 1e-12);
        assert_eq!(qtable.get(S, Action::Right), updated);
    }

    #[test]
    fn test_fixed_point_update_is_unchanged() {
        let mut qtable = QTable::new(0.5, 0.5);
        qtable.set(NEXT, Action::Left, 2.0);
        qtable.set(S, Action::Right, 2.0);

        // r + γ·max = 1.0 + 0.5 * 2.0 = Q(s, a)
        let updated = qtable.q_learning_update(S, Action::Right, 1.0, NEXT, &Action::ALL);
        assert_eq!(updated, 2.0);
    }
}
