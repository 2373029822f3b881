//! Core value types shared by the generator, the solver and the learner.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A cell coordinate on the grid.
///
/// Ordering is lexicographic on `(row, col)`, which the shortest-path solver
/// relies on to break ties between queue entries of equal distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Apply a unit move, returning `None` when it would leave the grid.
    pub fn step(self, action: Action, rows: usize, cols: usize) -> Option<Position> {
        let (dr, dc) = action.delta();
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        (row < rows && col < cols).then_some(Position { row, col })
    }

    /// Manhattan distance to another position.
    pub fn manhattan(self, other: Position) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// Whether the two positions differ by exactly one unit move.
    pub fn is_adjacent(self, other: Position) -> bool {
        self.manhattan(other) == 1
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One of the four unit moves.
///
/// The declaration order is the canonical action ordering used for
/// tie-breaking in both solvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Up,
    Right,
    Down,
    Left,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Up, Action::Right, Action::Down, Action::Left];

    /// Row/column offset of the move.
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Action::Up => (-1, 0),
            Action::Right => (0, 1),
            Action::Down => (1, 0),
            Action::Left => (0, -1),
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Action::Up => 0,
            Action::Right => 1,
            Action::Down => 2,
            Action::Left => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Up => "up",
            Action::Right => "right",
            Action::Down => "down",
            Action::Left => "left",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_stays_in_bounds() {
        let origin = Position::new(0, 0);
        assert_eq!(origin.step(Action::Up, 3, 3), None);
        assert_eq!(origin.step(Action::Left, 3, 3), None);
        assert_eq!(origin.step(Action::Down, 3, 3), Some(Position::new(1, 0)));

        let corner = Position::new(2, 2);
        assert_eq!(corner.step(Action::Right, 3, 3), None);
        assert_eq!(corner.step(Action::Down, 3, 3), None);
    }

    #[test]
    fn test_action_index_roundtrip() {
        for action in Action::ALL {
            assert_eq!(Action::from_index(action.index()), Some(action));
        }
        assert_eq!(Action::from_index(4), None);
    }

    #[test]
    fn test_position_ordering_is_row_major() {
        assert!(Position::new(0, 5) < Position::new(1, 0));
        assert!(Position::new(1, 0) < Position::new(1, 1));
    }
}
