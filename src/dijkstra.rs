//! Uniform-cost shortest-path search over a grid
//!
//! All moves cost one. The queue is keyed by `(distance, position)`, so among
//! entries at equal distance the lexicographically smallest position is popped
//! first. Neighbors are expanded in the canonical action order.
//!
//! `total_steps` is a work counter, not a path length: it counts every entry
//! popped from the queue (stale duplicates included) plus every successful
//! relaxation push. The seed push for the start cell is not counted.

use std::{cmp::Reverse, collections::BinaryHeap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    Result,
    maze::Grid,
    types::{Action, Position},
};

/// Result of a shortest-path search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    /// Cells from start to goal inclusive; empty when the goal is unreachable.
    pub path: Vec<Position>,
    /// Queue pops plus relaxation pushes.
    pub total_steps: usize,
    /// Cells settled before the search stopped.
    pub visited: Vec<Position>,
}

impl Solution {
    pub fn is_found(&self) -> bool {
        !self.path.is_empty()
    }

    /// Number of moves along the path.
    pub fn moves(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Find a shortest path from `start` to `goal`.
///
/// An unreachable goal is not an error: the returned path is empty and
/// `total_steps` reflects the work done exhausting the reachable region.
///
/// # Errors
///
/// Returns an error if `start` or `goal` lies outside the grid or on a wall.
pub fn solve(grid: &Grid, start: Position, goal: Position) -> Result<Solution> {
    grid.ensure_open(start)?;
    grid.ensure_open(goal)?;

    let cols = grid.cols();
    let index = |p: Position| p.row * cols + p.col;
    let cell_count = grid.rows() * cols;

    let mut dist = vec![usize::MAX; cell_count];
    let mut prev: Vec<Option<Position>> = vec![None; cell_count];
    let mut settled = vec![false; cell_count];
    let mut visited = Vec::new();
    let mut heap = BinaryHeap::new();
    let mut total_steps = 0;

    dist[index(start)] = 0;
    heap.push(Reverse((0usize, start)));

    while let Some(Reverse((d, current))) = heap.pop() {
        total_steps += 1;

        let current_idx = index(current);
        if settled[current_idx] {
            continue;
        }
        settled[current_idx] = true;
        visited.push(current);

        if current == goal {
            break;
        }

        for action in Action::ALL {
            let Some(next) = grid.neighbor(current, action) else {
                continue;
            };
            let next_idx = index(next);
            let candidate = d + 1;
            if candidate < dist[next_idx] {
                dist[next_idx] = candidate;
                prev[next_idx] = Some(current);
                heap.push(Reverse((candidate, next)));
                total_steps += 1;
            }
        }
    }

    let path = if dist[index(goal)] == usize::MAX {
        Vec::new()
    } else {
        let mut path = vec![goal];
        let mut current = goal;
        while let Some(parent) = prev[index(current)] {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    };

    debug!(
        %start,
        %goal,
        path_len = path.len(),
        total_steps,
        settled = visited.len(),
        "dijkstra finished"
    );

    Ok(Solution {
        path,
        total_steps,
        visited,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn fixture() -> Grid {
        Grid::from_matrix(&[[0u8, 1, 0, 0], [0, 1, 0, 1], [0, 0, 0, 1], [1, 1, 0, 0]]).unwrap()
    }

    #[test]
    fn test_fixture_path_and_work_count() {
        let solution = solve(&fixture(), Position::new(0, 0), Position::new(3, 3)).unwrap();
        let expected: Vec<Position> = [(0, 0), (1, 0), (2, 0), (2, 1), (2, 2), (3, 2), (3, 3)]
            .into_iter()
            .map(Position::from)
            .collect();
        assert_eq!(solution.path, expected);
        assert_eq!(solution.moves(), 6);
        // 9 pops and 9 pushes, traced by hand.
        assert_eq!(solution.total_steps, 18);
    }

    #[test]
    fn test_start_equals_goal() {
        let solution = solve(&fixture(), Position::new(0, 0), Position::new(0, 0)).unwrap();
        assert_eq!(solution.path, vec![Position::new(0, 0)]);
        assert_eq!(solution.total_steps, 1);
    }

    #[test]
    fn test_unreachable_goal_returns_empty_path() {
        let grid = Grid::from_matrix(&[[0u8, 0, 0], [0, 0, 1], [0, 1, 0]]).unwrap();
        let solution = solve(&grid, Position::new(0, 0), Position::new(2, 2)).unwrap();
        assert!(solution.path.is_empty());
        assert!(!solution.is_found());
        // Six reachable cells: six pops, five pushes.
        assert_eq!(solution.visited.len(), 6);
        assert_eq!(solution.total_steps, 11);
    }

    #[test]
    fn test_rejects_wall_endpoints() {
        let err = solve(&fixture(), Position::new(0, 1), Position::new(3, 3)).unwrap_err();
        assert!(matches!(err, Error::BlockedPosition { .. }));

        let err = solve(&fixture(), Position::new(0, 0), Position::new(4, 0)).unwrap_err();
        assert!(matches!(err, Error::InvalidPosition { .. }));
    }
}
