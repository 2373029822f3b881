//! Common test utilities for the mazebench test suite.
//!
//! Provides a breadth-first-search oracle and path checks shared by the
//! solver and learner tests.

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};

use mazebench::{Action, Grid, Position};

/// Shortest move count from `start` to `goal`, or `None` when unreachable.
pub fn bfs_distance(grid: &Grid, start: Position, goal: Position) -> Option<usize> {
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([(start, 0usize)]);
    while let Some((current, distance)) = queue.pop_front() {
        if current == goal {
            return Some(distance);
        }
        for action in Action::ALL {
            let Some(next) = grid.neighbor(current, action) else {
                continue;
            };
            if seen.insert(next) {
                queue.push_back((next, distance + 1));
            }
        }
    }
    None
}

/// Every open cell reachable from `start`.
pub fn reachable(grid: &Grid, start: Position) -> HashSet<Position> {
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        for action in Action::ALL {
            let Some(next) = grid.neighbor(current, action) else {
                continue;
            };
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    seen
}

/// Undirected edges between orthogonally adjacent open cells.
pub fn open_edge_count(grid: &Grid) -> usize {
    grid.open_cells()
        .flat_map(|cell| {
            [Action::Right, Action::Down]
                .into_iter()
                .filter_map(move |action| grid.neighbor(cell, action))
        })
        .count()
}

/// Assert `path` starts at `start`, stays on open cells, moves one cell at a
/// time and never revisits a cell.
pub fn assert_valid_path(grid: &Grid, path: &[Position], start: Position) {
    assert_eq!(path.first(), Some(&start), "path must begin at the start");
    let mut seen = HashSet::new();
    for cell in path {
        assert!(grid.is_open(*cell), "path crosses wall at {cell}");
        assert!(seen.insert(*cell), "path revisits {cell}");
    }
    for pair in path.windows(2) {
        assert!(
            pair[0].is_adjacent(pair[1]),
            "non-adjacent step {} -> {}",
            pair[0],
            pair[1]
        );
    }
}
