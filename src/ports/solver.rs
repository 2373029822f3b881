//! Solver port - common interface for maze pathfinding strategies
//!
//! The benchmark harness only sees this trait, so the shortest-path search and
//! the learned policy are timed and reported the same way.

use serde::{Deserialize, Serialize};

use crate::{Result, maze::Maze, types::Position};

/// What a solver produced for one maze.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverReport {
    /// Cells from the start; empty or partial when the goal was not reached.
    pub path: Vec<Position>,
    /// Work counter in the solver's own convention.
    pub total_steps: usize,
    pub success: bool,
}

impl SolverReport {
    /// Moves along the path when it reaches the goal, 0 otherwise.
    pub fn path_length(&self) -> usize {
        if self.success {
            self.path.len().saturating_sub(1)
        } else {
            0
        }
    }
}

/// Solver trait - unified interface for pathfinding approaches
///
/// # Examples
///
/// ```no_run
/// use mazebench::{maze::Maze, ports::{Solver, SolverReport}};
///
/// fn run_all(solvers: &mut [Box<dyn Solver>], maze: &Maze) -> mazebench::Result<Vec<SolverReport>> {
///     solvers.iter_mut().map(|solver| solver.solve(maze)).collect()
/// }
/// ```
pub trait Solver: Send {
    /// Display name used in metrics records and exports.
    fn name(&self) -> &str;

    /// Find a path from `maze.start` to `maze.goal`.
    ///
    /// Failing to reach the goal is a report with `success == false`, not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid input such as blocked endpoints.
    fn solve(&mut self, maze: &Maze) -> Result<SolverReport>;

    /// Reseed any internal randomness.
    ///
    /// # Default Implementation
    ///
    /// Does nothing, suitable for deterministic solvers.
    fn set_rng_seed(&mut self, _seed: u64) {}
}
