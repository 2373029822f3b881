//! Benchmark harness comparing pathfinding strategies
//!
//! This module wraps each strategy behind the [`Solver`] port and runs them
//! side by side on freshly generated mazes:
//! - Dijkstra shortest-path search
//! - Tabular Q-learning (train, then follow the greedy policy)

use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    Result,
    dijkstra,
    error::Error,
    maze::{Maze, MazeGenerator, Placement},
    ports::{Solver, SolverReport},
    q_learning::{QLearningAgent, QLearningConfig},
    types::Position,
};

/// Dijkstra solver adapter
#[derive(Debug, Clone)]
pub struct DijkstraSolver {
    name: String,
}

impl DijkstraSolver {
    pub fn new() -> Self {
        Self {
            name: "Dijkstra".to_string(),
        }
    }
}

impl Default for DijkstraSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver for DijkstraSolver {
    fn name(&self) -> &str {
        &self.name
    }

    fn solve(&mut self, maze: &Maze) -> Result<SolverReport> {
        let solution = dijkstra::solve(&maze.grid, maze.start, maze.goal)?;
        Ok(SolverReport {
            success: solution.is_found(),
            total_steps: solution.total_steps,
            path: solution.path,
        })
    }
}

/// Q-learning solver adapter
///
/// Trains a fresh agent on every maze, then extracts the greedy path. The
/// reported `total_steps` follows the policy-extraction convention: one for
/// the start cell plus one per attempted move.
#[derive(Debug, Clone)]
pub struct QLearningSolver {
    name: String,
    config: QLearningConfig,
    episodes: usize,
    max_steps: Option<usize>,
    seed: Option<u64>,
}

impl QLearningSolver {
    pub fn new(config: QLearningConfig, episodes: usize) -> Self {
        Self {
            name: "Q-Learning".to_string(),
            config,
            episodes,
            max_steps: None,
            seed: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Move cap for policy extraction; defaults to `rows * cols`
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Solver for QLearningSolver {
    fn name(&self) -> &str {
        &self.name
    }

    fn solve(&mut self, maze: &Maze) -> Result<SolverReport> {
        let mut agent = QLearningAgent::new(self.config.clone())?;
        if let Some(seed) = self.seed {
            agent.set_rng_seed(seed);
        }
        agent.train(maze, self.episodes)?;

        let max_steps = self.max_steps.unwrap_or(maze.rows() * maze.cols());
        let policy = agent.policy_path(&maze.grid, maze.start, maze.goal, max_steps)?;
        debug!(
            solver = %self.name,
            outcome = ?policy.outcome,
            total_steps = policy.total_steps,
            "policy extracted"
        );
        Ok(SolverReport {
            success: policy.reached_goal(),
            total_steps: policy.total_steps,
            path: policy.path,
        })
    }

    fn set_rng_seed(&mut self, seed: u64) {
        self.seed = Some(seed);
    }
}

/// Per-run metrics record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmResult {
    pub algorithm_name: String,
    /// `RxC`
    pub maze_size: String,
    /// Wall time in seconds
    pub execution_time: f64,
    /// Moves along the path; 0 on failure.
    ///
    /// Counts edges, not cells, so a successful run records one less than
    /// the path's cell count.
    pub path_length: usize,
    /// The solver's work counter
    pub cells_visited: usize,
    pub success: bool,
    pub path: Vec<Position>,
}

/// Flat row for CSV batch export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRow {
    pub maze_id: usize,
    pub algorithm: String,
    /// Moves, as in [`AlgorithmResult::path_length`]
    pub path_length: usize,
    pub maze_size: String,
    pub total_steps: usize,
    /// Wall time in seconds
    pub time: f64,
    pub success: bool,
}

impl BatchRow {
    pub fn from_result(maze_id: usize, result: &AlgorithmResult) -> Self {
        Self {
            maze_id,
            algorithm: result.algorithm_name.clone(),
            path_length: result.path_length,
            maze_size: result.maze_size.clone(),
            total_steps: result.cells_visited,
            time: result.execution_time,
            success: result.success,
        }
    }
}

/// Benchmark configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Maze sizes as (rows, cols)
    pub sizes: Vec<(usize, usize)>,
    pub mazes_per_size: usize,
    /// Seeds maze generation and, offset per maze, every solver
    pub seed: Option<u64>,
    pub placement: Placement,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            sizes: vec![(11, 11), (21, 21)],
            mazes_per_size: 5,
            seed: None,
            placement: Placement::default(),
        }
    }
}

/// Everything a benchmark run produced
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub records: Vec<AlgorithmResult>,
    pub rows: Vec<BatchRow>,
}

impl BenchmarkReport {
    /// Records of one algorithm, in run order
    pub fn records_for<'a>(&'a self, algorithm: &'a str) -> impl Iterator<Item = &'a AlgorithmResult> {
        self.records
            .iter()
            .filter(move |r| r.algorithm_name == algorithm)
    }
}

/// Runs every solver on every generated maze
pub struct BenchmarkRunner {
    config: BenchmarkConfig,
    solvers: Vec<Box<dyn Solver>>,
    show_progress: bool,
}

impl BenchmarkRunner {
    pub fn new(config: BenchmarkConfig, solvers: Vec<Box<dyn Solver>>) -> Self {
        Self {
            config,
            solvers,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn solver_names(&self) -> Vec<String> {
        self.solvers.iter().map(|s| s.name().to_string()).collect()
    }

    /// Generate the configured mazes and run all solvers on each.
    ///
    /// Maze ids run from 0 across all sizes in generation order.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid sizes, an empty solver list, or a solver
    /// error.
    pub fn run(&mut self) -> Result<BenchmarkReport> {
        if self.solvers.is_empty() {
            return Err(Error::InvalidConfiguration {
                message: "benchmark needs at least one solver".to_string(),
            });
        }

        let total = self.config.sizes.len() * self.config.mazes_per_size;
        let progress = self.progress_bar(total)?;
        let mut generator =
            MazeGenerator::new(self.config.seed).with_placement(self.config.placement);
        let mut report = BenchmarkReport::default();
        let mut maze_id = 0;

        let sizes = self.config.sizes.clone();
        for (rows, cols) in sizes {
            for _ in 0..self.config.mazes_per_size {
                let maze = generator.generate(rows, cols)?;
                for record in self.run_maze(maze_id, &maze)? {
                    report.rows.push(BatchRow::from_result(maze_id, &record));
                    report.records.push(record);
                }
                if let Some(pb) = &progress {
                    pb.inc(1);
                }
                maze_id += 1;
            }
        }

        if let Some(pb) = &progress {
            pb.finish();
        }
        info!(
            mazes = maze_id,
            records = report.records.len(),
            "benchmark finished"
        );
        Ok(report)
    }

    /// Run all solvers on one maze.
    pub fn run_maze(&mut self, maze_id: usize, maze: &Maze) -> Result<Vec<AlgorithmResult>> {
        let mut results = Vec::with_capacity(self.solvers.len());
        for solver in &mut self.solvers {
            if let Some(seed) = self.config.seed {
                solver.set_rng_seed(seed.wrapping_add(maze_id as u64));
            }

            let started = Instant::now();
            let report = solver.solve(maze)?;
            let execution_time = started.elapsed().as_secs_f64();

            debug!(
                maze_id,
                solver = solver.name(),
                success = report.success,
                total_steps = report.total_steps,
                execution_time,
                "solver finished"
            );

            results.push(AlgorithmResult {
                algorithm_name: solver.name().to_string(),
                maze_size: maze.size_label(),
                execution_time,
                path_length: report.path_length(),
                cells_visited: report.total_steps,
                success: report.success,
                path: report.path,
            });
        }
        Ok(results)
    }

    fn progress_bar(&self, total: usize) -> Result<Option<ProgressBar>> {
        if !self.show_progress {
            return Ok(None);
        }
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} mazes")
                .map_err(|e| Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        Ok(Some(pb))
    }
}
