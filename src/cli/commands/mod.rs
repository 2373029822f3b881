//! Subcommands and the argument plumbing they share

pub mod benchmark;
pub mod generate;
pub mod solve;
pub mod train;

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow, bail};
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{
    cli::config::{ExperimentConfig, MazeSettings},
    maze::{Grid, Maze, MazeGenerator, Placement},
    q_learning::{QLearningConfig, TransitionMode},
    types::Position,
};

/// Parse a `row,col` pair.
pub(crate) fn parse_position(value: &str) -> Result<Position> {
    let (row, col) = value
        .split_once(',')
        .ok_or_else(|| anyhow!("Invalid position '{value}' (expected ROW,COL)"))?;
    let row = row
        .trim()
        .parse()
        .with_context(|| format!("Invalid row in '{value}'"))?;
    let col = col
        .trim()
        .parse()
        .with_context(|| format!("Invalid column in '{value}'"))?;
    Ok(Position::new(row, col))
}

/// Parse a `ROWSxCOLS` size; a bare number means a square maze.
pub(crate) fn parse_size(value: &str) -> Result<(usize, usize)> {
    let value = value.trim();
    let (rows, cols) = match value.split_once(['x', 'X']) {
        Some((rows, cols)) => (rows.trim(), cols.trim()),
        None => (value, value),
    };
    let rows = rows
        .parse()
        .with_context(|| format!("Invalid size '{value}' (expected ROWSxCOLS)"))?;
    let cols = cols
        .parse()
        .with_context(|| format!("Invalid size '{value}' (expected ROWSxCOLS)"))?;
    Ok((rows, cols))
}

/// Parse a comma-separated size list such as `11x11,21x21`.
pub(crate) fn parse_size_list(value: &str) -> Result<Vec<(usize, usize)>> {
    let sizes = value
        .split(',')
        .filter(|token| !token.trim().is_empty())
        .map(parse_size)
        .collect::<Result<Vec<_>>>()?;
    if sizes.is_empty() {
        bail!("No maze sizes given");
    }
    Ok(sizes)
}

/// Force a `.json` extension; a directory target gets `default_name`.
pub(crate) fn sanitize_json_path(raw: &Path, default_name: &str) -> PathBuf {
    let mut normalized = raw.to_path_buf();
    let raw_str = raw.as_os_str().to_string_lossy();

    // Treat trailing separators or missing filename as a directory target.
    if raw_str.ends_with(std::path::MAIN_SEPARATOR) || normalized.file_name().is_none() {
        normalized.push(default_name);
        return normalized;
    }

    match normalized.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => normalized,
        _ => {
            normalized.set_extension("json");
            normalized
        }
    }
}

/// Write `value` as pretty JSON, creating parent directories.
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// On-disk maze: the 0/1 matrix plus endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MazeFile {
    pub grid: Vec<Vec<u8>>,
    pub start: Position,
    pub goal: Position,
}

impl From<&Maze> for MazeFile {
    fn from(maze: &Maze) -> Self {
        Self {
            grid: maze.grid.to_matrix(),
            start: maze.start,
            goal: maze.goal,
        }
    }
}

/// Accepted maze inputs: a full maze file or a bare grid matrix
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MazeInput {
    Full {
        grid: Vec<Vec<u8>>,
        start: Option<Position>,
        goal: Option<Position>,
    },
    Matrix(Vec<Vec<u8>>),
}

/// Where the maze for a command comes from
#[derive(Args, Debug, Clone, Default)]
pub struct MazeArgs {
    /// Load the maze from JSON (a 0/1 matrix or a generated maze file)
    #[arg(long, conflicts_with_all = ["rows", "cols", "placement"])]
    pub maze: Option<PathBuf>,

    /// Rows of a generated maze
    #[arg(long)]
    pub rows: Option<usize>,

    /// Columns of a generated maze
    #[arg(long)]
    pub cols: Option<usize>,

    /// Start/goal placement of a generated maze (farthest or corners)
    #[arg(long)]
    pub placement: Option<Placement>,

    /// Start cell as ROW,COL (overrides the file; defaults to the top-left corner)
    #[arg(long, value_parser = parse_position)]
    pub start: Option<Position>,

    /// Goal cell as ROW,COL (overrides the file; defaults to the bottom-right corner)
    #[arg(long, value_parser = parse_position)]
    pub goal: Option<Position>,
}

impl MazeArgs {
    /// Load or generate the maze, with flags taking precedence over `settings`.
    pub fn resolve(&self, settings: &MazeSettings, seed: Option<u64>) -> Result<Maze> {
        if let Some(path) = &self.maze {
            return self.load(path);
        }

        let rows = self.rows.unwrap_or(settings.rows);
        let cols = self.cols.unwrap_or(settings.cols);
        let placement = self.placement.unwrap_or(settings.placement);
        let mut maze = MazeGenerator::new(seed)
            .with_placement(placement)
            .generate(rows, cols)
            .with_context(|| format!("Failed to generate a {rows}x{cols} maze"))?;

        if self.start.is_some() || self.goal.is_some() {
            let start = self.start.unwrap_or(maze.start);
            let goal = self.goal.unwrap_or(maze.goal);
            maze = Maze::new(maze.grid, start, goal)?;
        }
        Ok(maze)
    }

    fn load(&self, path: &Path) -> Result<Maze> {
        let file =
            File::open(path).with_context(|| format!("Failed to open maze {}", path.display()))?;
        let input: MazeInput = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse maze {}", path.display()))?;
        let (matrix, file_start, file_goal) = match input {
            MazeInput::Full { grid, start, goal } => (grid, start, goal),
            MazeInput::Matrix(grid) => (grid, None, None),
        };

        let grid = Grid::from_matrix(matrix.as_slice())
            .with_context(|| format!("Invalid grid in {}", path.display()))?;
        let start = self
            .start
            .or(file_start)
            .unwrap_or(Position::new(0, 0));
        let goal = self.goal.or(file_goal).unwrap_or(Position::new(
            grid.rows().saturating_sub(1),
            grid.cols().saturating_sub(1),
        ));
        Maze::new(grid, start, goal).with_context(|| format!("Invalid endpoints in {}", path.display()))
    }
}

/// Q-learning hyper-parameter overrides
#[derive(Args, Debug, Clone, Default)]
pub struct LearnerArgs {
    /// Transition mode (action-filtered or bounce-penalized); selects its preset
    #[arg(long)]
    pub mode: Option<TransitionMode>,

    /// Learning rate α
    #[arg(long)]
    pub learning_rate: Option<f64>,

    /// Discount factor γ
    #[arg(long)]
    pub discount_factor: Option<f64>,

    /// Initial exploration rate ε
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Multiplicative ε decay applied after each episode
    #[arg(long)]
    pub epsilon_decay: Option<f64>,

    /// Floor for ε
    #[arg(long)]
    pub min_epsilon: Option<f64>,

    /// Per-episode step budget (defaults to rows * cols * 2)
    #[arg(long)]
    pub max_steps: Option<usize>,
}

impl LearnerArgs {
    /// Apply the overrides to the configured learner and validate the result.
    pub fn apply(&self, config: &mut ExperimentConfig) -> Result<QLearningConfig> {
        if let Some(mode) = self.mode {
            config.set_mode(mode);
        }
        let learner = &mut config.learner;
        if let Some(value) = self.learning_rate {
            learner.learning_rate = value;
        }
        if let Some(value) = self.discount_factor {
            learner.discount_factor = value;
        }
        if let Some(value) = self.epsilon {
            learner.epsilon = value;
        }
        if let Some(value) = self.epsilon_decay {
            learner.epsilon_decay = value;
        }
        if let Some(value) = self.min_epsilon {
            learner.min_epsilon = value;
        }
        if self.max_steps.is_some() {
            learner.max_steps = self.max_steps;
        }
        learner.validate()?;
        Ok(learner.clone())
    }
}
