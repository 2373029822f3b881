//! Shared configuration types for CLI commands
//!
//! An [`ExperimentConfig`] can be loaded from JSON with `--config`; any flag
//! given on the command line overrides the corresponding field.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    maze::Placement,
    q_learning::{QLearningConfig, TransitionMode},
};

/// Maze generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeSettings {
    pub rows: usize,
    pub cols: usize,
    pub placement: Placement,
}

impl Default for MazeSettings {
    fn default() -> Self {
        Self {
            rows: 11,
            cols: 11,
            placement: Placement::default(),
        }
    }
}

/// Training loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingSettings {
    pub episodes: usize,
    /// Render the greedy path every N episodes
    pub snapshot_every: Option<usize>,
    /// Structured progress log every N episodes
    pub log_every: usize,
    /// Move cap for the final greedy path; `None` means `rows * cols`
    pub policy_max_steps: Option<usize>,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            episodes: 1000,
            snapshot_every: None,
            log_every: 100,
            policy_max_steps: None,
        }
    }
}

/// Benchmark settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkSettings {
    pub sizes: Vec<(usize, usize)>,
    pub mazes_per_size: usize,
    /// Training episodes per maze for the Q-learning solver
    pub episodes: usize,
}

impl Default for BenchmarkSettings {
    fn default() -> Self {
        Self {
            sizes: vec![(11, 11), (21, 21)],
            mazes_per_size: 5,
            episodes: 1000,
        }
    }
}

/// Complete experiment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Random seed for reproducibility
    pub seed: Option<u64>,

    /// Whether to show progress bars
    pub progress: bool,

    pub maze: MazeSettings,

    pub learner: QLearningConfig,

    pub training: TrainingSettings,

    pub benchmark: BenchmarkSettings,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            seed: None,
            progress: true,
            maze: MazeSettings::default(),
            learner: QLearningConfig::default(),
            training: TrainingSettings::default(),
            benchmark: BenchmarkSettings::default(),
        }
    }
}

impl ExperimentConfig {
    /// Load from a JSON file; missing fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Load from `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Switch the learner to another transition mode's preset.
    ///
    /// Only applies when the mode actually changes, so a configured learner
    /// with the same mode keeps its tuned values.
    pub fn set_mode(&mut self, mode: TransitionMode) {
        if self.learner.transition != mode {
            self.learner = QLearningConfig::for_mode(mode);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: ExperimentConfig =
            serde_json::from_str(r#"{"seed": 7, "maze": {"rows": 15}}"#).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.maze.rows, 15);
        assert_eq!(config.maze.cols, 11);
        assert_eq!(config.training.episodes, 1000);
        assert_eq!(config.learner, QLearningConfig::action_filtered());
    }

    #[test]
    fn test_partial_learner_fills_defaults() {
        let config: ExperimentConfig = serde_json::from_str(
            r#"{"learner": {"learning_rate": 0.2, "rewards": {"goal": 50.0}}}"#,
        )
        .unwrap();
        let defaults = QLearningConfig::action_filtered();
        assert_eq!(config.learner.learning_rate, 0.2);
        assert_eq!(config.learner.discount_factor, defaults.discount_factor);
        assert_eq!(config.learner.transition, TransitionMode::ActionFiltered);
        assert_eq!(config.learner.rewards.goal, 50.0);
        assert_eq!(config.learner.rewards.step, defaults.rewards.step);
        assert_eq!(config.learner.max_steps, None);
    }

    #[test]
    fn test_set_mode_swaps_preset() {
        let mut config = ExperimentConfig::default();
        config.learner.learning_rate = 0.3;
        config.set_mode(TransitionMode::ActionFiltered);
        assert_eq!(config.learner.learning_rate, 0.3);

        config.set_mode(TransitionMode::BouncePenalized);
        assert_eq!(config.learner, QLearningConfig::bounce_penalized());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("experiment.json");
        std::fs::write(
            &path,
            r#"{"benchmark": {"sizes": [[5, 7]], "mazes_per_size": 2}, "maze": {"placement": "corners"}}"#,
        )
        .unwrap();

        let config = ExperimentConfig::load(&path).unwrap();
        assert_eq!(config.benchmark.sizes, vec![(5, 7)]);
        assert_eq!(config.benchmark.mazes_per_size, 2);
        assert_eq!(config.maze.placement, Placement::Corners);
        assert!(ExperimentConfig::load(dir.path().join("missing.json")).is_err());
    }
}
