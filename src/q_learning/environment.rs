//! Episodic maze environment
//!
//! The environment owns the agent's position and the per-episode step count.
//! It knows nothing about Q-values: it only turns an action into a reward, a
//! successor position and, on the last move of an episode, an outcome.

use serde::{Deserialize, Serialize};

use crate::{
    maze::{Grid, Maze},
    q_learning::config::{QLearningConfig, RewardScheme, TransitionMode},
    types::{Action, Position},
};

/// How a training episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeOutcome {
    ReachedGoal,
    /// No candidate action from the current cell.
    Stuck,
    StepBudgetExhausted,
}

/// Result of applying one action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub next_state: Position,
    pub reward: f64,
    /// The move hit a wall or the boundary and left the agent in place.
    pub bumped: bool,
    /// Set on the move that ends the episode.
    pub outcome: Option<EpisodeOutcome>,
}

impl Transition {
    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }
}

/// Candidate actions from `position` under the given transition mode.
pub fn candidate_actions(mode: TransitionMode, grid: &Grid, position: Position) -> Vec<Action> {
    match mode {
        TransitionMode::ActionFiltered => grid.valid_actions(position),
        TransitionMode::BouncePenalized => Action::ALL.to_vec(),
    }
}

/// A maze wrapped as an episodic reinforcement-learning environment.
#[derive(Debug, Clone)]
pub struct MazeEnvironment<'a> {
    maze: &'a Maze,
    mode: TransitionMode,
    rewards: RewardScheme,
    max_steps: usize,
    position: Position,
    steps: usize,
}

impl<'a> MazeEnvironment<'a> {
    pub fn new(maze: &'a Maze, config: &QLearningConfig) -> Self {
        Self {
            maze,
            mode: config.transition,
            rewards: config.rewards,
            max_steps: config.step_budget(maze.rows(), maze.cols()),
            position: maze.start,
            steps: 0,
        }
    }

    /// Return to the start cell and clear the step count.
    pub fn reset(&mut self) -> Position {
        self.position = self.maze.start;
        self.steps = 0;
        self.position
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn maze(&self) -> &'a Maze {
        self.maze
    }

    pub fn mode(&self) -> TransitionMode {
        self.mode
    }

    /// Actions the agent may choose from the current cell.
    pub fn candidates(&self) -> Vec<Action> {
        candidate_actions(self.mode, &self.maze.grid, self.position)
    }

    /// Actions the bootstrap maximum ranges over at `position`.
    pub fn bootstrap_actions(&self, position: Position) -> Vec<Action> {
        candidate_actions(self.mode, &self.maze.grid, position)
    }

    /// Apply `action` from the current cell.
    ///
    /// Blocked moves (only reachable in bounce-penalized mode) keep the agent
    /// in place with the wall-bump reward. Every call counts against the step
    /// budget; the call that exhausts it ends the episode with the timeout
    /// reward unless it reached the goal.
    pub fn step(&mut self, action: Action) -> Transition {
        self.steps += 1;
        let target = self.maze.grid.neighbor(self.position, action);
        let bumped = target.is_none();
        let next_state = target.unwrap_or(self.position);
        self.position = next_state;

        if next_state == self.maze.goal {
            return Transition {
                next_state,
                reward: self.rewards.goal,
                bumped,
                outcome: Some(EpisodeOutcome::ReachedGoal),
            };
        }

        if self.steps >= self.max_steps {
            return Transition {
                next_state,
                reward: self.rewards.timeout,
                bumped,
                outcome: Some(EpisodeOutcome::StepBudgetExhausted),
            };
        }

        let reward = if bumped {
            self.rewards.wall_bump
        } else {
            self.rewards.step
        };
        Transition {
            next_state,
            reward,
            bumped,
            outcome: None,
        }
    }
}
