//! ε-greedy Q-learning agent and greedy policy extraction

use std::collections::HashSet;

use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    Result,
    maze::{Grid, Maze},
    q_learning::{
        config::{QLearningConfig, TransitionMode},
        environment::{EpisodeOutcome, MazeEnvironment, candidate_actions},
        q_table::QTable,
    },
    types::{Action, Position},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AgentState {
    pub q_table: QTable,
    pub config: QLearningConfig,
    pub epsilon: f64,
    pub episodes_trained: usize,
    pub rng_seed: Option<u64>,
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// One transition as seen by observers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub episode: usize,
    /// 0-based index of the move within the episode
    pub step: usize,
    pub state: Position,
    pub action: Action,
    pub reward: f64,
    pub next_state: Position,
    pub bumped: bool,
    /// Q(state, action) after the update
    pub q_value: f64,
}

/// Summary of one training episode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeStats {
    pub episode: usize,
    pub total_reward: f64,
    pub steps: usize,
    pub outcome: EpisodeOutcome,
    /// Exploration rate in effect during the episode
    pub epsilon: f64,
}

/// Why greedy policy extraction stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyOutcome {
    ReachedGoal,
    /// The greedy move made no progress, or there was nothing to choose from.
    Stuck,
    /// The greedy move re-entered a cell already on the path.
    Loop,
    StepLimit,
}

/// Path followed by the greedy policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyPath {
    /// Cells visited from the start; a prefix when the goal was not reached.
    pub path: Vec<Position>,
    /// One for the start cell plus one per attempted move, bumps included.
    pub total_steps: usize,
    pub outcome: PolicyOutcome,
}

impl PolicyPath {
    pub fn reached_goal(&self) -> bool {
        self.outcome == PolicyOutcome::ReachedGoal
    }
}

/// Tabular Q-learning agent (off-policy TD control)
///
/// Learns Q* by updating toward the best next-state value after every move,
/// regardless of the action the ε-greedy behaviour policy takes next.
///
/// # Examples
///
/// ```
/// use mazebench::maze::{MazeGenerator, Placement};
/// use mazebench::q_learning::{QLearningAgent, QLearningConfig};
///
/// let maze = MazeGenerator::new(Some(1))
///     .with_placement(Placement::Corners)
///     .generate(5, 5)?;
/// let mut agent = QLearningAgent::new(QLearningConfig::action_filtered())?.with_seed(7);
/// let history = agent.train(&maze, 200)?;
/// assert_eq!(history.len(), 200);
///
/// let policy = agent.policy_path(&maze.grid, maze.start, maze.goal, 100)?;
/// assert_eq!(policy.path[0], maze.start);
/// # Ok::<(), mazebench::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    q_table: QTable,
    config: QLearningConfig,
    epsilon: f64,
    episodes_trained: usize,
    rng: StdRng,
    rng_seed: Option<u64>,
}

impl QLearningAgent {
    /// Create an agent with an empty Q-table.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfiguration`] if the configuration is
    /// out of range.
    pub fn new(config: QLearningConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            q_table: QTable::new(config.learning_rate, config.discount_factor),
            epsilon: config.epsilon,
            config,
            episodes_trained: 0,
            rng: build_rng(None),
            rng_seed: None,
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
        self
    }

    pub fn set_rng_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
    }

    pub fn config(&self) -> &QLearningConfig {
        &self.config
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn episodes_trained(&self) -> usize {
        self.episodes_trained
    }

    pub fn transition_mode(&self) -> TransitionMode {
        self.config.transition
    }

    /// ε-greedy choice among `candidates`; `None` when there are none.
    pub fn select_action(&mut self, state: Position, candidates: &[Action]) -> Option<Action> {
        if candidates.is_empty() {
            return None;
        }
        if self.rng.random::<f64>() < self.epsilon {
            candidates.choose(&mut self.rng).copied()
        } else {
            self.q_table.greedy_action(state, candidates)
        }
    }

    /// Decay epsilon after episode
    pub fn decay_epsilon(&mut self) {
        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.min_epsilon);
    }

    /// Run one training episode from the maze's start cell.
    ///
    /// `on_step` sees every transition after its update has been applied. An
    /// error from the callback aborts the episode before ε is decayed.
    pub fn run_episode(
        &mut self,
        maze: &Maze,
        episode: usize,
        on_step: &mut dyn FnMut(&StepRecord) -> Result<()>,
    ) -> Result<EpisodeStats> {
        let mut env = MazeEnvironment::new(maze, &self.config);
        let mut state = env.reset();
        let epsilon = self.epsilon;
        let mut total_reward = 0.0;
        let mut step = 0;

        let outcome = loop {
            let candidates = env.candidates();
            let Some(action) = self.select_action(state, &candidates) else {
                break EpisodeOutcome::Stuck;
            };

            let transition = env.step(action);
            let next_actions = env.bootstrap_actions(transition.next_state);
            let q_value = self.q_table.q_learning_update(
                state,
                action,
                transition.reward,
                transition.next_state,
                &next_actions,
            );
            total_reward += transition.reward;

            on_step(&StepRecord {
                episode,
                step,
                state,
                action,
                reward: transition.reward,
                next_state: transition.next_state,
                bumped: transition.bumped,
                q_value,
            })?;

            step += 1;
            state = transition.next_state;
            if let Some(outcome) = transition.outcome {
                break outcome;
            }
        };

        self.decay_epsilon();
        self.episodes_trained += 1;

        debug!(
            episode,
            steps = env.steps(),
            total_reward,
            ?outcome,
            epsilon = self.epsilon,
            "episode finished"
        );

        Ok(EpisodeStats {
            episode,
            total_reward,
            steps: env.steps(),
            outcome,
            epsilon,
        })
    }

    /// Train for `episodes` episodes without observation.
    pub fn train(&mut self, maze: &Maze, episodes: usize) -> Result<Vec<EpisodeStats>> {
        let mut history = Vec::with_capacity(episodes);
        for episode in 0..episodes {
            history.push(self.run_episode(maze, episode, &mut |_| Ok(()))?);
        }
        Ok(history)
    }

    /// Follow the greedy policy from `start` toward `goal`.
    ///
    /// Uses the agent's transition mode to decide candidate actions and never
    /// touches the random stream or the Q-table. Failing to reach the goal is
    /// reported through [`PolicyPath::outcome`], not as an error.
    ///
    /// # Errors
    ///
    /// Returns an error if `start` or `goal` is out of bounds or a wall.
    pub fn policy_path(
        &self,
        grid: &Grid,
        start: Position,
        goal: Position,
        max_steps: usize,
    ) -> Result<PolicyPath> {
        grid.ensure_open(start)?;
        grid.ensure_open(goal)?;

        let mut path = vec![start];
        let mut visited = HashSet::from([start]);
        let mut total_steps = 1;
        let mut current = start;

        if start == goal {
            return Ok(PolicyPath {
                path,
                total_steps,
                outcome: PolicyOutcome::ReachedGoal,
            });
        }

        let mut outcome = PolicyOutcome::StepLimit;
        for _ in 0..max_steps {
            let candidates = candidate_actions(self.config.transition, grid, current);
            let Some(action) = self.q_table.greedy_action(current, &candidates) else {
                outcome = PolicyOutcome::Stuck;
                break;
            };
            total_steps += 1;

            let Some(next) = grid.neighbor(current, action) else {
                outcome = PolicyOutcome::Stuck;
                break;
            };
            if !visited.insert(next) {
                outcome = PolicyOutcome::Loop;
                break;
            }
            path.push(next);
            current = next;
            if current == goal {
                outcome = PolicyOutcome::ReachedGoal;
                break;
            }
        }

        Ok(PolicyPath {
            path,
            total_steps,
            outcome,
        })
    }

    /// Clear the Q-table and restore the initial exploration rate and RNG.
    pub fn reset(&mut self) {
        self.q_table.reset();
        self.epsilon = self.config.epsilon;
        self.episodes_trained = 0;
        self.rng = build_rng(self.rng_seed);
    }

    pub(crate) fn export_state(&self) -> AgentState {
        AgentState {
            q_table: self.q_table.clone(),
            config: self.config.clone(),
            epsilon: self.epsilon,
            episodes_trained: self.episodes_trained,
            rng_seed: self.rng_seed,
        }
    }

    pub(crate) fn from_state(state: AgentState) -> Self {
        Self {
            q_table: state.q_table,
            config: state.config,
            epsilon: state.epsilon,
            episodes_trained: state.episodes_trained,
            rng: build_rng(state.rng_seed),
            rng_seed: state.rng_seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::Error, maze::Grid};

    fn corridor() -> Maze {
        let grid = Grid::from_matrix(&[[0u8, 0, 0], [1, 1, 0]]).unwrap();
        Maze::new(grid, Position::new(0, 0), Position::new(1, 2)).unwrap()
    }

    fn greedy_config() -> QLearningConfig {
        QLearningConfig::action_filtered().with_epsilon(0.0, 1.0, 0.0)
    }

    #[test]
    fn test_epsilon_decays_to_floor() {
        let mut agent = QLearningAgent::new(
            QLearningConfig::action_filtered().with_epsilon(0.5, 0.5, 0.1),
        )
        .unwrap();
        agent.decay_epsilon();
        assert!((agent.epsilon() - 0.25).abs() < 1e-12);
        agent.decay_epsilon();
        agent.decay_epsilon();
        assert!((agent.epsilon() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = QLearningAgent::new(QLearningConfig::default().with_discount_factor(-0.1))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_greedy_episode_on_corridor() {
        let maze = corridor();
        let mut agent = QLearningAgent::new(greedy_config()).unwrap().with_seed(1);
        let mut steps = Vec::new();
        let stats = agent
            .run_episode(&maze, 0, &mut |record| {
                steps.push(*record);
                Ok(())
            })
            .unwrap();

        assert_eq!(stats.outcome, EpisodeOutcome::ReachedGoal);
        assert_eq!(stats.steps, 3);
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[2].next_state, maze.goal);
        // -0.1 - 0.1 + 100
        assert!((stats.total_reward - 99.8).abs() < 1e-9);
        // Only the goal move is positive after one pass.
        assert!((steps[2].q_value - 10.0).abs() < 1e-9);
        assert_eq!(agent.episodes_trained(), 1);
    }

    #[test]
    fn test_isolated_start_is_stuck() {
        let grid = Grid::from_matrix(&[[0u8, 1, 0], [1, 1, 0]]).unwrap();
        let maze = Maze::new(grid, Position::new(0, 0), Position::new(1, 2)).unwrap();
        let mut agent = QLearningAgent::new(QLearningConfig::action_filtered()).unwrap();
        let stats = agent.run_episode(&maze, 0, &mut |_| Ok(())).unwrap();
        assert_eq!(stats.outcome, EpisodeOutcome::Stuck);
        assert_eq!(stats.steps, 0);
        assert!(agent.q_table().is_empty());
    }

    #[test]
    fn test_step_callback_error_propagates() {
        let maze = corridor();
        let mut agent = QLearningAgent::new(greedy_config()).unwrap();
        let result = agent.run_episode(&maze, 0, &mut |_| {
            Err(Error::InvalidConfiguration {
                message: "stop".to_string(),
            })
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_policy_path_after_training() {
        let maze = corridor();
        let mut agent = QLearningAgent::new(QLearningConfig::action_filtered())
            .unwrap()
            .with_seed(3);
        agent.train(&maze, 50).unwrap();

        let policy = agent
            .policy_path(&maze.grid, maze.start, maze.goal, 20)
            .unwrap();
        assert!(policy.reached_goal());
        assert_eq!(policy.path.len(), 4);
        assert_eq!(policy.total_steps, 4);
    }

    #[test]
    fn test_untrained_policy_loops_back() {
        // All Q-values are zero, so the first valid action wins. From (0, 0)
        // that is Right, back to the start.
        let grid = Grid::from_matrix(&[[0u8, 0], [0, 1]]).unwrap();
        let agent = QLearningAgent::new(QLearningConfig::action_filtered()).unwrap();
        let policy = agent
            .policy_path(&grid, Position::new(0, 1), Position::new(1, 0), 10)
            .unwrap();
        assert_eq!(policy.outcome, PolicyOutcome::Loop);
        assert_eq!(policy.path, vec![Position::new(0, 1), Position::new(0, 0)]);
        assert_eq!(policy.total_steps, 3);
    }

    #[test]
    fn test_untrained_bounce_policy_is_stuck() {
        let agent = QLearningAgent::new(QLearningConfig::bounce_penalized()).unwrap();
        let policy = agent
            .policy_path(
                &corridor().grid,
                Position::new(0, 0),
                Position::new(1, 2),
                10,
            )
            .unwrap();
        // Up is tried first and bumps the boundary.
        assert_eq!(policy.outcome, PolicyOutcome::Stuck);
        assert_eq!(policy.path, vec![Position::new(0, 0)]);
        assert_eq!(policy.total_steps, 2);
    }

    #[test]
    fn test_policy_step_limit() {
        let maze = corridor();
        let mut agent = QLearningAgent::new(QLearningConfig::action_filtered())
            .unwrap()
            .with_seed(3);
        agent.train(&maze, 50).unwrap();
        let policy = agent
            .policy_path(&maze.grid, maze.start, maze.goal, 2)
            .unwrap();
        assert_eq!(policy.outcome, PolicyOutcome::StepLimit);
        assert_eq!(policy.path.len(), 3);
        assert_eq!(policy.total_steps, 3);
    }

    #[test]
    fn test_policy_rejects_wall_endpoints() {
        let agent = QLearningAgent::new(QLearningConfig::default()).unwrap();
        let err = agent
            .policy_path(&corridor().grid, Position::new(1, 0), Position::new(1, 2), 5)
            .unwrap_err();
        assert!(matches!(err, Error::BlockedPosition { .. }));
    }

    #[test]
    fn test_reset_clears_learning() {
        let maze = corridor();
        let mut agent = QLearningAgent::new(QLearningConfig::action_filtered())
            .unwrap()
            .with_seed(5);
        agent.train(&maze, 10).unwrap();
        assert!(!agent.q_table().is_empty());

        agent.reset();
        assert!(agent.q_table().is_empty());
        assert_eq!(agent.epsilon(), agent.config().epsilon);
        assert_eq!(agent.episodes_trained(), 0);
    }

    #[test]
    fn test_same_seed_same_table() {
        let maze = corridor();
        let train = || {
            let mut agent = QLearningAgent::new(QLearningConfig::bounce_penalized())
                .unwrap()
                .with_seed(11);
            agent.train(&maze, 20).unwrap();
            agent
        };
        assert_eq!(train().q_table(), train().q_table());
    }
}
