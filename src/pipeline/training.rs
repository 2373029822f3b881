//! Episode loop for the Q-learning agent

use std::{
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    Result,
    maze::Maze,
    ports::TrainingObserver,
    q_learning::{EpisodeOutcome, EpisodeStats, PolicyPath, QLearningAgent},
};

/// Training configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of training episodes
    pub episodes: usize,

    /// Random seed applied to the agent before the first episode
    pub seed: Option<u64>,

    /// Move cap for greedy-path snapshots; `None` means `rows * cols`
    pub max_steps: Option<usize>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 1000,
            seed: None,
            max_steps: None,
        }
    }
}

/// Result of a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingResult {
    /// Episodes actually run
    pub total_episodes: usize,

    pub goals_reached: usize,

    pub stuck: usize,

    pub budget_exhausted: usize,

    /// Fraction of episodes that reached the goal
    pub success_rate: f64,

    /// Exploration rate after the last episode
    pub final_epsilon: f64,

    /// Whether the run stopped early on the cancellation flag
    pub cancelled: bool,

    /// Per-episode trace
    pub episodes: Vec<EpisodeStats>,
}

impl TrainingResult {
    pub fn new(episodes: Vec<EpisodeStats>, final_epsilon: f64, cancelled: bool) -> Self {
        let count = |outcome: EpisodeOutcome| episodes.iter().filter(|e| e.outcome == outcome).count();
        let goals_reached = count(EpisodeOutcome::ReachedGoal);
        let stuck = count(EpisodeOutcome::Stuck);
        let budget_exhausted = count(EpisodeOutcome::StepBudgetExhausted);
        let total_episodes = episodes.len();
        let success_rate = if total_episodes > 0 {
            goals_reached as f64 / total_episodes as f64
        } else {
            0.0
        };

        Self {
            total_episodes,
            goals_reached,
            stuck,
            budget_exhausted,
            success_rate,
            final_epsilon,
            cancelled,
            episodes,
        }
    }

    /// Save result to JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load result from JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let result = serde_json::from_reader(file)?;
        Ok(result)
    }
}

/// Training pipeline for a single agent on a single maze
pub struct TrainingPipeline {
    config: TrainingConfig,
    observers: Vec<Box<dyn TrainingObserver>>,
    cancel: Option<Arc<AtomicBool>>,
}

impl TrainingPipeline {
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            observers: Vec::new(),
            cancel: None,
        }
    }

    /// Add an observer to the pipeline
    pub fn with_observer(mut self, observer: Box<dyn TrainingObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Stop between episodes once `flag` is set
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train `agent` on `maze`.
    ///
    /// The agent keeps everything it learns; calling `run` again continues
    /// from the current Q-table and exploration rate.
    ///
    /// # Errors
    ///
    /// Propagates the first observer error. Episodes finished before the
    /// error remain applied to the agent.
    pub fn run(&mut self, agent: &mut QLearningAgent, maze: &Maze) -> Result<TrainingResult> {
        if let Some(seed) = self.config.seed {
            agent.set_rng_seed(seed);
        }

        for observer in &mut self.observers {
            observer.on_training_start(maze, self.config.episodes)?;
        }

        let snapshot_steps = self
            .config
            .max_steps
            .unwrap_or(maze.rows() * maze.cols());
        let mut trace = Vec::with_capacity(self.config.episodes);
        let mut cancelled = false;

        for episode in 0..self.config.episodes {
            if self.is_cancelled() {
                warn!(episode, "training cancelled");
                cancelled = true;
                break;
            }

            for observer in &mut self.observers {
                observer.on_episode_start(episode)?;
            }

            let observers = &mut self.observers;
            let stats = agent.run_episode(maze, episode, &mut |record| {
                for observer in observers.iter_mut() {
                    observer.on_step(record)?;
                }
                Ok(())
            })?;

            for observer in &mut self.observers {
                observer.on_episode_end(&stats)?;
            }
            trace.push(stats);

            self.notify_snapshots(agent, maze, episode, snapshot_steps)?;
        }

        for observer in &mut self.observers {
            observer.on_training_end()?;
        }

        let result = TrainingResult::new(trace, agent.epsilon(), cancelled);
        info!(
            episodes = result.total_episodes,
            goals = result.goals_reached,
            success_rate = result.success_rate,
            final_epsilon = result.final_epsilon,
            "training finished"
        );
        Ok(result)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn notify_snapshots(
        &mut self,
        agent: &QLearningAgent,
        maze: &Maze,
        episode: usize,
        max_steps: usize,
    ) -> Result<()> {
        let completed = episode + 1;
        let mut snapshot: Option<PolicyPath> = None;

        for observer in &mut self.observers {
            let due = observer
                .snapshot_interval()
                .is_some_and(|n| n > 0 && completed % n == 0);
            if !due {
                continue;
            }
            if snapshot.is_none() {
                snapshot = Some(agent.policy_path(&maze.grid, maze.start, maze.goal, max_steps)?);
            }
            if let Some(path) = &snapshot {
                observer.on_policy_snapshot(episode, path)?;
            }
        }
        Ok(())
    }
}
