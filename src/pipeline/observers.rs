//! Observer implementations for the training pipeline
//!
//! Observers allow composable data collection during training without coupling
//! the episode loop to specific output formats.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    Result,
    maze::Maze,
    ports::TrainingObserver,
    q_learning::{EpisodeOutcome, EpisodeStats, PolicyPath, StepRecord},
};

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    goals: usize,
    failures: usize,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            goals: 0,
            failures: 0,
        }
    }

    fn message(&self) -> String {
        format!("goal:{} failed:{}", self.goals, self.failures)
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl TrainingObserver for ProgressObserver {
    fn on_training_start(&mut self, _maze: &Maze, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, stats: &EpisodeStats) -> Result<()> {
        match stats.outcome {
            EpisodeOutcome::ReachedGoal => self.goals += 1,
            EpisodeOutcome::Stuck | EpisodeOutcome::StepBudgetExhausted => self.failures += 1,
        }

        if let Some(pb) = &self.progress_bar {
            pb.set_position(stats.episode as u64 + 1);
            pb.set_message(self.message());
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

/// Metrics observer - Tracks training metrics
#[derive(Debug, Default)]
pub struct MetricsObserver {
    outcomes: Vec<EpisodeOutcome>,
    rewards: Vec<f64>,
    steps: Vec<usize>,
    bumps: usize,
}

/// Summary of training metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_episodes: usize,
    pub goals_reached: usize,
    pub stuck: usize,
    pub budget_exhausted: usize,
    pub success_rate: f64,
    pub avg_reward: f64,
    pub avg_steps: f64,
    /// Wall bumps across all episodes (bounce-penalized mode)
    pub wall_bumps: usize,
    /// Success rate over the last 100 episodes
    pub recent_success_rate: f64,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    fn count(&self, outcome: EpisodeOutcome) -> usize {
        self.outcomes.iter().filter(|&&o| o == outcome).count()
    }

    /// Fraction of episodes that reached the goal
    pub fn success_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            0.0
        } else {
            self.count(EpisodeOutcome::ReachedGoal) as f64 / self.outcomes.len() as f64
        }
    }

    /// Success rate over the last `window` episodes
    pub fn recent_success_rate(&self, window: usize) -> f64 {
        let start = self.outcomes.len().saturating_sub(window);
        let recent = &self.outcomes[start..];
        if recent.is_empty() {
            0.0
        } else {
            recent
                .iter()
                .filter(|&&o| o == EpisodeOutcome::ReachedGoal)
                .count() as f64
                / recent.len() as f64
        }
    }

    pub fn avg_reward(&self) -> f64 {
        if self.rewards.is_empty() {
            0.0
        } else {
            self.rewards.iter().sum::<f64>() / self.rewards.len() as f64
        }
    }

    pub fn avg_steps(&self) -> f64 {
        if self.steps.is_empty() {
            0.0
        } else {
            self.steps.iter().sum::<usize>() as f64 / self.steps.len() as f64
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_episodes: self.outcomes.len(),
            goals_reached: self.count(EpisodeOutcome::ReachedGoal),
            stuck: self.count(EpisodeOutcome::Stuck),
            budget_exhausted: self.count(EpisodeOutcome::StepBudgetExhausted),
            success_rate: self.success_rate(),
            avg_reward: self.avg_reward(),
            avg_steps: self.avg_steps(),
            wall_bumps: self.bumps,
            recent_success_rate: self.recent_success_rate(100),
        }
    }
}

impl TrainingObserver for MetricsObserver {
    fn on_step(&mut self, record: &StepRecord) -> Result<()> {
        if record.bumped {
            self.bumps += 1;
        }
        Ok(())
    }

    fn on_episode_end(&mut self, stats: &EpisodeStats) -> Result<()> {
        self.outcomes.push(stats.outcome);
        self.rewards.push(stats.total_reward);
        self.steps.push(stats.steps);
        Ok(())
    }
}

/// One line of the JSONL episode log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeObservation {
    pub episode: usize,
    pub outcome: EpisodeOutcome,
    pub total_reward: f64,
    pub steps: usize,
    pub epsilon: f64,
    /// Every transition, when step recording is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transitions: Option<Vec<StepRecord>>,
}

/// JSONL observer - Exports one JSON object per episode
pub struct JsonlObserver {
    writer: BufWriter<File>,
    record_steps: bool,
    current_steps: Vec<StepRecord>,
}

impl JsonlObserver {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            record_steps: false,
            current_steps: Vec::new(),
        })
    }

    /// Include every transition in each episode line
    pub fn with_steps(mut self) -> Self {
        self.record_steps = true;
        self
    }
}

impl TrainingObserver for JsonlObserver {
    fn on_episode_start(&mut self, _episode: usize) -> Result<()> {
        self.current_steps.clear();
        Ok(())
    }

    fn on_step(&mut self, record: &StepRecord) -> Result<()> {
        if self.record_steps {
            self.current_steps.push(*record);
        }
        Ok(())
    }

    fn on_episode_end(&mut self, stats: &EpisodeStats) -> Result<()> {
        let observation = EpisodeObservation {
            episode: stats.episode,
            outcome: stats.outcome,
            total_reward: stats.total_reward,
            steps: stats.steps,
            epsilon: stats.epsilon,
            transitions: self
                .record_steps
                .then(|| std::mem::take(&mut self.current_steps)),
        };

        serde_json::to_writer(&mut self.writer, &observation)?;
        writeln!(&mut self.writer)?;
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Logging observer - Emits a structured log line every `interval` episodes
pub struct LoggingObserver {
    interval: usize,
    window_goals: usize,
    window_reward: f64,
    window_len: usize,
}

impl LoggingObserver {
    pub const DEFAULT_INTERVAL: usize = 100;

    pub fn new(interval: usize) -> Self {
        Self {
            interval: interval.max(1),
            window_goals: 0,
            window_reward: 0.0,
            window_len: 0,
        }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL)
    }
}

impl TrainingObserver for LoggingObserver {
    fn on_training_start(&mut self, maze: &Maze, total_episodes: usize) -> Result<()> {
        info!(
            size = %maze.size_label(),
            start = %maze.start,
            goal = %maze.goal,
            total_episodes,
            "training started"
        );
        Ok(())
    }

    fn on_episode_end(&mut self, stats: &EpisodeStats) -> Result<()> {
        self.window_len += 1;
        self.window_reward += stats.total_reward;
        if stats.outcome == EpisodeOutcome::ReachedGoal {
            self.window_goals += 1;
        }

        if (stats.episode + 1) % self.interval == 0 {
            info!(
                episode = stats.episode + 1,
                goal_rate = self.window_goals as f64 / self.window_len as f64,
                avg_reward = self.window_reward / self.window_len as f64,
                epsilon = stats.epsilon,
                "training progress"
            );
            self.window_goals = 0;
            self.window_reward = 0.0;
            self.window_len = 0;
        }
        Ok(())
    }
}

type SnapshotCallback = Box<dyn FnMut(usize, &PolicyPath) -> Result<()> + Send>;

/// Snapshot observer - Hands the greedy path to a callback every N episodes
///
/// This is the hook for live visualization: the callback can render the maze
/// with the current path without the training loop knowing about it.
pub struct SnapshotObserver {
    interval: usize,
    callback: SnapshotCallback,
}

impl SnapshotObserver {
    pub fn new<F>(interval: usize, callback: F) -> Self
    where
        F: FnMut(usize, &PolicyPath) -> Result<()> + Send + 'static,
    {
        Self {
            interval: interval.max(1),
            callback: Box::new(callback),
        }
    }
}

impl TrainingObserver for SnapshotObserver {
    fn snapshot_interval(&self) -> Option<usize> {
        Some(self.interval)
    }

    fn on_policy_snapshot(&mut self, episode: usize, path: &PolicyPath) -> Result<()> {
        (self.callback)(episode, path)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{BufRead, BufReader},
        sync::{Arc, Mutex},
    };

    use super::*;
    use crate::{
        maze::{MazeGenerator, Placement},
        pipeline::training::{TrainingConfig, TrainingPipeline},
        q_learning::{QLearningAgent, QLearningConfig},
    };

    fn maze() -> Maze {
        MazeGenerator::new(Some(21))
            .with_placement(Placement::Corners)
            .generate(5, 5)
            .unwrap()
    }

    fn stats(episode: usize, outcome: EpisodeOutcome, total_reward: f64) -> EpisodeStats {
        EpisodeStats {
            episode,
            total_reward,
            steps: 4,
            outcome,
            epsilon: 0.1,
        }
    }

    #[test]
    fn test_metrics_summary() {
        let mut metrics = MetricsObserver::new();
        metrics
            .on_episode_end(&stats(0, EpisodeOutcome::ReachedGoal, 10.0))
            .unwrap();
        metrics
            .on_episode_end(&stats(1, EpisodeOutcome::StepBudgetExhausted, -2.0))
            .unwrap();
        metrics
            .on_episode_end(&stats(2, EpisodeOutcome::ReachedGoal, 4.0))
            .unwrap();

        let summary = metrics.summary();
        assert_eq!(summary.total_episodes, 3);
        assert_eq!(summary.goals_reached, 2);
        assert_eq!(summary.budget_exhausted, 1);
        assert!((summary.success_rate - 2.0 / 3.0).abs() < 1e-12);
        assert!((summary.avg_reward - 4.0).abs() < 1e-12);
        assert!((metrics.recent_success_rate(1) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_jsonl_writes_one_line_per_episode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("episodes.jsonl");
        let observer = JsonlObserver::new(&path).unwrap().with_steps();

        let mut pipeline = TrainingPipeline::new(TrainingConfig {
            episodes: 4,
            seed: Some(5),
            max_steps: None,
        })
        .with_observer(Box::new(observer));
        let mut agent = QLearningAgent::new(QLearningConfig::default()).unwrap();
        let result = pipeline.run(&mut agent, &maze()).unwrap();

        let file = File::open(&path).unwrap();
        let lines: Vec<EpisodeObservation> = BufReader::new(file)
            .lines()
            .map(|line| serde_json::from_str(&line.unwrap()).unwrap())
            .collect();
        assert_eq!(lines.len(), 4);
        for (line, stats) in lines.iter().zip(&result.episodes) {
            assert_eq!(line.episode, stats.episode);
            assert_eq!(line.steps, stats.steps);
            assert_eq!(line.transitions.as_ref().map(Vec::len), Some(stats.steps));
        }
    }

    #[test]
    fn test_snapshot_callback_interval() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let observer = SnapshotObserver::new(3, move |episode, path: &PolicyPath| {
            sink.lock().unwrap().push((episode, path.path[0]));
            Ok(())
        });

        let maze = maze();
        let mut pipeline = TrainingPipeline::new(TrainingConfig {
            episodes: 7,
            seed: Some(5),
            max_steps: None,
        })
        .with_observer(Box::new(observer));
        let mut agent = QLearningAgent::new(QLearningConfig::default()).unwrap();
        pipeline.run(&mut agent, &maze).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(*seen, vec![(2, maze.start), (5, maze.start)]);
    }

    #[test]
    fn test_logging_observer_accepts_episodes() {
        let mut logger = LoggingObserver::new(2);
        logger.on_training_start(&maze(), 4).unwrap();
        for episode in 0..4 {
            logger
                .on_episode_end(&stats(episode, EpisodeOutcome::ReachedGoal, 1.0))
                .unwrap();
        }
        assert_eq!(logger.window_len, 0);
    }
}
