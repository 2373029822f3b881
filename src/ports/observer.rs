//! Observer port - abstraction for training observation and data collection
//!
//! This port defines the interface for observing training events, allowing
//! composable data collection without coupling the episode loop to specific
//! output formats or metrics.

use crate::{
    Result,
    maze::Maze,
    q_learning::{EpisodeStats, PolicyPath, StepRecord},
};

/// Observer trait for monitoring Q-learning training
///
/// Observers can be composed to collect different types of data during
/// training, for example progress bars, JSONL export, aggregated metrics or
/// periodic renderings of the greedy path.
///
/// # Event Sequence
///
/// 1. `on_training_start(maze, total_episodes)` - once
/// 2. For each episode:
///    - `on_episode_start(episode)`
///    - `on_step(record)` - after every update
///    - `on_episode_end(stats)`
///    - `on_policy_snapshot(episode, path)` - when the episode count is a
///      multiple of [`snapshot_interval`](TrainingObserver::snapshot_interval)
/// 3. `on_training_end()` - once, also after cancellation
///
/// # Examples
///
/// ```no_run
/// use mazebench::{ports::TrainingObserver, q_learning::{EpisodeOutcome, EpisodeStats}};
///
/// struct GoalCounter {
///     reached: usize,
/// }
///
/// impl TrainingObserver for GoalCounter {
///     fn on_episode_end(&mut self, stats: &EpisodeStats) -> mazebench::Result<()> {
///         if stats.outcome == EpisodeOutcome::ReachedGoal {
///             self.reached += 1;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait TrainingObserver: Send {
    /// Called once before the first episode.
    fn on_training_start(&mut self, _maze: &Maze, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    /// Called when an episode starts (0-based index).
    fn on_episode_start(&mut self, _episode: usize) -> Result<()> {
        Ok(())
    }

    /// Called for every transition, after the Q-table update.
    fn on_step(&mut self, _record: &StepRecord) -> Result<()> {
        Ok(())
    }

    /// Called when an episode ends, after ε has decayed.
    fn on_episode_end(&mut self, _stats: &EpisodeStats) -> Result<()> {
        Ok(())
    }

    /// How often this observer wants a greedy-path snapshot, in episodes.
    ///
    /// `None` (the default) opts out. Extracting a snapshot reads the
    /// Q-table only and does not disturb training.
    fn snapshot_interval(&self) -> Option<usize> {
        None
    }

    /// Called with the current greedy path after every
    /// `snapshot_interval()` completed episodes.
    fn on_policy_snapshot(&mut self, _episode: usize, _path: &PolicyPath) -> Result<()> {
        Ok(())
    }

    /// Called when training completes or is cancelled.
    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }
}
