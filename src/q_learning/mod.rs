//! Tabular Q-learning over grid mazes
//!
//! The learner treats each open cell as a state and the four unit moves as
//! actions. Values live in an explicit [`QTable`]; entries that were never
//! updated read as zero.
//!
//! ## Transition modes
//!
//! | Aspect | `ActionFiltered` | `BouncePenalized` |
//! |--------|------------------|-------------------|
//! | Candidates | moves into open cells | all four moves |
//! | Blocked move | never chosen | stay in place, wall-bump reward |
//! | Bootstrap max | over valid moves of s' | over all four moves |
//! | Stuck | no valid move | greedy move bumps (policy only) |
//!
//! ## Usage Example
//!
//! ```no_run
//! use mazebench::maze::generate;
//! use mazebench::q_learning::{QLearningAgent, QLearningConfig, SavedQTable, TrainingMetadata};
//!
//! let maze = generate(11, 11, Some(3))?;
//! let mut agent = QLearningAgent::new(QLearningConfig::action_filtered())?.with_seed(3);
//! agent.train(&maze, 1_000)?;
//!
//! let policy = agent.policy_path(&maze.grid, maze.start, maze.goal, 500)?;
//! println!("{:?} after {} steps", policy.outcome, policy.total_steps);
//!
//! SavedQTable::from_agent(&agent, TrainingMetadata::default()).save_to_file("agent.msgpack")?;
//! # Ok::<(), mazebench::Error>(())
//! ```

pub mod agent;
pub mod config;
pub mod environment;
pub mod q_table;
pub mod serialization;

// Public re-exports
pub use agent::{EpisodeStats, PolicyOutcome, PolicyPath, QLearningAgent, StepRecord};
pub use config::{QLearningConfig, RewardScheme, TransitionMode};
pub use environment::{EpisodeOutcome, MazeEnvironment, Transition, candidate_actions};
pub use q_table::QTable;
pub use serialization::{SavedQTable, TrainingMetadata};
