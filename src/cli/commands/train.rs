//! Train command - Train a Q-learning agent on one maze

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;

use crate::{
    cli::{
        commands::{LearnerArgs, MazeArgs, MazeFile, sanitize_json_path, write_json},
        config::ExperimentConfig,
        output::{format_number, print_kv, print_section, print_subsection},
    },
    dijkstra,
    maze::{Overlay, render},
    pipeline::{
        JsonlObserver, LoggingObserver, ProgressObserver, SnapshotObserver, TrainingConfig,
        TrainingPipeline, TrainingResult,
    },
    q_learning::{
        PolicyOutcome, PolicyPath, QLearningAgent, QLearningConfig, SavedQTable, TrainingMetadata,
    },
};

#[derive(Debug, Serialize)]
struct SummaryStats {
    total_episodes: usize,
    goals_reached: usize,
    stuck: usize,
    budget_exhausted: usize,
    success_rate: f64,
    avg_reward: f64,
    avg_steps: f64,
    final_epsilon: f64,
    cancelled: bool,
}

impl From<&TrainingResult> for SummaryStats {
    fn from(result: &TrainingResult) -> Self {
        let count = result.episodes.len().max(1) as f64;
        Self {
            total_episodes: result.total_episodes,
            goals_reached: result.goals_reached,
            stuck: result.stuck,
            budget_exhausted: result.budget_exhausted,
            success_rate: result.success_rate,
            avg_reward: result.episodes.iter().map(|e| e.total_reward).sum::<f64>() / count,
            avg_steps: result.episodes.iter().map(|e| e.steps as f64).sum::<f64>() / count,
            final_epsilon: result.final_epsilon,
            cancelled: result.cancelled,
        }
    }
}

#[derive(Debug, Serialize)]
struct PolicySummary {
    outcome: PolicyOutcome,
    path_length: usize,
    total_steps: usize,
    /// Dijkstra's move count on the same maze, for reference
    shortest_path: Option<usize>,
}

#[derive(Debug, Serialize)]
struct TrainingSummaryFile {
    training: SummaryStats,
    policy: PolicySummary,
    learner: QLearningConfig,
    maze: MazeFile,
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
#[command(about = "Train a Q-learning agent", allow_negative_numbers = true)]
pub struct TrainArgs {
    #[command(flatten)]
    pub maze: MazeArgs,

    #[command(flatten)]
    pub learner: LearnerArgs,

    /// Number of training episodes
    #[arg(long, short = 'e')]
    pub episodes: Option<usize>,

    /// Random seed for maze generation and training
    #[arg(long)]
    pub seed: Option<u64>,

    /// Experiment configuration (JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output file for the trained value table (MessagePack)
    #[arg(long, short = 'O')]
    pub output: Option<PathBuf>,

    /// Optional file for JSONL episode observations
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Include every transition in the JSONL observations
    #[arg(long, requires = "observations")]
    pub observe_steps: bool,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Render the greedy path every N episodes
    #[arg(long)]
    pub snapshot_every: Option<usize>,

    /// Log progress every N episodes (0 disables)
    #[arg(long)]
    pub log_every: Option<usize>,

    /// Move cap for greedy policy extraction (defaults to rows * cols)
    #[arg(long)]
    pub policy_max_steps: Option<usize>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let mut config = ExperimentConfig::load_or_default(args.config.as_deref())?;
    let seed = args.seed.or(config.seed);
    let learner = args.learner.apply(&mut config)?;
    let maze = args.maze.resolve(&config.maze, seed)?;
    let episodes = args.episodes.unwrap_or(config.training.episodes);
    let policy_max_steps = args
        .policy_max_steps
        .or(config.training.policy_max_steps)
        .unwrap_or(maze.rows() * maze.cols());
    let log_every = args.log_every.unwrap_or(config.training.log_every);
    let snapshot_every = args.snapshot_every.or(config.training.snapshot_every);

    let summary_target = args
        .summary
        .as_deref()
        .map(|raw| sanitize_json_path(raw, "training_summary.json"));

    print_section("Q-Learning Training");
    print_kv("Maze", &maze.size_label());
    print_kv("Start", &maze.start.to_string());
    print_kv("Goal", &maze.goal.to_string());
    print_kv("Mode", &learner.transition.to_string());
    print_kv("Episodes", &format_number(episodes));
    if let Some(seed) = seed {
        print_kv("Seed", &seed.to_string());
    }

    let mut pipeline = TrainingPipeline::new(TrainingConfig {
        episodes,
        seed,
        max_steps: Some(policy_max_steps),
    });
    if !args.no_progress && config.progress && snapshot_every.is_none() {
        pipeline = pipeline.with_observer(Box::new(ProgressObserver::new()));
    }
    if log_every > 0 {
        pipeline = pipeline.with_observer(Box::new(LoggingObserver::new(log_every)));
    }
    if let Some(path) = &args.observations {
        let mut observer = JsonlObserver::new(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        if args.observe_steps {
            observer = observer.with_steps();
        }
        pipeline = pipeline.with_observer(Box::new(observer));
    }
    if let Some(interval) = snapshot_every {
        let snapshot_maze = maze.clone();
        pipeline = pipeline.with_observer(Box::new(SnapshotObserver::new(
            interval,
            move |episode, path: &PolicyPath| {
                println!(
                    "\nEpisode {}: {:?} after {} cells",
                    episode + 1,
                    path.outcome,
                    path.path.len()
                );
                print!("{}", render(&snapshot_maze, &Overlay::path(&path.path)));
                Ok(())
            },
        )));
    }

    let mut agent = QLearningAgent::new(learner.clone())?;
    let result = pipeline.run(&mut agent, &maze)?;

    let policy = agent.policy_path(&maze.grid, maze.start, maze.goal, policy_max_steps)?;
    let shortest = dijkstra::solve(&maze.grid, maze.start, maze.goal)?;
    let shortest_path = shortest.is_found().then(|| shortest.moves());
    let path_length = if policy.reached_goal() {
        policy.path.len() - 1
    } else {
        0
    };

    print_subsection("Results");
    print_kv("Goals reached", &format_number(result.goals_reached));
    print_kv("Success rate", &format!("{:.1}%", result.success_rate * 100.0));
    print_kv("Final epsilon", &format!("{:.4}", result.final_epsilon));
    print_kv("Table entries", &format_number(agent.q_table().len()));
    print_kv("Greedy outcome", &format!("{:?}", policy.outcome));
    print_kv("Greedy length", &format_number(path_length));
    if let Some(moves) = shortest_path {
        print_kv("Shortest length", &format_number(moves));
    }
    println!();
    print!("{}", render(&maze, &Overlay::path(&policy.path)));

    if let Some(path) = &args.output {
        save_table(&agent, path, &maze.size_label(), seed, episodes)?;
        println!("\nValue table saved to {}", path.display());
    }

    if let Some(path) = &summary_target {
        let summary = TrainingSummaryFile {
            training: SummaryStats::from(&result),
            policy: PolicySummary {
                outcome: policy.outcome,
                path_length,
                total_steps: policy.total_steps,
                shortest_path,
            },
            learner,
            maze: MazeFile::from(&maze),
            seed,
        };
        write_json(path, &summary)?;
        if args.summary.as_deref() != Some(path.as_path()) {
            println!("Summary path normalized to {}", path.display());
        }
        println!("Summary written to {}", path.display());
    }

    info!(
        outcome = ?policy.outcome,
        path_length,
        episodes = result.total_episodes,
        "training command finished"
    );
    Ok(())
}

fn save_table(
    agent: &QLearningAgent,
    path: &Path,
    maze_size: &str,
    seed: Option<u64>,
    episodes: usize,
) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let saved = SavedQTable::from_agent(
        agent,
        TrainingMetadata {
            maze_size: Some(maze_size.to_string()),
            maze_seed: seed,
            episodes,
        },
    );
    saved
        .save_to_file(path)
        .with_context(|| format!("Failed to save value table to {}", path.display()))
}
