//! Solve command - Find a path with Dijkstra or a Q-learning policy

use std::{collections::HashSet, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::info;

use crate::{
    cli::{
        commands::{LearnerArgs, MazeArgs, sanitize_json_path, write_json},
        config::ExperimentConfig,
        output::{format_number, print_kv, print_section},
    },
    dijkstra,
    maze::{Maze, Overlay, render},
    q_learning::{PolicyOutcome, QLearningAgent, SavedQTable},
    types::Position,
};

/// Solving strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SolverKind {
    /// Shortest-path search
    Dijkstra,
    /// Train a Q-learning agent (or load one) and follow its greedy policy
    QLearning,
}

#[derive(Parser, Debug)]
#[command(about = "Solve a maze", allow_negative_numbers = true)]
pub struct SolveArgs {
    /// Solving strategy
    #[arg(value_enum, default_value = "dijkstra")]
    pub solver: SolverKind,

    #[command(flatten)]
    pub maze: MazeArgs,

    #[command(flatten)]
    pub learner: LearnerArgs,

    /// Training episodes for the Q-learning solver
    #[arg(long, short = 'e')]
    pub episodes: Option<usize>,

    /// Use a saved value table instead of training
    #[arg(long)]
    pub table: Option<PathBuf>,

    /// Move cap for greedy policy extraction (defaults to rows * cols)
    #[arg(long)]
    pub policy_max_steps: Option<usize>,

    /// Random seed for maze generation and training
    #[arg(long)]
    pub seed: Option<u64>,

    /// Experiment configuration (JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the solution as JSON
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Skip drawing cells the search settled
    #[arg(long)]
    pub no_visited: bool,
}

/// Solution written by `--output`
#[derive(Debug, Serialize)]
struct SolveSummary {
    solver: String,
    maze_size: String,
    start: Position,
    goal: Position,
    success: bool,
    path_length: usize,
    total_steps: usize,
    outcome: Option<PolicyOutcome>,
    path: Vec<Position>,
}

pub fn execute(args: SolveArgs) -> Result<()> {
    let mut config = ExperimentConfig::load_or_default(args.config.as_deref())?;
    let seed = args.seed.or(config.seed);
    let maze = args.maze.resolve(&config.maze, seed)?;

    let (summary, visited) = match args.solver {
        SolverKind::Dijkstra => solve_dijkstra(&maze)?,
        SolverKind::QLearning => {
            let learner = args.learner.apply(&mut config)?;
            let agent = match &args.table {
                Some(path) => SavedQTable::load_from_file(path)
                    .and_then(|saved| saved.to_agent())
                    .with_context(|| format!("Failed to load value table {}", path.display()))?,
                None => {
                    let episodes = args.episodes.unwrap_or(config.training.episodes);
                    let mut agent = QLearningAgent::new(learner)?;
                    if let Some(seed) = seed {
                        agent.set_rng_seed(seed);
                    }
                    agent.train(&maze, episodes)?;
                    agent
                }
            };
            let max_steps = args
                .policy_max_steps
                .or(config.training.policy_max_steps)
                .unwrap_or(maze.rows() * maze.cols());
            (solve_policy(&agent, &maze, max_steps)?, HashSet::new())
        }
    };

    info!(
        solver = %summary.solver,
        success = summary.success,
        total_steps = summary.total_steps,
        "solve finished"
    );

    print_section(&format!("{} on {}", summary.solver, summary.maze_size));
    print_kv("Start", &summary.start.to_string());
    print_kv("Goal", &summary.goal.to_string());
    print_kv("Reached goal", if summary.success { "yes" } else { "no" });
    print_kv("Path length", &format_number(summary.path_length));
    print_kv("Total steps", &format_number(summary.total_steps));
    if let Some(outcome) = summary.outcome {
        print_kv("Outcome", &format!("{outcome:?}"));
    }
    println!();
    let mut overlay = Overlay::path(&summary.path);
    if !args.no_visited {
        overlay = overlay.with_visited(&visited);
    }
    print!("{}", render(&maze, &overlay));

    if let Some(raw) = &args.output {
        let path = sanitize_json_path(raw, "solution.json");
        write_json(&path, &summary)?;
        println!("Solution written to {}", path.display());
    }

    Ok(())
}

fn solve_dijkstra(maze: &Maze) -> Result<(SolveSummary, HashSet<Position>)> {
    let solution = dijkstra::solve(&maze.grid, maze.start, maze.goal)?;
    let visited = solution.visited.iter().copied().collect();
    let summary = SolveSummary {
        solver: "Dijkstra".to_string(),
        maze_size: maze.size_label(),
        start: maze.start,
        goal: maze.goal,
        success: solution.is_found(),
        path_length: solution.moves(),
        total_steps: solution.total_steps,
        outcome: None,
        path: solution.path,
    };
    Ok((summary, visited))
}

fn solve_policy(agent: &QLearningAgent, maze: &Maze, max_steps: usize) -> Result<SolveSummary> {
    let policy = agent.policy_path(&maze.grid, maze.start, maze.goal, max_steps)?;
    let success = policy.reached_goal();
    Ok(SolveSummary {
        solver: "Q-Learning".to_string(),
        maze_size: maze.size_label(),
        start: maze.start,
        goal: maze.goal,
        success,
        path_length: if success {
            policy.path.len().saturating_sub(1)
        } else {
            0
        },
        total_steps: policy.total_steps,
        outcome: Some(policy.outcome),
        path: policy.path,
    })
}
