//! mazebench CLI - Maze generation, pathfinding and Q-learning benchmarks
//!
//! This CLI provides a unified interface for:
//! - Generating seeded mazes
//! - Solving mazes with Dijkstra or a trained Q-learning policy
//! - Training Q-learning agents with progress, logs and snapshots
//! - Benchmarking solvers and exporting batch results

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mazebench")]
#[command(version, about = "Maze pathfinding benchmarks: Dijkstra vs Q-learning", long_about = None)]
struct Cli {
    /// Log filter (e.g. info, debug, mazebench=trace); overrides RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a maze and print or save it
    Generate(mazebench::cli::commands::generate::GenerateArgs),

    /// Solve a maze with Dijkstra or a Q-learning policy
    Solve(Box<mazebench::cli::commands::solve::SolveArgs>),

    /// Train a Q-learning agent on a maze
    Train(Box<mazebench::cli::commands::train::TrainArgs>),

    /// Benchmark solvers on batches of generated mazes
    Benchmark(Box<mazebench::cli::commands::benchmark::BenchmarkArgs>),
}

fn init_tracing(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref())?;

    match cli.command {
        Commands::Generate(args) => mazebench::cli::commands::generate::execute(args),
        Commands::Solve(args) => mazebench::cli::commands::solve::execute(*args),
        Commands::Train(args) => mazebench::cli::commands::train::execute(*args),
        Commands::Benchmark(args) => mazebench::cli::commands::benchmark::execute(*args),
    }
}
