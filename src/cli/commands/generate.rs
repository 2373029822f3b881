//! Generate command - Carve a maze and print or save it

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use crate::{
    cli::{
        commands::{MazeArgs, MazeFile, write_json},
        config::ExperimentConfig,
        output::{print_kv, print_section},
    },
    maze::{Overlay, render},
};

#[derive(Parser, Debug)]
#[command(about = "Generate a maze")]
pub struct GenerateArgs {
    #[command(flatten)]
    pub maze: MazeArgs,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the maze as JSON (grid, start, goal)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Experiment configuration (JSON) supplying maze defaults
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Do not print the rendered maze
    #[arg(long)]
    pub quiet: bool,
}

pub fn execute(args: GenerateArgs) -> Result<()> {
    let config = ExperimentConfig::load_or_default(args.config.as_deref())?;
    let seed = args.seed.or(config.seed);
    let maze = args.maze.resolve(&config.maze, seed)?;

    info!(
        rows = maze.rows(),
        cols = maze.cols(),
        open_cells = maze.grid.open_count(),
        "maze ready"
    );

    if !args.quiet {
        print_section(&format!("Maze {}", maze.size_label()));
        print_kv("Start", &maze.start.to_string());
        print_kv("Goal", &maze.goal.to_string());
        print_kv("Open cells", &maze.grid.open_count().to_string());
        if let Some(seed) = seed {
            print_kv("Seed", &seed.to_string());
        }
        println!();
        print!("{}", render(&maze, &Overlay::default()));
    }

    if let Some(path) = &args.output {
        write_json(path, &MazeFile::from(&maze))?;
        println!("Maze written to {}", path.display());
    }

    Ok(())
}
