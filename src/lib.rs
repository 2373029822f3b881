//! Maze generation, shortest-path search and tabular Q-learning benchmarks
//!
//! This crate provides:
//! - Seeded maze generation by randomized depth-first carving
//! - Dijkstra shortest-path search with a work counter
//! - A tabular Q-learning agent with two transition models and a versioned
//!   MessagePack save format
//! - An observed training loop and a benchmark harness comparing solvers
//! - Descriptive statistics, significance tests and CSV export of results

pub mod adapters;
pub mod analysis;
pub mod cli;
pub mod dijkstra;
pub mod error;
pub mod export;
pub mod maze;
pub mod pipeline;
pub mod ports;
pub mod q_learning;
pub mod types;

pub use error::{Error, Result};
pub use maze::{Cell, Grid, Maze, MazeGenerator, Placement};
pub use types::{Action, Position};
