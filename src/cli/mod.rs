//! CLI infrastructure for the maze benchmarking toolkit
//!
//! This module provides the command-line interface for generating and
//! solving mazes, training Q-learning agents, and benchmarking solvers
//! against each other.

pub mod commands;
pub mod config;
pub mod output;
