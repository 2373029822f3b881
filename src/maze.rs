//! Grid mazes: occupancy grid, carving generator and text rendering

pub mod generator;
pub mod grid;
pub mod render;

pub use generator::{MIN_DIMENSION, MazeGenerator, Placement, generate};
pub use grid::{Cell, Grid, Maze};
pub use render::{Overlay, render};

pub use crate::types::{Action, Position};
