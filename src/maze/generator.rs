//! Randomized depth-first maze carving
//!
//! Carving runs over the lattice of even-indexed cells with a stride of two:
//! the walker opens the cell it stands on, then for each direction (in a
//! freshly shuffled order) whose cell two steps away is still a wall, opens the
//! cell in between and moves on. The result is a spanning tree over the
//! lattice, so every open cell is reachable and there are no loops.
//!
//! With an odd dimension the last row (or column) belongs to the lattice. With
//! an even dimension it stays solid unless [`Placement::Corners`] opens the goal
//! corridor.

use std::{fmt, str::FromStr};

use rand::{
    SeedableRng,
    rngs::StdRng,
    seq::{IndexedRandom, SliceRandom},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    Result,
    error::Error,
    maze::grid::{Cell, Grid, Maze},
    types::{Action, Position},
};

/// Smallest accepted side length.
pub const MIN_DIMENSION: usize = 2;

/// How start and goal are chosen once the grid is carved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Start uniformly at random among open cells, goal at the open cell
    /// farthest from it by Manhattan distance (first in row-major order on ties).
    #[default]
    Farthest,
    /// Start at (0, 0), goal at the opposite corner, with an L-shaped corridor
    /// forced open so the goal joins the carved tree.
    Corners,
}

impl Placement {
    pub const VARIANTS: &'static str = "farthest, corners";
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placement::Farthest => f.write_str("farthest"),
            Placement::Corners => f.write_str("corners"),
        }
    }
}

impl FromStr for Placement {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "farthest" | "random" => Ok(Placement::Farthest),
            "corners" | "corner" => Ok(Placement::Corners),
            other => Err(Error::InvalidConfiguration {
                message: format!("unknown placement '{other}' (expected one of: {})", Self::VARIANTS),
            }),
        }
    }
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Seedable maze generator.
#[derive(Debug, Clone)]
pub struct MazeGenerator {
    rng: StdRng,
    placement: Placement,
}

impl MazeGenerator {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: build_rng(seed),
            placement: Placement::default(),
        }
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Carve a new `rows × cols` maze and place start and goal.
    ///
    /// Successive calls on the same generator draw fresh mazes from the same
    /// random stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if either side is below
    /// [`MIN_DIMENSION`], or if the carved grid has too few open cells to hold
    /// distinct start and goal.
    pub fn generate(&mut self, rows: usize, cols: usize) -> Result<Maze> {
        if rows < MIN_DIMENSION || cols < MIN_DIMENSION {
            return Err(Error::InvalidDimensions {
                rows,
                cols,
                reason: format!("both sides must be at least {MIN_DIMENSION}"),
            });
        }

        let mut grid = Grid::filled(rows, cols, Cell::Wall);
        self.carve(&mut grid, Position::new(0, 0));

        let (start, goal) = match self.placement {
            Placement::Farthest => self.place_farthest(&grid)?,
            Placement::Corners => place_corners(&mut grid),
        };

        debug!(
            rows,
            cols,
            open_cells = grid.open_count(),
            %start,
            %goal,
            "carved maze"
        );

        Ok(Maze { grid, start, goal })
    }

    fn shuffled_directions(&mut self) -> [Action; 4] {
        let mut directions = Action::ALL;
        directions.shuffle(&mut self.rng);
        directions
    }

    fn carve(&mut self, grid: &mut Grid, origin: Position) {
        struct Frame {
            cell: Position,
            directions: [Action; 4],
            next: usize,
        }

        grid.set(origin, Cell::Open);
        let mut stack = vec![Frame {
            cell: origin,
            directions: self.shuffled_directions(),
            next: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            if frame.next == frame.directions.len() {
                stack.pop();
                continue;
            }
            let cell = frame.cell;
            let action = frame.directions[frame.next];
            frame.next += 1;

            let Some(passage) = cell.step(action, grid.rows(), grid.cols()) else {
                continue;
            };
            let Some(target) = passage.step(action, grid.rows(), grid.cols()) else {
                continue;
            };
            if grid.get(target) != Some(Cell::Wall) {
                continue;
            }

            grid.set(passage, Cell::Open);
            grid.set(target, Cell::Open);
            stack.push(Frame {
                cell: target,
                directions: self.shuffled_directions(),
                next: 0,
            });
        }
    }

    fn place_farthest(&mut self, grid: &Grid) -> Result<(Position, Position)> {
        let open: Vec<Position> = grid.open_cells().collect();
        if open.len() < 2 {
            return Err(Error::InvalidDimensions {
                rows: grid.rows(),
                cols: grid.cols(),
                reason: "carved grid has fewer than two open cells for start and goal".to_string(),
            });
        }

        let start = *open.choose(&mut self.rng).ok_or_else(|| Error::InvalidDimensions {
            rows: grid.rows(),
            cols: grid.cols(),
            reason: "carved grid has no open cells".to_string(),
        })?;

        let mut goal = start;
        let mut best = 0;
        for &candidate in &open {
            let distance = candidate.manhattan(start);
            if distance > best {
                best = distance;
                goal = candidate;
            }
        }

        Ok((start, goal))
    }
}

impl Default for MazeGenerator {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Largest even index not exceeding `len - 1`.
fn last_lattice_index(len: usize) -> usize {
    let last = len - 1;
    last - last % 2
}

fn place_corners(grid: &mut Grid) -> (Position, Position) {
    let rows = grid.rows();
    let cols = grid.cols();
    let lattice_row = last_lattice_index(rows);
    let lattice_col = last_lattice_index(cols);

    for row in lattice_row..rows {
        grid.set(Position::new(row, cols - 1), Cell::Open);
    }
    for col in lattice_col..cols {
        grid.set(Position::new(lattice_row, col), Cell::Open);
    }

    (Position::new(0, 0), Position::new(rows - 1, cols - 1))
}

/// Generate a maze with the default placement.
///
/// # Errors
///
/// See [`MazeGenerator::generate`].
pub fn generate(rows: usize, cols: usize, seed: Option<u64>) -> Result<Maze> {
    MazeGenerator::new(seed).generate(rows, cols)
}

#[cfg(test)]
mod tests {
    use std::collections::{HashSet, VecDeque};

    use super::*;

    fn reachable_from(grid: &Grid, start: Position) -> HashSet<Position> {
        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(cell) = queue.pop_front() {
            for action in Action::ALL {
                if let Some(next) = grid.neighbor(cell, action) {
                    if seen.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }
        seen
    }

    #[test]
    fn test_rejects_tiny_dimensions() {
        assert!(matches!(
            generate(1, 5, Some(1)),
            Err(Error::InvalidDimensions { .. })
        ));
        assert!(matches!(
            generate(5, 0, Some(1)),
            Err(Error::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_two_by_two_farthest_is_too_small() {
        let err = MazeGenerator::new(Some(3)).generate(2, 2).unwrap_err();
        assert!(matches!(err, Error::InvalidDimensions { .. }));
    }

    #[test]
    fn test_two_by_two_corners_opens_goal() {
        let maze = MazeGenerator::new(Some(3))
            .with_placement(Placement::Corners)
            .generate(2, 2)
            .unwrap();
        assert_eq!(maze.start, Position::new(0, 0));
        assert_eq!(maze.goal, Position::new(1, 1));
        assert!(reachable_from(&maze.grid, maze.start).contains(&maze.goal));
    }

    #[test]
    fn test_same_seed_same_maze() {
        let a = generate(15, 11, Some(42)).unwrap();
        let b = generate(15, 11, Some(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_odd_dimensions_open_every_lattice_cell() {
        let maze = generate(9, 7, Some(5)).unwrap();
        for row in (0..9).step_by(2) {
            for col in (0..7).step_by(2) {
                assert!(maze.grid.is_open(Position::new(row, col)));
            }
        }
        // Odd-odd cells are never carved.
        for row in (1..9).step_by(2) {
            for col in (1..7).step_by(2) {
                assert!(!maze.grid.is_open(Position::new(row, col)));
            }
        }
    }

    #[test]
    fn test_even_dimensions_leave_last_row_and_col_solid() {
        let maze = generate(8, 6, Some(9)).unwrap();
        for col in 0..6 {
            assert!(!maze.grid.is_open(Position::new(7, col)));
        }
        for row in 0..8 {
            assert!(!maze.grid.is_open(Position::new(row, 5)));
        }
    }

    #[test]
    fn test_corners_goal_reachable_for_all_parities() {
        for (rows, cols) in [(10, 10), (10, 11), (11, 10), (11, 11), (3, 2), (2, 5)] {
            let maze = MazeGenerator::new(Some(17))
                .with_placement(Placement::Corners)
                .generate(rows, cols)
                .unwrap();
            let reachable = reachable_from(&maze.grid, maze.start);
            assert!(reachable.contains(&maze.goal), "{rows}x{cols}");
            assert_eq!(reachable.len(), maze.grid.open_count(), "{rows}x{cols}");
        }
    }

    #[test]
    fn test_placement_parse() {
        assert_eq!("Corners".parse::<Placement>().unwrap(), Placement::Corners);
        assert_eq!("farthest".parse::<Placement>().unwrap(), Placement::Farthest);
        assert!("diagonal".parse::<Placement>().is_err());
    }
}
