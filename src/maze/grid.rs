//! Rectangular occupancy grid

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    error::Error,
    types::{Action, Position},
};

/// State of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    Open,
    Wall,
}

impl Cell {
    /// Integer encoding used by the matrix interchange format (0 = open, 1 = wall).
    pub const fn as_u8(self) -> u8 {
        match self {
            Cell::Open => 0,
            Cell::Wall => 1,
        }
    }
}

/// A `rows × cols` matrix of cells stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid with every cell set to `fill`.
    pub fn filled(rows: usize, cols: usize, fill: Cell) -> Self {
        Self {
            rows,
            cols,
            cells: vec![fill; rows * cols],
        }
    }

    /// Build a grid from a 0/1 matrix (0 = open, 1 = wall).
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix is empty, ragged, or contains values
    /// other than 0 and 1.
    pub fn from_matrix<R: AsRef<[u8]>>(matrix: &[R]) -> Result<Self> {
        let rows = matrix.len();
        let cols = matrix.first().map_or(0, |row| row.as_ref().len());
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidDimensions {
                rows,
                cols,
                reason: "grid must have at least one row and one column".to_string(),
            });
        }

        let mut cells = Vec::with_capacity(rows * cols);
        for (row, values) in matrix.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != cols {
                return Err(Error::RaggedGrid {
                    row,
                    expected: cols,
                    got: values.len(),
                });
            }
            for (col, &value) in values.iter().enumerate() {
                let cell = match value {
                    0 => Cell::Open,
                    1 => Cell::Wall,
                    other => {
                        return Err(Error::InvalidCellValue {
                            row,
                            col,
                            value: other,
                        });
                    }
                };
                cells.push(cell);
            }
        }

        Ok(Self { rows, cols, cells })
    }

    /// Export as a 0/1 matrix (0 = open, 1 = wall).
    pub fn to_matrix(&self) -> Vec<Vec<u8>> {
        self.cells
            .chunks(self.cols)
            .map(|row| row.iter().map(|cell| cell.as_u8()).collect())
            .collect()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn in_bounds(&self, position: Position) -> bool {
        position.row < self.rows && position.col < self.cols
    }

    /// Cell at `position`, or `None` when out of bounds.
    pub fn get(&self, position: Position) -> Option<Cell> {
        self.in_bounds(position)
            .then(|| self.cells[position.row * self.cols + position.col])
    }

    pub fn is_open(&self, position: Position) -> bool {
        self.get(position) == Some(Cell::Open)
    }

    pub(crate) fn set(&mut self, position: Position, cell: Cell) {
        if self.in_bounds(position) {
            self.cells[position.row * self.cols + position.col] = cell;
        }
    }

    /// Target of `action` from `position` if it is in bounds and open.
    pub fn neighbor(&self, position: Position, action: Action) -> Option<Position> {
        position
            .step(action, self.rows, self.cols)
            .filter(|&next| self.is_open(next))
    }

    /// Actions whose target cell is in bounds and open, in canonical order.
    pub fn valid_actions(&self, position: Position) -> Vec<Action> {
        Action::ALL
            .into_iter()
            .filter(|&action| self.neighbor(position, action).is_some())
            .collect()
    }

    /// Iterate over every open position in row-major order.
    pub fn open_cells(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == Cell::Open)
            .map(|(idx, _)| Position::new(idx / self.cols, idx % self.cols))
    }

    pub fn open_count(&self) -> usize {
        self.cells.iter().filter(|cell| **cell == Cell::Open).count()
    }

    /// Check that `position` is inside the grid and open.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPosition`] when out of bounds and
    /// [`Error::BlockedPosition`] when the cell is a wall.
    pub fn ensure_open(&self, position: Position) -> Result<()> {
        match self.get(position) {
            None => Err(Error::InvalidPosition {
                position,
                rows: self.rows,
                cols: self.cols,
            }),
            Some(Cell::Wall) => Err(Error::BlockedPosition { position }),
            Some(Cell::Open) => Ok(()),
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.cols) {
            for cell in row {
                let symbol = match cell {
                    Cell::Open => '.',
                    Cell::Wall => '#',
                };
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A grid together with its distinguished start and goal cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maze {
    pub grid: Grid,
    pub start: Position,
    pub goal: Position,
}

impl Maze {
    /// Pair a grid with start and goal, checking both are distinct open cells.
    ///
    /// # Errors
    ///
    /// Returns an error if either endpoint is out of bounds or a wall, or if
    /// they coincide.
    pub fn new(grid: Grid, start: Position, goal: Position) -> Result<Self> {
        grid.ensure_open(start)?;
        grid.ensure_open(goal)?;
        if start == goal {
            return Err(Error::InvalidConfiguration {
                message: format!("start and goal must differ (both at {start})"),
            });
        }
        Ok(Self { grid, start, goal })
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    /// Size label in the `RxC` form used by batch exports.
    pub fn size_label(&self) -> String {
        format!("{}x{}", self.rows(), self.cols())
    }
}
