//! Plain-text rendering of a maze with path and visited overlays

use std::collections::HashSet;

use crate::{
    maze::grid::{Cell, Maze},
    types::Position,
};

/// Optional overlays drawn on top of the maze.
#[derive(Debug, Clone, Default)]
pub struct Overlay<'a> {
    pub path: &'a [Position],
    pub visited: Option<&'a HashSet<Position>>,
}

impl<'a> Overlay<'a> {
    pub fn path(path: &'a [Position]) -> Self {
        Self {
            path,
            visited: None,
        }
    }

    pub fn with_visited(mut self, visited: &'a HashSet<Position>) -> Self {
        self.visited = Some(visited);
        self
    }
}

/// Render the maze as text.
///
/// Symbols: `#` wall, `.` open, `S` start, `G` goal, `*` path, `o` visited.
/// Start and goal take precedence over the path, the path over visited cells.
pub fn render(maze: &Maze, overlay: &Overlay<'_>) -> String {
    let on_path: HashSet<Position> = overlay.path.iter().copied().collect();
    let mut out = String::with_capacity(maze.rows() * (maze.cols() + 1));

    for row in 0..maze.rows() {
        for col in 0..maze.cols() {
            let position = Position::new(row, col);
            let symbol = if position == maze.start {
                'S'
            } else if position == maze.goal {
                'G'
            } else if on_path.contains(&position) {
                '*'
            } else if overlay.visited.is_some_and(|v| v.contains(&position)) {
                'o'
            } else {
                match maze.grid.get(position) {
                    Some(Cell::Open) => '.',
                    _ => '#',
                }
            };
            out.push(symbol);
        }
        out.push('\n');
    }

    out
}
