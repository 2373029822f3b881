//! Structural properties of generated mazes

mod common;

use common::{open_edge_count, reachable};
use mazebench::{Error, MazeGenerator, Placement, Position, maze::generate};

const SIZES: [(usize, usize); 6] = [(3, 3), (5, 5), (8, 6), (10, 10), (11, 21), (20, 13)];

#[test]
fn test_every_open_cell_reachable_and_tree_shaped() {
    for placement in [Placement::Farthest, Placement::Corners] {
        for (rows, cols) in SIZES {
            for seed in 0..4 {
                let maze = MazeGenerator::new(Some(seed))
                    .with_placement(placement)
                    .generate(rows, cols)
                    .unwrap();
                let grid = &maze.grid;

                let open = grid.open_count();
                let seen = reachable(grid, maze.start);
                assert_eq!(
                    seen.len(),
                    open,
                    "{rows}x{cols} seed {seed} {placement}: unreachable open cells"
                );
                assert_eq!(
                    open_edge_count(grid),
                    open - 1,
                    "{rows}x{cols} seed {seed} {placement}: open cells do not form a tree"
                );
            }
        }
    }
}

#[test]
fn test_endpoints_are_distinct_open_cells() {
    for (rows, cols) in SIZES {
        for seed in 0..4 {
            let maze = generate(rows, cols, Some(seed)).unwrap();
            assert_ne!(maze.start, maze.goal);
            assert!(maze.grid.is_open(maze.start));
            assert!(maze.grid.is_open(maze.goal));
        }
    }
}

#[test]
fn test_farthest_goal_maximizes_manhattan_distance() {
    let maze = generate(15, 15, Some(8)).unwrap();
    let best = maze
        .grid
        .open_cells()
        .map(|cell| cell.manhattan(maze.start))
        .max()
        .unwrap();
    assert_eq!(maze.goal.manhattan(maze.start), best);
}

#[test]
fn test_corner_placement() {
    for (rows, cols) in SIZES {
        let maze = MazeGenerator::new(Some(1))
            .with_placement(Placement::Corners)
            .generate(rows, cols)
            .unwrap();
        assert_eq!(maze.start, Position::new(0, 0));
        assert_eq!(maze.goal, Position::new(rows - 1, cols - 1));
    }
}

#[test]
fn test_same_seed_same_maze_and_stream_advances() {
    let mut a = MazeGenerator::new(Some(99));
    let mut b = MazeGenerator::new(Some(99));
    let first = a.generate(11, 11).unwrap();
    assert_eq!(first, b.generate(11, 11).unwrap());

    let second = a.generate(11, 11).unwrap();
    assert_eq!(second, b.generate(11, 11).unwrap());
    assert_ne!(first.grid, second.grid);
}

#[test]
fn test_rejects_tiny_dimensions() {
    for (rows, cols) in [(1, 5), (5, 1), (0, 0)] {
        let err = generate(rows, cols, Some(0)).unwrap_err();
        assert!(matches!(err, Error::InvalidDimensions { .. }));
    }
}
