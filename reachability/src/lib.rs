#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wall-aware flood fill over a [`Board`].
//!
//! Every query here is pure: it reads an immutable board and returns a fresh
//! cell set, so callers may run fills for different boards or robots on
//! separate threads without coordination.

mod regions;

use std::collections::{BTreeSet, VecDeque};

use roboyard_core::{Board, Position};

pub use regions::find_regions;

/// Set of board cells produced by a fill or a region split.
pub type Region = BTreeSet<Position>;

/// Cells reachable from any of the seeds through legal single-step moves.
///
/// All seeds start the breadth-first search together. Seeds outside the board
/// are ignored; every seed on the board is part of the result.
pub fn reachable_from<I>(board: &Board, seeds: I) -> Region
where
    I: IntoIterator<Item = Position>,
{
    let mut visited = VisitedGrid::for_board(board);
    let mut queue = VecDeque::new();

    for seed in seeds {
        if visited.mark(seed) {
            queue.push_back(seed);
        }
    }

    while let Some(cell) = queue.pop_front() {
        for neighbor in board.neighbors(cell) {
            if visited.mark(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    visited.into_region()
}

/// Union of independent single-seed fills.
///
/// Produces the same set as [`reachable_from`] with all seeds at once; kept as
/// the reference formulation for callers that already hold per-seed results.
pub fn reachable_from_any(board: &Board, seeds: &[Position]) -> Region {
    seeds
        .iter()
        .flat_map(|&seed| reachable_from(board, [seed]))
        .collect()
}

/// Number of cells reachable from a single seed.
#[must_use]
pub fn reach_count(board: &Board, seed: Position) -> usize {
    reachable_from(board, [seed]).len()
}

/// Board cells missing from `reachable`.
#[must_use]
pub fn unreachable_cells(board: &Board, reachable: &Region) -> Region {
    board
        .cells()
        .filter(|cell| !reachable.contains(cell))
        .collect()
}

/// Dense visited flags mirroring the board in row-major order.
struct VisitedGrid {
    width: usize,
    height: usize,
    flags: Vec<bool>,
}

impl VisitedGrid {
    fn for_board(board: &Board) -> Self {
        let width = usize::try_from(board.width()).unwrap_or(0);
        let height = usize::try_from(board.height()).unwrap_or(0);
        let cell_count = width.checked_mul(height).unwrap_or(0);
        Self {
            width,
            height,
            flags: vec![false; cell_count],
        }
    }

    /// Marks the cell, returning `true` when it was in bounds and unvisited.
    fn mark(&mut self, cell: Position) -> bool {
        let Some(index) = self.index(cell) else {
            return false;
        };
        let Some(flag) = self.flags.get_mut(index) else {
            return false;
        };
        if *flag {
            return false;
        }
        *flag = true;
        true
    }

    fn index(&self, cell: Position) -> Option<usize> {
        let column = usize::try_from(cell.x()).ok()?;
        let row = usize::try_from(cell.y()).ok()?;
        if column >= self.width || row >= self.height {
            return None;
        }
        row.checked_mul(self.width)?.checked_add(column)
    }

    fn into_region(self) -> Region {
        let width = self.width;
        self.flags
            .iter()
            .enumerate()
            .filter(|(_, visited)| **visited)
            .filter_map(|(index, _)| {
                let x = u32::try_from(index % width).ok()?;
                let y = u32::try_from(index / width).ok()?;
                Some(Position::new(x, y))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roboyard_core::Wall;

    fn board(width: u32, height: u32) -> Board {
        Board::new(width, height).expect("board")
    }

    #[test]
    fn open_board_is_fully_reachable() {
        let board = board(3, 4);
        let region = reachable_from(&board, [Position::new(1, 2)]);
        assert_eq!(region.len(), 12);
    }

    #[test]
    fn wall_line_splits_the_board() {
        let mut board = board(3, 3);
        for y in 0..3 {
            let _ = board.add_wall(Wall::vertical(1, y)).expect("wall");
        }

        let left = reachable_from(&board, [Position::new(0, 0)]);
        assert_eq!(left.len(), 3);
        assert!(left.iter().all(|cell| cell.x() == 0));
        assert_eq!(reach_count(&board, Position::new(2, 2)), 6);
    }

    #[test]
    fn off_board_seeds_are_ignored() {
        let board = board(2, 2);
        assert!(reachable_from(&board, [Position::new(5, 5)]).is_empty());
    }

    #[test]
    fn unreachable_cells_complement_the_fill() {
        let mut board = board(2, 1);
        let _ = board.add_wall(Wall::vertical(1, 0)).expect("wall");
        let reachable = reachable_from(&board, [Position::new(0, 0)]);
        let missing = unreachable_cells(&board, &reachable);
        assert_eq!(missing.into_iter().collect::<Vec<_>>(), vec![Position::new(1, 0)]);
    }

    #[test]
    fn visited_grid_rejects_repeat_marks() {
        let mut grid = VisitedGrid::for_board(&board(2, 2));
        assert!(grid.mark(Position::new(1, 1)));
        assert!(!grid.mark(Position::new(1, 1)));
        assert!(!grid.mark(Position::new(2, 0)));
    }
}
