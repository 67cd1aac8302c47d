#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core board contracts shared across the Roboyard level tooling.
//!
//! This crate defines the grid model every other crate operates on. A
//! [`Board`] is a rectangular cell grid subdivided by edge walls, a [`Level`]
//! places a [`Target`] and a set of [`Robot`] values on top of it, and the
//! [`artifact`] module converts levels to and from the textual map format the
//! game ships. Analysis systems only ever read a board; the generator mutates
//! one wall at a time while it builds a level.

pub mod artifact;

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use artifact::ParseError;

/// Location of a single board cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    x: u32,
    y: u32,
}

impl Position {
    /// Creates a new cell position.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Neighbouring position one step in `direction`, if it does not underflow.
    ///
    /// The result is not bounds-checked against any board; use
    /// [`Board::can_move`] for legal movement.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Self> {
        match direction {
            Direction::North => self.y.checked_sub(1).map(|y| Self::new(self.x, y)),
            Direction::East => self.x.checked_add(1).map(|x| Self::new(x, self.y)),
            Direction::South => self.y.checked_add(1).map(|y| Self::new(self.x, y)),
            Direction::West => self.x.checked_sub(1).map(|x| Self::new(x, self.y)),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Cardinal single-step movement directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction, in clockwise order starting at north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];
}

/// Which cell edge a wall segment is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WallOrientation {
    /// Wall on the top edge of its cell, blocking vertical movement.
    Horizontal,
    /// Wall on the left edge of its cell, blocking horizontal movement.
    Vertical,
}

/// Single wall segment anchored on the top or left edge of a cell.
///
/// Walls belong to the cell on their high-coordinate side: a horizontal wall
/// at `(x, y)` separates `(x, y - 1)` from `(x, y)` and a vertical wall at
/// `(x, y)` separates `(x - 1, y)` from `(x, y)`. Anchors may therefore sit
/// one past the last row or column to describe the bottom and right borders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Wall {
    orientation: WallOrientation,
    x: u32,
    y: u32,
}

impl Wall {
    /// Wall on the top edge of cell `(x, y)`.
    #[must_use]
    pub const fn horizontal(x: u32, y: u32) -> Self {
        Self {
            orientation: WallOrientation::Horizontal,
            x,
            y,
        }
    }

    /// Wall on the left edge of cell `(x, y)`.
    #[must_use]
    pub const fn vertical(x: u32, y: u32) -> Self {
        Self {
            orientation: WallOrientation::Vertical,
            x,
            y,
        }
    }

    /// Edge the wall is attached to.
    #[must_use]
    pub const fn orientation(&self) -> WallOrientation {
        self.orientation
    }

    /// Column of the anchoring cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Row of the anchoring cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }
}

impl fmt::Display for Wall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.orientation {
            WallOrientation::Horizontal => "mh",
            WallOrientation::Vertical => "mv",
        };
        write!(f, "{prefix}{},{}", self.x, self.y)
    }
}

/// Reasons a board or level mutation may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum BoardError {
    /// Boards need at least one row and one column.
    #[error("board dimensions {width}x{height} must both be positive")]
    EmptyDimensions {
        /// Requested number of columns.
        width: u32,
        /// Requested number of rows.
        height: u32,
    },
    /// Boards are capped at [`Board::MAX_DIMENSION`] cells per side.
    #[error(
        "board dimensions {width}x{height} exceed the {}-cell limit",
        Board::MAX_DIMENSION
    )]
    TooLarge {
        /// Requested number of columns.
        width: u32,
        /// Requested number of rows.
        height: u32,
    },
    /// The wall anchor lies outside the board's edge lattice.
    #[error("wall {0} lies outside the board")]
    WallOutOfBounds(Wall),
    /// The position lies outside the board's cells.
    #[error("position {0} lies outside the board")]
    PositionOutOfBounds(Position),
}

/// Rectangular cell grid subdivided by edge walls.
///
/// The four outer edges are implicitly closed: movement never leaves the
/// board whether or not border walls were stored explicitly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    width: u32,
    height: u32,
    horizontal: BTreeSet<(u32, u32)>,
    vertical: BTreeSet<(u32, u32)>,
}

impl Board {
    /// Largest supported width or height.
    pub const MAX_DIMENSION: u32 = 1_024;

    /// Creates an empty board with the provided extent.
    pub fn new(width: u32, height: u32) -> Result<Self, BoardError> {
        if width == 0 || height == 0 {
            return Err(BoardError::EmptyDimensions { width, height });
        }
        if width > Self::MAX_DIMENSION || height > Self::MAX_DIMENSION {
            return Err(BoardError::TooLarge { width, height });
        }

        Ok(Self {
            width,
            height,
            horizontal: BTreeSet::new(),
            vertical: BTreeSet::new(),
        })
    }

    /// Number of columns on the board.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows on the board.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells on the board.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Reports whether the position names a cell of this board.
    #[must_use]
    pub const fn contains(&self, position: Position) -> bool {
        position.x < self.width && position.y < self.height
    }

    /// Iterates every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Position::new(x, y)))
    }

    /// Stores a wall, returning `true` when it was not present before.
    pub fn add_wall(&mut self, wall: Wall) -> Result<bool, BoardError> {
        if !self.wall_in_bounds(wall) {
            return Err(BoardError::WallOutOfBounds(wall));
        }

        let inserted = match wall.orientation {
            WallOrientation::Horizontal => self.horizontal.insert((wall.x, wall.y)),
            WallOrientation::Vertical => self.vertical.insert((wall.x, wall.y)),
        };
        Ok(inserted)
    }

    /// Removes a wall, returning `true` when it was present.
    pub fn remove_wall(&mut self, wall: Wall) -> bool {
        match wall.orientation {
            WallOrientation::Horizontal => self.horizontal.remove(&(wall.x, wall.y)),
            WallOrientation::Vertical => self.vertical.remove(&(wall.x, wall.y)),
        }
    }

    /// Reports whether the wall is stored on the board.
    #[must_use]
    pub fn has_wall(&self, wall: Wall) -> bool {
        match wall.orientation {
            WallOrientation::Horizontal => self.horizontal.contains(&(wall.x, wall.y)),
            WallOrientation::Vertical => self.vertical.contains(&(wall.x, wall.y)),
        }
    }

    /// Stored horizontal walls ordered by `(x, y)`.
    pub fn horizontal_walls(&self) -> impl Iterator<Item = Wall> + '_ {
        self.horizontal.iter().map(|&(x, y)| Wall::horizontal(x, y))
    }

    /// Stored vertical walls ordered by `(x, y)`.
    pub fn vertical_walls(&self) -> impl Iterator<Item = Wall> + '_ {
        self.vertical.iter().map(|&(x, y)| Wall::vertical(x, y))
    }

    /// Every stored wall, horizontal walls first.
    pub fn walls(&self) -> impl Iterator<Item = Wall> + '_ {
        self.horizontal_walls().chain(self.vertical_walls())
    }

    /// Number of stored walls of both orientations.
    #[must_use]
    pub fn wall_count(&self) -> usize {
        self.horizontal.len() + self.vertical.len()
    }

    /// Decides whether a single step from `from` in `direction` is legal.
    ///
    /// Fails closed for steps that start or end outside the board.
    #[must_use]
    pub fn can_move(&self, from: Position, direction: Direction) -> bool {
        if !self.contains(from) {
            return false;
        }
        let Some(to) = from.step(direction) else {
            return false;
        };
        if !self.contains(to) {
            return false;
        }

        let blocking = match direction {
            Direction::North => Wall::horizontal(from.x, from.y),
            Direction::South => Wall::horizontal(from.x, to.y),
            Direction::West => Wall::vertical(from.x, from.y),
            Direction::East => Wall::vertical(to.x, from.y),
        };
        !self.has_wall(blocking)
    }

    /// Cells one legal step away from `from`, in [`Direction::ALL`] order.
    pub fn neighbors(&self, from: Position) -> impl Iterator<Item = Position> + '_ {
        Direction::ALL.into_iter().filter_map(move |direction| {
            if self.can_move(from, direction) {
                from.step(direction)
            } else {
                None
            }
        })
    }

    /// Stores walls along all four outer edges.
    pub fn enclose_border(&mut self) {
        for x in 0..self.width {
            let _ = self.horizontal.insert((x, 0));
            let _ = self.horizontal.insert((x, self.height));
        }
        for y in 0..self.height {
            let _ = self.vertical.insert((0, y));
            let _ = self.vertical.insert((self.width, y));
        }
    }

    /// Upper-left cell of the 2x2 center block.
    ///
    /// Returns `None` when the board is too narrow or short to hold one.
    #[must_use]
    pub fn center_origin(&self) -> Option<Position> {
        let x = (self.width / 2).checked_sub(1)?;
        let y = (self.height / 2).checked_sub(1)?;
        Some(Position::new(x, y))
    }

    /// The four cells of the center block, row-major.
    #[must_use]
    pub fn center_block(&self) -> Option<[Position; 4]> {
        let origin = self.center_origin()?;
        let (x, y) = (origin.x, origin.y);
        Some([
            Position::new(x, y),
            Position::new(x + 1, y),
            Position::new(x, y + 1),
            Position::new(x + 1, y + 1),
        ])
    }

    /// Reports whether `position` is one of the center block cells.
    #[must_use]
    pub fn is_center_cell(&self, position: Position) -> bool {
        self.center_origin().is_some_and(|origin| {
            (origin.x..=origin.x + 1).contains(&position.x)
                && (origin.y..=origin.y + 1).contains(&position.y)
        })
    }

    /// The eight wall segments that fully enclose the center block.
    #[must_use]
    pub fn center_enclosure(&self) -> Option<[Wall; 8]> {
        let origin = self.center_origin()?;
        let (x, y) = (origin.x, origin.y);
        Some([
            Wall::horizontal(x, y),
            Wall::horizontal(x + 1, y),
            Wall::horizontal(x, y + 2),
            Wall::horizontal(x + 1, y + 2),
            Wall::vertical(x, y),
            Wall::vertical(x, y + 1),
            Wall::vertical(x + 2, y),
            Wall::vertical(x + 2, y + 1),
        ])
    }

    /// Stores the center block enclosure, returning how many walls were new.
    pub fn enclose_center_block(&mut self) -> usize {
        let Some(enclosure) = self.center_enclosure() else {
            return 0;
        };
        enclosure
            .into_iter()
            .filter(|wall| matches!(self.add_wall(*wall), Ok(true)))
            .count()
    }

    fn wall_in_bounds(&self, wall: Wall) -> bool {
        match wall.orientation {
            WallOrientation::Horizontal => wall.x < self.width && wall.y <= self.height,
            WallOrientation::Vertical => wall.x <= self.width && wall.y < self.height,
        }
    }
}

/// Piece colours understood by the map format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// Red piece.
    Red,
    /// Green piece.
    Green,
    /// Blue piece.
    Blue,
    /// Yellow piece.
    Yellow,
    /// Silver piece.
    Silver,
    /// Pink piece.
    Pink,
    /// Brown piece.
    Brown,
    /// Orange piece.
    Orange,
    /// White piece.
    White,
    /// Target any robot may claim.
    Multi,
}

impl Color {
    /// Robot colours placed by the level generator, in placement order.
    pub const STANDARD: [Color; 4] = [Color::Red, Color::Blue, Color::Yellow, Color::Green];

    const NAMED: [Color; 10] = [
        Color::Red,
        Color::Green,
        Color::Blue,
        Color::Yellow,
        Color::Silver,
        Color::Pink,
        Color::Brown,
        Color::Orange,
        Color::White,
        Color::Multi,
    ];

    /// Lowercase name used in the map format.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Yellow => "yellow",
            Self::Silver => "silver",
            Self::Pink => "pink",
            Self::Brown => "brown",
            Self::Orange => "orange",
            Self::White => "white",
            Self::Multi => "multi",
        }
    }

    /// Looks up a colour by its map-format name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMED.into_iter().find(|color| color.name() == name)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Robot piece standing on a board cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Robot {
    /// Colour of the robot.
    pub color: Color,
    /// Cell the robot occupies.
    pub position: Position,
}

/// Goal cell a robot must reach.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    /// Colour of the robot that must reach the target.
    pub color: Color,
    /// Cell holding the target.
    pub position: Position,
}

/// Board plus the pieces placed on it; the in-memory form of one map artifact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    board: Board,
    target: Option<Target>,
    robots: Vec<Robot>,
}

impl Level {
    /// Creates a level with no pieces on the provided board.
    #[must_use]
    pub fn new(board: Board) -> Self {
        Self {
            board,
            target: None,
            robots: Vec::new(),
        }
    }

    /// Board the level is played on.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Target of the level, if one was placed.
    #[must_use]
    pub const fn target(&self) -> Option<Target> {
        self.target
    }

    /// Robots in placement order.
    #[must_use]
    pub fn robots(&self) -> &[Robot] {
        &self.robots
    }

    /// Positions of all robots in placement order.
    #[must_use]
    pub fn robot_positions(&self) -> Vec<Position> {
        self.robots.iter().map(|robot| robot.position).collect()
    }

    /// Places or replaces the target.
    pub fn set_target(&mut self, target: Target) -> Result<(), BoardError> {
        self.ensure_on_board(target.position)?;
        self.target = Some(target);
        Ok(())
    }

    /// Appends a robot. Overlapping positions are accepted and reported by
    /// [`Level::duplicate_robot_positions`].
    pub fn push_robot(&mut self, robot: Robot) -> Result<(), BoardError> {
        self.ensure_on_board(robot.position)?;
        self.robots.push(robot);
        Ok(())
    }

    /// Positions held by more than one robot, each listed once.
    #[must_use]
    pub fn duplicate_robot_positions(&self) -> Vec<Position> {
        let mut seen = BTreeSet::new();
        let mut duplicates = BTreeSet::new();
        for robot in &self.robots {
            if !seen.insert(robot.position) {
                let _ = duplicates.insert(robot.position);
            }
        }
        duplicates.into_iter().collect()
    }

    /// Reports whether the target shares a cell with any robot.
    #[must_use]
    pub fn target_overlaps_robot(&self) -> bool {
        self.target.is_some_and(|target| {
            self.robots
                .iter()
                .any(|robot| robot.position == target.position)
        })
    }

    fn ensure_on_board(&self, position: Position) -> Result<(), BoardError> {
        if self.board.contains(position) {
            Ok(())
        } else {
            Err(BoardError::PositionOutOfBounds(position))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_board(width: u32, height: u32) -> Board {
        Board::new(width, height).expect("board")
    }

    #[test]
    fn empty_dimensions_are_rejected() {
        assert_eq!(
            Board::new(0, 4),
            Err(BoardError::EmptyDimensions {
                width: 0,
                height: 4
            })
        );
    }

    #[test]
    fn oversized_dimensions_are_rejected() {
        assert!(Board::new(Board::MAX_DIMENSION, Board::MAX_DIMENSION).is_ok());
        assert_eq!(
            Board::new(100_000, 100_000),
            Err(BoardError::TooLarge {
                width: 100_000,
                height: 100_000
            })
        );
        assert!(Board::new(4, Board::MAX_DIMENSION + 1).is_err());
    }

    #[test]
    fn movement_fails_closed_at_the_border() {
        let board = open_board(3, 3);
        assert!(!board.can_move(Position::new(0, 0), Direction::North));
        assert!(!board.can_move(Position::new(0, 0), Direction::West));
        assert!(!board.can_move(Position::new(2, 2), Direction::East));
        assert!(!board.can_move(Position::new(2, 2), Direction::South));
        assert!(board.can_move(Position::new(1, 1), Direction::North));
        assert!(!board.can_move(Position::new(5, 5), Direction::North));
    }

    #[test]
    fn horizontal_wall_blocks_the_edge_above_its_cell() {
        let mut board = open_board(3, 3);
        assert_eq!(board.add_wall(Wall::horizontal(1, 1)), Ok(true));

        assert!(!board.can_move(Position::new(1, 1), Direction::North));
        assert!(!board.can_move(Position::new(1, 0), Direction::South));
        assert!(board.can_move(Position::new(1, 1), Direction::South));
        assert!(board.can_move(Position::new(0, 1), Direction::North));
    }

    #[test]
    fn vertical_wall_blocks_the_edge_left_of_its_cell() {
        let mut board = open_board(3, 3);
        assert_eq!(board.add_wall(Wall::vertical(2, 0)), Ok(true));

        assert!(!board.can_move(Position::new(2, 0), Direction::West));
        assert!(!board.can_move(Position::new(1, 0), Direction::East));
        assert!(board.can_move(Position::new(1, 0), Direction::West));
        assert!(board.can_move(Position::new(2, 1), Direction::West));
    }

    #[test]
    fn wall_anchors_may_sit_on_the_far_border_only() {
        let mut board = open_board(4, 5);
        assert_eq!(board.add_wall(Wall::horizontal(3, 5)), Ok(true));
        assert_eq!(board.add_wall(Wall::vertical(4, 4)), Ok(true));
        assert_eq!(board.add_wall(Wall::horizontal(3, 5)), Ok(false));
        assert_eq!(
            board.add_wall(Wall::horizontal(4, 0)),
            Err(BoardError::WallOutOfBounds(Wall::horizontal(4, 0)))
        );
        assert_eq!(
            board.add_wall(Wall::vertical(0, 5)),
            Err(BoardError::WallOutOfBounds(Wall::vertical(0, 5)))
        );
    }

    #[test]
    fn center_block_matches_integer_division() {
        let board = open_board(12, 14);
        assert_eq!(board.center_origin(), Some(Position::new(5, 6)));
        assert!(board.is_center_cell(Position::new(6, 7)));
        assert!(!board.is_center_cell(Position::new(7, 7)));
        assert_eq!(open_board(1, 6).center_block(), None);
    }

    #[test]
    fn center_enclosure_adds_eight_walls_once() {
        let mut board = open_board(12, 14);
        assert_eq!(board.enclose_center_block(), 8);
        assert_eq!(board.enclose_center_block(), 0);
        assert!(!board.can_move(Position::new(5, 6), Direction::North));
        assert!(!board.can_move(Position::new(6, 7), Direction::East));
        assert!(board.can_move(Position::new(5, 6), Direction::East));
    }

    #[test]
    fn border_walls_cover_every_outer_edge() {
        let mut board = open_board(3, 2);
        board.enclose_border();
        assert_eq!(board.wall_count(), 2 * 3 + 2 * 2);
        assert!(board.has_wall(Wall::horizontal(2, 2)));
        assert!(board.has_wall(Wall::vertical(3, 1)));
    }

    #[test]
    fn duplicates_and_overlaps_are_reported_not_corrected() {
        let mut level = Level::new(open_board(4, 4));
        let shared = Position::new(1, 1);
        level
            .push_robot(Robot {
                color: Color::Red,
                position: shared,
            })
            .expect("robot");
        level
            .push_robot(Robot {
                color: Color::Blue,
                position: shared,
            })
            .expect("robot");
        level
            .set_target(Target {
                color: Color::Red,
                position: shared,
            })
            .expect("target");

        assert_eq!(level.robots().len(), 2);
        assert_eq!(level.duplicate_robot_positions(), vec![shared]);
        assert!(level.target_overlaps_robot());
    }

    #[test]
    fn pieces_outside_the_board_are_rejected() {
        let mut level = Level::new(open_board(4, 4));
        let outside = Position::new(4, 0);
        assert_eq!(
            level.push_robot(Robot {
                color: Color::Green,
                position: outside,
            }),
            Err(BoardError::PositionOutOfBounds(outside))
        );
    }

    #[test]
    fn level_round_trips_through_bincode() {
        let mut board = open_board(5, 5);
        board.enclose_border();
        let mut level = Level::new(board);
        level
            .push_robot(Robot {
                color: Color::Yellow,
                position: Position::new(3, 1),
            })
            .expect("robot");

        let bytes = bincode::serialize(&level).expect("serialize");
        let restored: Level = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, level);
    }

    #[test]
    fn colors_resolve_by_name() {
        assert_eq!(Color::from_name("silver"), Some(Color::Silver));
        assert_eq!(Color::from_name("purple"), None);
        assert_eq!(Color::Multi.to_string(), "multi");
    }
}
