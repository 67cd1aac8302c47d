#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic procedural level generation.
//!
//! A [`LevelGenerator`] lays down the mandatory border and center block
//! enclosure, scatters a bounded number of decorative walls (first hugging
//! the border, then across the interior), and finally places a target and one
//! robot per standard colour. The result is not checked for solvability; that
//! is the classifier's job.

mod seed;

use log::{debug, warn};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use roboyard_core::{
    Board, BoardError, Color, Level, Position, Robot, Target, Wall, WallOrientation,
};
use roboyard_reachability::reach_count;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use seed::derive_candidate_seed;

const CENTER_CELLS: usize = 4;

/// Tuning knobs for the generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Board width in cells.
    pub width: u32,
    /// Board height in cells.
    pub height: u32,
    /// Wall budget excluding the border, including the 8 center enclosure walls.
    /// Companion walls come on top of it.
    pub max_walls: usize,
    /// Share of the remaining budget spent on walls hugging the border. Companions
    /// draw from this share as well.
    pub edge_share: f64,
    /// Chance that a border-hugging wall gains a perpendicular companion.
    pub companion_chance: f64,
    /// Placement attempts allowed per phase before accepting a sparser board.
    pub max_attempts: usize,
    /// Rejects walls that would cut off part of the board outside the center block.
    pub keep_connected: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            width: 12,
            height: 14,
            max_walls: 50,
            edge_share: 0.4,
            companion_chance: 0.5,
            max_attempts: 1_000,
            keep_connected: true,
        }
    }
}

/// Reasons a generator cannot be constructed.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum GenerationError {
    /// The board cannot hold the center block, the scatter ranges, and every piece.
    #[error("a {width}x{height} board is too small to generate levels on")]
    BoardTooSmall {
        /// Requested number of columns.
        width: u32,
        /// Requested number of rows.
        height: u32,
    },
    /// A probability setting lies outside `0.0..=1.0`.
    #[error("`{name}` must lie within 0.0..=1.0, got {value}")]
    InvalidProbability {
        /// Name of the offending setting.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// The board model rejected a mandatory wall or piece.
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Level produced by the generator together with placement statistics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedLevel {
    /// Complete level: walls, target, and robots.
    pub level: Level,
    /// Non-border walls on the board, center enclosure and companions included.
    pub walls_placed: usize,
    /// Companion walls among `walls_placed`. They do not count against the budget.
    pub companions: usize,
    /// Wall budget the generator aimed for.
    pub wall_budget: usize,
}

impl GeneratedLevel {
    /// Walls that count against the budget.
    #[must_use]
    pub fn budgeted_walls(&self) -> usize {
        self.walls_placed.saturating_sub(self.companions)
    }

    /// Reports whether the attempt caps ran out before the budget was spent.
    #[must_use]
    pub fn is_sparse(&self) -> bool {
        self.budgeted_walls() < self.wall_budget
    }
}

/// Seeded generator producing one level per [`LevelGenerator::generate`] call.
#[derive(Debug)]
pub struct LevelGenerator {
    config: GeneratorConfig,
    rng: ChaCha8Rng,
}

impl LevelGenerator {
    /// Creates a generator after validating the configuration.
    pub fn new(config: GeneratorConfig, seed: u64) -> Result<Self, GenerationError> {
        validate(&config)?;
        Ok(Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// Creates the generator for candidate `index` of a seeded run.
    pub fn for_candidate(
        config: GeneratorConfig,
        base_seed: u64,
        index: u64,
    ) -> Result<Self, GenerationError> {
        Self::new(config, derive_candidate_seed(base_seed, index))
    }

    /// Configuration the generator was built with.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates the next level from the generator's RNG stream.
    pub fn generate(&mut self) -> Result<GeneratedLevel, GenerationError> {
        let GeneratorConfig { width, height, .. } = self.config;
        let mut board = Board::new(width, height)?;
        board.enclose_border();
        let border_walls = board.wall_count();
        let enclosure_walls = board.enclose_center_block();

        let mut scatter = Scatter {
            open_cells: board.cell_count() - CENTER_CELLS,
            board,
            keep_connected: self.config.keep_connected,
            placed: enclosure_walls,
            companions: 0,
        };
        let remaining = self.config.max_walls.saturating_sub(scatter.placed);
        let edge_budget = (remaining as f64 * self.config.edge_share) as usize;
        self.scatter_edge_walls(&mut scatter, edge_budget);
        self.scatter_interior_walls(&mut scatter);

        let walls_placed = scatter.board.wall_count() - border_walls;
        if scatter.placed < self.config.max_walls {
            warn!(
                "accepting sparse board with {} of {} walls",
                scatter.placed, self.config.max_walls
            );
        }
        let companions = scatter.companions;

        let mut level = Level::new(scatter.board);
        self.place_pieces(&mut level)?;

        Ok(GeneratedLevel {
            level,
            walls_placed,
            companions,
            wall_budget: self.config.max_walls,
        })
    }

    fn scatter_edge_walls(&mut self, scatter: &mut Scatter, mut budget: usize) {
        let GeneratorConfig { width, height, .. } = self.config;
        let mut attempts = 0;

        while budget > 0 && attempts < self.config.max_attempts {
            attempts += 1;
            let (wall, companion) = if self.rng.gen_bool(0.5) {
                let x = self.rng.gen_range(1..=width - 2);
                let y = if self.rng.gen_bool(0.5) { 1 } else { height - 1 };
                let companion_y = if y == 1 { 0 } else { height - 1 };
                (Wall::horizontal(x, y), Wall::vertical(x, companion_y))
            } else {
                let x = if self.rng.gen_bool(0.5) { 1 } else { width - 1 };
                let y = self.rng.gen_range(1..=height - 2);
                let companion_x = if x == 1 { 0 } else { width - 1 };
                (Wall::vertical(x, y), Wall::horizontal(companion_x, y))
            };

            if !scatter.try_place(wall) {
                continue;
            }
            budget -= 1;

            if budget > 0
                && self.rng.gen_bool(self.config.companion_chance)
                && scatter.try_place_companion(companion)
            {
                budget -= 1;
            }
        }
        debug!(
            "edge phase finished after {attempts} attempts with {} walls and {} companions",
            scatter.placed, scatter.companions
        );
    }

    fn scatter_interior_walls(&mut self, scatter: &mut Scatter) {
        let GeneratorConfig { width, height, .. } = self.config;
        let mut attempts = 0;

        while scatter.placed < self.config.max_walls && attempts < self.config.max_attempts {
            attempts += 1;
            let wall = if self.rng.gen_bool(0.5) {
                Wall::horizontal(
                    self.rng.gen_range(1..=width - 2),
                    self.rng.gen_range(2..=height - 2),
                )
            } else {
                Wall::vertical(
                    self.rng.gen_range(2..=width - 2),
                    self.rng.gen_range(1..=height - 2),
                )
            };
            let _ = scatter.try_place(wall);
        }
        debug!(
            "interior phase finished after {attempts} attempts with {} walls",
            scatter.placed
        );
    }

    fn place_pieces(&mut self, level: &mut Level) -> Result<(), GenerationError> {
        let candidates = piece_cells(level.board());
        let mut picks = candidates.choose_multiple(&mut self.rng, Color::STANDARD.len() + 1);
        let (Some(&target_cell), robot_cells) = (picks.next(), picks) else {
            let board = level.board();
            return Err(GenerationError::BoardTooSmall {
                width: board.width(),
                height: board.height(),
            });
        };

        let target_color = *Color::STANDARD
            .choose(&mut self.rng)
            .unwrap_or(&Color::Red);
        level.set_target(Target {
            color: target_color,
            position: target_cell,
        })?;
        for (&color, &position) in Color::STANDARD.iter().zip(robot_cells) {
            level.push_robot(Robot { color, position })?;
        }
        Ok(())
    }
}

/// Generates a single level with the default tuning on a `width` x `height` board.
pub fn generate(width: u32, height: u32, seed: u64) -> Result<GeneratedLevel, GenerationError> {
    let config = GeneratorConfig {
        width,
        height,
        ..GeneratorConfig::default()
    };
    LevelGenerator::new(config, seed)?.generate()
}

/// Board under construction plus the bookkeeping shared by both scatter phases.
struct Scatter {
    board: Board,
    open_cells: usize,
    keep_connected: bool,
    placed: usize,
    companions: usize,
}

impl Scatter {
    /// Places a wall that counts toward `max_walls`.
    fn try_place(&mut self, wall: Wall) -> bool {
        let inserted = self.insert(wall);
        self.placed += usize::from(inserted);
        inserted
    }

    /// Places a border companion, which is tallied apart from the budget.
    fn try_place_companion(&mut self, wall: Wall) -> bool {
        let inserted = self.insert(wall);
        self.companions += usize::from(inserted);
        inserted
    }

    /// Adds `wall` unless it is taken, touches the center block, or splits the board.
    fn insert(&mut self, wall: Wall) -> bool {
        if self.board.has_wall(wall) || touches_center(&self.board, wall) {
            return false;
        }
        if !matches!(self.board.add_wall(wall), Ok(true)) {
            return false;
        }
        if self.keep_connected && reach_count(&self.board, Position::new(0, 0)) < self.open_cells
        {
            let _ = self.board.remove_wall(wall);
            return false;
        }
        true
    }
}

/// Reports whether either cell separated by `wall` lies in the center block.
fn touches_center(board: &Board, wall: Wall) -> bool {
    let (x, y) = (wall.x(), wall.y());
    let anchor = Position::new(x, y);
    let opposite = match wall.orientation() {
        WallOrientation::Horizontal => y.checked_sub(1).map(|y| Position::new(x, y)),
        WallOrientation::Vertical => x.checked_sub(1).map(|x| Position::new(x, y)),
    };
    board.is_center_cell(anchor) || opposite.is_some_and(|cell| board.is_center_cell(cell))
}

/// Cells eligible for the target and robots: one step in from the border and
/// outside the center block.
fn piece_cells(board: &Board) -> Vec<Position> {
    let (width, height) = (board.width(), board.height());
    (1..height.saturating_sub(1))
        .flat_map(|y| (1..width.saturating_sub(1)).map(move |x| Position::new(x, y)))
        .filter(|cell| !board.is_center_cell(*cell))
        .collect()
}

fn validate(config: &GeneratorConfig) -> Result<(), GenerationError> {
    for (name, value) in [
        ("edge_share", config.edge_share),
        ("companion_chance", config.companion_chance),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(GenerationError::InvalidProbability { name, value });
        }
    }

    let too_small = GenerationError::BoardTooSmall {
        width: config.width,
        height: config.height,
    };
    if config.width < 4 || config.height < 4 {
        return Err(too_small);
    }
    let board = Board::new(config.width, config.height)?;
    if piece_cells(&board).len() <= Color::STANDARD.len() {
        return Err(too_small);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiny_boards_are_rejected() {
        for (width, height) in [(3, 10), (10, 3), (4, 4)] {
            let config = GeneratorConfig {
                width,
                height,
                ..GeneratorConfig::default()
            };
            assert_eq!(
                LevelGenerator::new(config, 1).map(|_| ()),
                Err(GenerationError::BoardTooSmall { width, height })
            );
        }
    }

    #[test]
    fn probabilities_are_validated() {
        let config = GeneratorConfig {
            companion_chance: 1.5,
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            LevelGenerator::new(config, 1),
            Err(GenerationError::InvalidProbability {
                name: "companion_chance",
                ..
            })
        ));
    }

    #[test]
    fn center_touching_walls_are_detected() {
        let board = Board::new(12, 14).expect("board");
        assert!(touches_center(&board, Wall::horizontal(5, 6)));
        assert!(touches_center(&board, Wall::horizontal(6, 8)));
        assert!(touches_center(&board, Wall::vertical(7, 7)));
        assert!(touches_center(&board, Wall::vertical(6, 6)));
        assert!(!touches_center(&board, Wall::vertical(8, 7)));
        assert!(!touches_center(&board, Wall::horizontal(7, 6)));
    }

    #[test]
    fn scatter_refuses_walls_that_split_the_board() {
        let mut board = Board::new(5, 5).expect("board");
        board.enclose_border();
        let _ = board.enclose_center_block();
        let _ = board.add_wall(Wall::vertical(1, 0)).expect("wall");
        let mut scatter = Scatter {
            open_cells: board.cell_count() - CENTER_CELLS,
            board,
            keep_connected: true,
            placed: 0,
            companions: 0,
        };

        assert!(!scatter.try_place(Wall::horizontal(0, 1)), "would seal (0,0)");
        assert!(scatter.try_place(Wall::horizontal(4, 1)));
        assert_eq!(scatter.placed, 1);
    }

    #[test]
    fn companions_are_tallied_apart_from_the_budget() {
        let mut board = Board::new(12, 14).expect("board");
        board.enclose_border();
        let _ = board.enclose_center_block();
        let mut scatter = Scatter {
            open_cells: board.cell_count() - CENTER_CELLS,
            board,
            keep_connected: true,
            placed: 0,
            companions: 0,
        };

        assert!(scatter.try_place(Wall::horizontal(3, 1)));
        assert!(scatter.try_place_companion(Wall::vertical(3, 0)));
        assert!(!scatter.try_place_companion(Wall::vertical(3, 0)), "already taken");
        assert_eq!((scatter.placed, scatter.companions), (1, 1));
    }

    #[test]
    fn piece_cells_skip_border_ring_and_center() {
        let board = Board::new(5, 5).expect("board");
        let cells = piece_cells(&board);
        assert_eq!(cells.len(), 5);
        assert!(cells.iter().all(|cell| !board.is_center_cell(*cell)));
    }
}
