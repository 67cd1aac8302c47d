//! Textual map artifact shared by the generator, the game, and the analysis tools.
//!
//! ```text
//! board:12,14;
//! mh5,6;
//! mv5,6;
//! target_red3,4;
//! robot_blue1,1;
//! ```
//!
//! Entries are terminated by a newline or `;`. Surrounding whitespace is
//! ignored, as are blank entries.

use std::str::FromStr;

use thiserror::Error;

use crate::{Board, BoardError, Color, Level, Position, Robot, Target, Wall};

const BOARD_PREFIX: &str = "board:";
const HORIZONTAL_PREFIX: &str = "mh";
const VERTICAL_PREFIX: &str = "mv";
const TARGET_PREFIX: &str = "target_";
const ROBOT_PREFIX: &str = "robot_";

/// Errors raised while parsing a map artifact.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The artifact never declared the board extent.
    #[error("map artifact is missing a `board:` line")]
    MissingBoard,
    /// An entry could not be understood.
    #[error("line {line}: `{text}`: {reason}")]
    Malformed {
        /// One-based line number of the offending entry.
        line: usize,
        /// Offending entry with whitespace and terminator stripped.
        text: String,
        /// What was wrong with the entry.
        reason: Malformed,
    },
    /// An entry was well formed but does not fit the declared board.
    #[error("line {line}: `{text}`: {source}")]
    Invalid {
        /// One-based line number of the offending entry.
        line: usize,
        /// Offending entry with whitespace and terminator stripped.
        text: String,
        /// Board constraint the entry violated.
        source: BoardError,
    },
}

/// Specific defect found in a malformed entry.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Malformed {
    /// The entry did not start with a known prefix.
    #[error("unknown entry")]
    UnknownEntry,
    /// The coordinates were not two comma separated integers.
    #[error("expected `<x>,<y>` integer coordinates")]
    Coordinates,
    /// The colour name is not part of the map format.
    #[error("unknown colour `{0}`")]
    UnknownColor(String),
    /// A second `board:` entry was found.
    #[error("board extent declared twice")]
    DuplicateBoard,
    /// A second target entry was found.
    #[error("only one target is supported")]
    DuplicateTarget,
}

enum Entry {
    Board(u32, u32),
    Wall(Wall),
    Target(Target),
    Robot(Robot),
}

struct Located {
    line: usize,
    text: String,
    entry: Entry,
}

impl Level {
    /// Parses a map artifact into a level.
    ///
    /// Nothing is produced unless every entry parses and fits the board.
    pub fn from_artifact(text: &str) -> Result<Self, ParseError> {
        let mut dimensions = None;
        let mut entries = Vec::new();
        let mut target_seen = false;

        for (index, raw_line) in text.lines().enumerate() {
            let line = index + 1;
            for segment in raw_line.split(';') {
                let segment = segment.trim();
                if segment.is_empty() {
                    continue;
                }

                let malformed = |reason| ParseError::Malformed {
                    line,
                    text: segment.to_owned(),
                    reason,
                };
                let entry = parse_entry(segment).map_err(malformed)?;
                match entry {
                    Entry::Board(width, height) => {
                        if dimensions.is_some() {
                            return Err(malformed(Malformed::DuplicateBoard));
                        }
                        dimensions = Some((line, segment.to_owned(), width, height));
                    }
                    Entry::Target(_) if target_seen => {
                        return Err(malformed(Malformed::DuplicateTarget));
                    }
                    entry => {
                        target_seen |= matches!(entry, Entry::Target(_));
                        entries.push(Located {
                            line,
                            text: segment.to_owned(),
                            entry,
                        });
                    }
                }
            }
        }

        let (line, text, width, height) = dimensions.ok_or(ParseError::MissingBoard)?;
        let board = Board::new(width, height)
            .map_err(|source| ParseError::Invalid { line, text, source })?;
        let mut level = Level::new(board);

        for located in entries {
            let applied = match located.entry {
                Entry::Wall(wall) => level.board.add_wall(wall).map(|_| ()),
                Entry::Target(target) => level.set_target(target),
                Entry::Robot(robot) => level.push_robot(robot),
                Entry::Board(..) => Ok(()),
            };
            applied.map_err(|source| ParseError::Invalid {
                line: located.line,
                text: located.text,
                source,
            })?;
        }

        Ok(level)
    }

    /// Serialises the level into the map artifact format.
    ///
    /// Walls are emitted horizontal first, each group ordered by `(x, y)`,
    /// followed by the target and then the robots in placement order.
    #[must_use]
    pub fn to_artifact(&self) -> String {
        let mut lines = Vec::with_capacity(self.board.wall_count() + self.robots.len() + 2);
        lines.push(format!(
            "{BOARD_PREFIX}{},{};",
            self.board.width(),
            self.board.height()
        ));
        lines.extend(self.board.walls().map(|wall| format!("{wall};")));
        if let Some(target) = self.target {
            lines.push(format!(
                "{TARGET_PREFIX}{}{},{};",
                target.color,
                target.position.x(),
                target.position.y()
            ));
        }
        lines.extend(self.robots.iter().map(|robot| {
            format!(
                "{ROBOT_PREFIX}{}{},{};",
                robot.color,
                robot.position.x(),
                robot.position.y()
            )
        }));
        lines.join("\n")
    }
}

impl FromStr for Level {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::from_artifact(text)
    }
}

fn parse_entry(segment: &str) -> Result<Entry, Malformed> {
    if let Some(rest) = segment.strip_prefix(BOARD_PREFIX) {
        let (width, height) = parse_pair(rest)?;
        return Ok(Entry::Board(width, height));
    }
    if let Some(rest) = segment.strip_prefix(HORIZONTAL_PREFIX) {
        let (x, y) = parse_pair(rest)?;
        return Ok(Entry::Wall(Wall::horizontal(x, y)));
    }
    if let Some(rest) = segment.strip_prefix(VERTICAL_PREFIX) {
        let (x, y) = parse_pair(rest)?;
        return Ok(Entry::Wall(Wall::vertical(x, y)));
    }
    if let Some(rest) = segment.strip_prefix(TARGET_PREFIX) {
        let (color, position) = parse_piece(rest)?;
        return Ok(Entry::Target(Target { color, position }));
    }
    if let Some(rest) = segment.strip_prefix(ROBOT_PREFIX) {
        let (color, position) = parse_piece(rest)?;
        return Ok(Entry::Robot(Robot { color, position }));
    }
    Err(Malformed::UnknownEntry)
}

fn parse_piece(rest: &str) -> Result<(Color, Position), Malformed> {
    let split = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    let (name, coordinates) = rest.split_at(split);
    let color = Color::from_name(name).ok_or_else(|| Malformed::UnknownColor(name.to_owned()))?;
    let (x, y) = parse_pair(coordinates)?;
    Ok((color, Position::new(x, y)))
}

fn parse_pair(value: &str) -> Result<(u32, u32), Malformed> {
    let (first, second) = value.split_once(',').ok_or(Malformed::Coordinates)?;
    let first = first.trim().parse().map_err(|_| Malformed::Coordinates)?;
    let second = second.trim().parse().map_err(|_| Malformed::Coordinates)?;
    Ok((first, second))
}
