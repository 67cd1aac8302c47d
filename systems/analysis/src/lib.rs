#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Anomaly analysis for finished levels.
//!
//! The [`Analyzer`] answers which parts of a level no free robot can reach,
//! which robots are boxed in, and whether the target is reachable. The center
//! block is enclosed on purpose and never reported.

mod center;
mod trap;

use log::debug;
use roboyard_core::{Level, Position};
use roboyard_reachability::{find_regions, reachable_from, unreachable_cells, Region};
use serde::Serialize;

pub use center::filter_regions;
pub use trap::{classify_robots, TrapClassification, TrapPolicy, TrappedRobot};

/// Findings for a single level, ready to hand to a report formatter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    /// Board width in cells.
    pub width: u32,
    /// Board height in cells.
    pub height: u32,
    /// Unreachable regions with the center block removed.
    pub regions: Vec<Region>,
    /// Number of cells across all reported regions.
    pub unreachable_count: usize,
    /// Robots whose reach fell below the trap threshold.
    pub trapped_robots: Vec<TrappedRobot>,
    /// Whether a free robot can reach the target; `None` without a target.
    pub target_reachable: Option<bool>,
    /// Whether the target shares a cell with a robot.
    pub target_overlaps_robot: bool,
    /// Cells occupied by more than one robot.
    pub duplicate_robots: Vec<Position>,
}

impl AnalysisReport {
    /// Reports whether any finding deserves attention.
    #[must_use]
    pub fn has_anomalies(&self) -> bool {
        !self.regions.is_empty()
            || !self.trapped_robots.is_empty()
            || self.target_reachable == Some(false)
            || self.target_overlaps_robot
            || !self.duplicate_robots.is_empty()
    }
}

/// Pure analysis system parameterised by the trap policy.
#[derive(Clone, Copy, Debug, Default)]
pub struct Analyzer {
    policy: TrapPolicy,
}

impl Analyzer {
    /// Creates an analyzer using the provided trap policy.
    #[must_use]
    pub const fn new(policy: TrapPolicy) -> Self {
        Self { policy }
    }

    /// Analyses one level.
    ///
    /// Reachability is measured from the free robots only, so the pocket of a
    /// trapped robot counts as unreachable. When every robot is trapped, or
    /// none is placed, all robots seed the fill instead.
    #[must_use]
    pub fn analyze(&self, level: &Level) -> AnalysisReport {
        let board = level.board();
        let robots = level.robot_positions();
        let classification = classify_robots(board, &robots, self.policy);

        let seeds = if classification.free.is_empty() {
            &robots
        } else {
            &classification.free
        };
        let reachable = reachable_from(board, seeds.iter().copied());
        let unreachable = unreachable_cells(board, &reachable);
        let regions = filter_regions(find_regions(&unreachable), board);
        let unreachable_count = regions.iter().map(Region::len).sum();
        debug!(
            "{} of {} cells reachable, {} anomalous regions",
            reachable.len(),
            board.cell_count(),
            regions.len()
        );

        AnalysisReport {
            width: board.width(),
            height: board.height(),
            regions,
            unreachable_count,
            trapped_robots: classification.trapped,
            target_reachable: level
                .target()
                .map(|target| reachable.contains(&target.position)),
            target_overlaps_robot: level.target_overlaps_robot(),
            duplicate_robots: level.duplicate_robot_positions(),
        }
    }
}
