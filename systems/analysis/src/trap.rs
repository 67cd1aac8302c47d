//! Heuristic detection of robots boxed into small areas.

use log::debug;
use roboyard_core::{Board, Position};
use roboyard_reachability::reach_count;
use serde::{Deserialize, Serialize};

/// Threshold controlling when a robot counts as trapped.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrapPolicy {
    /// Fraction of the largest robot reach below which a robot is trapped.
    pub ratio: f64,
}

impl Default for TrapPolicy {
    fn default() -> Self {
        Self { ratio: 0.5 }
    }
}

/// Robot whose reachable area fell below the trap threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrappedRobot {
    /// Cell the robot stands on.
    pub position: Position,
    /// Number of cells the robot can reach, including its own.
    pub reach: usize,
}

/// Split of a robot set into trapped and free robots.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrapClassification {
    /// Robots below the threshold, in input order.
    pub trapped: Vec<TrappedRobot>,
    /// Remaining robots, in input order.
    pub free: Vec<Position>,
}

/// Classifies each robot by comparing its reach with the largest reach.
///
/// A robot is trapped when its reach is strictly below
/// `policy.ratio * max_reach`. This is a heuristic rather than a graph
/// property: robots sharing one small pocket are all free when no robot does
/// better, and a lone robot is never trapped.
#[must_use]
pub fn classify_robots(
    board: &Board,
    robots: &[Position],
    policy: TrapPolicy,
) -> TrapClassification {
    let reaches: Vec<(Position, usize)> = robots
        .iter()
        .map(|&robot| (robot, reach_count(board, robot)))
        .collect();
    let max_reach = reaches.iter().map(|&(_, reach)| reach).max().unwrap_or(0);
    let threshold = policy.ratio * max_reach as f64;

    let mut classification = TrapClassification::default();
    for (position, reach) in reaches {
        debug!("robot at {position} reaches {reach} of max {max_reach} cells");
        if (reach as f64) < threshold {
            classification
                .trapped
                .push(TrappedRobot { position, reach });
        } else {
            classification.free.push(position);
        }
    }
    classification
}
