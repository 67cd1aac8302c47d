#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Difficulty classification and the generation campaign.
//!
//! Candidates produced by the level generator are handed to an external
//! [`Solver`]; the optimal move count selects a [`Tier`], and a shared
//! [`QuotaLedger`] decides whether that tier still has room. Accepted levels
//! are persisted through an [`ArtifactSink`].

mod campaign;
mod ledger;
mod sink;
mod solver;

use std::fmt;

use log::{debug, warn};
use roboyard_core::Level;
use serde::{Deserialize, Serialize};

pub use campaign::{run_campaign, CampaignConfig, CampaignSummary};
pub use ledger::QuotaLedger;
pub use sink::{ArtifactError, ArtifactSink, DirectorySink};
pub use solver::{ExternalSolver, Solver, SolverError, SolverOutcome};

/// Difficulty bucket a level is filed under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Solvable in very few moves.
    Beginner,
    /// Moderate solutions.
    Intermediate,
    /// Long solutions.
    Advanced,
    /// Everything beyond the advanced threshold.
    Expert,
}

impl Tier {
    /// Every tier from easiest to hardest.
    pub const ALL: [Self; 4] = [
        Self::Beginner,
        Self::Intermediate,
        Self::Advanced,
        Self::Expert,
    ];

    /// Lowercase name, also used as the artifact directory name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Expert => "expert",
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Inclusive upper move counts for the three lower tiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    /// Largest move count still filed as beginner.
    pub beginner: u32,
    /// Largest move count still filed as intermediate.
    pub intermediate: u32,
    /// Largest move count still filed as advanced.
    pub advanced: u32,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            beginner: 6,
            intermediate: 10,
            advanced: 14,
        }
    }
}

impl TierThresholds {
    /// Maps an optimal move count onto its tier.
    #[must_use]
    pub const fn tier_for(&self, moves: u32) -> Tier {
        if moves <= self.beginner {
            Tier::Beginner
        } else if moves <= self.intermediate {
            Tier::Intermediate
        } else if moves <= self.advanced {
            Tier::Advanced
        } else {
            Tier::Expert
        }
    }
}

/// Reasons a candidate level is turned away.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// The generator could not build the candidate.
    GenerationFailed,
    /// The solver proved the level unsolvable or ran out of time.
    Unsolvable,
    /// The solver crashed or produced unusable output.
    SolverFailed,
    /// The level's tier had no free slot left.
    QuotaFull,
    /// The artifact could not be written.
    PersistFailed,
}

/// Solver verdict translated into a tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grade {
    /// Tier selected by the move count.
    pub tier: Tier,
    /// Optimal move count reported by the solver.
    pub moves: u32,
}

/// Final decision about one candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// The candidate holds `slot` in its tier until persisted or released.
    Accepted {
        /// Solver grade of the candidate.
        grade: Grade,
        /// Slot reserved in the quota ledger.
        slot: usize,
    },
    /// The candidate was discarded.
    Rejected(Rejection),
}

/// Grades levels through a solver and files them against a quota ledger.
#[derive(Clone, Copy, Debug, Default)]
pub struct DifficultyClassifier {
    thresholds: TierThresholds,
}

impl DifficultyClassifier {
    /// Creates a classifier with the provided tier thresholds.
    #[must_use]
    pub const fn new(thresholds: TierThresholds) -> Self {
        Self { thresholds }
    }

    /// Thresholds used to pick tiers.
    #[must_use]
    pub const fn thresholds(&self) -> &TierThresholds {
        &self.thresholds
    }

    /// Asks `solver` for the optimal move count and maps it onto a tier.
    pub fn grade<S>(&self, solver: &S, level: &Level) -> Result<Grade, Rejection>
    where
        S: Solver + ?Sized,
    {
        match solver.solve(level) {
            Ok(SolverOutcome::Solved(moves)) => Ok(Grade {
                tier: self.thresholds.tier_for(moves),
                moves,
            }),
            Ok(SolverOutcome::Unsolvable) => Err(Rejection::Unsolvable),
            Err(error) => {
                warn!("solver failed: {error}");
                Err(Rejection::SolverFailed)
            }
        }
    }

    /// Grades `level` and reserves a slot for it in its tier.
    pub fn classify_and_accept<S>(&self, solver: &S, level: &Level, ledger: &QuotaLedger) -> Verdict
    where
        S: Solver + ?Sized,
    {
        let grade = match self.grade(solver, level) {
            Ok(grade) => grade,
            Err(rejection) => return Verdict::Rejected(rejection),
        };
        match ledger.try_reserve(grade.tier) {
            Some(slot) => Verdict::Accepted { grade, slot },
            None => {
                debug!("{} quota full, dropping {}-move level", grade.tier, grade.moves);
                Verdict::Rejected(Rejection::QuotaFull)
            }
        }
    }
}
