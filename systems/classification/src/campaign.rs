//! Parallel generate-and-classify loop filling every tier quota.

use std::{
    collections::BTreeMap,
    num::NonZeroUsize,
    panic,
    sync::atomic::{AtomicU64, Ordering},
    thread,
};

use log::{debug, info, warn};
use roboyard_system_generation::{GenerationError, GeneratorConfig, LevelGenerator};
use serde::{Deserialize, Serialize};

use crate::{
    ArtifactSink, DifficultyClassifier, QuotaLedger, Rejection, Solver, Tier, TierThresholds,
    Verdict,
};

/// Settings for one campaign run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignConfig {
    /// Levels wanted per tier.
    pub quota: usize,
    /// Worker threads; zero is treated as one.
    pub workers: usize,
    /// Base seed from which every candidate seed is derived.
    pub seed: u64,
    /// Stops issuing candidates after this many, complete or not.
    pub max_candidates: Option<u64>,
    /// Generator tuning applied to every candidate.
    pub generator: GeneratorConfig,
    /// Move-count boundaries between tiers.
    pub thresholds: TierThresholds,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            quota: 35,
            workers: thread::available_parallelism().map_or(1, NonZeroUsize::get),
            seed: 0,
            max_candidates: None,
            generator: GeneratorConfig::default(),
            thresholds: TierThresholds::default(),
        }
    }
}

/// Outcome of a campaign run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CampaignSummary {
    /// Candidates generated across all workers.
    pub candidates: u64,
    /// Levels persisted per tier.
    pub accepted: BTreeMap<Tier, usize>,
    /// Discarded candidates per reason.
    pub rejected: BTreeMap<Rejection, u64>,
    /// Whether every tier reached its quota.
    pub complete: bool,
}

impl CampaignSummary {
    /// Total number of rejected candidates.
    #[must_use]
    pub fn rejected_total(&self) -> u64 {
        self.rejected.values().sum()
    }
}

/// Runs generate, solve, and persist on `config.workers` threads until every
/// tier quota is full or `max_candidates` is exhausted.
///
/// Fails only when the generator configuration is invalid.
pub fn run_campaign<S, K>(
    config: &CampaignConfig,
    solver: &S,
    sink: &K,
) -> Result<CampaignSummary, GenerationError>
where
    S: Solver + Sync + ?Sized,
    K: ArtifactSink + Sync + ?Sized,
{
    let _ = LevelGenerator::new(config.generator.clone(), config.seed)?;

    let ledger = QuotaLedger::new(config.quota);
    let next_candidate = AtomicU64::new(0);
    let worker = Worker {
        config,
        classifier: DifficultyClassifier::new(config.thresholds),
        solver,
        sink,
        ledger: &ledger,
        next_candidate: &next_candidate,
    };
    let workers = config.workers.max(1);
    info!(
        "campaign started: {} per tier, {workers} workers, seed {}",
        config.quota, config.seed
    );

    let tallies: Vec<Tally> = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| scope.spawn(|| worker.run()))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|payload| panic::resume_unwind(payload)))
            .collect()
    });

    let mut summary = CampaignSummary {
        accepted: Tier::ALL
            .into_iter()
            .map(|tier| (tier, ledger.accepted(tier)))
            .collect(),
        complete: ledger.is_complete(),
        ..CampaignSummary::default()
    };
    for tally in tallies {
        summary.candidates += tally.candidates;
        for (rejection, count) in tally.rejected {
            *summary.rejected.entry(rejection).or_default() += count;
        }
    }
    info!(
        "campaign finished after {} candidates, complete: {}",
        summary.candidates, summary.complete
    );
    Ok(summary)
}

#[derive(Default)]
struct Tally {
    candidates: u64,
    rejected: BTreeMap<Rejection, u64>,
}

struct Worker<'a, S: ?Sized, K: ?Sized> {
    config: &'a CampaignConfig,
    classifier: DifficultyClassifier,
    solver: &'a S,
    sink: &'a K,
    ledger: &'a QuotaLedger,
    next_candidate: &'a AtomicU64,
}

impl<S, K> Worker<'_, S, K>
where
    S: Solver + ?Sized,
    K: ArtifactSink + ?Sized,
{
    fn run(&self) -> Tally {
        let mut tally = Tally::default();
        while !self.ledger.is_complete() {
            let index = self.next_candidate.fetch_add(1, Ordering::Relaxed);
            if self.config.max_candidates.is_some_and(|max| index >= max) {
                break;
            }
            tally.candidates += 1;
            if let Err(rejection) = self.attempt(index) {
                debug!("candidate {index} rejected: {rejection:?}");
                *tally.rejected.entry(rejection).or_default() += 1;
            }
        }
        tally
    }

    fn attempt(&self, index: u64) -> Result<(), Rejection> {
        let generated =
            LevelGenerator::for_candidate(self.config.generator.clone(), self.config.seed, index)
                .and_then(|mut generator| generator.generate())
                .map_err(|error| {
                    warn!("candidate {index} could not be generated: {error}");
                    Rejection::GenerationFailed
                })?;
        let level = generated.level;

        let (grade, slot) = match self
            .classifier
            .classify_and_accept(self.solver, &level, self.ledger)
        {
            Verdict::Accepted { grade, slot } => (grade, slot),
            Verdict::Rejected(rejection) => return Err(rejection),
        };

        if let Err(error) = self.sink.persist(grade.tier, slot, &level.to_artifact()) {
            warn!("dropping candidate {index}: {error}");
            let _ = self.ledger.release(grade.tier, slot);
            return Err(Rejection::PersistFailed);
        }
        info!(
            "candidate {index} accepted as {} #{slot} ({} moves)",
            grade.tier, grade.moves
        );
        Ok(())
    }
}
