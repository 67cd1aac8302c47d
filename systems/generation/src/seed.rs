//! Seed derivation keeping every candidate independently replayable.

use sha2::{Digest, Sha256};

const CANDIDATE_STREAM: &str = "roboyard.candidate";

/// Derives the RNG seed for candidate `index` of a run seeded with `base_seed`.
///
/// Workers may draw candidate indices in any order; a given pair always yields
/// the same seed and therefore the same level.
#[must_use]
pub fn derive_candidate_seed(base_seed: u64, index: u64) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base_seed.to_le_bytes());
    hasher.update(CANDIDATE_STREAM.as_bytes());
    hasher.update(index.to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
