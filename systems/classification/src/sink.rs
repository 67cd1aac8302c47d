//! Destinations for accepted level artifacts.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::Tier;

/// Failures while persisting an accepted level.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The tier directory could not be created.
    #[error("failed to create directory {}", .path.display())]
    CreateDir {
        /// Directory that was being created.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The artifact file could not be written.
    #[error("failed to write {}", .path.display())]
    Write {
        /// File that was being written.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

/// Stores artifacts under a tier and slot number.
pub trait ArtifactSink {
    /// Persists `artifact` as slot `slot` of `tier`.
    fn persist(&self, tier: Tier, slot: usize, artifact: &str) -> Result<(), ArtifactError>;
}

/// Writes `<root>/<tier>/generatedMap_<slot>.txt`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    /// Creates a sink rooted at `root`. Directories are created lazily.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the tier folders.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File an artifact for `tier` and `slot` is written to.
    #[must_use]
    pub fn path_for(&self, tier: Tier, slot: usize) -> PathBuf {
        self.root
            .join(tier.name())
            .join(format!("generatedMap_{slot}.txt"))
    }
}

impl ArtifactSink for DirectorySink {
    fn persist(&self, tier: Tier, slot: usize, artifact: &str) -> Result<(), ArtifactError> {
        let directory = self.root.join(tier.name());
        fs::create_dir_all(&directory).map_err(|source| ArtifactError::CreateDir {
            path: directory,
            source,
        })?;
        let path = self.path_for(tier, slot);
        fs::write(&path, artifact).map_err(|source| ArtifactError::Write { path, source })
    }
}
