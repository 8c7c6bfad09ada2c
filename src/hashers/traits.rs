// traits.rs - Core traits and types for the fingerprint hasher system

use crate::data::Dataset;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};

/// Hasher-qualified digest identifying a dataset's content
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    pub hasher: String,
    pub digest: String,
}

impl Fingerprint {
    pub fn new(hasher: &str, digest: String) -> Self {
        Self {
            hasher: hasher.to_string(),
            digest,
        }
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.hasher, self.digest)
    }
}

/// Pluggable digest used for dataset provenance
pub trait DatasetHasher: Send + Sync + Debug {
    /// Hex digest of raw bytes
    fn hash_bytes(&self, bytes: &[u8]) -> String;

    /// Registry key, lowercase
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Digest of the dataset's canonical serialization. Record order matters.
    fn fingerprint(&self, dataset: &Dataset) -> Fingerprint {
        Fingerprint::new(self.name(), self.hash_bytes(&dataset.canonical_bytes()))
    }
}
