// sha256.rs - SHA256 hasher implementation

use super::traits::DatasetHasher;

/// SHA256 hasher - default for provenance
#[derive(Debug, Clone)]
pub struct Sha256Hasher;

impl DatasetHasher for Sha256Hasher {
    fn hash_bytes(&self, bytes: &[u8]) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        format!("{:x}", hasher.finalize())
    }

    fn name(&self) -> &'static str {
        "sha256"
    }

    fn description(&self) -> &'static str {
        "SHA256 digest for collision-resistant dataset identification"
    }
}
