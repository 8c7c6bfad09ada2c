// crc32.rs - CRC32 hasher implementation

use super::traits::DatasetHasher;

/// CRC32 hasher - fast, non-cryptographic
#[derive(Debug, Clone)]
pub struct Crc32Hasher;

impl DatasetHasher for Crc32Hasher {
    fn hash_bytes(&self, bytes: &[u8]) -> String {
        use crc32fast::Hasher;
        let mut hasher = Hasher::new();
        hasher.update(bytes);
        format!("{:08x}", hasher.finalize())
    }

    fn name(&self) -> &'static str {
        "crc32"
    }

    fn description(&self) -> &'static str {
        "CRC32 checksum (fast, non-cryptographic)"
    }
}
