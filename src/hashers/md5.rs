// md5.rs - MD5 hasher implementation

use super::traits::DatasetHasher;

/// MD5 hasher - legacy compatibility
#[derive(Debug, Clone)]
pub struct Md5Hasher;

impl DatasetHasher for Md5Hasher {
    fn hash_bytes(&self, bytes: &[u8]) -> String {
        format!("{:x}", md5::compute(bytes))
    }

    fn name(&self) -> &'static str {
        "md5"
    }

    fn description(&self) -> &'static str {
        "MD5 digest for legacy compatibility"
    }
}
