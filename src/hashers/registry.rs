// registry.rs - Hasher registry for managing available hashers

use super::traits::DatasetHasher;
use super::{Crc32Hasher, Md5Hasher, Sha256Hasher};
use std::collections::BTreeMap;

/// Registry for available fingerprint hashers
#[derive(Debug)]
pub struct HasherRegistry {
    hashers: BTreeMap<String, Box<dyn DatasetHasher>>,
}

impl HasherRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            hashers: BTreeMap::new(),
        };

        // Register built-in hashers
        registry.register_hasher(Box::new(Crc32Hasher));
        registry.register_hasher(Box::new(Sha256Hasher));
        registry.register_hasher(Box::new(Md5Hasher));

        registry
    }

    /// Register a new hasher under its own name
    pub fn register_hasher(&mut self, hasher: Box<dyn DatasetHasher>) {
        self.hashers.insert(hasher.name().to_string(), hasher);
    }

    /// Get a hasher by name (case-insensitive)
    pub fn get_hasher(&self, name: &str) -> Option<&dyn DatasetHasher> {
        self.hashers
            .get(&name.to_ascii_lowercase())
            .map(|h| h.as_ref())
    }

    /// Check if a hasher exists
    pub fn has_hasher(&self, name: &str) -> bool {
        self.get_hasher(name).is_some()
    }

    /// List all available hashers as (name, description), sorted by name
    pub fn list_hashers(&self) -> Vec<(&str, &str)> {
        self.hashers
            .values()
            .map(|h| (h.name(), h.description()))
            .collect()
    }

    /// Get all hasher names, sorted
    pub fn get_hasher_names(&self) -> Vec<&str> {
        self.hashers.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for HasherRegistry {
    fn default() -> Self {
        Self::new()
    }
}
