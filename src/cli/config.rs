// config.rs - Configuration file support

use crate::simulation::{NetworkSirParams, SirvParams};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    // Input/Output
    pub input: Option<String>,
    pub format: Option<String>,
    pub alphabet: Option<String>,
    pub missing_marker: Option<String>,
    pub output: Option<String>,
    pub output_format: Option<String>,

    // Analysis
    pub tier: Option<String>,
    pub metrics: Option<Vec<String>>,
    pub window: Option<i64>,
    pub step: Option<i64>,
    pub k: Option<i64>,
    pub distance: Option<String>,
    pub distance_mode: Option<String>,
    pub cluster_threshold: Option<f64>,
    pub z_threshold: Option<f64>,
    pub sample_size: Option<i64>,
    pub seed: Option<u64>,
    pub hasher: Option<String>,

    // Alignment settings
    pub alignment_mode: Option<String>,
    pub match_score: Option<i32>,
    pub mismatch_penalty: Option<i32>,
    pub gap_open: Option<i32>,
    pub gap_extend: Option<i32>,

    // Validation filters
    pub include_records: Option<String>,
    pub exclude_records: Option<String>,
    pub min_length: Option<usize>,
    pub max_invalid_fraction: Option<f64>,
    pub max_missing_fraction: Option<f64>,
    pub repair: Option<bool>,

    // Performance
    pub threads: Option<usize>,

    // Flags
    pub dry_run: Option<bool>,
    pub progress: Option<bool>,

    // Simulation
    pub simulate: Option<String>,
    pub sirv: Option<SirvParams>,
    pub network: Option<NetworkSirParams>,
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        println!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Generate a sample configuration file with comments
    pub fn generate_sample() -> String {
        r#"# bioenv.toml - Configuration file for bioenv
# Command line arguments will override these settings

# =============================================================================
# INPUT/OUTPUT
# =============================================================================

# Input dataset: FASTA sequences or a CSV/TSV table
input = "/path/to/sequences.fasta"

# Input format: fasta, csv, tsv (omit to infer)
# format = "fasta"

# Sequence alphabet: dna, rna, protein (omit to infer from the majority of records)
# alphabet = "dna"

# Extra table cell value treated as missing (empty cells and NA always are)
missing_marker = "-"

# Output file and format: json, msgpack, tsv, phylip, nexus
output = "result.json"
output_format = "json"

# =============================================================================
# ANALYSIS
# =============================================================================

# Tier: basic, advanced
tier = "basic"

# Metrics to run (omit to run every metric of the tier that fits the dataset)
# metrics = ["length", "gc-content", "identity"]

# Sliding window for windowed GC
window = 100
step = 50

# k-mer length
k = 4

# Distance used for clusters and outliers: identity, alignment, kmer
distance = "identity"

# Alignment distance mode: snps, snps-indel-events, snps-indel-bases
distance_mode = "snps"

# Clustering and outlier thresholds
cluster_threshold = 0.1
z_threshold = 2.0

# Compare only a seeded random sample of records
# sample_size = 500
seed = 42

# Dataset fingerprint hasher: crc32, sha256, md5
hasher = "sha256"

# =============================================================================
# ALIGNMENT SETTINGS
# =============================================================================

# Alignment mode: dna, dna-strict, dna-permissive, protein
alignment_mode = "dna"

# Custom alignment scores (overrides preset mode)
# match_score = 2
# mismatch_penalty = -1
# gap_open = 5
# gap_extend = 2

# =============================================================================
# VALIDATION FILTERS
# =============================================================================

# Keep only / drop records whose id matches a regex
# include_records = "^sample_.*"
# exclude_records = "control.*"

# Drop sequences shorter than this
min_length = 0

# Drop sequences / rows above these invalid or missing fractions (0.0-1.0)
max_invalid_fraction = 1.0
max_missing_fraction = 1.0

# Replace invalid symbols with N/X and stray text cells with missing
repair = false

# =============================================================================
# PERFORMANCE
# =============================================================================

# Number of threads (omit for auto-detection)
# threads = 8

# =============================================================================
# SIMULATION (used with simulate = "sirv" or "network")
# =============================================================================

# simulate = "sirv"

[sirv]
base_beta = 0.3
gamma = 0.1
vaccine_efficacy = 0.8
temperature = 0.0
mobility = 1.0
reference_temperature = 10.0
temperature_sensitivity = 0.05
population = 1000000.0
vaccinated_fraction = 0.3
initial_infected = 1000.0
days = 180
steps_per_day = 10

[network]
nodes = 200
edge_probability = 0.05
beta = 0.3
gamma = 0.1
initial_infected_fraction = 0.02
steps = 50
seed = 42
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_config_parses() {
        let config = Config::from_toml(&Config::generate_sample()).unwrap();
        assert_eq!(config.tier.as_deref(), Some("basic"));
        assert_eq!(config.window, Some(100));
        assert_eq!(config.sirv, Some(SirvParams::default()));
        assert_eq!(config.network, Some(NetworkSirParams::default()));
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config = Config::from_toml("[sirv]\ndays = 30\n").unwrap();
        let sirv = config.sirv.unwrap();
        assert_eq!(sirv.days, 30);
        assert_eq!(sirv.gamma, SirvParams::default().gamma);
        assert!(config.network.is_none());
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(Config::from_toml("window = \"wide\"").is_err());
    }
}
