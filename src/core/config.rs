// config.rs - Analysis tiers, metrics and run configuration

use crate::core::alignment::{AlignmentConfig, DistanceMode};
use crate::data::{Alphabet, Dataset, DatasetKind};
use crate::error::{BioenvError, Result};
use crate::hashers::HasherRegistry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Analysis tier; advanced is a superset of basic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Basic,
    Advanced,
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(Tier::Basic),
            "advanced" => Ok(Tier::Advanced),
            _ => Err(format!("Invalid tier: {}. Use: basic, advanced", s)),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Basic => write!(f, "basic"),
            Tier::Advanced => write!(f, "advanced"),
        }
    }
}

/// A named computation the engine can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    Length,
    Composition,
    GcContent,
    Complexity,
    Ambiguity,
    Summary,
    WindowedGc,
    Identity,
    Alignment,
    KmerDistance,
    RowDistance,
    Correlation,
    Clusters,
    Outliers,
}

impl Metric {
    pub const ALL: [Metric; 14] = [
        Metric::Length,
        Metric::Composition,
        Metric::GcContent,
        Metric::Complexity,
        Metric::Ambiguity,
        Metric::Summary,
        Metric::WindowedGc,
        Metric::Identity,
        Metric::Alignment,
        Metric::KmerDistance,
        Metric::RowDistance,
        Metric::Correlation,
        Metric::Clusters,
        Metric::Outliers,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Length => "length",
            Metric::Composition => "composition",
            Metric::GcContent => "gc-content",
            Metric::Complexity => "complexity",
            Metric::Ambiguity => "ambiguity",
            Metric::Summary => "summary",
            Metric::WindowedGc => "windowed-gc",
            Metric::Identity => "identity",
            Metric::Alignment => "alignment",
            Metric::KmerDistance => "kmer-distance",
            Metric::RowDistance => "row-distance",
            Metric::Correlation => "correlation",
            Metric::Clusters => "clusters",
            Metric::Outliers => "outliers",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Metric::Length => "Sequence length",
            Metric::Composition => "Per-record canonical symbol frequencies",
            Metric::GcContent => "G+C fraction (nucleotide only)",
            Metric::Complexity => "Normalized Shannon entropy",
            Metric::Ambiguity => "Fraction of ambiguity codes",
            Metric::Summary => "Per-column count, missing, mean, sd, min, median, max",
            Metric::WindowedGc => "Sliding-window G+C profile (nucleotide only)",
            Metric::Identity => "Pairwise p-distance",
            Metric::Alignment => "Pairwise global alignment distance",
            Metric::KmerDistance => "Pairwise Jaccard distance of k-mer sets",
            Metric::RowDistance => "Pairwise Euclidean distance over shared numeric columns",
            Metric::Correlation => "Pearson correlation between numeric columns",
            Metric::Clusters => "Single-linkage clusters at the cluster threshold",
            Metric::Outliers => "Z-score of each record's mean distance",
        }
    }

    /// Lowest tier that offers this metric
    pub fn tier(&self) -> Tier {
        match self {
            Metric::Length
            | Metric::Composition
            | Metric::GcContent
            | Metric::Complexity
            | Metric::Ambiguity
            | Metric::Summary => Tier::Basic,
            _ => Tier::Advanced,
        }
    }

    /// Dataset kind the metric reads; None for kind-agnostic metrics
    pub fn dataset_kind(&self) -> Option<DatasetKind> {
        match self {
            Metric::Summary | Metric::RowDistance | Metric::Correlation => Some(DatasetKind::Table),
            Metric::Clusters | Metric::Outliers => None,
            _ => Some(DatasetKind::Sequences),
        }
    }

    pub fn requires_nucleotide(&self) -> bool {
        matches!(self, Metric::GcContent | Metric::WindowedGc)
    }

    /// Needs at least two records
    pub fn is_comparative(&self) -> bool {
        matches!(
            self,
            Metric::Identity
                | Metric::Alignment
                | Metric::KmerDistance
                | Metric::RowDistance
                | Metric::Correlation
                | Metric::Clusters
                | Metric::Outliers
        )
    }

    /// Metrics run when none are requested
    pub fn defaults(tier: Tier, kind: DatasetKind, alphabet: Option<Alphabet>) -> Vec<Metric> {
        let mut metrics = match kind {
            DatasetKind::Sequences => {
                let mut m = vec![Metric::Length, Metric::Composition];
                if alphabet.map_or(false, |a| a.is_nucleotide()) {
                    m.push(Metric::GcContent);
                }
                m.push(Metric::Complexity);
                m
            }
            DatasetKind::Table => vec![Metric::Summary],
        };
        if tier == Tier::Advanced {
            match kind {
                DatasetKind::Sequences => metrics.extend([Metric::Identity, Metric::Clusters]),
                DatasetKind::Table => {
                    metrics.extend([Metric::RowDistance, Metric::Correlation, Metric::Clusters])
                }
            }
        }
        metrics
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        Metric::ALL
            .iter()
            .find(|m| m.name() == wanted)
            .copied()
            .ok_or_else(|| {
                let names: Vec<&str> = Metric::ALL.iter().map(|m| m.name()).collect();
                format!("Invalid metric: {}. Use: {}", s, names.join(", "))
            })
    }
}

/// Sequence distance backing clusters and outliers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMethod {
    Identity,
    Alignment,
    Kmer,
}

impl DistanceMethod {
    pub fn metric(&self) -> Metric {
        match self {
            DistanceMethod::Identity => Metric::Identity,
            DistanceMethod::Alignment => Metric::Alignment,
            DistanceMethod::Kmer => Metric::KmerDistance,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            DistanceMethod::Identity => "p-distance (mismatches / longer length)",
            DistanceMethod::Alignment => "global alignment differences",
            DistanceMethod::Kmer => "Jaccard distance of k-mer sets",
        }
    }
}

impl FromStr for DistanceMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "identity" | "p-distance" => Ok(DistanceMethod::Identity),
            "alignment" => Ok(DistanceMethod::Alignment),
            "kmer" | "k-mer" | "jaccard" => Ok(DistanceMethod::Kmer),
            _ => Err(format!("Invalid distance method: {}. Use: identity, alignment, kmer", s)),
        }
    }
}

impl fmt::Display for DistanceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceMethod::Identity => write!(f, "identity"),
            DistanceMethod::Alignment => write!(f, "alignment"),
            DistanceMethod::Kmer => write!(f, "kmer"),
        }
    }
}

/// Parameters of one analysis run. Immutable once the run starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub tier: Tier,
    /// Requested metrics; empty selects the tier defaults
    pub metrics: Vec<Metric>,
    pub window: usize,
    pub step: usize,
    pub k: usize,
    pub distance: DistanceMethod,
    pub distance_mode: DistanceMode,
    pub alignment: AlignmentConfig,
    /// Single-linkage merge threshold, in the units of the clustering distance
    pub cluster_threshold: f64,
    pub z_threshold: f64,
    /// Upper bound on records entering pairwise metrics
    pub sample_size: Option<usize>,
    pub seed: u64,
    pub hasher: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tier: Tier::Basic,
            metrics: Vec::new(),
            window: 100,
            step: 50,
            k: 4,
            distance: DistanceMethod::Identity,
            distance_mode: DistanceMode::SnpsOnly,
            alignment: AlignmentConfig::default(),
            cluster_threshold: 0.1,
            z_threshold: 2.0,
            sample_size: None,
            seed: 42,
            hasher: "sha256".to_string(),
        }
    }
}

impl AnalysisConfig {
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Check parameter ranges and tier membership
    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(BioenvError::Config("window must be at least 1".to_string()));
        }
        if self.step == 0 {
            return Err(BioenvError::Config("step must be at least 1".to_string()));
        }
        if self.k == 0 {
            return Err(BioenvError::Config("k must be at least 1".to_string()));
        }
        if !self.cluster_threshold.is_finite() || self.cluster_threshold < 0.0 {
            return Err(BioenvError::Config(format!(
                "cluster threshold must be a non-negative number, got {}",
                self.cluster_threshold
            )));
        }
        if !self.z_threshold.is_finite() || self.z_threshold <= 0.0 {
            return Err(BioenvError::Config(format!(
                "z threshold must be positive, got {}",
                self.z_threshold
            )));
        }
        if let Some(n) = self.sample_size {
            if n < 2 {
                return Err(BioenvError::Config(format!(
                    "sample size must be at least 2, got {}",
                    n
                )));
            }
        }
        self.alignment.validate().map_err(BioenvError::Config)?;
        if !HasherRegistry::new().has_hasher(&self.hasher) {
            return Err(BioenvError::Config(format!("unknown hasher '{}'", self.hasher)));
        }
        for metric in &self.metrics {
            if metric.tier() > self.tier {
                return Err(BioenvError::Config(format!(
                    "metric '{}' requires the advanced tier",
                    metric
                )));
            }
        }
        Ok(())
    }

    /// Metrics to run on this dataset, in request order without duplicates
    pub fn resolve_metrics(&self, dataset: &Dataset) -> Result<Vec<Metric>> {
        let kind = dataset.kind();
        let alphabet = dataset.as_sequences().map(|s| s.alphabet);

        if self.metrics.is_empty() {
            return Ok(Metric::defaults(self.tier, kind, alphabet));
        }

        let mut resolved = Vec::with_capacity(self.metrics.len());
        for &metric in &self.metrics {
            if let Some(needed) = metric.dataset_kind() {
                if needed != kind {
                    return Err(BioenvError::Config(format!(
                        "metric '{}' does not apply to a {} dataset",
                        metric, kind
                    )));
                }
            }
            if metric.requires_nucleotide() && !alphabet.map_or(false, |a| a.is_nucleotide()) {
                return Err(BioenvError::Config(format!(
                    "metric '{}' requires a nucleotide alphabet",
                    metric
                )));
            }
            if !resolved.contains(&metric) {
                resolved.push(metric);
            }
        }
        Ok(resolved)
    }
}

/// Builder taking raw signed values so that negative input surfaces as `Config`
#[derive(Debug, Clone, Default)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
    window: Option<i64>,
    step: Option<i64>,
    k: Option<i64>,
    sample_size: Option<i64>,
}

fn positive(name: &str, value: i64) -> Result<usize> {
    if value <= 0 {
        return Err(BioenvError::Config(format!(
            "{} must be a positive integer, got {}",
            name, value
        )));
    }
    usize::try_from(value)
        .map_err(|_| BioenvError::Config(format!("{} is out of range: {}", name, value)))
}

impl AnalysisConfigBuilder {
    pub fn tier(mut self, tier: Tier) -> Self {
        self.config.tier = tier;
        self
    }

    pub fn metrics(mut self, metrics: Vec<Metric>) -> Self {
        self.config.metrics = metrics;
        self
    }

    pub fn window(mut self, window: i64) -> Self {
        self.window = Some(window);
        self
    }

    pub fn step(mut self, step: i64) -> Self {
        self.step = Some(step);
        self
    }

    pub fn k(mut self, k: i64) -> Self {
        self.k = Some(k);
        self
    }

    pub fn distance(mut self, distance: DistanceMethod) -> Self {
        self.config.distance = distance;
        self
    }

    pub fn distance_mode(mut self, mode: DistanceMode) -> Self {
        self.config.distance_mode = mode;
        self
    }

    pub fn alignment(mut self, alignment: AlignmentConfig) -> Self {
        self.config.alignment = alignment;
        self
    }

    pub fn cluster_threshold(mut self, threshold: f64) -> Self {
        self.config.cluster_threshold = threshold;
        self
    }

    pub fn z_threshold(mut self, threshold: f64) -> Self {
        self.config.z_threshold = threshold;
        self
    }

    pub fn sample_size(mut self, sample_size: i64) -> Self {
        self.sample_size = Some(sample_size);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn hasher(mut self, hasher: &str) -> Self {
        self.config.hasher = hasher.to_lowercase();
        self
    }

    pub fn build(self) -> Result<AnalysisConfig> {
        let mut config = self.config;
        if let Some(window) = self.window {
            config.window = positive("window", window)?;
        }
        if let Some(step) = self.step {
            config.step = positive("step", step)?;
        }
        if let Some(k) = self.k {
            config.k = positive("k", k)?;
        }
        if let Some(sample_size) = self.sample_size {
            config.sample_size = Some(positive("sample size", sample_size)?);
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SequenceRecord, SequenceSet};

    fn protein_dataset() -> Dataset {
        Dataset::Sequences(SequenceSet {
            alphabet: Alphabet::Protein,
            records: vec![SequenceRecord::new("p", "MKVL")],
        })
    }

    #[test]
    fn test_metric_names_roundtrip() {
        for metric in Metric::ALL {
            assert_eq!(metric.name().parse::<Metric>().unwrap(), metric);
        }
        assert_eq!("gc_content".parse::<Metric>().unwrap(), Metric::GcContent);
        assert!("entropy".parse::<Metric>().is_err());
    }

    #[test]
    fn test_negative_window_is_config_error() {
        let result = AnalysisConfig::builder().tier(Tier::Advanced).window(-5).build();
        assert!(matches!(result, Err(BioenvError::Config(_))));
    }

    #[test]
    fn test_zero_k_is_config_error() {
        assert!(matches!(
            AnalysisConfig::builder().k(0).build(),
            Err(BioenvError::Config(_))
        ));
    }

    #[test]
    fn test_advanced_metric_in_basic_tier() {
        let result = AnalysisConfig::builder()
            .tier(Tier::Basic)
            .metrics(vec![Metric::Length, Metric::Identity])
            .build();
        assert!(matches!(result, Err(BioenvError::Config(_))));

        let ok = AnalysisConfig::builder()
            .tier(Tier::Advanced)
            .metrics(vec![Metric::Length, Metric::Identity])
            .build();
        assert!(ok.is_ok());
    }

    #[test]
    fn test_unknown_hasher() {
        assert!(matches!(
            AnalysisConfig::builder().hasher("blake3").build(),
            Err(BioenvError::Config(_))
        ));
    }

    #[test]
    fn test_defaults_by_kind() {
        let basic = Metric::defaults(Tier::Basic, DatasetKind::Sequences, Some(Alphabet::Protein));
        assert!(!basic.contains(&Metric::GcContent));
        let advanced = Metric::defaults(Tier::Advanced, DatasetKind::Table, None);
        assert_eq!(
            advanced,
            vec![Metric::Summary, Metric::RowDistance, Metric::Correlation, Metric::Clusters]
        );
    }

    #[test]
    fn test_resolve_rejects_inapplicable() {
        let ds = protein_dataset();
        let gc = AnalysisConfig {
            metrics: vec![Metric::GcContent],
            ..AnalysisConfig::default()
        };
        assert!(matches!(gc.resolve_metrics(&ds), Err(BioenvError::Config(_))));

        let summary = AnalysisConfig {
            metrics: vec![Metric::Summary],
            ..AnalysisConfig::default()
        };
        assert!(matches!(summary.resolve_metrics(&ds), Err(BioenvError::Config(_))));

        let dup = AnalysisConfig {
            metrics: vec![Metric::Length, Metric::Length, Metric::Complexity],
            ..AnalysisConfig::default()
        };
        assert_eq!(
            dup.resolve_metrics(&ds).unwrap(),
            vec![Metric::Length, Metric::Complexity]
        );
    }
}
