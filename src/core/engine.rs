// engine.rs - Two-tier analysis engine

use crate::core::alignment::pair_distance;
use crate::core::cancel::CancelToken;
use crate::core::composition::{
    ambiguous_fraction, complexity, count_symbols, frequencies, gc_content, jaccard_distance,
    kmer_set, p_distance, windowed_gc, SymbolCounts,
};
use crate::core::config::{AnalysisConfig, Metric};
use crate::core::distance::{outlier_scores, pairwise_matrix, progress_bar, single_linkage, DistanceMatrix};
use crate::core::result::{AnalysisResult, LabeledRow, Provenance, ResultBuilder, ResultValue, RunConfig};
use crate::core::statistics::{euclidean, pearson, summarize, ColumnSummary};
use crate::data::{Dataset, SequenceSet, Table, ValidatedDataset};
use crate::error::{BioenvError, Result};
use crate::hashers::HasherRegistry;
use log::{debug, info};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use std::collections::HashMap;
use std::time::Instant;

/// Runs analyses over validated datasets. Holds no per-run state.
#[derive(Debug, Clone, Default)]
pub struct AnalysisEngine {
    show_progress: bool,
}

/// Record indices entering pairwise metrics: all of them, or a seeded
/// sample of `sample_size` kept in record order
pub fn sample_indices(n: usize, sample_size: Option<usize>, seed: u64) -> Vec<usize> {
    match sample_size {
        Some(k) if k < n => {
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
            let mut picked = rand::seq::index::sample(&mut rng, n, k).into_vec();
            picked.sort_unstable();
            picked
        }
        _ => (0..n).collect(),
    }
}

fn describe(values: &[f64]) -> (f64, f64, f64) {
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (mean, min, max)
}

impl AnalysisEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show an indicatif bar while pairwise matrices are computed
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn run(
        &self,
        validated: &ValidatedDataset,
        config: &AnalysisConfig,
        cancel: &CancelToken,
    ) -> Result<AnalysisResult> {
        config.validate()?;
        let dataset = validated.dataset();
        let metrics = config.resolve_metrics(dataset)?;

        if let Some(metric) = metrics.iter().find(|m| m.is_comparative()) {
            if dataset.len() < 2 {
                return Err(BioenvError::Computation(format!(
                    "'{}' compares records and needs at least 2, dataset has {}",
                    metric,
                    dataset.len()
                )));
            }
        }

        let registry = HasherRegistry::new();
        let hasher = registry
            .get_hasher(&config.hasher)
            .ok_or_else(|| BioenvError::Config(format!("unknown hasher '{}'", config.hasher)))?;
        let fingerprint = hasher.fingerprint(dataset);

        let names: Vec<&str> = metrics.iter().map(|m| m.name()).collect();
        info!(
            "Running {} analysis on {} {} records: {}",
            config.tier,
            dataset.len(),
            dataset.kind(),
            names.join(", ")
        );
        let start = Instant::now();

        let mut run = Run {
            engine: self,
            config,
            cancel,
            sample: sample_indices(dataset.len(), config.sample_size, config.seed),
            matrices: HashMap::new(),
            builder: ResultBuilder::new(),
        };
        if run.sample.len() < dataset.len() {
            debug!(
                "Pairwise metrics use {} of {} records (seed {})",
                run.sample.len(),
                dataset.len(),
                config.seed
            );
        }

        match dataset {
            Dataset::Sequences(set) => run.sequences(set, &metrics)?,
            Dataset::Table(table) => run.table(table, &metrics)?,
        }

        info!("Analysis finished in {:.2}s", start.elapsed().as_secs_f64());
        Ok(run.builder.finish(Provenance {
            fingerprint: Some(fingerprint),
            dataset_kind: Some(dataset.kind()),
            records: dataset.len(),
            config: RunConfig::Analysis(config.clone()),
        }))
    }
}

/// State of one run
struct Run<'a> {
    engine: &'a AnalysisEngine,
    config: &'a AnalysisConfig,
    cancel: &'a CancelToken,
    sample: Vec<usize>,
    matrices: HashMap<Metric, DistanceMatrix>,
    builder: ResultBuilder,
}

impl Run<'_> {
    fn pairwise<F>(&self, labels: Vec<String>, pair: F) -> Result<DistanceMatrix>
    where
        F: Fn(usize, usize) -> Option<f64> + Sync,
    {
        let n = labels.len();
        let pb = progress_bar(n * n.saturating_sub(1) / 2, self.engine.show_progress);
        pairwise_matrix(labels, pair, &pb, self.cancel)
    }

    fn sequences(&mut self, set: &SequenceSet, metrics: &[Metric]) -> Result<()> {
        let alphabet = set.alphabet;
        let labels: Vec<String> = set.records.iter().map(|r| r.id.clone()).collect();
        let counts: Vec<SymbolCounts> = set
            .records
            .par_iter()
            .map(|r| count_symbols(&r.sequence, alphabet))
            .collect();

        for &metric in metrics {
            match metric {
                Metric::Length => {
                    let lengths: Vec<f64> = set.records.iter().map(|r| r.len() as f64).collect();
                    let (mean, min, max) = describe(&lengths);
                    self.builder.series("length", labels.clone(), lengths);
                    self.builder.scalar("length.mean", mean);
                    self.builder.scalar("length.min", min);
                    self.builder.scalar("length.max", max);
                }
                Metric::Composition => {
                    self.builder.push(
                        "composition",
                        ResultValue::Distribution {
                            labels: labels.clone(),
                            symbols: alphabet
                                .symbols()
                                .iter()
                                .map(|&s| (s as char).to_string())
                                .collect(),
                            frequencies: counts.iter().map(frequencies).collect(),
                        },
                    );
                }
                Metric::GcContent => {
                    let gc: Vec<f64> = set
                        .records
                        .iter()
                        .map(|r| gc_content(&r.sequence, alphabet))
                        .collect();
                    let (mean, _, _) = describe(&gc);
                    self.builder.series("gc_content", labels.clone(), gc);
                    self.builder.scalar("gc_content.mean", mean);
                }
                Metric::Complexity => {
                    let values = counts.iter().map(complexity).collect();
                    self.builder.series("complexity", labels.clone(), values);
                }
                Metric::Ambiguity => {
                    let values = counts.iter().map(ambiguous_fraction).collect();
                    self.builder.series("ambiguous_fraction", labels.clone(), values);
                }
                Metric::WindowedGc => {
                    let (window, step) = (self.config.window, self.config.step);
                    let values = set
                        .records
                        .par_iter()
                        .map(|r| windowed_gc(&r.sequence, alphabet, window, step))
                        .collect();
                    self.builder.push(
                        "windowed_gc",
                        ResultValue::Profiles {
                            labels: labels.clone(),
                            step,
                            values,
                        },
                    );
                }
                Metric::Identity | Metric::Alignment | Metric::KmerDistance => {
                    let matrix = self.sequence_matrix(set, metric)?;
                    let name = match metric {
                        Metric::Identity => "identity_distance",
                        Metric::Alignment => "alignment_distance",
                        _ => "kmer_distance",
                    };
                    self.push_matrix(name, matrix);
                }
                Metric::Clusters => {
                    let matrix = self.sequence_matrix(set, self.config.distance.metric())?;
                    self.push_clusters(&matrix);
                }
                Metric::Outliers => {
                    let matrix = self.sequence_matrix(set, self.config.distance.metric())?;
                    self.push_outliers(&matrix);
                }
                Metric::Summary | Metric::RowDistance | Metric::Correlation => {
                    return Err(BioenvError::Config(format!(
                        "metric '{}' does not apply to sequences",
                        metric
                    )));
                }
            }
        }
        Ok(())
    }

    fn table(&mut self, table: &Table, metrics: &[Metric]) -> Result<()> {
        let numeric = table.numeric_columns();

        for &metric in metrics {
            match metric {
                Metric::Summary => {
                    let rows = numeric
                        .iter()
                        .map(|&col| {
                            let summary = summarize(&table.numeric_column(col));
                            LabeledRow::new(table.columns[col].clone(), summary.cells())
                        })
                        .collect();
                    self.builder.push(
                        "column_summary",
                        ResultValue::Table {
                            columns: ColumnSummary::FIELDS.iter().map(|f| f.to_string()).collect(),
                            rows,
                        },
                    );

                    let n_rows = table.rows.len() as f64;
                    let missing = (0..table.columns.len())
                        .map(|col| {
                            let missing = table
                                .rows
                                .iter()
                                .filter(|row| row.values.get(col).map_or(true, |v| v.is_missing()))
                                .count();
                            missing as f64 / n_rows
                        })
                        .collect();
                    self.builder
                        .series("missing_fraction", table.columns.clone(), missing);
                }
                Metric::RowDistance => {
                    let matrix = self.row_matrix(table, &numeric)?;
                    self.push_matrix("row_distance", matrix);
                }
                Metric::Correlation => {
                    let matrix = correlation_matrix(table, &numeric)?;
                    self.builder.push(
                        "correlation",
                        ResultValue::Matrix {
                            labels: matrix.labels,
                            values: matrix.values,
                        },
                    );
                }
                Metric::Clusters => {
                    let matrix = self.row_matrix(table, &numeric)?;
                    self.push_clusters(&matrix);
                }
                Metric::Outliers => {
                    let matrix = self.row_matrix(table, &numeric)?;
                    self.push_outliers(&matrix);
                }
                _ => {
                    return Err(BioenvError::Config(format!(
                        "metric '{}' does not apply to tables",
                        metric
                    )));
                }
            }
        }
        Ok(())
    }

    /// Pairwise sequence distances over the sampled records, computed once per metric
    fn sequence_matrix(&mut self, set: &SequenceSet, metric: Metric) -> Result<DistanceMatrix> {
        if let Some(matrix) = self.matrices.get(&metric) {
            return Ok(matrix.clone());
        }

        let alphabet = set.alphabet;
        let seqs: Vec<&[u8]> = self
            .sample
            .iter()
            .map(|&i| set.records[i].sequence.as_slice())
            .collect();
        let labels: Vec<String> = self.sample.iter().map(|&i| set.records[i].id.clone()).collect();

        let matrix = match metric {
            Metric::Identity => self.pairwise(labels, |i, j| Some(p_distance(seqs[i], seqs[j])))?,
            Metric::Alignment => {
                let (alignment, mode) = (&self.config.alignment, self.config.distance_mode);
                self.pairwise(labels, |i, j| {
                    Some(pair_distance(seqs[i], seqs[j], alphabet, alignment, mode) as f64)
                })?
            }
            Metric::KmerDistance => {
                let k = self.config.k;
                let sets: Vec<_> = seqs.iter().map(|s| kmer_set(s, alphabet, k)).collect();
                self.pairwise(labels, |i, j| Some(jaccard_distance(&sets[i], &sets[j])))?
            }
            other => {
                return Err(BioenvError::Internal(format!(
                    "'{}' is not a sequence distance",
                    other
                )))
            }
        };

        self.matrices.insert(metric, matrix.clone());
        Ok(matrix)
    }

    /// Euclidean distances between sampled rows over shared numeric columns
    fn row_matrix(&mut self, table: &Table, numeric: &[usize]) -> Result<DistanceMatrix> {
        if let Some(matrix) = self.matrices.get(&Metric::RowDistance) {
            return Ok(matrix.clone());
        }
        if numeric.is_empty() {
            return Err(BioenvError::Computation(
                "row distance needs at least one numeric column".to_string(),
            ));
        }

        let vectors: Vec<Vec<Option<f64>>> = self
            .sample
            .iter()
            .map(|&i| {
                numeric
                    .iter()
                    .map(|&col| table.rows[i].values.get(col).and_then(|v| v.as_number()))
                    .collect()
            })
            .collect();
        let labels = self.sample.iter().map(|&i| table.rows[i].label.clone()).collect();

        let matrix = self.pairwise(labels, |i, j| euclidean(&vectors[i], &vectors[j]))?;
        self.matrices.insert(Metric::RowDistance, matrix.clone());
        Ok(matrix)
    }

    fn push_matrix(&mut self, name: &str, matrix: DistanceMatrix) {
        self.builder.push(
            name,
            ResultValue::Matrix {
                labels: matrix.labels,
                values: matrix.values,
            },
        );
    }

    fn push_clusters(&mut self, matrix: &DistanceMatrix) {
        let assignment = single_linkage(matrix, self.config.cluster_threshold);
        let count = assignment.iter().max().map_or(0, |m| m + 1);
        debug!(
            "{} clusters at threshold {}",
            count, self.config.cluster_threshold
        );
        self.builder.push(
            "clusters",
            ResultValue::Groups {
                labels: matrix.labels.clone(),
                assignment,
            },
        );
        self.builder.scalar("clusters.count", count as f64);
    }

    fn push_outliers(&mut self, matrix: &DistanceMatrix) {
        let (scores, flagged) = outlier_scores(matrix, self.config.z_threshold);
        self.builder.series("outlier_score", matrix.labels.clone(), scores);
        self.builder.scalar("outliers.count", flagged.len() as f64);
    }
}

/// Pearson correlation between every pair of numeric columns, over all rows
fn correlation_matrix(table: &Table, numeric: &[usize]) -> Result<DistanceMatrix> {
    if numeric.len() < 2 {
        return Err(BioenvError::Computation(format!(
            "correlation needs at least 2 numeric columns, table has {}",
            numeric.len()
        )));
    }
    let columns: Vec<Vec<Option<f64>>> = numeric.iter().map(|&c| table.numeric_column(c)).collect();
    let n = columns.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        values[i][i] = Some(1.0);
        for j in i + 1..n {
            let r = pearson(&columns[i], &columns[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    Ok(DistanceMatrix {
        labels: numeric.iter().map(|&c| table.columns[c].clone()).collect(),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{DistanceMethod, Tier};
    use crate::data::{load, Alphabet, LoadOptions, SequenceRecord, ValidationPolicy};

    fn validated(bytes: &[u8]) -> ValidatedDataset {
        let dataset = load(bytes, &LoadOptions::default()).unwrap();
        ValidatedDataset::new(dataset, &ValidationPolicy::default()).unwrap()
    }

    fn dna(records: &[(&str, &str)]) -> ValidatedDataset {
        let dataset = Dataset::Sequences(SequenceSet {
            alphabet: Alphabet::Dna,
            records: records
                .iter()
                .map(|(id, seq)| SequenceRecord::new(*id, *seq))
                .collect(),
        });
        ValidatedDataset::new(dataset, &ValidationPolicy::default()).unwrap()
    }

    fn run(ds: &ValidatedDataset, config: &AnalysisConfig) -> Result<AnalysisResult> {
        AnalysisEngine::new().run(ds, config, &CancelToken::new())
    }

    #[test]
    fn test_basic_length_and_composition() {
        let ds = dna(&[("a", "ACGT"), ("b", "AAAAGG"), ("c", "GCGCGCTT")]);
        let config = AnalysisConfig {
            metrics: vec![Metric::Length, Metric::Composition],
            ..AnalysisConfig::default()
        };
        let result = run(&ds, &config).unwrap();

        match result.get("length") {
            Some(ResultValue::Series { labels, values }) => {
                assert_eq!(labels, &["a", "b", "c"]);
                assert_eq!(values, &[4.0, 6.0, 8.0]);
            }
            other => panic!("unexpected length entry: {:?}", other),
        }
        match result.get("composition") {
            Some(ResultValue::Distribution { frequencies, symbols, .. }) => {
                assert_eq!(symbols, &["A", "C", "G", "T"]);
                assert_eq!(frequencies.len(), 3);
                for row in frequencies {
                    assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-9);
                }
            }
            other => panic!("unexpected composition entry: {:?}", other),
        }
        assert_eq!(result.scalar("length.mean"), Some(6.0));
        assert_eq!(result.provenance().records, 3);
    }

    #[test]
    fn test_deterministic() {
        let ds = dna(&[
            ("a", "ACGTACGTAA"),
            ("b", "ACGTACGTTA"),
            ("c", "TTGTACGGAA"),
            ("d", "ACCTACGTAA"),
        ]);
        let config = AnalysisConfig {
            tier: Tier::Advanced,
            metrics: vec![Metric::Identity, Metric::KmerDistance, Metric::Clusters, Metric::Outliers],
            k: 3,
            sample_size: Some(3),
            ..AnalysisConfig::default()
        };
        let first = run(&ds, &config).unwrap();
        let second = run(&ds, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_single_record_basic_ok_advanced_fails() {
        let ds = dna(&[("only", "ACGTACGT")]);
        assert!(run(&ds, &AnalysisConfig::default()).is_ok());

        let advanced = AnalysisConfig {
            tier: Tier::Advanced,
            metrics: vec![Metric::Identity],
            ..AnalysisConfig::default()
        };
        assert!(matches!(run(&ds, &advanced), Err(BioenvError::Computation(_))));
    }

    #[test]
    fn test_advanced_defaults_for_sequences() {
        let ds = dna(&[("a", "ACGTACGT"), ("b", "ACGTACGA"), ("c", "TTTTTTTT")]);
        let config = AnalysisConfig {
            tier: Tier::Advanced,
            cluster_threshold: 0.2,
            ..AnalysisConfig::default()
        };
        let result = run(&ds, &config).unwrap();
        assert!(result.get("identity_distance").is_some());
        assert!(result.get("gc_content").is_some());
        match result.get("clusters") {
            Some(ResultValue::Groups { assignment, .. }) => assert_eq!(assignment, &[0, 0, 1]),
            other => panic!("unexpected clusters entry: {:?}", other),
        }
        assert_eq!(result.scalar("clusters.count"), Some(2.0));
    }

    #[test]
    fn test_alignment_distance_and_kmer_clusters() {
        let ds = dna(&[("a", "ACGTACGTAC"), ("b", "ACGTTCGTAC"), ("c", "ACGTACGTAC")]);
        let config = AnalysisConfig {
            tier: Tier::Advanced,
            metrics: vec![Metric::Alignment, Metric::Clusters],
            distance: DistanceMethod::Kmer,
            k: 3,
            cluster_threshold: 0.0,
            ..AnalysisConfig::default()
        };
        let result = run(&ds, &config).unwrap();
        match result.get("alignment_distance") {
            Some(ResultValue::Matrix { values, .. }) => {
                assert_eq!(values[0][1], Some(1.0));
                assert_eq!(values[0][2], Some(0.0));
            }
            other => panic!("unexpected alignment entry: {:?}", other),
        }
        match result.get("clusters") {
            Some(ResultValue::Groups { assignment, .. }) => assert_eq!(assignment, &[0, 1, 0]),
            other => panic!("unexpected clusters entry: {:?}", other),
        }
    }

    #[test]
    fn test_windowed_gc_profiles() {
        let ds = dna(&[("a", "GGGGAAAA"), ("b", "ACG")]);
        let config = AnalysisConfig {
            tier: Tier::Advanced,
            metrics: vec![Metric::WindowedGc],
            window: 4,
            step: 2,
            ..AnalysisConfig::default()
        };
        let result = run(&ds, &config).unwrap();
        match result.get("windowed_gc") {
            Some(ResultValue::Profiles { values, step, .. }) => {
                assert_eq!(*step, 2);
                assert_eq!(values[0], vec![1.0, 0.5, 0.0]);
                assert!(values[1].is_empty());
            }
            other => panic!("unexpected profile entry: {:?}", other),
        }
    }

    #[test]
    fn test_table_summary_and_advanced() {
        let ds = validated(b"id,ph,temp,site\nr1,7.0,20,n\nr2,6.0,22,s\nr3,8.0,NA,n\nr4,7.5,25,s\n");
        let result = run(&ds, &AnalysisConfig::default()).unwrap();
        match result.get("column_summary") {
            Some(ResultValue::Table { columns, rows }) => {
                assert_eq!(columns.len(), 7);
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[0].label, "ph");
                assert_eq!(rows[1].cells[1], Some(1.0));
            }
            other => panic!("unexpected summary entry: {:?}", other),
        }

        let advanced = AnalysisConfig {
            tier: Tier::Advanced,
            ..AnalysisConfig::default()
        };
        let result = run(&ds, &advanced).unwrap();
        match result.get("correlation") {
            Some(ResultValue::Matrix { labels, values }) => {
                assert_eq!(labels, &["ph", "temp"]);
                assert_eq!(values[0][0], Some(1.0));
                assert_eq!(values[0][1], values[1][0]);
            }
            other => panic!("unexpected correlation entry: {:?}", other),
        }
        assert!(result.get("row_distance").is_some());
        assert!(result.get("clusters").is_some());
    }

    #[test]
    fn test_cancelled_run() {
        let ds = dna(&[("a", "ACGT"), ("b", "ACGA"), ("c", "ACGG")]);
        let token = CancelToken::new();
        token.cancel();
        let config = AnalysisConfig {
            tier: Tier::Advanced,
            metrics: vec![Metric::Identity],
            ..AnalysisConfig::default()
        };
        let result = AnalysisEngine::new().run(&ds, &config, &token);
        assert!(matches!(result, Err(BioenvError::Cancelled { .. })));
    }

    #[test]
    fn test_sample_indices() {
        assert_eq!(sample_indices(4, None, 1), vec![0, 1, 2, 3]);
        assert_eq!(sample_indices(4, Some(10), 1), vec![0, 1, 2, 3]);
        let picked = sample_indices(100, Some(10), 7);
        assert_eq!(picked.len(), 10);
        assert!(picked.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(picked, sample_indices(100, Some(10), 7));
    }
}
