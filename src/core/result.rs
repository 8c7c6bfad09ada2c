// result.rs - Immutable analysis results and their provenance

use crate::core::config::AnalysisConfig;
use crate::data::DatasetKind;
use crate::hashers::Fingerprint;
use crate::simulation::{NetworkSirParams, SirvParams};
use serde::{Deserialize, Serialize};

/// Parameters that produced a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunConfig {
    Analysis(AnalysisConfig),
    Sirv(SirvParams),
    NetworkSir(NetworkSirParams),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    /// Absent for simulations, which read no dataset
    pub fingerprint: Option<Fingerprint>,
    pub dataset_kind: Option<DatasetKind>,
    /// Records in the validated dataset
    pub records: usize,
    pub config: RunConfig,
}

/// One labelled table row; cells aligned with the table's columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledRow {
    pub label: String,
    pub cells: Vec<Option<f64>>,
}

impl LabeledRow {
    pub fn new(label: impl Into<String>, cells: Vec<Option<f64>>) -> Self {
        Self {
            label: label.into(),
            cells,
        }
    }
}

/// Value of one result entry
#[derive(Debug, Clone, PartialEq)]
pub enum ResultValue {
    Scalar(f64),
    /// One value per label
    Series { labels: Vec<String>, values: Vec<f64> },
    /// Per-record frequencies over `symbols`
    Distribution {
        labels: Vec<String>,
        symbols: Vec<String>,
        frequencies: Vec<Vec<f64>>,
    },
    /// Square, labelled on both axes
    Matrix {
        labels: Vec<String>,
        values: Vec<Vec<Option<f64>>>,
    },
    Table {
        columns: Vec<String>,
        rows: Vec<LabeledRow>,
    },
    /// Per-record profiles sampled every `step` positions from position 0
    Profiles {
        labels: Vec<String>,
        step: usize,
        values: Vec<Vec<f64>>,
    },
    /// Group index per label
    Groups {
        labels: Vec<String>,
        assignment: Vec<usize>,
    },
}

impl ResultValue {
    pub fn kind(&self) -> &'static str {
        match self {
            ResultValue::Scalar(_) => "scalar",
            ResultValue::Series { .. } => "series",
            ResultValue::Distribution { .. } => "distribution",
            ResultValue::Matrix { .. } => "matrix",
            ResultValue::Table { .. } => "table",
            ResultValue::Profiles { .. } => "profiles",
            ResultValue::Groups { .. } => "groups",
        }
    }
}

/// Output of one run. Entries keep insertion order; never mutated once built.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    provenance: Provenance,
    entries: Vec<(String, ResultValue)>,
}

impl AnalysisResult {
    pub fn new(provenance: Provenance, entries: Vec<(String, ResultValue)>) -> Self {
        Self {
            provenance,
            entries,
        }
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    pub fn entries(&self) -> &[(String, ResultValue)] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&ResultValue> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, value)| value)
    }

    pub fn scalar(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            ResultValue::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Accumulates entries in order while a run is in progress
#[derive(Debug, Default)]
pub struct ResultBuilder {
    entries: Vec<(String, ResultValue)>,
}

impl ResultBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &str, value: ResultValue) {
        self.entries.push((name.to_string(), value));
    }

    pub fn scalar(&mut self, name: &str, value: f64) {
        self.push(name, ResultValue::Scalar(value));
    }

    pub fn series(&mut self, name: &str, labels: Vec<String>, values: Vec<f64>) {
        self.push(name, ResultValue::Series { labels, values });
    }

    pub fn finish(self, provenance: Provenance) -> AnalysisResult {
        AnalysisResult::new(provenance, self.entries)
    }
}
