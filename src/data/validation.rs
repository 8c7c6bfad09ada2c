// validation.rs - Structural checks over a loaded dataset

use crate::data::alphabet::{Alphabet, SymbolClass};
use crate::data::cleaning::clean;
use crate::data::dataset::{CellValue, Dataset, SequenceSet, Table};
use crate::error::{BioenvError, Result};
use log::{info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Fatal,
}

/// Where a finding applies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "lowercase")]
pub enum Location {
    Dataset,
    Record { index: usize, id: String },
    Column { name: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    MixedAlphabet { expected: Alphabet, found: Alphabet },
    InvalidSymbols { count: usize, first_position: usize, symbol: char },
    EmptyRecord,
    TooShort { length: usize, minimum: usize },
    DuplicateId,
    DuplicateSequence { first: String },
    FilteredOut,
    MissingValues { count: usize },
    MixedColumnType { numbers: usize, texts: usize },
    TooManyMissing { fraction: f64 },
    EmptyAfterFiltering,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub location: Location,
    pub kind: IssueKind,
    pub severity: Severity,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Dataset => write!(f, "dataset"),
            Location::Record { index, id } => write!(f, "record {} ({})", index + 1, id),
            Location::Column { name } => write!(f, "column '{}'", name),
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::MixedAlphabet { expected, found } => {
                write!(f, "looks like {} but dataset alphabet is {}", found, expected)
            }
            IssueKind::InvalidSymbols { count, first_position, symbol } => write!(
                f,
                "{} invalid symbol(s), first '{}' at position {}",
                count,
                symbol,
                first_position + 1
            ),
            IssueKind::EmptyRecord => write!(f, "empty sequence"),
            IssueKind::TooShort { length, minimum } => {
                write!(f, "length {} below minimum {}", length, minimum)
            }
            IssueKind::DuplicateId => write!(f, "duplicate identifier"),
            IssueKind::DuplicateSequence { first } => write!(f, "sequence identical to '{}'", first),
            IssueKind::FilteredOut => write!(f, "excluded by identifier filter"),
            IssueKind::MissingValues { count } => write!(f, "{} missing value(s)", count),
            IssueKind::MixedColumnType { numbers, texts } => {
                write!(f, "mixes {} numeric and {} text value(s)", numbers, texts)
            }
            IssueKind::TooManyMissing { fraction } => {
                write!(f, "{:.1}% of values missing", fraction * 100.0)
            }
            IssueKind::EmptyAfterFiltering => write!(f, "no records remain after validation"),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}: {}", self.severity, self.location, self.kind)
    }
}

/// Filtering and repair rules applied during validation
#[derive(Debug, Clone)]
pub struct ValidationPolicy {
    pub include_ids: Option<Regex>,
    pub exclude_ids: Option<Regex>,
    /// Sequences shorter than this are excluded
    pub min_length: usize,
    /// Sequences whose invalid-symbol fraction exceeds this are excluded
    pub max_invalid_fraction: f64,
    /// Rows whose missing-cell fraction exceeds this are excluded
    pub max_missing_fraction: f64,
    /// Replace invalid symbols / stray text cells when cleaning
    pub repair: bool,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            include_ids: None,
            exclude_ids: None,
            min_length: 0,
            max_invalid_fraction: 1.0,
            max_missing_fraction: 1.0,
            repair: false,
        }
    }
}

impl ValidationPolicy {
    fn keeps_id(&self, id: &str) -> bool {
        if let Some(include) = &self.include_ids {
            if !include.is_match(id) {
                return false;
            }
        }
        if let Some(exclude) = &self.exclude_ids {
            if exclude.is_match(id) {
                return false;
            }
        }
        true
    }
}

/// Findings for one dataset; never modifies the dataset it describes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub findings: Vec<Finding>,
    /// Record indices the policy removes during cleaning
    pub excluded: BTreeSet<usize>,
    pub records_checked: usize,
}

impl ValidationReport {
    fn push(&mut self, location: Location, kind: IssueKind, severity: Severity) {
        self.findings.push(Finding {
            location,
            kind,
            severity,
        });
    }

    pub fn has_fatal(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Fatal)
    }

    pub fn is_usable(&self) -> bool {
        !self.has_fatal()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }

    pub fn usable_records(&self) -> usize {
        self.records_checked - self.excluded.len()
    }

    pub fn ensure_usable(&self) -> Result<()> {
        if self.has_fatal() {
            return Err(BioenvError::EmptyAfterValidation {
                checked: self.records_checked,
                excluded: self.excluded.len(),
            });
        }
        Ok(())
    }
}

/// Check a dataset against the policy
pub fn validate(dataset: &Dataset, policy: &ValidationPolicy) -> ValidationReport {
    let mut report = match dataset {
        Dataset::Sequences(set) => validate_sequences(set, policy),
        Dataset::Table(table) => validate_table(table, policy),
    };

    // Covers a dataset that had no records to begin with
    if report.excluded.len() == report.records_checked {
        report.push(Location::Dataset, IssueKind::EmptyAfterFiltering, Severity::Fatal);
    }

    info!(
        "Validation: {} records checked, {} excluded, {} warning(s), {} fatal",
        report.records_checked,
        report.excluded.len(),
        report.count(Severity::Warning),
        report.count(Severity::Fatal)
    );
    report
}

fn validate_sequences(set: &SequenceSet, policy: &ValidationPolicy) -> ValidationReport {
    let mut report = ValidationReport {
        records_checked: set.records.len(),
        ..ValidationReport::default()
    };
    let mut seen_ids = HashSet::new();
    let mut seen_sequences: HashMap<&[u8], &str> = HashMap::new();

    for (index, record) in set.records.iter().enumerate() {
        let location = Location::Record {
            index,
            id: record.id.clone(),
        };

        if !policy.keeps_id(&record.id) {
            report.push(location, IssueKind::FilteredOut, Severity::Info);
            report.excluded.insert(index);
            continue;
        }

        if !seen_ids.insert(record.id.as_str()) {
            report.push(location, IssueKind::DuplicateId, Severity::Warning);
            report.excluded.insert(index);
            continue;
        }

        if record.is_empty() {
            report.push(location, IssueKind::EmptyRecord, Severity::Warning);
            report.excluded.insert(index);
            continue;
        }

        if record.len() < policy.min_length {
            report.push(
                location.clone(),
                IssueKind::TooShort {
                    length: record.len(),
                    minimum: policy.min_length,
                },
                Severity::Warning,
            );
            report.excluded.insert(index);
        }

        if let Some(found) = Alphabet::infer(&record.sequence) {
            if found != set.alphabet {
                report.push(
                    location.clone(),
                    IssueKind::MixedAlphabet {
                        expected: set.alphabet,
                        found,
                    },
                    Severity::Warning,
                );
            }
        }

        let mut invalid = 0usize;
        let mut first_invalid = None;
        for (pos, &symbol) in record.sequence.iter().enumerate() {
            if set.alphabet.classify(symbol) == SymbolClass::Invalid {
                invalid += 1;
                first_invalid.get_or_insert((pos, symbol));
            }
        }
        if let Some((first_position, symbol)) = first_invalid {
            report.push(
                location.clone(),
                IssueKind::InvalidSymbols {
                    count: invalid,
                    first_position,
                    symbol: symbol as char,
                },
                Severity::Warning,
            );
            let fraction = invalid as f64 / record.len() as f64;
            if fraction > policy.max_invalid_fraction {
                report.excluded.insert(index);
            }
        }

        if let Some(first) = seen_sequences.get(record.sequence.as_slice()) {
            report.push(
                location,
                IssueKind::DuplicateSequence {
                    first: first.to_string(),
                },
                Severity::Info,
            );
        } else {
            seen_sequences.insert(record.sequence.as_slice(), record.id.as_str());
        }
    }

    report
}

fn validate_table(table: &Table, policy: &ValidationPolicy) -> ValidationReport {
    let mut report = ValidationReport {
        records_checked: table.rows.len(),
        ..ValidationReport::default()
    };

    for (col, name) in table.columns.iter().enumerate() {
        let (mut numbers, mut texts, mut missing) = (0usize, 0usize, 0usize);
        for row in &table.rows {
            match row.values.get(col) {
                Some(CellValue::Number(_)) => numbers += 1,
                Some(CellValue::Text(_)) => texts += 1,
                Some(CellValue::Missing) | None => missing += 1,
            }
        }
        let location = Location::Column { name: name.clone() };
        if missing > 0 {
            report.push(
                location.clone(),
                IssueKind::MissingValues { count: missing },
                Severity::Warning,
            );
        }
        if numbers > 0 && texts > 0 {
            report.push(
                location,
                IssueKind::MixedColumnType { numbers, texts },
                Severity::Warning,
            );
        }
    }

    let mut seen_labels = HashSet::new();
    for (index, row) in table.rows.iter().enumerate() {
        let location = Location::Record {
            index,
            id: row.label.clone(),
        };

        if !policy.keeps_id(&row.label) {
            report.push(location, IssueKind::FilteredOut, Severity::Info);
            report.excluded.insert(index);
            continue;
        }

        if !seen_labels.insert(row.label.as_str()) {
            report.push(location, IssueKind::DuplicateId, Severity::Warning);
            report.excluded.insert(index);
            continue;
        }

        if !table.columns.is_empty() {
            let missing = row.values.iter().filter(|v| v.is_missing()).count();
            let fraction = missing as f64 / table.columns.len() as f64;
            if fraction > policy.max_missing_fraction {
                report.push(location, IssueKind::TooManyMissing { fraction }, Severity::Warning);
                report.excluded.insert(index);
            }
        }
    }

    report
}

/// A cleaned dataset whose validation report has no fatal finding.
/// The analysis engine only accepts this type.
#[derive(Debug, Clone)]
pub struct ValidatedDataset {
    dataset: Arc<Dataset>,
    report: ValidationReport,
}

impl ValidatedDataset {
    /// Validate, fail on fatal findings, then clean
    pub fn new(dataset: Dataset, policy: &ValidationPolicy) -> Result<Self> {
        let report = validate(&dataset, policy);
        report.ensure_usable()?;

        let dataset = if report.excluded.is_empty() && !policy.repair {
            dataset
        } else {
            let cleaned = clean(&dataset, &report, policy);
            if !report.excluded.is_empty() {
                warn!(
                    "Cleaning removed {} of {} records",
                    report.excluded.len(),
                    report.records_checked
                );
            }
            cleaned
        };

        Ok(Self {
            dataset: Arc::new(dataset),
            report,
        })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn shared(&self) -> Arc<Dataset> {
        Arc::clone(&self.dataset)
    }

    pub fn report(&self) -> &ValidationReport {
        &self.report
    }
}
