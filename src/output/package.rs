// package.rs - Presentation-neutral packaging of analysis results

use crate::core::result::{AnalysisResult, LabeledRow, Provenance, ResultValue};
use crate::error::{BioenvError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Bumped whenever the packaged layout changes
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedScalar {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedSeries {
    pub name: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<LabeledRow>,
}

impl NamedTable {
    /// Square with row labels equal to the column names
    pub fn is_square_matrix(&self) -> bool {
        self.rows.len() == self.columns.len()
            && self.rows.iter().zip(&self.columns).all(|(row, col)| &row.label == col)
    }
}

/// What a presentation shell consumes: ordered scalars, series and tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackagedResult {
    pub format_version: u32,
    pub engine_version: String,
    pub provenance: Provenance,
    pub scalars: Vec<NamedScalar>,
    pub series: Vec<NamedSeries>,
    pub tables: Vec<NamedTable>,
}

impl PackagedResult {
    pub fn scalar(&self, name: &str) -> Option<f64> {
        self.scalars.iter().find(|s| s.name == name).map(|s| s.value)
    }

    pub fn series(&self, name: &str) -> Option<&NamedSeries> {
        self.series.iter().find(|s| s.name == name)
    }

    pub fn table(&self, name: &str) -> Option<&NamedTable> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Preferred table for matrix formats: a distance matrix, else any square one
    pub fn distance_table(&self) -> Option<&NamedTable> {
        self.tables
            .iter()
            .find(|t| t.name.contains("distance") && t.is_square_matrix())
            .or_else(|| self.tables.iter().find(|t| t.is_square_matrix()))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_msgpack(&self) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(self)?)
    }

    pub fn from_msgpack(bytes: &[u8]) -> Result<Self> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}

fn invariant(entry: &str, message: impl AsRef<str>) -> BioenvError {
    BioenvError::Internal(format!("entry '{}': {}", entry, message.as_ref()))
}

fn check_finite(entry: &str, values: &[f64]) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(pos) => Err(invariant(entry, format!("non-finite value at index {}", pos))),
        None => Ok(()),
    }
}

fn check_cells(entry: &str, width: usize, rows: &[LabeledRow]) -> Result<()> {
    for row in rows {
        if row.cells.len() != width {
            return Err(invariant(
                entry,
                format!("row '{}' has {} cells, expected {}", row.label, row.cells.len(), width),
            ));
        }
        if row.cells.iter().flatten().any(|v| !v.is_finite()) {
            return Err(invariant(entry, format!("row '{}' has a non-finite cell", row.label)));
        }
    }
    Ok(())
}

fn check_labels(entry: &str, labels: usize, values: usize) -> Result<()> {
    if labels != values {
        return Err(invariant(
            entry,
            format!("{} labels for {} values", labels, values),
        ));
    }
    Ok(())
}

/// Flatten a result into named scalars, series and tables.
/// Fails only when the result itself is malformed.
pub fn package(result: &AnalysisResult) -> Result<PackagedResult> {
    let mut scalars = Vec::new();
    let mut series = Vec::new();
    let mut tables = Vec::new();

    for (name, value) in result.entries() {
        match value {
            ResultValue::Scalar(v) => {
                check_finite(name, &[*v])?;
                scalars.push(NamedScalar {
                    name: name.clone(),
                    value: *v,
                });
            }
            ResultValue::Series { labels, values } => {
                check_labels(name, labels.len(), values.len())?;
                check_finite(name, values)?;
                series.push(NamedSeries {
                    name: name.clone(),
                    labels: labels.clone(),
                    values: values.clone(),
                });
            }
            ResultValue::Distribution {
                labels,
                symbols,
                frequencies,
            } => {
                check_labels(name, labels.len(), frequencies.len())?;
                let rows: Vec<LabeledRow> = labels
                    .iter()
                    .zip(frequencies)
                    .map(|(label, freqs)| {
                        LabeledRow::new(label.clone(), freqs.iter().map(|&f| Some(f)).collect())
                    })
                    .collect();
                check_cells(name, symbols.len(), &rows)?;
                tables.push(NamedTable {
                    name: name.clone(),
                    columns: symbols.clone(),
                    rows,
                });
            }
            ResultValue::Matrix { labels, values } => {
                check_labels(name, labels.len(), values.len())?;
                let rows: Vec<LabeledRow> = labels
                    .iter()
                    .zip(values)
                    .map(|(label, row)| LabeledRow::new(label.clone(), row.clone()))
                    .collect();
                check_cells(name, labels.len(), &rows)
                    .map_err(|_| invariant(name, "matrix is not square or has non-finite values"))?;
                tables.push(NamedTable {
                    name: name.clone(),
                    columns: labels.clone(),
                    rows,
                });
            }
            ResultValue::Table { columns, rows } => {
                check_cells(name, columns.len(), rows)?;
                tables.push(NamedTable {
                    name: name.clone(),
                    columns: columns.clone(),
                    rows: rows.clone(),
                });
            }
            ResultValue::Profiles {
                labels,
                step,
                values,
            } => {
                check_labels(name, labels.len(), values.len())?;
                if *step == 0 {
                    return Err(invariant(name, "profile step is zero"));
                }
                for (label, profile) in labels.iter().zip(values) {
                    let series_name = format!("{}/{}", name, label);
                    check_finite(&series_name, profile)?;
                    series.push(NamedSeries {
                        name: series_name,
                        labels: (0..profile.len()).map(|i| (i * step).to_string()).collect(),
                        values: profile.clone(),
                    });
                }
            }
            ResultValue::Groups { labels, assignment } => {
                check_labels(name, labels.len(), assignment.len())?;
                tables.push(NamedTable {
                    name: name.clone(),
                    columns: vec!["group".to_string()],
                    rows: labels
                        .iter()
                        .zip(assignment)
                        .map(|(label, &group)| LabeledRow::new(label.clone(), vec![Some(group as f64)]))
                        .collect(),
                });
            }
        }
    }

    let mut seen = HashSet::new();
    let names = scalars
        .iter()
        .map(|s| &s.name)
        .chain(series.iter().map(|s| &s.name))
        .chain(tables.iter().map(|t| &t.name));
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(invariant(name, "duplicate output key"));
        }
    }

    Ok(PackagedResult {
        format_version: FORMAT_VERSION,
        engine_version: crate::VERSION.to_string(),
        provenance: result.provenance().clone(),
        scalars,
        series,
        tables,
    })
}
