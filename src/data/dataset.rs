// dataset.rs - Normalized in-memory datasets (sequence sets and labeled tables)

use crate::data::alphabet::Alphabet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single labeled sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub id: String,
    pub description: Option<String>,
    /// Uppercase symbols, whitespace removed
    pub sequence: Vec<u8>,
}

impl SequenceRecord {
    pub fn new(id: impl Into<String>, sequence: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            description: None,
            sequence: sequence.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// Labeled sequences over one alphabet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceSet {
    pub alphabet: Alphabet,
    pub records: Vec<SequenceRecord>,
}

/// One table cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Missing,
}

impl CellValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }
}

/// One table row; `values` is aligned with `Table::columns`
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub label: String,
    pub values: Vec<CellValue>,
}

/// Labeled table: row label -> (column -> value)
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub label_column: String,
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl Table {
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Value of `column` in `row`, if both exist
    pub fn get(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col = self.column_index(column)?;
        self.rows.get(row)?.values.get(col)
    }

    /// Column values as numbers, `None` for missing or text cells
    pub fn numeric_column(&self, col: usize) -> Vec<Option<f64>> {
        self.rows
            .iter()
            .map(|row| row.values.get(col).and_then(CellValue::as_number))
            .collect()
    }

    /// Indices of columns holding at least one number
    pub fn numeric_columns(&self) -> Vec<usize> {
        (0..self.columns.len())
            .filter(|&col| {
                self.rows
                    .iter()
                    .any(|row| matches!(row.values.get(col), Some(CellValue::Number(_))))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    Sequences,
    Table,
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetKind::Sequences => write!(f, "sequences"),
            DatasetKind::Table => write!(f, "table"),
        }
    }
}

/// Loaded dataset. Never mutated after construction; cleaning builds a new one.
#[derive(Debug, Clone, PartialEq)]
pub enum Dataset {
    Sequences(SequenceSet),
    Table(Table),
}

impl Dataset {
    pub fn kind(&self) -> DatasetKind {
        match self {
            Dataset::Sequences(_) => DatasetKind::Sequences,
            Dataset::Table(_) => DatasetKind::Table,
        }
    }

    /// Number of records (sequences or rows)
    pub fn len(&self) -> usize {
        match self {
            Dataset::Sequences(set) => set.records.len(),
            Dataset::Table(table) => table.rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record identifiers in order
    pub fn labels(&self) -> Vec<&str> {
        match self {
            Dataset::Sequences(set) => set.records.iter().map(|r| r.id.as_str()).collect(),
            Dataset::Table(table) => table.rows.iter().map(|r| r.label.as_str()).collect(),
        }
    }

    pub fn as_sequences(&self) -> Option<&SequenceSet> {
        match self {
            Dataset::Sequences(set) => Some(set),
            Dataset::Table(_) => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Dataset::Table(table) => Some(table),
            Dataset::Sequences(_) => None,
        }
    }

    /// Order-sensitive serialization used for fingerprints
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            Dataset::Sequences(set) => {
                out.extend_from_slice(set.alphabet.name().as_bytes());
                out.push(b'\n');
                for record in &set.records {
                    out.extend_from_slice(record.id.as_bytes());
                    out.push(b'\t');
                    out.extend_from_slice(&record.sequence);
                    out.push(b'\n');
                }
            }
            Dataset::Table(table) => {
                out.extend_from_slice(table.label_column.as_bytes());
                for column in &table.columns {
                    out.push(b'\t');
                    out.extend_from_slice(column.as_bytes());
                }
                out.push(b'\n');
                for row in &table.rows {
                    out.extend_from_slice(row.label.as_bytes());
                    for value in &row.values {
                        out.push(b'\t');
                        // Tagged text so no cell can emit a separator byte
                        // or pass for a cell of another type
                        match value {
                            CellValue::Number(v) => {
                                out.push(b'n');
                                out.extend_from_slice(v.to_string().as_bytes());
                            }
                            CellValue::Text(s) => {
                                out.push(b's');
                                out.extend_from_slice(s.as_bytes());
                            }
                            CellValue::Missing => {}
                        }
                    }
                    out.push(b'\n');
                }
            }
        }
        out
    }
}
