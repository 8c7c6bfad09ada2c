// cleaning.rs - Build a cleaned copy of a dataset from its validation report

use crate::data::alphabet::SymbolClass;
use crate::data::dataset::{CellValue, Dataset, SequenceRecord, SequenceSet, Table, TableRow};
use crate::data::validation::{ValidationPolicy, ValidationReport};
use log::debug;

/// Drop excluded records and, with `policy.repair`, patch the survivors.
/// The input dataset is left as it was.
pub fn clean(dataset: &Dataset, report: &ValidationReport, policy: &ValidationPolicy) -> Dataset {
    match dataset {
        Dataset::Sequences(set) => Dataset::Sequences(clean_sequences(set, report, policy.repair)),
        Dataset::Table(table) => Dataset::Table(clean_table(table, report, policy.repair)),
    }
}

fn clean_sequences(set: &SequenceSet, report: &ValidationReport, repair: bool) -> SequenceSet {
    let unknown = set.alphabet.unknown_symbol();
    let mut repaired = 0usize;

    let records = set
        .records
        .iter()
        .enumerate()
        .filter(|(index, _)| !report.excluded.contains(index))
        .map(|(_, record)| {
            if !repair {
                return record.clone();
            }
            let sequence = record
                .sequence
                .iter()
                .map(|&b| match set.alphabet.classify(b) {
                    SymbolClass::Invalid => {
                        repaired += 1;
                        unknown
                    }
                    _ => b,
                })
                .collect();
            SequenceRecord {
                id: record.id.clone(),
                description: record.description.clone(),
                sequence,
            }
        })
        .collect();

    if repaired > 0 {
        debug!("Replaced {} invalid symbols with '{}'", repaired, unknown as char);
    }

    SequenceSet {
        alphabet: set.alphabet,
        records,
    }
}

/// Columns where numbers outnumber text cells
fn numeric_majority(table: &Table) -> Vec<bool> {
    (0..table.columns.len())
        .map(|col| {
            let (mut numbers, mut texts) = (0usize, 0usize);
            for row in &table.rows {
                match row.values.get(col) {
                    Some(CellValue::Number(_)) => numbers += 1,
                    Some(CellValue::Text(_)) => texts += 1,
                    _ => {}
                }
            }
            numbers > texts
        })
        .collect()
}

fn clean_table(table: &Table, report: &ValidationReport, repair: bool) -> Table {
    let numeric = if repair {
        numeric_majority(table)
    } else {
        vec![false; table.columns.len()]
    };

    let rows = table
        .rows
        .iter()
        .enumerate()
        .filter(|(index, _)| !report.excluded.contains(index))
        .map(|(_, row)| TableRow {
            label: row.label.clone(),
            values: row
                .values
                .iter()
                .zip(&numeric)
                .map(|(value, &is_numeric)| match value {
                    CellValue::Text(_) if is_numeric => CellValue::Missing,
                    other => other.clone(),
                })
                .collect(),
        })
        .collect();

    Table {
        label_column: table.label_column.clone(),
        columns: table.columns.clone(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::alphabet::Alphabet;
    use crate::data::validation::validate;

    #[test]
    fn test_repair_replaces_invalid_symbols() {
        let ds = Dataset::Sequences(SequenceSet {
            alphabet: Alphabet::Dna,
            records: vec![SequenceRecord::new("a", "AC?T"), SequenceRecord::new("b", "ACGU")],
        });
        let policy = ValidationPolicy {
            repair: true,
            ..ValidationPolicy::default()
        };
        let report = validate(&ds, &policy);
        let cleaned = clean(&ds, &report, &policy);
        let set = cleaned.as_sequences().unwrap();

        assert_eq!(set.records[0].sequence, b"ACNT".to_vec());
        assert_eq!(set.records[1].sequence, b"ACGN".to_vec());
        // Input untouched
        assert_eq!(ds.as_sequences().unwrap().records[0].sequence, b"AC?T".to_vec());
    }

    #[test]
    fn test_without_repair_only_drops_excluded() {
        let ds = Dataset::Sequences(SequenceSet {
            alphabet: Alphabet::Dna,
            records: vec![SequenceRecord::new("a", "AC?T"), SequenceRecord::new("b", "")],
        });
        let policy = ValidationPolicy::default();
        let report = validate(&ds, &policy);
        let cleaned = clean(&ds, &report, &policy);

        assert_eq!(cleaned.labels(), vec!["a"]);
        assert_eq!(cleaned.as_sequences().unwrap().records[0].sequence, b"AC?T".to_vec());
    }

    #[test]
    fn test_repair_blanks_text_in_numeric_columns() {
        let row = |label: &str, ph: CellValue, site: CellValue| TableRow {
            label: label.to_string(),
            values: vec![ph, site],
        };
        let ds = Dataset::Table(Table {
            label_column: "id".to_string(),
            columns: vec!["ph".to_string(), "site".to_string()],
            rows: vec![
                row("r1", CellValue::Number(7.0), CellValue::Text("n".to_string())),
                row("r2", CellValue::Text("high".to_string()), CellValue::Text("s".to_string())),
                row("r3", CellValue::Number(6.0), CellValue::Number(1.0)),
            ],
        });
        let policy = ValidationPolicy {
            repair: true,
            ..ValidationPolicy::default()
        };
        let report = validate(&ds, &policy);
        let cleaned = clean(&ds, &report, &policy);
        let table = cleaned.as_table().unwrap();

        assert_eq!(table.get(1, "ph"), Some(&CellValue::Missing));
        // Text-majority column keeps its text
        assert_eq!(table.get(1, "site"), Some(&CellValue::Text("s".to_string())));
    }
}
