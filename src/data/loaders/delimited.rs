// delimited.rs - CSV/TSV loader producing a labeled table

use crate::data::dataset::{CellValue, Dataset, Table, TableRow};
use crate::error::{BioenvError, FormatIssue, FormatIssues, Result};
use std::collections::HashSet;

/// Parse a single cell: missing markers, then numbers, then free text
pub fn parse_cell(raw: &str, missing_marker: &str) -> CellValue {
    let cleaned = raw.trim().trim_matches('"');

    if cleaned.is_empty() || cleaned == "NA" || cleaned == missing_marker {
        return CellValue::Missing;
    }

    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => CellValue::Number(v),
        // NaN/inf are treated as absent measurements
        Ok(_) => CellValue::Missing,
        Err(_) => CellValue::Text(cleaned.to_string()),
    }
}

/// Split off blank and `#` lines preceding the header. Returns the rest
/// of the input and the number of lines skipped.
fn skip_preamble(bytes: &[u8]) -> (&[u8], usize) {
    let mut rest = bytes;
    let mut skipped = 0;
    loop {
        let end = rest.iter().position(|&b| b == b'\n').map_or(rest.len(), |i| i + 1);
        let line = rest[..end].trim_ascii_start();
        if end == 0 || !(line.is_empty() || line.starts_with(b"#")) {
            return (rest, skipped);
        }
        rest = &rest[end..];
        skipped += 1;
    }
}

/// Parse delimited bytes. The first column holds row labels.
/// Only lines before the header may be `#` comments; after it every line is data.
/// Rows with the wrong number of fields are all reported together.
pub fn parse(bytes: &[u8], delimiter: u8, missing_marker: &str) -> Result<Dataset> {
    let (body, skipped) = skip_preamble(bytes);
    let header_line = skipped + 1;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(body);

    let headers = reader
        .headers()
        .map_err(|e| BioenvError::format(FormatIssue::at_line(header_line, format!("unreadable header: {}", e))))?
        .clone();

    if headers.is_empty() {
        return Err(BioenvError::EmptyInput("table has no header line".to_string()));
    }
    if headers.len() < 2 {
        return Err(BioenvError::format(FormatIssue::at_line(
            header_line,
            "header must have a label column and at least one data column",
        )));
    }

    let header_names: Vec<String> = headers
        .iter()
        .map(|h| h.trim().trim_matches('"').to_string())
        .collect();

    let mut issues = Vec::new();
    let mut seen = HashSet::new();
    for name in &header_names[1..] {
        if name.is_empty() {
            issues.push(FormatIssue::at_line(header_line, "empty column name"));
        } else if !seen.insert(name.as_str()) {
            issues.push(FormatIssue::at_line(header_line, format!("duplicate column name '{}'", name)));
        }
    }

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map_or(index + 2, |p| p.line() as usize) + skipped;
                issues.push(FormatIssue::at_line(line, format!("unreadable row: {}", e)));
                continue;
            }
        };
        let line = record.position().map_or(index + 2, |p| p.line() as usize) + skipped;

        if record.len() != header_names.len() {
            issues.push(FormatIssue::at_line(
                line,
                format!("expected {} fields, found {}", header_names.len(), record.len()),
            ));
            continue;
        }

        let label = record[0].trim().trim_matches('"').to_string();
        if label.is_empty() {
            issues.push(FormatIssue::at_line(line, "empty row label"));
            continue;
        }

        let values = record
            .iter()
            .skip(1)
            .map(|raw| parse_cell(raw, missing_marker))
            .collect();
        rows.push(TableRow { label, values });
    }

    if !issues.is_empty() {
        return Err(BioenvError::Format(FormatIssues(issues)));
    }
    if rows.is_empty() {
        return Err(BioenvError::EmptyInput("table has a header but no data rows".to_string()));
    }

    let mut names = header_names.into_iter();
    let label_column = names.next().unwrap_or_default();
    Ok(Dataset::Table(Table {
        label_column,
        columns: names.collect(),
        rows,
    }))
}
