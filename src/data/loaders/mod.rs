// mod.rs - Dataset loaders: format detection and dispatch

pub mod delimited;
pub mod fasta;

use crate::data::alphabet::Alphabet;
use crate::data::dataset::Dataset;
use crate::error::{BioenvError, FormatIssue, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Supported upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    Fasta,
    Csv,
    Tsv,
}

impl InputFormat {
    /// Guess the format from the content itself
    pub fn infer(bytes: &[u8]) -> Result<Self> {
        let first = bytes.iter().find(|b| !b.is_ascii_whitespace());
        if first == Some(&b'>') {
            return Ok(InputFormat::Fasta);
        }

        let text = String::from_utf8_lossy(bytes);
        let header = text
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty() && !line.starts_with('#'));

        match header {
            Some(line) if line.contains('\t') => Ok(InputFormat::Tsv),
            Some(line) if line.contains(',') => Ok(InputFormat::Csv),
            _ => Err(BioenvError::format(FormatIssue::general(
                "cannot infer input format: expected a FASTA header ('>') or a delimited header line",
            ))),
        }
    }

    /// Map a file extension to a format
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "fasta" | "fa" | "fas" | "fna" | "faa" => Some(InputFormat::Fasta),
            "csv" => Some(InputFormat::Csv),
            "tsv" | "tab" | "txt" => Some(InputFormat::Tsv),
            _ => None,
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormat::Fasta => write!(f, "fasta"),
            InputFormat::Csv => write!(f, "csv"),
            InputFormat::Tsv => write!(f, "tsv"),
        }
    }
}

impl FromStr for InputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fasta" | "fa" => Ok(InputFormat::Fasta),
            "csv" => Ok(InputFormat::Csv),
            "tsv" | "tab" => Ok(InputFormat::Tsv),
            _ => Err(format!("Invalid input format: {}. Use: fasta, csv, tsv", s)),
        }
    }
}

/// Options recognized by the loader
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    /// Declared format; inferred from content when None
    pub format: Option<InputFormat>,
    /// Declared alphabet for sequence input; majority-inferred when None
    pub alphabet: Option<Alphabet>,
    /// Extra table cell value treated as missing (besides empty and "NA")
    pub missing_marker: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            format: None,
            alphabet: None,
            missing_marker: "-".to_string(),
        }
    }
}

/// Parse uploaded bytes into a dataset
pub fn load(bytes: &[u8], options: &LoadOptions) -> Result<Dataset> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(BioenvError::EmptyInput("input contains no data".to_string()));
    }

    let format = match options.format {
        Some(format) => format,
        None => InputFormat::infer(bytes)?,
    };

    let dataset = match format {
        InputFormat::Fasta => fasta::parse(bytes, options.alphabet)?,
        InputFormat::Csv => delimited::parse(bytes, b',', &options.missing_marker)?,
        InputFormat::Tsv => delimited::parse(bytes, b'\t', &options.missing_marker)?,
    };

    info!(
        "Loaded {} dataset ({}): {} records",
        dataset.kind(),
        format,
        dataset.len()
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_format() {
        assert_eq!(InputFormat::infer(b"\n>seq1\nACGT\n").unwrap(), InputFormat::Fasta);
        assert_eq!(InputFormat::infer(b"id\tph\ns1\t7.0\n").unwrap(), InputFormat::Tsv);
        assert_eq!(InputFormat::infer(b"# comment\nid,ph\ns1,7.0\n").unwrap(), InputFormat::Csv);
        assert!(matches!(
            InputFormat::infer(b"just some words"),
            Err(BioenvError::Format(_))
        ));
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(InputFormat::from_extension(Path::new("reads.FASTA")), Some(InputFormat::Fasta));
        assert_eq!(InputFormat::from_extension(Path::new("samples.csv")), Some(InputFormat::Csv));
        assert_eq!(InputFormat::from_extension(Path::new("matrix.tsv")), Some(InputFormat::Tsv));
        assert_eq!(InputFormat::from_extension(Path::new("archive.zip")), None);
    }

    #[test]
    fn test_empty_input_is_empty_error() {
        let options = LoadOptions::default();
        assert!(matches!(load(b"", &options), Err(BioenvError::EmptyInput(_))));
        assert!(matches!(load(b"  \n\t\n", &options), Err(BioenvError::EmptyInput(_))));

        // Declared format must not turn an empty upload into a format error
        let fasta = LoadOptions {
            format: Some(InputFormat::Fasta),
            ..LoadOptions::default()
        };
        assert!(matches!(load(b"", &fasta), Err(BioenvError::EmptyInput(_))));
    }

    #[test]
    fn test_load_dispatch() {
        let options = LoadOptions::default();
        let seqs = load(b">a\nACGT\n>b\nGGCA\n", &options).unwrap();
        assert_eq!(seqs.len(), 2);
        let table = load(b"id,ph\ns1,7.0\ns2,6.5\n", &options).unwrap();
        assert_eq!(table.len(), 2);
    }
}
