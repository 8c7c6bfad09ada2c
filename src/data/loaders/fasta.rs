// fasta.rs - FASTA loader producing a normalized sequence set

use crate::data::alphabet::Alphabet;
use crate::data::dataset::{Dataset, SequenceRecord, SequenceSet};
use crate::error::{BioenvError, FormatIssue, FormatIssues, Result};
use bio::io::fasta;
use log::debug;

/// Uppercase and strip whitespace/carriage returns from raw sequence bytes
fn normalize_sequence(raw: &[u8]) -> Vec<u8> {
    raw.iter()
        .filter(|b| !b.is_ascii_whitespace())
        .map(|b| b.to_ascii_uppercase())
        .collect()
}

/// Parse FASTA bytes. Every malformed record is reported, not just the first.
pub fn parse(bytes: &[u8], alphabet: Option<Alphabet>) -> Result<Dataset> {
    let reader = fasta::Reader::new(bytes);
    let mut records = Vec::new();
    let mut issues = Vec::new();

    for (index, record_result) in reader.records().enumerate() {
        let record = match record_result {
            Ok(record) => record,
            Err(e) => {
                // The reader cannot resynchronize after a structural error
                issues.push(FormatIssue::at_record(index, format!("invalid FASTA record: {}", e)));
                break;
            }
        };

        if let Err(msg) = record.check() {
            issues.push(FormatIssue::at_record(index, msg.to_string()));
            continue;
        }

        records.push(SequenceRecord {
            id: record.id().to_string(),
            description: record.desc().map(str::to_string),
            sequence: normalize_sequence(record.seq()),
        });
    }

    if !issues.is_empty() {
        return Err(BioenvError::Format(FormatIssues(issues)));
    }
    if records.is_empty() {
        return Err(BioenvError::EmptyInput("FASTA input contains no records".to_string()));
    }

    let alphabet = alphabet.unwrap_or_else(|| {
        let inferred = Alphabet::infer_majority(records.iter().map(|r| r.sequence.as_slice()));
        debug!("Inferred alphabet '{}' from {} records", inferred, records.len());
        inferred
    });

    Ok(Dataset::Sequences(SequenceSet { alphabet, records }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let input = b">seq1 first sample\nacgt\nACGT\n>seq2\nGGCC\r\n";
        let dataset = parse(input, None).unwrap();
        let set = dataset.as_sequences().unwrap();

        assert_eq!(set.alphabet, Alphabet::Dna);
        assert_eq!(set.records.len(), 2);
        assert_eq!(set.records[0].id, "seq1");
        assert_eq!(set.records[0].description.as_deref(), Some("first sample"));
        assert_eq!(set.records[0].sequence, b"ACGTACGT".to_vec());
        assert_eq!(set.records[1].sequence, b"GGCC".to_vec());
    }

    #[test]
    fn test_declared_alphabet_wins() {
        let dataset = parse(b">p1\nACGT\n", Some(Alphabet::Protein)).unwrap();
        assert_eq!(dataset.as_sequences().unwrap().alphabet, Alphabet::Protein);
    }

    #[test]
    fn test_protein_inferred() {
        let dataset = parse(b">p1\nMKVLAAGW\n>p2\nMKKLPEEW\n", None).unwrap();
        assert_eq!(dataset.as_sequences().unwrap().alphabet, Alphabet::Protein);
    }

    #[test]
    fn test_missing_header_is_format_error() {
        let err = parse(b"ACGT\nACGT\n", None).unwrap_err();
        assert!(matches!(err, BioenvError::Format(_)));
    }

    #[test]
    fn test_missing_ids_all_reported() {
        let err = parse(b">\nACGT\n>ok\nACGT\n>\nGGGG\n", None).unwrap_err();
        match err {
            BioenvError::Format(issues) => {
                assert_eq!(issues.len(), 2);
                assert_eq!(issues.0[0].record, Some(0));
                assert_eq!(issues.0[1].record, Some(2));
            }
            other => panic!("expected format error, got {:?}", other),
        }
    }
}
