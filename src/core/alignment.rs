// alignment.rs - Alignment configuration and pairwise alignment utilities

use crate::data::Alphabet;
use log::debug;
use parasail_rs::{Aligner, Matrix};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Configuration for sequence alignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentConfig {
    pub match_score: i32,
    pub mismatch_penalty: i32,
    pub gap_open: i32,
    pub gap_extend: i32,
    pub description: Option<String>,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            match_score: 2,
            mismatch_penalty: -1,
            gap_open: 5,
            gap_extend: 2,
            description: Some("Default alignment parameters".to_string()),
        }
    }
}

impl AlignmentConfig {
    /// Create configuration from mode string
    pub fn from_mode(mode: &str) -> Result<Self, String> {
        match mode {
            "dna" => Ok(Self {
                match_score: 2,
                mismatch_penalty: -1,
                gap_open: 5,
                gap_extend: 2,
                description: Some("Standard DNA alignment".to_string()),
            }),
            "dna-strict" => Ok(Self {
                match_score: 3,
                mismatch_penalty: -2,
                gap_open: 8,
                gap_extend: 3,
                description: Some("Strict DNA alignment (higher penalties)".to_string()),
            }),
            "dna-permissive" => Ok(Self {
                match_score: 1,
                mismatch_penalty: 0,
                gap_open: 3,
                gap_extend: 1,
                description: Some("Permissive DNA alignment (lower penalties)".to_string()),
            }),
            "protein" => Ok(Self {
                match_score: 5,
                mismatch_penalty: -4,
                gap_open: 10,
                gap_extend: 1,
                description: Some("Protein alignment (identity scoring)".to_string()),
            }),
            _ => Err(format!(
                "Unknown alignment mode: {}. Use: dna, dna-strict, dna-permissive, protein",
                mode
            )),
        }
    }

    /// Create custom configuration
    pub fn custom(match_score: i32, mismatch_penalty: i32, gap_open: i32, gap_extend: i32) -> Self {
        Self {
            match_score,
            mismatch_penalty,
            gap_open,
            gap_extend,
            description: Some("Custom alignment parameters".to_string()),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.gap_open < 0 || self.gap_extend < 0 {
            return Err(format!(
                "Gap penalties must be non-negative (open={}, extend={})",
                self.gap_open, self.gap_extend
            ));
        }
        if self.match_score <= self.mismatch_penalty {
            return Err(format!(
                "Match score ({}) must exceed mismatch penalty ({})",
                self.match_score, self.mismatch_penalty
            ));
        }
        Ok(())
    }
}

/// Difference counts from one pairwise alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlignmentStats {
    pub snps: usize,
    pub indel_events: usize,
    pub indel_bases: usize,
}

/// Distance calculation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistanceMode {
    SnpsOnly,
    SnpsAndIndelEvents,
    SnpsAndIndelBases,
    Hamming,
}

impl FromStr for DistanceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "snps" | "snps-only" => Ok(DistanceMode::SnpsOnly),
            "snps-indel-events" | "snps+indel-events" => Ok(DistanceMode::SnpsAndIndelEvents),
            "snps-indel-bases" | "snps+indel-bases" => Ok(DistanceMode::SnpsAndIndelBases),
            "hamming" => Ok(DistanceMode::Hamming),
            _ => Err(format!(
                "Invalid distance mode: {}. Use: snps, snps-indel-events, snps-indel-bases, hamming",
                s
            )),
        }
    }
}

impl fmt::Display for DistanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DistanceMode::SnpsOnly => "snps",
            DistanceMode::SnpsAndIndelEvents => "snps-indel-events",
            DistanceMode::SnpsAndIndelBases => "snps-indel-bases",
            DistanceMode::Hamming => "hamming",
        };
        write!(f, "{}", name)
    }
}

impl DistanceMode {
    pub fn description(&self) -> &str {
        match self {
            DistanceMode::SnpsOnly => "SNPs only",
            DistanceMode::SnpsAndIndelEvents => "SNPs + indel events",
            DistanceMode::SnpsAndIndelBases => "SNPs + indel bases",
            DistanceMode::Hamming => "Hamming distance (all mismatches)",
        }
    }

    /// Collapse alignment counts into a single distance
    pub fn distance(&self, stats: &AlignmentStats) -> usize {
        match self {
            DistanceMode::SnpsOnly => stats.snps,
            DistanceMode::SnpsAndIndelEvents => stats.snps + stats.indel_events,
            DistanceMode::SnpsAndIndelBases => stats.snps + stats.indel_bases,
            DistanceMode::Hamming => stats.snps + stats.indel_bases,
        }
    }
}

/// Compute alignment statistics from aligned sequences
pub fn compute_alignment_stats(query: &str, reference: &str) -> AlignmentStats {
    let query_bytes = query.as_bytes();
    let ref_bytes = reference.as_bytes();

    let mut stats = AlignmentStats::default();
    let mut in_gap = false;

    for i in 0..query_bytes.len().min(ref_bytes.len()) {
        let q = query_bytes[i];
        let r = ref_bytes[i];

        if q == b'-' || r == b'-' {
            if !in_gap {
                stats.indel_events += 1;
                in_gap = true;
            }
            stats.indel_bases += 1;
        } else {
            in_gap = false;
            if q != r {
                stats.snps += 1;
            }
        }
    }

    stats
}

/// Compute Hamming distance between two sequences
/// Counts all mismatches, treating the length difference as mismatches
pub fn compute_hamming_distance(seq1: &[u8], seq2: &[u8]) -> usize {
    let min_len = seq1.len().min(seq2.len());
    let max_len = seq1.len().max(seq2.len());

    let mismatches = seq1
        .iter()
        .take(min_len)
        .zip(seq2.iter().take(min_len))
        .filter(|(a, b)| a != b)
        .count();

    mismatches + (max_len - min_len)
}

/// Ungapped comparison used when the aligner cannot produce a traceback
fn analyze_sequences(seq1: &[u8], seq2: &[u8]) -> AlignmentStats {
    let min_len = seq1.len().min(seq2.len());
    let len_diff = seq1.len().abs_diff(seq2.len());

    let snps = seq1[..min_len]
        .iter()
        .zip(&seq2[..min_len])
        .filter(|(a, b)| a != b)
        .count();

    AlignmentStats {
        snps,
        indel_events: usize::from(len_diff > 0),
        indel_bases: len_diff,
    }
}

/// Scoring alphabet: canonical symbols plus ambiguity codes
fn scoring_alphabet(alphabet: Alphabet) -> Vec<u8> {
    let mut symbols = alphabet.symbols().to_vec();
    for &code in alphabet.ambiguity_codes() {
        if !symbols.contains(&code) {
            symbols.push(code);
        }
    }
    symbols
}

/// Global alignment of two sequences, reduced to difference counts
pub fn align_pair(
    seq1: &[u8],
    seq2: &[u8],
    alphabet: Alphabet,
    config: &AlignmentConfig,
) -> AlignmentStats {
    if seq1 == seq2 {
        return AlignmentStats::default();
    }

    let symbols = scoring_alphabet(alphabet);
    let matrix = match Matrix::create(&symbols, config.match_score, config.mismatch_penalty) {
        Ok(m) => m,
        Err(_) => {
            debug!("Scoring matrix creation failed, using ungapped comparison");
            return analyze_sequences(seq1, seq2);
        }
    };

    let aligner = Aligner::new()
        .matrix(matrix)
        .gap_open(config.gap_open)
        .gap_extend(config.gap_extend)
        .global()
        .use_trace()
        .build();

    match aligner.align(Some(seq1), seq2) {
        Ok(result) => match result.get_traceback_strings(seq1, seq2) {
            Ok(traceback) => compute_alignment_stats(&traceback.query, &traceback.reference),
            Err(_) => analyze_sequences(seq1, seq2),
        },
        Err(_) => analyze_sequences(seq1, seq2),
    }
}

/// Distance between two sequences under the given mode.
/// Hamming mode skips alignment entirely.
pub fn pair_distance(
    seq1: &[u8],
    seq2: &[u8],
    alphabet: Alphabet,
    config: &AlignmentConfig,
    mode: DistanceMode,
) -> usize {
    match mode {
        DistanceMode::Hamming => compute_hamming_distance(seq1, seq2),
        _ => mode.distance(&align_pair(seq1, seq2, alphabet, config)),
    }
}
