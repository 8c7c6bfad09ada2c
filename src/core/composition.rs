// composition.rs - Single-sequence composition statistics

use crate::data::{Alphabet, SymbolClass};
use std::collections::HashSet;

/// Symbol tallies for one sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolCounts {
    /// Aligned with `Alphabet::symbols()`
    pub canonical: Vec<usize>,
    pub ambiguous: usize,
    pub gaps: usize,
    pub invalid: usize,
}

impl SymbolCounts {
    pub fn canonical_total(&self) -> usize {
        self.canonical.iter().sum()
    }

    pub fn total(&self) -> usize {
        self.canonical_total() + self.ambiguous + self.gaps + self.invalid
    }
}

pub fn count_symbols(sequence: &[u8], alphabet: Alphabet) -> SymbolCounts {
    let mut counts = SymbolCounts {
        canonical: vec![0; alphabet.symbols().len()],
        ambiguous: 0,
        gaps: 0,
        invalid: 0,
    };
    for &symbol in sequence {
        match alphabet.classify(symbol) {
            SymbolClass::Canonical(idx) => counts.canonical[idx] += 1,
            SymbolClass::Ambiguous => counts.ambiguous += 1,
            SymbolClass::Gap => counts.gaps += 1,
            SymbolClass::Invalid => counts.invalid += 1,
        }
    }
    counts
}

/// Canonical symbol frequencies. Sums to 1.0 unless the sequence has no
/// canonical symbol, in which case every frequency is 0.0.
pub fn frequencies(counts: &SymbolCounts) -> Vec<f64> {
    let total = counts.canonical_total();
    if total == 0 {
        return vec![0.0; counts.canonical.len()];
    }
    counts
        .canonical
        .iter()
        .map(|&c| c as f64 / total as f64)
        .collect()
}

#[inline]
fn is_gc(symbol: u8) -> bool {
    symbol == b'G' || symbol == b'C'
}

/// G+C over canonical bases; 0.0 when there are none
pub fn gc_content(sequence: &[u8], alphabet: Alphabet) -> f64 {
    let (mut gc, mut canonical) = (0usize, 0usize);
    for &symbol in sequence {
        if let SymbolClass::Canonical(_) = alphabet.classify(symbol) {
            canonical += 1;
            if is_gc(symbol) {
                gc += 1;
            }
        }
    }
    if canonical == 0 {
        0.0
    } else {
        gc as f64 / canonical as f64
    }
}

/// Shannon entropy of the canonical composition divided by log2(alphabet size)
pub fn complexity(counts: &SymbolCounts) -> f64 {
    let total = counts.canonical_total();
    let size = counts.canonical.len();
    if total == 0 || size < 2 {
        return 0.0;
    }

    let mut entropy = 0.0;
    for &c in &counts.canonical {
        if c > 0 {
            let p = c as f64 / total as f64;
            entropy -= p * p.log2();
        }
    }
    entropy / (size as f64).log2()
}

/// Fraction of positions holding an ambiguity code
pub fn ambiguous_fraction(counts: &SymbolCounts) -> f64 {
    let total = counts.total();
    if total == 0 {
        0.0
    } else {
        counts.ambiguous as f64 / total as f64
    }
}

/// G+C in windows starting at 0, `step` apart. A sequence shorter than
/// the window yields no windows.
pub fn windowed_gc(sequence: &[u8], alphabet: Alphabet, window: usize, step: usize) -> Vec<f64> {
    if window == 0 || step == 0 || sequence.len() < window {
        return Vec::new();
    }
    (0..=sequence.len() - window)
        .step_by(step)
        .map(|start| gc_content(&sequence[start..start + window], alphabet))
        .collect()
}

/// Distinct k-mers made only of canonical symbols
pub fn kmer_set(sequence: &[u8], alphabet: Alphabet, k: usize) -> HashSet<&[u8]> {
    if k == 0 || sequence.len() < k {
        return HashSet::new();
    }
    sequence
        .windows(k)
        .filter(|kmer| {
            kmer.iter()
                .all(|&b| matches!(alphabet.classify(b), SymbolClass::Canonical(_)))
        })
        .collect()
}

/// 1 - |A ∩ B| / |A ∪ B|; two empty sets are at distance 0
pub fn jaccard_distance(a: &HashSet<&[u8]>, b: &HashSet<&[u8]>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let shared = a.intersection(b).count();
    1.0 - shared as f64 / union as f64
}

/// Mismatches over the longer length; length difference counts as mismatches
pub fn p_distance(a: &[u8], b: &[u8]) -> f64 {
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 0.0;
    }
    crate::core::alignment::compute_hamming_distance(a, b) as f64 / longest as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_frequencies() {
        let counts = count_symbols(b"AACGTN-?", Alphabet::Dna);
        assert_eq!(counts.canonical, vec![2, 1, 1, 1]);
        assert_eq!(counts.ambiguous, 1);
        assert_eq!(counts.gaps, 1);
        assert_eq!(counts.invalid, 1);

        let freqs = frequencies(&counts);
        assert!((freqs.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((freqs[0] - 0.4).abs() < 1e-12);

        assert_eq!(frequencies(&count_symbols(b"NNN", Alphabet::Dna)), vec![0.0; 4]);
    }

    #[test]
    fn test_ambiguous_fraction() {
        assert_eq!(ambiguous_fraction(&count_symbols(b"ACNN", Alphabet::Dna)), 0.5);
        assert_eq!(ambiguous_fraction(&count_symbols(b"ACGT", Alphabet::Dna)), 0.0);
        assert_eq!(ambiguous_fraction(&count_symbols(b"", Alphabet::Dna)), 0.0);
    }

    #[test]
    fn test_gc_content() {
        assert!((gc_content(b"GGCC", Alphabet::Dna) - 1.0).abs() < 1e-12);
        assert!((gc_content(b"ACGT", Alphabet::Dna) - 0.5).abs() < 1e-12);
        // Ambiguity codes are ignored
        assert!((gc_content(b"GCNN", Alphabet::Dna) - 1.0).abs() < 1e-12);
        assert_eq!(gc_content(b"", Alphabet::Dna), 0.0);
    }

    #[test]
    fn test_complexity_bounds() {
        let uniform = count_symbols(b"ACGTACGT", Alphabet::Dna);
        assert!((complexity(&uniform) - 1.0).abs() < 1e-12);
        let homopolymer = count_symbols(b"AAAAAAAA", Alphabet::Dna);
        assert_eq!(complexity(&homopolymer), 0.0);
    }

    #[test]
    fn test_windowed_gc() {
        let profile = windowed_gc(b"GGGGAAAA", Alphabet::Dna, 4, 2);
        assert_eq!(profile, vec![1.0, 0.5, 0.0]);
        assert!(windowed_gc(b"ACG", Alphabet::Dna, 4, 1).is_empty());
    }

    #[test]
    fn test_kmer_jaccard() {
        let a = kmer_set(b"ACGTAC", Alphabet::Dna, 3);
        let b = kmer_set(b"ACGTAC", Alphabet::Dna, 3);
        assert_eq!(jaccard_distance(&a, &b), 0.0);

        let c = kmer_set(b"TTTTTT", Alphabet::Dna, 3);
        assert_eq!(jaccard_distance(&a, &c), 1.0);

        // k-mers spanning an ambiguity code are skipped
        assert_eq!(kmer_set(b"ACNGT", Alphabet::Dna, 2).len(), 2);
    }

    #[test]
    fn test_p_distance() {
        assert_eq!(p_distance(b"ACGT", b"ACGT"), 0.0);
        assert!((p_distance(b"ACGT", b"ACGA") - 0.25).abs() < 1e-12);
        assert!((p_distance(b"ACGT", b"AC") - 0.5).abs() < 1e-12);
    }
}
