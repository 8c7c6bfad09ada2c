// alphabet.rs - Sequence alphabets and per-symbol classification

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DNA: &[u8] = b"ACGT";
const RNA: &[u8] = b"ACGU";
const PROTEIN: &[u8] = b"ACDEFGHIKLMNPQRSTVWY";

const NUCLEOTIDE_AMBIGUITY: &[u8] = b"NRYKMSWBDHV";
const PROTEIN_AMBIGUITY: &[u8] = b"XBZJUO*";

pub const GAP: u8 = b'-';

/// Alphabet shared by every record of a sequence dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alphabet {
    Dna,
    Rna,
    Protein,
}

/// How a single byte relates to an alphabet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolClass {
    /// Index into `Alphabet::symbols()`
    Canonical(usize),
    Ambiguous,
    Gap,
    Invalid,
}

impl Alphabet {
    /// Canonical symbols in a fixed order; frequencies are reported in this order
    pub fn symbols(&self) -> &'static [u8] {
        match self {
            Alphabet::Dna => DNA,
            Alphabet::Rna => RNA,
            Alphabet::Protein => PROTEIN,
        }
    }

    pub fn ambiguity_codes(&self) -> &'static [u8] {
        match self {
            Alphabet::Dna | Alphabet::Rna => NUCLEOTIDE_AMBIGUITY,
            Alphabet::Protein => PROTEIN_AMBIGUITY,
        }
    }

    /// Symbol substituted for invalid bytes during repair
    pub fn unknown_symbol(&self) -> u8 {
        match self {
            Alphabet::Dna | Alphabet::Rna => b'N',
            Alphabet::Protein => b'X',
        }
    }

    pub fn is_nucleotide(&self) -> bool {
        matches!(self, Alphabet::Dna | Alphabet::Rna)
    }

    #[inline]
    pub fn classify(&self, symbol: u8) -> SymbolClass {
        if symbol == GAP {
            return SymbolClass::Gap;
        }
        if let Some(idx) = self.symbols().iter().position(|&s| s == symbol) {
            return SymbolClass::Canonical(idx);
        }
        if self.ambiguity_codes().contains(&symbol) {
            SymbolClass::Ambiguous
        } else {
            SymbolClass::Invalid
        }
    }

    /// True if every byte is canonical, ambiguous or a gap
    pub fn accepts(&self, sequence: &[u8]) -> bool {
        sequence
            .iter()
            .all(|&b| self.classify(b) != SymbolClass::Invalid)
    }

    /// Best-fitting alphabet for one sequence, tried DNA -> RNA -> protein.
    /// Returns None for empty or gap/ambiguity-only sequences and for sequences
    /// no alphabet accepts.
    pub fn infer(sequence: &[u8]) -> Option<Alphabet> {
        let informative = sequence.iter().any(|&b| {
            b != GAP && !NUCLEOTIDE_AMBIGUITY.contains(&b) && !PROTEIN_AMBIGUITY.contains(&b)
        });
        if !informative {
            return None;
        }
        [Alphabet::Dna, Alphabet::Rna, Alphabet::Protein]
            .into_iter()
            .find(|alphabet| alphabet.accepts(sequence))
    }

    /// Majority vote over records; ties resolve in DNA, RNA, protein order
    pub fn infer_majority<'a, I>(sequences: I) -> Alphabet
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let mut votes = [0usize; 3];
        for seq in sequences {
            match Alphabet::infer(seq) {
                Some(Alphabet::Dna) => votes[0] += 1,
                Some(Alphabet::Rna) => votes[1] += 1,
                Some(Alphabet::Protein) => votes[2] += 1,
                None => {}
            }
        }
        let mut best = 0;
        for i in 1..votes.len() {
            if votes[i] > votes[best] {
                best = i;
            }
        }
        match best {
            0 => Alphabet::Dna,
            1 => Alphabet::Rna,
            _ => Alphabet::Protein,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Alphabet::Dna => "dna",
            Alphabet::Rna => "rna",
            Alphabet::Protein => "protein",
        }
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Alphabet::Dna
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Alphabet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dna" | "nucleotide" => Ok(Alphabet::Dna),
            "rna" => Ok(Alphabet::Rna),
            "protein" | "aa" | "amino" => Ok(Alphabet::Protein),
            _ => Err(format!("Invalid alphabet: {}. Use: dna, rna, protein", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        let dna = Alphabet::Dna;
        assert_eq!(dna.classify(b'A'), SymbolClass::Canonical(0));
        assert_eq!(dna.classify(b'T'), SymbolClass::Canonical(3));
        assert_eq!(dna.classify(b'N'), SymbolClass::Ambiguous);
        assert_eq!(dna.classify(b'-'), SymbolClass::Gap);
        assert_eq!(dna.classify(b'U'), SymbolClass::Invalid);
        assert_eq!(Alphabet::Rna.classify(b'U'), SymbolClass::Canonical(3));
    }

    #[test]
    fn test_infer_single() {
        assert_eq!(Alphabet::infer(b"ACGTNACGT"), Some(Alphabet::Dna));
        assert_eq!(Alphabet::infer(b"ACGUUA"), Some(Alphabet::Rna));
        assert_eq!(Alphabet::infer(b"MKVLEEW"), Some(Alphabet::Protein));
        assert_eq!(Alphabet::infer(b"NNNN--"), None);
        assert_eq!(Alphabet::infer(b""), None);
        assert_eq!(Alphabet::infer(b"AC1GT"), None);
    }

    #[test]
    fn test_infer_majority_prefers_dna_on_tie() {
        let seqs: Vec<&[u8]> = vec![b"ACGT", b"MKVLEEW"];
        assert_eq!(Alphabet::infer_majority(seqs), Alphabet::Dna);

        let seqs: Vec<&[u8]> = vec![b"ACGT", b"MKVLEEW", b"WWPPLK"];
        assert_eq!(Alphabet::infer_majority(seqs), Alphabet::Protein);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("DNA".parse::<Alphabet>().unwrap(), Alphabet::Dna);
        assert_eq!("protein".parse::<Alphabet>().unwrap(), Alphabet::Protein);
        assert!("xna".parse::<Alphabet>().is_err());
    }
}
