// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Sequence Points
//!
//! Two point types over symbol sequences:
//!
//! - [`KmerPoint`]: nucleotide k-mers under Hamming distance, where the
//!   wildcard `N` matches any symbol.
//! - [`ProteinPoint`]: residue sequences under a BLOSUM62-derived
//!   substitution distance.
//!
//! Neither is a true metric. A wildcard sits at distance zero from every
//! symbol, and the substitution distance is a summed pairwise score, so both
//! report `IS_METRIC = false`.

use smallvec::SmallVec;
use std::fmt;
use std::io::{Read, Write};

use crate::codec::{read_bytes, write_bytes, Decode, Encode};
use crate::error::{GenoDbError, Result};
use crate::metric::MetricPoint;

/// Inline capacity for symbol storage; typical k-mers fit without allocation
const INLINE_SYMBOLS: usize = 32;

type Symbols = SmallVec<[u8; INLINE_SYMBOLS]>;

// =============================================================================
// Nucleotide k-mers
// =============================================================================

/// A nucleotide k-mer
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct KmerPoint {
    symbols: Symbols,
}

impl KmerPoint {
    /// Wildcard symbol matching any nucleotide
    pub const WILDCARD: u8 = b'N';

    const ALPHABET: &'static [u8] = b"ACGTN";

    /// Build from raw symbols, upper-casing without validation
    pub fn new(symbols: impl AsRef<[u8]>) -> Self {
        Self {
            symbols: symbols.as_ref().iter().map(u8::to_ascii_uppercase).collect(),
        }
    }

    /// Parse a k-mer over the `ACGTN` alphabet (case-insensitive)
    pub fn parse(text: &str) -> Result<Self> {
        let point = Self::new(text.trim());
        if let Some(bad) = point.symbols.iter().find(|s| !Self::ALPHABET.contains(s)) {
            return Err(GenoDbError::InvalidArgument(format!(
                "invalid nucleotide '{}' in k-mer {:?}",
                *bad as char, text
            )));
        }
        Ok(point)
    }

    /// Every overlapping window of length `k` in `sequence`
    pub fn windows(sequence: &[u8], k: usize) -> impl Iterator<Item = KmerPoint> + '_ {
        let k = k.max(1);
        sequence.windows(k).map(KmerPoint::new)
    }

    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl MetricPoint for KmerPoint {
    const IS_METRIC: bool = false;

    /// Mismatching positions, ignoring wildcards; every position past the
    /// shorter sequence counts as a mismatch.
    fn distance(&self, other: &Self) -> f64 {
        let mismatches = self
            .symbols
            .iter()
            .zip(other.symbols.iter())
            .filter(|(a, b)| a != b && **a != Self::WILDCARD && **b != Self::WILDCARD)
            .count();
        let overhang = self.symbols.len().abs_diff(other.symbols.len());
        (mismatches + overhang) as f64
    }
}

impl fmt::Debug for KmerPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KmerPoint({})", String::from_utf8_lossy(&self.symbols))
    }
}

impl fmt::Display for KmerPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.symbols))
    }
}

impl Encode for KmerPoint {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_bytes(writer, &self.symbols)
    }
}

impl Decode for KmerPoint {
    fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Self::new(read_bytes(reader)?))
    }
}

// =============================================================================
// Protein sequences
// =============================================================================

/// Residue order of the rows and columns of [`BLOSUM62`]
const RESIDUES: &[u8; 20] = b"ARNDCQEGHILKMFPSTWYV";

/// BLOSUM62 substitution scores
#[rustfmt::skip]
const BLOSUM62: [[i8; 20]; 20] = [
    //A   R   N   D   C   Q   E   G   H   I   L   K   M   F   P   S   T   W   Y   V
    [ 4, -1, -2, -2,  0, -1, -1,  0, -2, -1, -1, -1, -1, -2, -1,  1,  0, -3, -2,  0], // A
    [-1,  5,  0, -2, -3,  1,  0, -2,  0, -3, -2,  2, -1, -3, -2, -1, -1, -3, -2, -3], // R
    [-2,  0,  6,  1, -3,  0,  0,  0,  1, -3, -3,  0, -2, -3, -2,  1,  0, -4, -2, -3], // N
    [-2, -2,  1,  6, -3,  0,  2, -1, -1, -3, -4, -1, -3, -3, -1,  0, -1, -4, -3, -3], // D
    [ 0, -3, -3, -3,  9, -3, -4, -3, -3, -1, -1, -3, -1, -2, -3, -1, -1, -2, -2, -1], // C
    [-1,  1,  0,  0, -3,  5,  2, -2,  0, -3, -2,  1,  0, -3, -1,  0, -1, -2, -1, -2], // Q
    [-1,  0,  0,  2, -4,  2,  5, -2,  0, -3, -3,  1, -2, -3, -1,  0, -1, -3, -2, -2], // E
    [ 0, -2,  0, -1, -3, -2, -2,  6, -2, -4, -4, -2, -3, -3, -2,  0, -2, -2, -3, -3], // G
    [-2,  0,  1, -1, -3,  0,  0, -2,  8, -3, -3, -1, -2, -1, -2, -1, -2, -2,  2, -3], // H
    [-1, -3, -3, -3, -1, -3, -3, -4, -3,  4,  2, -3,  1,  0, -3, -2, -1, -3, -1,  3], // I
    [-1, -2, -3, -4, -1, -2, -3, -4, -3,  2,  4, -2,  2,  0, -3, -2, -1, -2, -1,  1], // L
    [-1,  2,  0, -1, -3,  1,  1, -2, -1, -3, -2,  5, -1, -3, -1,  0, -1, -3, -2, -2], // K
    [-1, -1, -2, -3, -1,  0, -2, -3, -2,  1,  2, -1,  5,  0, -2, -1, -1, -1, -1,  1], // M
    [-2, -3, -3, -3, -2, -3, -3, -3, -1,  0,  0, -3,  0,  6, -4, -2, -2,  1,  3, -1], // F
    [-1, -2, -2, -1, -3, -1, -1, -2, -2, -3, -3, -1, -2, -4,  7, -1, -1, -4, -3, -2], // P
    [ 1, -1,  1,  0, -1,  0,  0,  0, -1, -2, -2,  0, -1, -2, -1,  4,  1, -3, -2, -2], // S
    [ 0, -1,  0, -1, -1, -1, -1, -2, -2, -1, -1, -1, -1, -2, -1,  1,  5, -2, -2,  0], // T
    [-3, -3, -4, -4, -2, -2, -3, -2, -2, -3, -2, -3, -1,  1, -4, -3, -2, 11,  2, -3], // W
    [-2, -2, -2, -3, -2, -1, -2, -3,  2, -1, -1, -2, -1,  3, -3, -2, -2,  2,  7, -1], // Y
    [ 0, -3, -3, -3, -1, -2, -2, -3, -3,  3,  1, -2,  1, -1, -2, -2,  0, -3, -1,  4], // V
];

fn residue_index(symbol: u8) -> Option<usize> {
    RESIDUES.iter().position(|&r| r == symbol)
}

/// Per-position substitution distance: `(s(a,a) + s(b,b)) / 2 - s(a,b)`.
///
/// Zero for identical residues; unknown residues (`X`, `B`, `Z`, `*`) always
/// score zero.
pub fn substitution_distance(a: u8, b: u8) -> f64 {
    match (residue_index(a), residue_index(b)) {
        (Some(i), Some(j)) => {
            let self_a = BLOSUM62[i][i] as f64;
            let self_b = BLOSUM62[j][j] as f64;
            (self_a + self_b) / 2.0 - BLOSUM62[i][j] as f64
        }
        _ => 0.0,
    }
}

/// A protein fragment scored with BLOSUM62
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ProteinPoint {
    residues: Symbols,
}

impl ProteinPoint {
    /// Penalty for each residue past the end of the shorter sequence
    pub const GAP_PENALTY: f64 = 4.0;

    pub fn new(residues: impl AsRef<[u8]>) -> Self {
        Self {
            residues: residues.as_ref().iter().map(u8::to_ascii_uppercase).collect(),
        }
    }

    pub fn residues(&self) -> &[u8] {
        &self.residues
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }
}

impl MetricPoint for ProteinPoint {
    const IS_METRIC: bool = false;

    fn distance(&self, other: &Self) -> f64 {
        let aligned: f64 = self
            .residues
            .iter()
            .zip(other.residues.iter())
            .map(|(&a, &b)| substitution_distance(a, b))
            .sum();
        let overhang = self.residues.len().abs_diff(other.residues.len()) as f64;
        aligned + overhang * Self::GAP_PENALTY
    }
}

impl fmt::Debug for ProteinPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProteinPoint({})", String::from_utf8_lossy(&self.residues))
    }
}

impl Encode for ProteinPoint {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_bytes(writer, &self.residues)
    }
}

impl Decode for ProteinPoint {
    fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Self::new(read_bytes(reader)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kmer(s: &str) -> KmerPoint {
        KmerPoint::parse(s).unwrap()
    }

    #[test]
    fn test_hamming_distance() {
        assert_eq!(kmer("ACTGCCTGA").distance(&kmer("ACTGCCTGG")), 1.0);
        assert_eq!(kmer("ACTGCCTGA").distance(&kmer("AAGGCCTGA")), 2.0);
        assert_eq!(kmer("ACGT").distance(&kmer("ACGT")), 0.0);
    }

    #[test]
    fn test_wildcard_matches_anything() {
        assert_eq!(kmer("ACNT").distance(&kmer("ACGT")), 0.0);
        assert_eq!(kmer("NNNN").distance(&kmer("ACGT")), 0.0);
        assert_eq!(kmer("ANGA").distance(&kmer("TCGT")), 2.0);
    }

    #[test]
    fn test_length_difference_counts() {
        assert_eq!(kmer("ACG").distance(&kmer("ACGTT")), 2.0);
    }

    #[test]
    fn test_parse_rejects_unknown_symbol() {
        assert!(KmerPoint::parse("ACGX").is_err());
        assert_eq!(KmerPoint::parse("acgn").unwrap().symbols(), b"ACGN");
    }

    #[test]
    fn test_windows() {
        let kmers: Vec<String> = KmerPoint::windows(b"ACGTA", 3).map(|k| k.to_string()).collect();
        assert_eq!(kmers, vec!["ACG", "CGT", "GTA"]);
    }

    #[test]
    fn test_blosum_is_symmetric() {
        for i in 0..20 {
            for j in 0..20 {
                assert_eq!(BLOSUM62[i][j], BLOSUM62[j][i], "row {} col {}", i, j);
            }
        }
    }

    #[test]
    fn test_substitution_distance_non_negative() {
        for &a in RESIDUES.iter() {
            assert_eq!(substitution_distance(a, a), 0.0);
            for &b in RESIDUES.iter() {
                assert!(substitution_distance(a, b) >= 0.0);
            }
        }
    }

    #[test]
    fn test_protein_distance() {
        let a = ProteinPoint::new("IV");
        let b = ProteinPoint::new("VI");
        // (4+4)/2 - 3 for each position
        assert_eq!(a.distance(&b), 2.0);
        assert_eq!(a.distance(&ProteinPoint::new("IVW")), ProteinPoint::GAP_PENALTY);
        assert_eq!(ProteinPoint::new("XA").distance(&ProteinPoint::new("WA")), 0.0);
    }

    #[test]
    fn test_codec_preserves_symbols() {
        let point = kmer("ACTGN");
        let bytes = point.to_bytes().unwrap();
        assert_eq!(KmerPoint::from_bytes(&bytes).unwrap(), point);
    }
}
