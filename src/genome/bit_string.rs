//! Bit string genotype
//!
//! This module provides the fixed-length bit string every genome is stored as.
//! Multi-bit fields are written most-significant bit first, so the textual
//! form of a genotype reads left to right as `sign | exponent | mantissa`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GenomeError;

/// Fixed-length bit string
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitString {
    /// The bits of this genotype
    bits: Vec<bool>,
}

impl BitString {
    /// Create a new bit string with the given bits
    pub fn new(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// Create an empty bit string with room for `capacity` bits
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bits: Vec::with_capacity(capacity),
        }
    }

    /// Create an all-zeros bit string of the given length
    pub fn zeros(length: usize) -> Self {
        Self {
            bits: vec![false; length],
        }
    }

    /// Create an all-ones bit string of the given length
    pub fn ones(length: usize) -> Self {
        Self {
            bits: vec![true; length],
        }
    }

    /// Create a `width`-bit string holding `value`, most significant bit first
    ///
    /// Bits of `value` above `width` are dropped.
    pub fn from_unsigned(value: u64, width: usize) -> Self {
        let mut bs = Self::with_capacity(width);
        bs.push_unsigned(value, width);
        bs
    }

    /// Read the whole string as an unsigned integer, most significant bit first
    ///
    /// Returns `None` for strings longer than 64 bits.
    pub fn to_unsigned(&self) -> Option<u64> {
        if self.bits.len() > 64 {
            return None;
        }
        Some(read_unsigned(&self.bits))
    }

    /// Append a `width`-bit field holding `value`, most significant bit first
    pub fn push_unsigned(&mut self, value: u64, width: usize) {
        for shift in (0..width).rev() {
            let bit = shift < 64 && (value >> shift) & 1 == 1;
            self.bits.push(bit);
        }
    }

    /// Append a single bit
    pub fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    /// Append every bit of another bit string
    pub fn extend_from(&mut self, other: &BitString) {
        self.bits.extend_from_slice(&other.bits);
    }

    /// Get the length of the bit string
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Check if the bit string is empty
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Get a specific bit
    pub fn get(&self, index: usize) -> Option<bool> {
        self.bits.get(index).copied()
    }

    /// Set a specific bit
    pub fn set(&mut self, index: usize, value: bool) {
        if let Some(bit) = self.bits.get_mut(index) {
            *bit = value;
        }
    }

    /// Flip a specific bit
    pub fn flip(&mut self, index: usize) {
        if let Some(bit) = self.bits.get_mut(index) {
            *bit = !*bit;
        }
    }

    /// Flip all bits
    pub fn flip_all(&mut self) {
        for bit in &mut self.bits {
            *bit = !*bit;
        }
    }

    /// Borrow the raw bits
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Count the set bits
    pub fn count_ones(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Count the cleared bits
    pub fn count_zeros(&self) -> usize {
        self.bits.len() - self.count_ones()
    }

    /// True when no bit is set
    pub fn is_all_zero(&self) -> bool {
        self.bits.iter().all(|&b| !b)
    }

    /// Hamming distance to another bit string
    pub fn hamming_distance(&self, other: &Self) -> usize {
        self.bits
            .iter()
            .zip(other.bits.iter())
            .filter(|(a, b)| a != b)
            .count()
    }

    /// Split into consecutive `width`-bit slices
    ///
    /// Fails unless the length is an exact multiple of `width`.
    pub fn fields(&self, width: usize) -> Result<std::slice::Chunks<'_, bool>, GenomeError> {
        if width == 0 || self.bits.len() % width != 0 {
            return Err(GenomeError::MalformedGenotype {
                expected: width * self.bits.len().div_ceil(width.max(1)),
                actual: self.bits.len(),
            });
        }
        Ok(self.bits.chunks(width))
    }
}

/// Interpret a bit slice as an unsigned integer, most significant bit first
pub(crate) fn read_unsigned(bits: &[bool]) -> u64 {
    bits.iter().fold(0u64, |acc, &bit| (acc << 1) | u64::from(bit))
}

impl std::ops::Index<usize> for BitString {
    type Output = bool;

    fn index(&self, index: usize) -> &Self::Output {
        &self.bits[index]
    }
}

impl From<Vec<bool>> for BitString {
    fn from(bits: Vec<bool>) -> Self {
        Self { bits }
    }
}

impl From<BitString> for Vec<bool> {
    fn from(genome: BitString) -> Self {
        genome.bits
    }
}

impl<const N: usize> From<[bool; N]> for BitString {
    fn from(arr: [bool; N]) -> Self {
        Self { bits: arr.to_vec() }
    }
}

impl FromIterator<bool> for BitString {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self {
            bits: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a BitString {
    type Item = &'a bool;
    type IntoIter = std::slice::Iter<'a, bool>;

    fn into_iter(self) -> Self::IntoIter {
        self.bits.iter()
    }
}

impl std::fmt::Display for BitString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for bit in &self.bits {
            write!(f, "{}", if *bit { '1' } else { '0' })?;
        }
        Ok(())
    }
}

impl FromStr for BitString {
    type Err = GenomeError;

    /// Parse a literal such as `"00111000"`; underscores and spaces are skipped
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .filter(|c| *c != '_' && !c.is_whitespace())
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(GenomeError::InvalidBitChar(other)),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }
}
