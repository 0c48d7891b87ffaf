//! Crossover operators
//!
//! This module provides multi-point crossover for bit-string genotypes.

use rand::seq::index;
use rand::Rng;

use crate::error::OperatorError;
use crate::genome::bit_string::BitString;
use crate::operators::traits::CrossoverOperator;

/// Multi-point crossover
///
/// Cuts both parents at `num_points` distinct random positions and
/// alternates which parent each child copies from at every cut.
#[derive(Clone, Debug)]
pub struct MultiPointCrossover {
    /// Number of cut points per crossover
    pub num_points: usize,
}

impl MultiPointCrossover {
    /// Create a new multi-point crossover
    ///
    /// The count is checked against the genotype length on every call.
    pub fn new(num_points: usize) -> Self {
        Self { num_points }
    }

    /// Single-point crossover
    pub fn one_point() -> Self {
        Self::new(1)
    }

    /// Two-point crossover
    pub fn two_point() -> Self {
        Self::new(2)
    }

    /// Draw sorted, distinct cut positions in `[1, length)` followed by the
    /// `length` sentinel
    pub fn cut_points<R: Rng>(
        &self,
        length: usize,
        rng: &mut R,
    ) -> Result<Vec<usize>, OperatorError> {
        if self.num_points == 0 || self.num_points >= length {
            return Err(OperatorError::InvalidCutCount {
                points: self.num_points,
                length,
            });
        }

        let mut cuts: Vec<usize> = index::sample(rng, length - 1, self.num_points)
            .into_iter()
            .map(|i| i + 1)
            .collect();
        cuts.sort_unstable();
        cuts.push(length);
        Ok(cuts)
    }
}

impl Default for MultiPointCrossover {
    fn default() -> Self {
        Self::two_point()
    }
}

impl CrossoverOperator for MultiPointCrossover {
    fn crossover<R: Rng>(
        &self,
        parent1: &BitString,
        parent2: &BitString,
        rng: &mut R,
    ) -> Result<(BitString, BitString), OperatorError> {
        if parent1.len() != parent2.len() {
            return Err(OperatorError::LengthMismatch {
                left: parent1.len(),
                right: parent2.len(),
            });
        }

        let length = parent1.len();
        let cuts = self.cut_points(length, rng)?;

        let mut child1 = BitString::with_capacity(length);
        let mut child2 = BitString::with_capacity(length);
        let mut start = 0;
        let mut swapped = false;

        for end in cuts {
            let (from1, from2) = if swapped {
                (parent2, parent1)
            } else {
                (parent1, parent2)
            };
            for i in start..end {
                child1.push(from1[i]);
                child2.push(from2[i]);
            }
            swapped = !swapped;
            start = end;
        }

        Ok((child1, child2))
    }
}
