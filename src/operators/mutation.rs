//! Mutation operators
//!
//! This module provides bit-flip mutation for bit-string genotypes.

use rand::Rng;

use crate::genome::bit_string::BitString;
use crate::operators::traits::MutationOperator;

/// Bit-flip mutation
///
/// Flips each bit independently with the given probability.
#[derive(Clone, Debug)]
pub struct BitFlipMutation {
    /// Per-bit flip probability
    pub rate: f64,
}

impl BitFlipMutation {
    /// Create a new bit-flip mutation
    pub fn new(rate: f64) -> Self {
        assert!((0.0..=1.0).contains(&rate), "Rate must be in [0, 1]");
        Self { rate }
    }
}

impl Default for BitFlipMutation {
    fn default() -> Self {
        Self::new(0.01)
    }
}

impl MutationOperator for BitFlipMutation {
    fn mutate<R: Rng>(&self, genotype: &mut BitString, rng: &mut R) {
        for i in 0..genotype.len() {
            // gen() is in [0, 1): rate 0 never flips, rate 1 always does
            if rng.gen::<f64>() < self.rate {
                genotype.flip(i);
            }
        }
    }

    fn mutation_probability(&self) -> f64 {
        self.rate
    }
}
