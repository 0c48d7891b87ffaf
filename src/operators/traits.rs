//! Operator traits
//!
//! This module defines the core operator traits for the genetic algorithm.
//! Crossover and mutation act on genotype bits only; callers re-derive the
//! phenotype afterwards.

use rand::Rng;

use crate::error::OperatorError;
use crate::genome::bit_string::BitString;
use crate::genome::genome::Genome;

/// Selection operator trait
///
/// Picks two parents from a population.
pub trait SelectionOperator {
    /// Select two distinct individuals from the pool
    ///
    /// Returns their indices in `pool`. The two never share a genome id.
    fn select_pair<R: Rng>(
        &self,
        pool: &[Genome],
        rng: &mut R,
    ) -> Result<(usize, usize), OperatorError>;
}

/// Crossover operator trait
///
/// Combines genetic material from two parents to create two offspring.
pub trait CrossoverOperator {
    /// Apply crossover to two parent genotypes
    ///
    /// The parents are never modified, even on error.
    fn crossover<R: Rng>(
        &self,
        parent1: &BitString,
        parent2: &BitString,
        rng: &mut R,
    ) -> Result<(BitString, BitString), OperatorError>;
}

/// Mutation operator trait
///
/// Applies random changes to a genotype in place.
pub trait MutationOperator {
    /// Apply mutation to a genotype in place
    fn mutate<R: Rng>(&self, genotype: &mut BitString, rng: &mut R);

    /// Get the mutation probability per bit
    fn mutation_probability(&self) -> f64;
}
