//! Population type
//!
//! This module provides the Population container type and the degeneracy
//! measurement the engine uses to detect premature convergence.

use std::collections::HashMap;

use crate::error::{EvoResult, EvolutionError};
use crate::fitness::objective::{Objective, OptimizationGoal};
use crate::genome::bit_string::BitString;
use crate::genome::genome::Genome;

/// A population of genomes
#[derive(Clone, Debug, Default)]
pub struct Population {
    /// The genomes in this population
    genomes: Vec<Genome>,
    /// Current generation number
    generation: usize,
}

impl Population {
    /// Create an empty population
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a population with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            genomes: Vec::with_capacity(capacity),
            generation: 0,
        }
    }

    /// Create a population from a vector of genomes
    pub fn from_genomes(genomes: Vec<Genome>) -> Self {
        Self {
            genomes,
            generation: 0,
        }
    }

    /// Get the current generation
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Set the generation number
    pub fn set_generation(&mut self, generation: usize) {
        self.generation = generation;
    }

    /// Get the population size
    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    /// Check if the population is empty
    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Genome> {
        self.genomes.get(index)
    }

    /// Add a genome to the population
    pub fn push(&mut self, genome: Genome) {
        self.genomes.push(genome);
    }

    /// Get an iterator over the genomes
    pub fn iter(&self) -> std::slice::Iter<'_, Genome> {
        self.genomes.iter()
    }

    /// Get the underlying genomes
    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    /// Mutable access for in-place replacement
    pub(crate) fn genomes_mut(&mut self) -> &mut [Genome] {
        &mut self.genomes
    }

    /// Take the genomes out of this population
    pub fn into_genomes(self) -> Vec<Genome> {
        self.genomes
    }

    /// Get the best evaluated genome (lowest adjusted fitness)
    pub fn best(&self) -> Option<&Genome> {
        self.genomes
            .iter()
            .filter(|g| g.is_evaluated())
            .min_by(|a, b| a.cmp_fitness(b))
    }

    /// Get the worst evaluated genome (highest adjusted fitness)
    pub fn worst(&self) -> Option<&Genome> {
        self.genomes
            .iter()
            .filter(|g| g.is_evaluated())
            .max_by(|a, b| a.cmp_fitness(b))
    }

    /// Sort the population by fitness (best first, unevaluated last)
    pub fn sort_by_fitness(&mut self) {
        self.genomes.sort_by(|a, b| a.cmp_fitness(b));
    }

    /// Truncate the population to the given size, keeping the best genomes
    pub fn truncate_to_best(&mut self, size: usize) {
        self.sort_by_fitness();
        self.genomes.truncate(size);
    }

    /// Check if all genomes have been evaluated
    pub fn all_evaluated(&self) -> bool {
        self.genomes.iter().all(|g| g.is_evaluated())
    }

    /// Count the number of evaluated genomes
    pub fn count_evaluated(&self) -> usize {
        self.genomes.iter().filter(|g| g.is_evaluated()).count()
    }

    /// Evaluate every genome without a current fitness
    ///
    /// Returns how many objective calls were made. On error, genomes
    /// evaluated before the failure keep their fitness.
    pub fn evaluate<O: Objective + ?Sized>(
        &mut self,
        objective: &O,
        goal: OptimizationGoal,
    ) -> EvoResult<usize> {
        let mut calls = 0;
        for genome in &mut self.genomes {
            if !genome.is_evaluated() {
                genome.evaluate(objective, goal)?;
                calls += 1;
            }
        }
        Ok(calls)
    }

    /// Raw objective values of all evaluated genomes, in population order
    pub fn objective_values(&self, goal: OptimizationGoal) -> Vec<f64> {
        self.genomes
            .iter()
            .filter_map(|g| g.objective_value(goal))
            .collect()
    }

    /// The most frequent genotype and how many genomes carry it
    pub fn most_common_genotype(&self) -> Option<(&BitString, usize)> {
        let mut counts: HashMap<&BitString, usize> = HashMap::new();
        for genome in &self.genomes {
            *counts.entry(genome.genotype()).or_insert(0) += 1;
        }
        counts.into_iter().max_by_key(|&(_, count)| count)
    }

    /// Share of the population carried by the most frequent genotype
    pub fn most_common_genotype_ratio(&self) -> f64 {
        match self.most_common_genotype() {
            Some((_, count)) => count as f64 / self.len() as f64,
            None => 0.0,
        }
    }

    /// Check whether one genotype holds more than `threshold` of the population
    pub fn is_degenerate(&self, threshold: f64) -> bool {
        self.most_common_genotype_ratio() > threshold
    }

    /// Compute population diversity (average pairwise Hamming distance)
    pub fn diversity(&self) -> f64 {
        if self.len() < 2 {
            return 0.0;
        }

        let mut total_distance = 0usize;
        let mut count = 0usize;

        for i in 0..self.len() {
            for j in (i + 1)..self.len() {
                total_distance += self.genomes[i]
                    .genotype()
                    .hamming_distance(self.genomes[j].genotype());
                count += 1;
            }
        }

        total_distance as f64 / count as f64
    }

    /// Fail with [`EvolutionError::EmptyPopulation`] when there is nothing to evolve
    pub(crate) fn ensure_not_empty(&self) -> EvoResult<()> {
        if self.is_empty() {
            Err(EvolutionError::EmptyPopulation)
        } else {
            Ok(())
        }
    }
}

impl std::ops::Index<usize> for Population {
    type Output = Genome;

    fn index(&self, index: usize) -> &Self::Output {
        &self.genomes[index]
    }
}

impl IntoIterator for Population {
    type Item = Genome;
    type IntoIter = std::vec::IntoIter<Genome>;

    fn into_iter(self) -> Self::IntoIter {
        self.genomes.into_iter()
    }
}

impl<'a> IntoIterator for &'a Population {
    type Item = &'a Genome;
    type IntoIter = std::slice::Iter<'a, Genome>;

    fn into_iter(self) -> Self::IntoIter {
        self.genomes.iter()
    }
}

impl FromIterator<Genome> for Population {
    fn from_iter<I: IntoIterator<Item = Genome>>(iter: I) -> Self {
        Self::from_genomes(iter.into_iter().collect())
    }
}
