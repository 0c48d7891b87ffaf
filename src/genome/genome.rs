//! Genome type
//!
//! A genome owns its genotype bits, the phenotype decoded from them and an
//! optional goal-adjusted fitness. The phenotype is only ever set from a
//! decode of the genotype, so the two never diverge.

use std::cmp::Ordering;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{EvoResult, GenomeError};
use crate::fitness::objective::{Objective, OptimizationGoal};
use crate::genome::bit_string::BitString;
use crate::genome::codec::VectorCodec;
use crate::operators::traits::MutationOperator;

/// Stable identity of a genome, unique within one engine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GenomeId(pub u64);

impl std::fmt::Display for GenomeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic [`GenomeId`] source
#[derive(Clone, Debug, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    /// Start allocating from zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next unused id
    pub fn allocate(&mut self) -> GenomeId {
        let id = GenomeId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far
    pub fn allocated(&self) -> u64 {
        self.next
    }
}

/// A bit-encoded candidate solution
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Genome {
    id: GenomeId,
    genotype: BitString,
    phenotype: Vec<f64>,
    /// Goal-adjusted fitness, lower is better; None until evaluated
    fitness: Option<f64>,
    birth_generation: usize,
}

impl Genome {
    /// Build a genome from a genotype, deriving the phenotype by decoding it
    pub fn from_genotype(
        id: GenomeId,
        genotype: BitString,
        codec: &VectorCodec,
    ) -> Result<Self, GenomeError> {
        let phenotype = codec.decode(&genotype)?;
        Ok(Self {
            id,
            genotype,
            phenotype,
            fitness: None,
            birth_generation: 0,
        })
    }

    /// Build a genome by encoding a phenotype
    ///
    /// The stored phenotype is the decode of the encoded bits, i.e. the input
    /// after clamping and quantization.
    pub fn from_phenotype(
        id: GenomeId,
        phenotype: &[f64],
        codec: &VectorCodec,
    ) -> Result<Self, GenomeError> {
        let genotype = codec.encode(phenotype)?;
        Self::from_genotype(id, genotype, codec)
    }

    /// Build a genome from a uniform random point inside the codec's bounds
    pub fn random<R: Rng>(
        id: GenomeId,
        codec: &VectorCodec,
        rng: &mut R,
    ) -> Result<Self, GenomeError> {
        let phenotype = codec.bounds().sample_vec(rng);
        Self::from_phenotype(id, &phenotype, codec)
    }

    /// Record the generation this genome was created in
    pub fn with_generation(mut self, generation: usize) -> Self {
        self.birth_generation = generation;
        self
    }

    /// Attach an already known adjusted fitness
    pub fn with_fitness(mut self, fitness: f64) -> Self {
        self.fitness = Some(fitness);
        self
    }

    pub fn id(&self) -> GenomeId {
        self.id
    }

    pub fn genotype(&self) -> &BitString {
        &self.genotype
    }

    pub fn phenotype(&self) -> &[f64] {
        &self.phenotype
    }

    /// Adjusted fitness (lower is better), if evaluated
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    /// Adjusted fitness with unevaluated genomes ranked last
    pub fn fitness_or_worst(&self) -> f64 {
        self.fitness.unwrap_or(f64::INFINITY)
    }

    /// The objective value before goal adjustment, if evaluated
    pub fn objective_value(&self, goal: OptimizationGoal) -> Option<f64> {
        self.fitness.map(|f| goal.restore(f))
    }

    pub fn birth_generation(&self) -> usize {
        self.birth_generation
    }

    /// Check if this genome has been evaluated
    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// Check if this genome is strictly better than another
    pub fn is_better_than(&self, other: &Self) -> bool {
        match (self.fitness, other.fitness) {
            (Some(a), Some(b)) => a < b,
            (Some(_), None) => true,
            _ => false,
        }
    }

    /// Order by adjusted fitness, best first; unevaluated genomes sort last
    pub fn cmp_fitness(&self, other: &Self) -> Ordering {
        self.fitness_or_worst()
            .partial_cmp(&other.fitness_or_worst())
            .unwrap_or(Ordering::Equal)
    }

    /// Evaluate the objective unless the stored fitness is current
    pub fn evaluate<O: Objective + ?Sized>(
        &mut self,
        objective: &O,
        goal: OptimizationGoal,
    ) -> EvoResult<f64> {
        if let Some(fitness) = self.fitness {
            return Ok(fitness);
        }
        let raw = objective.evaluate(&self.phenotype)?;
        let fitness = goal.adjust(raw);
        self.fitness = Some(fitness);
        Ok(fitness)
    }

    /// Mutate the genotype and re-derive the phenotype
    ///
    /// The fitness is cleared whenever a bit changed. On error the genome is
    /// left untouched. Returns the number of flipped bits.
    pub fn mutate<M, R>(
        &mut self,
        mutation: &M,
        codec: &VectorCodec,
        rng: &mut R,
    ) -> Result<usize, GenomeError>
    where
        M: MutationOperator,
        R: Rng,
    {
        let mut genotype = self.genotype.clone();
        mutation.mutate(&mut genotype, rng);
        let flipped = genotype.hamming_distance(&self.genotype);
        if flipped == 0 {
            return Ok(0);
        }

        let phenotype = codec.decode(&genotype)?;
        self.genotype = genotype;
        self.phenotype = phenotype;
        self.fitness = None;
        Ok(flipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvolutionError;
    use crate::fitness::benchmarks::Sphere;
    use crate::fitness::objective::FallibleObjective;
    use crate::genome::bounds::MultiBounds;
    use crate::genome::codec::BitCodec;
    use crate::operators::mutation::BitFlipMutation;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn codec() -> VectorCodec {
        VectorCodec::new(BitCodec::new(8, 4).unwrap(), MultiBounds::symmetric(10.0, 2))
    }

    #[test]
    fn test_id_allocator() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate(), GenomeId(0));
        assert_eq!(ids.allocate(), GenomeId(1));
        assert_eq!(ids.allocated(), 2);
        assert_eq!(GenomeId(7).to_string(), "#7");
    }

    #[test]
    fn test_from_phenotype_quantizes() {
        let genome = Genome::from_phenotype(GenomeId(0), &[1.0, 1.1], &codec()).unwrap();
        assert_eq!(genome.genotype().to_string(), "0011100000111001");
        // 1.1 rounds to 1.125 with a 3-bit mantissa
        assert_eq!(genome.phenotype(), &[1.0, 1.125]);
        assert!(!genome.is_evaluated());
        assert_eq!(genome.birth_generation(), 0);
    }

    #[test]
    fn test_from_phenotype_dimension_mismatch() {
        let err = Genome::from_phenotype(GenomeId(0), &[1.0], &codec()).unwrap_err();
        assert!(matches!(err, GenomeError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_from_genotype_rejects_wrong_length() {
        let err = Genome::from_genotype(GenomeId(0), BitString::zeros(9), &codec()).unwrap_err();
        assert!(matches!(err, GenomeError::MalformedGenotype { .. }));
    }

    #[test]
    fn test_random_within_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let codec = codec();
        for i in 0..100 {
            let genome = Genome::random(GenomeId(i), &codec, &mut rng).unwrap();
            assert_eq!(genome.genotype().len(), 16);
            assert!(codec.bounds().contains_vec(genome.phenotype()));
        }
    }

    #[test]
    fn test_evaluate_adjusts_and_caches() {
        let mut genome = Genome::from_phenotype(GenomeId(0), &[1.0, 2.0], &codec()).unwrap();
        let sphere = Sphere::new(2);

        assert_eq!(genome.evaluate(&sphere, OptimizationGoal::Maximize).unwrap(), -5.0);
        assert_eq!(genome.objective_value(OptimizationGoal::Maximize), Some(5.0));

        // cached: a different goal does not re-evaluate
        assert_eq!(genome.evaluate(&sphere, OptimizationGoal::Minimize).unwrap(), -5.0);
    }

    #[test]
    fn test_evaluate_propagates_objective_failure() {
        let mut genome = Genome::from_phenotype(GenomeId(0), &[1.0, 2.0], &codec()).unwrap();
        let failing = FallibleObjective::new(|_: &[f64]| Err::<f64, _>("diverged"));
        let err = genome
            .evaluate(&failing, OptimizationGoal::Minimize)
            .unwrap_err();
        assert!(matches!(err, EvolutionError::FitnessEvaluation(ref m) if m == "diverged"));
        assert!(!genome.is_evaluated());
    }

    #[test]
    fn test_mutate_full_rate_flips_and_redecodes() {
        let mut rng = StdRng::seed_from_u64(1);
        let codec = codec();
        let mut genome = Genome::from_phenotype(GenomeId(0), &[1.0, 0.0], &codec)
            .unwrap()
            .with_fitness(1.0);

        let flipped = genome
            .mutate(&BitFlipMutation::new(1.0), &codec, &mut rng)
            .unwrap();
        assert_eq!(flipped, 16);
        assert_eq!(genome.genotype().to_string(), "1100011111111111");
        assert_eq!(genome.phenotype(), codec.decode(genome.genotype()).unwrap().as_slice());
        assert!(!genome.is_evaluated());
    }

    #[test]
    fn test_mutate_zero_rate_keeps_fitness() {
        let mut rng = StdRng::seed_from_u64(1);
        let codec = codec();
        let mut genome = Genome::from_phenotype(GenomeId(0), &[1.0, 0.0], &codec)
            .unwrap()
            .with_fitness(1.0);
        let before = genome.genotype().clone();

        let flipped = genome
            .mutate(&BitFlipMutation::new(0.0), &codec, &mut rng)
            .unwrap();
        assert_eq!(flipped, 0);
        assert_eq!(genome.genotype(), &before);
        assert_eq!(genome.fitness(), Some(1.0));
    }

    #[test]
    fn test_is_better_than_and_ordering() {
        let codec = codec();
        let a = Genome::from_phenotype(GenomeId(0), &[0.0, 0.0], &codec)
            .unwrap()
            .with_fitness(1.0);
        let b = Genome::from_phenotype(GenomeId(1), &[0.0, 0.0], &codec)
            .unwrap()
            .with_fitness(2.0);
        let unevaluated = Genome::from_phenotype(GenomeId(2), &[0.0, 0.0], &codec).unwrap();

        assert!(a.is_better_than(&b));
        assert!(!b.is_better_than(&a));
        assert!(b.is_better_than(&unevaluated));
        assert!(!unevaluated.is_better_than(&a));
        assert_eq!(a.cmp_fitness(&b), Ordering::Less);
        assert_eq!(unevaluated.cmp_fitness(&b), Ordering::Greater);
    }
}
