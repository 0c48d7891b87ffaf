//! Binary-encoded Genetic Algorithm
//!
//! This module implements the engine: real vectors are evolved as
//! sign/exponent/mantissa bit strings with multi-point crossover, bit-flip
//! mutation and probabilistic survivor replacement. Degenerate populations,
//! where one genotype dominates, are partially refilled with fresh random
//! genomes.

use std::time::{Duration, Instant};

use log::{debug, info, trace};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::algorithms::config::{BinaryGAConfig, GenerationScheme, SelectionKind};
use crate::diagnostics::{
    EvolutionResult, EvolutionStats, GenerationObserver, GenerationStats, TimingStats,
};
use crate::error::{EvoResult, EvolutionError};
use crate::fitness::objective::{Objective, OptimizationGoal};
use crate::genome::bounds::{Bounds, MultiBounds};
use crate::genome::codec::VectorCodec;
use crate::genome::genome::{Genome, IdAllocator};
use crate::operators::crossover::MultiPointCrossover;
use crate::operators::mutation::BitFlipMutation;
use crate::operators::selection::SelectionStrategy;
use crate::operators::survivor::SurvivorSelector;
use crate::operators::traits::{CrossoverOperator, SelectionOperator};
use crate::population::population::Population;

/// Lifecycle of an engine
///
/// `Unseeded -> Seeded -> Evaluated -> (Evolving -> Evaluated)* -> Terminated`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GaState {
    /// No population yet
    Unseeded,
    /// Population generated but not fully evaluated
    Seeded,
    /// Every genome carries a current fitness
    Evaluated,
    /// A generation step is in progress
    Evolving,
    /// `run` completed; no further steps are accepted
    Terminated,
}

/// Builder for BinaryGA
pub struct BinaryGABuilder<O> {
    config: BinaryGAConfig,
    objective: O,
    observer: Option<Box<dyn GenerationObserver>>,
}

impl BinaryGABuilder<()> {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: BinaryGAConfig::default(),
            objective: (),
            observer: None,
        }
    }
}

impl Default for BinaryGABuilder<()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> BinaryGABuilder<O> {
    /// Replace the whole configuration
    pub fn config(mut self, config: BinaryGAConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the population size
    pub fn population_size(mut self, size: usize) -> Self {
        self.config.population_size = size;
        self
    }

    /// Set per-dimension bounds; the dimension count follows them
    pub fn bounds(mut self, bounds: MultiBounds) -> Self {
        self.config.num_vars = bounds.dimension();
        self.config.bounds = bounds;
        self
    }

    /// Use `num_vars` dimensions sharing the same bounds
    pub fn search_space(self, num_vars: usize, bounds: Bounds) -> Self {
        self.bounds(MultiBounds::uniform(bounds, num_vars))
    }

    /// Set the encoded width of each dimension
    pub fn bits_per_var(mut self, bits: usize) -> Self {
        self.config.bits_per_var = bits;
        self
    }

    /// Set the width of the exponent field
    pub fn exponent_bits(mut self, bits: usize) -> Self {
        self.config.exponent_bits = bits;
        self
    }

    /// Set the per-bit mutation rate
    pub fn mutation_rate(mut self, rate: f64) -> Self {
        self.config.mutation_rate = rate;
        self
    }

    /// Set the number of crossover cut points
    pub fn crossover_points(mut self, points: usize) -> Self {
        self.config.crossover_points = points;
        self
    }

    /// Set the optimization goal
    pub fn goal(mut self, goal: OptimizationGoal) -> Self {
        self.config.goal = goal;
        self
    }

    pub fn minimize(self) -> Self {
        self.goal(OptimizationGoal::Minimize)
    }

    pub fn maximize(self) -> Self {
        self.goal(OptimizationGoal::Maximize)
    }

    /// Use tournament parent selection
    pub fn tournament(mut self, size: usize) -> Self {
        self.config.selection = SelectionKind::Tournament { size };
        self
    }

    /// Use roulette parent selection
    pub fn roulette(mut self) -> Self {
        self.config.selection = SelectionKind::Roulette;
        self
    }

    /// Set the most-common-genotype share that triggers a refill
    pub fn degeneracy_threshold(mut self, threshold: f64) -> Self {
        self.config.degeneracy_threshold = threshold;
        self
    }

    /// Set the share of best genomes a refill keeps
    pub fn refill_keep_fraction(mut self, fraction: f64) -> Self {
        self.config.refill_keep_fraction = fraction;
        self
    }

    /// Set how each step advances the population
    pub fn scheme(mut self, scheme: GenerationScheme) -> Self {
        self.config.scheme = scheme;
        self
    }

    /// Receive statistics after every committed generation
    pub fn observer<Obs>(mut self, observer: Obs) -> Self
    where
        Obs: GenerationObserver + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Set the objective function
    pub fn objective<NewO>(self, objective: NewO) -> BinaryGABuilder<NewO>
    where
        NewO: Objective,
    {
        BinaryGABuilder {
            config: self.config,
            objective,
            observer: self.observer,
        }
    }
}

impl<O: Objective> BinaryGABuilder<O> {
    /// Validate the configuration and build the engine
    pub fn build(self) -> EvoResult<BinaryGA<O>> {
        let config = self.config;
        config.validate()?;

        let codec = config.vector_codec()?;
        let goal = config.goal;

        Ok(BinaryGA {
            codec,
            crossover: MultiPointCrossover::new(config.crossover_points),
            mutation: BitFlipMutation::new(config.mutation_rate),
            selection: config.selection.strategy(goal),
            survivors: SurvivorSelector::new(goal),
            objective: self.objective,
            observer: self.observer,
            population: Population::new(),
            ids: IdAllocator::new(),
            state: GaState::Unseeded,
            evaluations: 0,
            stats: EvolutionStats::new(),
            config,
        })
    }
}

/// Work of one step that is only committed when the whole step succeeds
struct Scratch {
    ids: IdAllocator,
    evaluations: usize,
    evaluation_time: Duration,
}

/// Binary-encoded Genetic Algorithm
///
/// Owns the population and threads a caller-supplied random source through
/// every stochastic call, so a seeded `StdRng` reproduces a run exactly.
pub struct BinaryGA<O> {
    config: BinaryGAConfig,
    codec: VectorCodec,
    crossover: MultiPointCrossover,
    mutation: BitFlipMutation,
    selection: SelectionStrategy,
    survivors: SurvivorSelector,
    objective: O,
    observer: Option<Box<dyn GenerationObserver>>,
    population: Population,
    ids: IdAllocator,
    state: GaState,
    evaluations: usize,
    stats: EvolutionStats,
}

impl BinaryGA<()> {
    /// Create a builder for BinaryGA
    pub fn builder() -> BinaryGABuilder<()> {
        BinaryGABuilder::new()
    }
}

impl<O: Objective> BinaryGA<O> {
    pub fn config(&self) -> &BinaryGAConfig {
        &self.config
    }

    pub fn codec(&self) -> &VectorCodec {
        &self.codec
    }

    pub fn state(&self) -> GaState {
        self.state
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Generations committed since seeding
    pub fn generation(&self) -> usize {
        self.population.generation()
    }

    /// Objective calls made since seeding
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Statistics recorded since seeding
    pub fn stats(&self) -> &EvolutionStats {
        &self.stats
    }

    /// Best evaluated genome of the current population
    pub fn best(&self) -> Option<&Genome> {
        self.population.best()
    }

    /// Seed `population_size` uniform random genomes and evaluate them
    ///
    /// Discards any previous population. If the objective fails the engine
    /// stays `Seeded`; evaluation resumes on the next step.
    pub fn seed<R: Rng>(&mut self, rng: &mut R) -> EvoResult<()> {
        let mut ids = IdAllocator::new();
        let genomes = (0..self.config.population_size)
            .map(|_| Genome::random(ids.allocate(), &self.codec, rng))
            .collect::<Result<Vec<_>, _>>()?;
        trace!("seeded {} random genomes", genomes.len());
        self.install(Population::from_genomes(genomes), ids)
    }

    /// Seed from caller-supplied phenotypes, one per population slot
    ///
    /// Values are clamped into bounds and quantized by the codec.
    pub fn seed_from_phenotypes(&mut self, phenotypes: &[Vec<f64>]) -> EvoResult<()> {
        if phenotypes.len() != self.config.population_size {
            return Err(EvolutionError::Configuration(format!(
                "expected {} phenotypes, got {}",
                self.config.population_size,
                phenotypes.len()
            )));
        }
        let mut ids = IdAllocator::new();
        let genomes = phenotypes
            .iter()
            .map(|p| Genome::from_phenotype(ids.allocate(), p, &self.codec))
            .collect::<Result<Vec<_>, _>>()?;
        trace!("seeded {} genomes from phenotypes", genomes.len());
        self.install(Population::from_genomes(genomes), ids)
    }

    fn install(&mut self, population: Population, ids: IdAllocator) -> EvoResult<()> {
        self.population = population;
        self.ids = ids;
        self.evaluations = 0;
        self.stats = EvolutionStats::new();
        self.state = GaState::Seeded;
        self.evaluate_population()
    }

    /// Evaluate every genome lacking a fitness and move to `Evaluated`
    ///
    /// Records generation statistics on the `Seeded -> Evaluated` transition.
    pub fn evaluate_population(&mut self) -> EvoResult<()> {
        match self.state {
            GaState::Unseeded => return Err(EvolutionError::EmptyPopulation),
            GaState::Terminated => return Err(EvolutionError::Terminated),
            GaState::Evaluated | GaState::Evolving => return Ok(()),
            GaState::Seeded => {}
        }

        let start = Instant::now();
        let before = self.population.count_evaluated();
        // fitness computed before a failure stays cached
        let result = self.population.evaluate(&self.objective, self.config.goal);
        let elapsed = start.elapsed();
        self.evaluations += self.population.count_evaluated() - before;
        result?;
        self.state = GaState::Evaluated;

        let timing = TimingStats::new()
            .with_evaluation(elapsed)
            .with_total(elapsed);
        self.publish(false, timing);
        Ok(())
    }

    /// Advance one step with the configured scheme
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> EvoResult<GenerationStats> {
        match self.config.scheme {
            GenerationScheme::Generational => self.evolve_one_generation(rng),
            GenerationScheme::SteadyState => self.evolve_steady_state(rng),
        }
    }

    /// Replace the whole population by pairwise mating
    ///
    /// The population is shuffled and paired; each pair is crossed, both
    /// children mutated and evaluated, and two of the four survive. An odd
    /// leftover mates with a fresh random genome and only its first survivor
    /// is kept. On error nothing is committed.
    pub fn evolve_one_generation<R: Rng>(&mut self, rng: &mut R) -> EvoResult<GenerationStats> {
        self.begin_step()?;
        let start = Instant::now();
        let generation = self.population.generation() + 1;
        let mut scratch = self.scratch();

        let result = self.next_generation(generation, &mut scratch, rng);
        self.finish_step(result, scratch, start)
    }

    /// One mating event: select two parents, and let two of the four
    /// candidates take the parents' slots
    pub fn evolve_steady_state<R: Rng>(&mut self, rng: &mut R) -> EvoResult<GenerationStats> {
        self.begin_step()?;
        let start = Instant::now();
        let generation = self.population.generation() + 1;
        let mut scratch = self.scratch();

        let result = self.replace_one_pair(generation, &mut scratch, rng);
        self.finish_step(result, scratch, start)
    }

    /// Seed if needed, step `generations` times and terminate
    ///
    /// Returns the best genome of the final population.
    pub fn run<R: Rng>(&mut self, generations: usize, rng: &mut R) -> EvoResult<EvolutionResult> {
        let start = Instant::now();
        match self.state {
            GaState::Unseeded => self.seed(rng)?,
            GaState::Seeded => self.evaluate_population()?,
            GaState::Terminated => return Err(EvolutionError::Terminated),
            GaState::Evaluated | GaState::Evolving => {}
        }

        for _ in 0..generations {
            self.step(rng)?;
        }

        self.state = GaState::Terminated;
        self.stats.set_runtime(start.elapsed());

        let best = self
            .population
            .best()
            .ok_or(EvolutionError::EmptyPopulation)?
            .clone();
        let best_objective = self.config.goal.restore(best.fitness_or_worst());
        info!(
            "run finished after {} generations, {} evaluations, best {} = {}",
            self.generation(),
            self.evaluations,
            best.id(),
            best_objective
        );

        Ok(EvolutionResult {
            best,
            best_objective,
            generations: self.generation(),
            evaluations: self.evaluations,
            stats: self.stats.clone(),
        })
    }

    fn begin_step(&mut self) -> EvoResult<()> {
        match self.state {
            GaState::Unseeded => return Err(EvolutionError::EmptyPopulation),
            GaState::Terminated => return Err(EvolutionError::Terminated),
            GaState::Seeded => self.evaluate_population()?,
            GaState::Evaluated | GaState::Evolving => {}
        }
        self.population.ensure_not_empty()?;
        self.state = GaState::Evolving;
        Ok(())
    }

    fn next_generation<R: Rng>(
        &self,
        generation: usize,
        scratch: &mut Scratch,
        rng: &mut R,
    ) -> EvoResult<(Population, bool)> {
        let size = self.population.len();
        let mut order: Vec<usize> = (0..size).collect();
        order.shuffle(rng);

        let mut next = Vec::with_capacity(size);
        for pair in order.chunks(2) {
            let first = self.population[pair[0]].clone();
            match pair.get(1) {
                Some(&other) => {
                    let second = self.population[other].clone();
                    let [a, b] = self.mate(first, second, generation, scratch, rng)?;
                    next.push(a);
                    next.push(b);
                }
                None => {
                    let partner = self.fresh_genome(generation, scratch, rng)?;
                    let [a, _] = self.mate(first, partner, generation, scratch, rng)?;
                    next.push(a);
                }
            }
        }

        let mut population = Population::from_genomes(next);
        population.set_generation(generation);
        let refilled = self.repair(&mut population, generation, scratch, rng)?;
        Ok((population, refilled))
    }

    fn replace_one_pair<R: Rng>(
        &self,
        generation: usize,
        scratch: &mut Scratch,
        rng: &mut R,
    ) -> EvoResult<(Population, bool)> {
        let (i, j) = self.selection.select_pair(self.population.genomes(), rng)?;
        let first = self.population[i].clone();
        let second = self.population[j].clone();
        let [a, b] = self.mate(first, second, generation, scratch, rng)?;

        let mut population = self.population.clone();
        population.genomes_mut()[i] = a;
        population.genomes_mut()[j] = b;
        population.set_generation(generation);
        let refilled = self.repair(&mut population, generation, scratch, rng)?;
        Ok((population, refilled))
    }

    fn scratch(&self) -> Scratch {
        Scratch {
            ids: self.ids.clone(),
            evaluations: 0,
            evaluation_time: Duration::ZERO,
        }
    }

    fn finish_step(
        &mut self,
        result: EvoResult<(Population, bool)>,
        scratch: Scratch,
        start: Instant,
    ) -> EvoResult<GenerationStats> {
        let (population, refilled) = match result {
            Ok(next) => next,
            Err(e) => {
                self.state = GaState::Evaluated;
                return Err(e);
            }
        };

        self.population = population;
        self.ids = scratch.ids;
        self.evaluations += scratch.evaluations;
        self.state = GaState::Evaluated;

        let timing = TimingStats::new()
            .with_evaluation(scratch.evaluation_time)
            .with_total(start.elapsed());
        Ok(self.publish(refilled, timing))
    }

    fn publish(&mut self, refilled: bool, timing: TimingStats) -> GenerationStats {
        let stats = GenerationStats::from_population(
            &self.population,
            self.config.goal,
            self.population.generation(),
            self.evaluations,
        )
        .with_refill(refilled)
        .with_timing(timing);

        debug!(
            "generation {}: best {:.6}, mean {:.6}, worst {:.6}, most common genotype {:.2}",
            stats.generation, stats.best, stats.mean, stats.worst, stats.most_common_ratio
        );
        if let Some(observer) = self.observer.as_mut() {
            observer.on_generation(&stats);
        }
        self.stats.record(stats.clone());
        stats
    }

    fn evaluate(&self, genome: &mut Genome, scratch: &mut Scratch) -> EvoResult<()> {
        if genome.is_evaluated() {
            return Ok(());
        }
        let start = Instant::now();
        let result = genome.evaluate(&self.objective, self.config.goal);
        scratch.evaluation_time += start.elapsed();
        result?;
        scratch.evaluations += 1;
        Ok(())
    }

    fn fresh_genome<R: Rng>(
        &self,
        generation: usize,
        scratch: &mut Scratch,
        rng: &mut R,
    ) -> EvoResult<Genome> {
        let mut genome =
            Genome::random(scratch.ids.allocate(), &self.codec, rng)?.with_generation(generation);
        self.evaluate(&mut genome, scratch)?;
        Ok(genome)
    }

    /// Crossover, mutate and evaluate two children, then keep two of the four
    fn mate<R: Rng>(
        &self,
        first: Genome,
        second: Genome,
        generation: usize,
        scratch: &mut Scratch,
        rng: &mut R,
    ) -> EvoResult<[Genome; 2]> {
        let (bits1, bits2) = self
            .crossover
            .crossover(first.genotype(), second.genotype(), rng)?;

        let mut child1 = Genome::from_genotype(scratch.ids.allocate(), bits1, &self.codec)?
            .with_generation(generation);
        let mut child2 = Genome::from_genotype(scratch.ids.allocate(), bits2, &self.codec)?
            .with_generation(generation);
        child1.mutate(&self.mutation, &self.codec, rng)?;
        child2.mutate(&self.mutation, &self.codec, rng)?;
        self.evaluate(&mut child1, scratch)?;
        self.evaluate(&mut child2, scratch)?;

        let candidates = [first, second, child1, child2];
        let [a, b] = self.survivors.select(&candidates, rng)?;
        Ok([candidates[a].clone(), candidates[b].clone()])
    }

    /// Refill a degenerate population, keeping the best share
    fn repair<R: Rng>(
        &self,
        population: &mut Population,
        generation: usize,
        scratch: &mut Scratch,
        rng: &mut R,
    ) -> EvoResult<bool> {
        let ratio = population.most_common_genotype_ratio();
        if ratio <= self.config.degeneracy_threshold {
            return Ok(false);
        }

        let size = population.len();
        let keep = ((size as f64 * self.config.refill_keep_fraction).ceil() as usize).clamp(1, size);
        if keep == size {
            return Ok(false);
        }

        population.truncate_to_best(keep);
        while population.len() < size {
            population.push(self.fresh_genome(generation, scratch, rng)?);
        }
        info!(
            "generation {}: most common genotype holds {:.2} of the population, kept {} and refilled {}",
            generation,
            ratio,
            keep,
            size - keep
        );
        Ok(true)
    }
}
