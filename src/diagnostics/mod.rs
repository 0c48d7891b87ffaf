//! Diagnostics and statistics
//!
//! This module provides per-generation statistics, the observer hook the
//! engine reports them through, and the result of a complete run. Values are
//! raw objective values; "best" and "worst" follow the optimization goal.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::fitness::objective::OptimizationGoal;
use crate::genome::genome::Genome;
use crate::population::population::Population;

/// Statistics for a single generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation number
    pub generation: usize,
    /// Total objective evaluations so far
    pub evaluations: usize,
    /// Best objective value in this generation
    pub best: f64,
    /// Median objective value
    pub median: f64,
    /// Worst objective value in this generation
    pub worst: f64,
    /// Mean objective value
    pub mean: f64,
    /// Population standard deviation of the objective values
    pub std_dev: f64,
    /// Share of the population carried by the most frequent genotype
    pub most_common_ratio: f64,
    /// Whether a degeneracy refill ran this generation
    pub refilled: bool,
    /// Timing information
    pub timing: TimingStats,
}

/// Timing statistics
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingStats {
    /// Time spent in the objective (ms)
    pub evaluation_ms: f64,
    /// Total generation time (ms)
    pub total_ms: f64,
}

impl TimingStats {
    /// Create new timing stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Set evaluation time
    pub fn with_evaluation(mut self, duration: Duration) -> Self {
        self.evaluation_ms = duration.as_secs_f64() * 1000.0;
        self
    }

    /// Set total time
    pub fn with_total(mut self, duration: Duration) -> Self {
        self.total_ms = duration.as_secs_f64() * 1000.0;
        self
    }
}

impl GenerationStats {
    /// Compute statistics from a population
    ///
    /// Unevaluated genomes are ignored. An empty or unevaluated population
    /// yields NaN summary values.
    pub fn from_population(
        population: &Population,
        goal: OptimizationGoal,
        generation: usize,
        evaluations: usize,
    ) -> Self {
        let mut values = population.objective_values(goal);
        let most_common_ratio = population.most_common_genotype_ratio();

        if values.is_empty() {
            return Self {
                generation,
                evaluations,
                best: f64::NAN,
                median: f64::NAN,
                worst: f64::NAN,
                mean: f64::NAN,
                std_dev: f64::NAN,
                most_common_ratio,
                refilled: false,
                timing: TimingStats::default(),
            };
        }

        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let lowest = values[0];
        let highest = values[values.len() - 1];
        let (best, worst) = match goal {
            OptimizationGoal::Minimize => (lowest, highest),
            OptimizationGoal::Maximize => (highest, lowest),
        };

        let n = values.len();
        let mean = values.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 0 {
            (values[n / 2 - 1] + values[n / 2]) / 2.0
        } else {
            values[n / 2]
        };
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;

        Self {
            generation,
            evaluations,
            best,
            median,
            worst,
            mean,
            std_dev: variance.sqrt(),
            most_common_ratio,
            refilled: false,
            timing: TimingStats::default(),
        }
    }

    /// Mark whether the degeneracy refill ran
    pub fn with_refill(mut self, refilled: bool) -> Self {
        self.refilled = refilled;
        self
    }

    /// Set timing information
    pub fn with_timing(mut self, timing: TimingStats) -> Self {
        self.timing = timing;
        self
    }
}

/// Receives the statistics of every committed generation
///
/// Implemented for any `FnMut(&GenerationStats)`.
pub trait GenerationObserver {
    fn on_generation(&mut self, stats: &GenerationStats);
}

impl<F> GenerationObserver for F
where
    F: FnMut(&GenerationStats),
{
    fn on_generation(&mut self, stats: &GenerationStats) {
        self(stats)
    }
}

/// Statistics collector for an entire evolution run
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EvolutionStats {
    /// Statistics per generation
    pub generations: Vec<GenerationStats>,
    /// Total runtime in milliseconds
    pub total_runtime_ms: f64,
}

impl EvolutionStats {
    /// Create a new stats collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a generation's statistics
    pub fn record(&mut self, stats: GenerationStats) {
        self.generations.push(stats);
    }

    /// Get the number of generations recorded
    pub fn num_generations(&self) -> usize {
        self.generations.len()
    }

    /// Number of generations in which a refill ran
    pub fn refill_count(&self) -> usize {
        self.generations.iter().filter(|g| g.refilled).count()
    }

    /// Get the final best objective value
    pub fn final_best(&self) -> Option<f64> {
        self.generations.last().map(|g| g.best)
    }

    /// Get the history of best objective values
    pub fn best_history(&self) -> Vec<f64> {
        self.generations.iter().map(|g| g.best).collect()
    }

    /// Get the history of mean objective values
    pub fn mean_history(&self) -> Vec<f64> {
        self.generations.iter().map(|g| g.mean).collect()
    }

    /// Set the total runtime
    pub fn set_runtime(&mut self, duration: Duration) {
        self.total_runtime_ms = duration.as_secs_f64() * 1000.0;
    }

    /// Get a summary of the evolution run
    pub fn summary(&self) -> String {
        format!(
            "Evolution Summary:\n\
             - Generations: {}\n\
             - Final best: {:.6}\n\
             - Refills: {}\n\
             - Runtime: {:.2}ms",
            self.num_generations(),
            self.final_best().unwrap_or(f64::NAN),
            self.refill_count(),
            self.total_runtime_ms,
        )
    }
}

impl GenerationObserver for EvolutionStats {
    fn on_generation(&mut self, stats: &GenerationStats) {
        self.record(stats.clone());
    }
}

/// Result of an evolution run
#[derive(Clone, Debug)]
pub struct EvolutionResult {
    /// The best genome found
    pub best: Genome,
    /// Its raw objective value
    pub best_objective: f64,
    /// Number of generations completed
    pub generations: usize,
    /// Total objective evaluations
    pub evaluations: usize,
    /// Statistics for the run
    pub stats: EvolutionStats,
}

impl EvolutionResult {
    /// Best phenotype found
    pub fn best_phenotype(&self) -> &[f64] {
        self.best.phenotype()
    }
}

pub mod prelude {
    pub use super::{
        EvolutionResult, EvolutionStats, GenerationObserver, GenerationStats, TimingStats,
    };
}
