//! Engine configuration
//!
//! A plain serializable struct with defaults, validated once before an engine
//! is built.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{EvoResult, EvolutionError};
use crate::fitness::objective::OptimizationGoal;
use crate::genome::bounds::{Bounds, MultiBounds};
use crate::genome::codec::{BitCodec, VectorCodec};
use crate::operators::selection::SelectionStrategy;

/// Which parent selection the steady-state scheme uses
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKind {
    Tournament { size: usize },
    Roulette,
}

impl Default for SelectionKind {
    fn default() -> Self {
        Self::Tournament { size: 3 }
    }
}

impl SelectionKind {
    /// Instantiate the strategy for a goal
    pub fn strategy(self, goal: OptimizationGoal) -> SelectionStrategy {
        match self {
            Self::Tournament { size } => SelectionStrategy::tournament(size, goal),
            Self::Roulette => SelectionStrategy::roulette(goal),
        }
    }
}

/// How one call to `step` advances the population
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationScheme {
    /// Shuffle, pair everyone, replace the whole population
    #[default]
    Generational,
    /// One selected pair mates and its survivors replace the parents
    SteadyState,
}

/// Configuration for the binary GA
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinaryGAConfig {
    /// Population size
    pub population_size: usize,
    /// Number of real-valued dimensions
    pub num_vars: usize,
    /// Bits per encoded dimension (sign + exponent + mantissa)
    pub bits_per_var: usize,
    /// Width of the exponent field
    pub exponent_bits: usize,
    /// Search window per dimension
    pub bounds: MultiBounds,
    /// Per-bit flip probability
    pub mutation_rate: f64,
    /// Cut points per crossover
    pub crossover_points: usize,
    /// Minimize or maximize the objective
    pub goal: OptimizationGoal,
    /// Parent selection for the steady-state scheme
    pub selection: SelectionKind,
    /// Most-common-genotype share above which the population is refilled
    pub degeneracy_threshold: f64,
    /// Share of the best genomes a refill keeps
    pub refill_keep_fraction: f64,
    /// Generational or steady-state stepping
    pub scheme: GenerationScheme,
}

impl Default for BinaryGAConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            num_vars: 3,
            bits_per_var: 16,
            exponent_bits: 5,
            bounds: MultiBounds::uniform(Bounds::symmetric(10.0), 3),
            mutation_rate: 0.01,
            crossover_points: 2,
            goal: OptimizationGoal::Minimize,
            selection: SelectionKind::default(),
            degeneracy_threshold: 0.95,
            refill_keep_fraction: 0.5,
            scheme: GenerationScheme::Generational,
        }
    }
}

impl BinaryGAConfig {
    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> EvoResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the configuration as pretty-printed JSON
    pub fn to_json(&self) -> EvoResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Total genotype length in bits
    pub fn genotype_len(&self) -> usize {
        self.num_vars * self.bits_per_var
    }

    /// Build the per-dimension codec
    pub fn bit_codec(&self) -> EvoResult<BitCodec> {
        BitCodec::new(self.bits_per_var, self.exponent_bits)
    }

    /// Build the whole-genotype codec
    pub fn vector_codec(&self) -> EvoResult<VectorCodec> {
        Ok(VectorCodec::new(self.bit_codec()?, self.bounds.clone()))
    }

    /// Check every parameter, warning about bounds the codec cannot reach
    pub fn validate(&self) -> EvoResult<()> {
        if self.population_size == 0 {
            return Err(config_error("population_size must be positive"));
        }
        if self.num_vars == 0 {
            return Err(config_error("num_vars must be positive"));
        }
        let codec = self.vector_codec()?;

        if self.bounds.dimension() != self.num_vars {
            return Err(config_error(format!(
                "expected {} bounds, got {}",
                self.num_vars,
                self.bounds.dimension()
            )));
        }
        if let Some(i) = self.bounds.iter().position(|b| !b.is_valid()) {
            return Err(config_error(format!(
                "bounds for dimension {} must be finite with low < high and a finite width",
                i
            )));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(config_error(format!(
                "mutation_rate must be in [0, 1], got {}",
                self.mutation_rate
            )));
        }

        let length = self.genotype_len();
        if self.crossover_points == 0 || self.crossover_points >= length {
            return Err(config_error(format!(
                "crossover_points must be in [1, {}), got {}",
                length, self.crossover_points
            )));
        }
        if let SelectionKind::Tournament { size } = self.selection {
            if size < 2 {
                return Err(config_error(format!(
                    "tournament size must be at least 2, got {}",
                    size
                )));
            }
        }
        if !(self.degeneracy_threshold > 0.0 && self.degeneracy_threshold <= 1.0) {
            return Err(config_error(format!(
                "degeneracy_threshold must be in (0, 1], got {}",
                self.degeneracy_threshold
            )));
        }
        if !(self.refill_keep_fraction > 0.0 && self.refill_keep_fraction <= 1.0) {
            return Err(config_error(format!(
                "refill_keep_fraction must be in (0, 1], got {}",
                self.refill_keep_fraction
            )));
        }

        let saturating = codec.saturating_dimensions();
        if !saturating.is_empty() {
            warn!(
                "dimensions {:?} extend past the largest encodable magnitude {}; values there saturate",
                saturating,
                codec.codec().max_magnitude()
            );
        }
        Ok(())
    }
}

fn config_error(message: impl Into<String>) -> EvolutionError {
    EvolutionError::Configuration(message.into())
}
