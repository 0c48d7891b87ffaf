//! Objective traits
//!
//! The engine treats the objective as an external, pure function from a
//! phenotype to a scalar. Fitness is stored goal-adjusted so that lower is
//! always better internally.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::error::{EvoResult, EvolutionError};

/// Whether the objective is minimized or maximized
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationGoal {
    #[default]
    Minimize,
    Maximize,
}

impl OptimizationGoal {
    /// Sign applied to raw objective values: +1 to minimize, -1 to maximize
    pub fn sign(self) -> f64 {
        match self {
            Self::Minimize => 1.0,
            Self::Maximize => -1.0,
        }
    }

    /// Convert a raw objective value into adjusted fitness (lower is better)
    pub fn adjust(self, raw: f64) -> f64 {
        self.sign() * raw
    }

    /// Convert adjusted fitness back into the raw objective value
    pub fn restore(self, adjusted: f64) -> f64 {
        self.sign() * adjusted
    }

    /// Check if raw value `a` is strictly better than raw value `b`
    pub fn is_better(self, a: f64, b: f64) -> bool {
        match self {
            Self::Minimize => a < b,
            Self::Maximize => a > b,
        }
    }
}

/// Objective function trait
///
/// Implementations must be total over the bounded search space. A returned
/// error aborts the generation step in progress without committing it.
pub trait Objective {
    /// Evaluate a phenotype
    fn evaluate(&self, phenotype: &[f64]) -> EvoResult<f64>;
}

impl<T: Objective + ?Sized> Objective for &T {
    fn evaluate(&self, phenotype: &[f64]) -> EvoResult<f64> {
        (**self).evaluate(phenotype)
    }
}

impl<T: Objective + ?Sized> Objective for Box<T> {
    fn evaluate(&self, phenotype: &[f64]) -> EvoResult<f64> {
        (**self).evaluate(phenotype)
    }
}

/// A simple function wrapper for infallible objectives
pub struct FnObjective<F>
where
    F: Fn(&[f64]) -> f64,
{
    f: F,
}

impl<F> FnObjective<F>
where
    F: Fn(&[f64]) -> f64,
{
    /// Create a new function-based objective
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Objective for FnObjective<F>
where
    F: Fn(&[f64]) -> f64,
{
    fn evaluate(&self, phenotype: &[f64]) -> EvoResult<f64> {
        Ok((self.f)(phenotype))
    }
}

/// A function wrapper for objectives that can fail
///
/// Errors are reported as [`EvolutionError::FitnessEvaluation`] carrying the
/// error's display text.
pub struct FallibleObjective<F> {
    f: F,
}

impl<F> FallibleObjective<F> {
    /// Create a new fallible function-based objective
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F, E> Objective for FallibleObjective<F>
where
    F: Fn(&[f64]) -> Result<f64, E>,
    E: Display,
{
    fn evaluate(&self, phenotype: &[f64]) -> EvoResult<f64> {
        (self.f)(phenotype).map_err(|e| EvolutionError::FitnessEvaluation(e.to_string()))
    }
}
