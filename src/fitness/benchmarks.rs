//! Benchmark objective functions
//!
//! Standard test functions for exercising the engine. Both are minimized,
//! with their global optimum at the origin.

use std::f64::consts::PI;

use crate::error::{EvoResult, GenomeError};
use crate::fitness::objective::Objective;

fn check_dimension(expected: Option<usize>, x: &[f64]) -> EvoResult<()> {
    match expected {
        Some(expected) if expected != x.len() => Err(GenomeError::DimensionMismatch {
            expected,
            actual: x.len(),
        }
        .into()),
        _ => Ok(()),
    }
}

/// Sphere function: f(x) = Σxᵢ²
///
/// Unimodal, convex, separable. Optimum at origin.
#[derive(Clone, Debug, Default)]
pub struct Sphere {
    dimension: Option<usize>,
}

impl Sphere {
    /// Create a Sphere function that checks the input dimension
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: Some(dimension),
        }
    }

    /// Create a Sphere function accepting any dimension
    pub fn any_dimension() -> Self {
        Self { dimension: None }
    }
}

impl Objective for Sphere {
    fn evaluate(&self, x: &[f64]) -> EvoResult<f64> {
        check_dimension(self.dimension, x)?;
        Ok(x.iter().map(|xi| xi * xi).sum())
    }
}

/// Rastrigin function: f(x) = 10n + Σ(xᵢ² - 10cos(2πxᵢ))
///
/// Highly multimodal with a regular grid of local minima.
#[derive(Clone, Debug)]
pub struct Rastrigin {
    dimension: usize,
}

impl Rastrigin {
    /// Create a new Rastrigin function
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Objective for Rastrigin {
    fn evaluate(&self, x: &[f64]) -> EvoResult<f64> {
        check_dimension(Some(self.dimension), x)?;
        let n = x.len() as f64;
        Ok(10.0 * n
            + x.iter()
                .map(|xi| xi * xi - 10.0 * (2.0 * PI * xi).cos())
                .sum::<f64>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvolutionError;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_sphere() {
        let sphere = Sphere::new(3);
        assert_eq!(sphere.evaluate(&[0.0, 0.0, 0.0]).unwrap(), 0.0);
        assert_eq!(sphere.evaluate(&[1.0, 2.0, 3.0]).unwrap(), 14.0);
    }

    #[test]
    fn test_sphere_dimension_check() {
        let err = Sphere::new(3).evaluate(&[1.0]).unwrap_err();
        assert!(matches!(
            err,
            EvolutionError::Genome(GenomeError::DimensionMismatch {
                expected: 3,
                actual: 1
            })
        ));
        assert_eq!(Sphere::any_dimension().evaluate(&[2.0]).unwrap(), 4.0);
    }

    #[test]
    fn test_rastrigin() {
        let rastrigin = Rastrigin::new(2);
        assert_abs_diff_eq!(rastrigin.evaluate(&[0.0, 0.0]).unwrap(), 0.0, epsilon = 1e-12);
        // integer points sit on local minima: f = Σxᵢ²
        assert_abs_diff_eq!(rastrigin.evaluate(&[1.0, -2.0]).unwrap(), 5.0, epsilon = 1e-9);
    }
}
