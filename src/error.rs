//! Error types for binary-evo
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Error type for genome representation failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenomeError {
    /// A genotype (or a per-dimension slice of one) has the wrong number of bits
    #[error("Malformed genotype: expected {expected} bits, got {actual}")]
    MalformedGenotype { expected: usize, actual: usize },

    /// Dimension mismatch between a phenotype and its bounds
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A bit-string literal contained something other than '0' or '1'
    #[error("Invalid bit character {0:?}")]
    InvalidBitChar(char),
}

/// Error type for operator failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OperatorError {
    /// Crossover parents have genotypes of different lengths
    #[error("Length mismatch: parent genotypes have {left} and {right} bits")]
    LengthMismatch { left: usize, right: usize },

    /// Number of cut points is outside `[1, length)`
    #[error("Invalid cut count: {points} points for a genotype of {length} bits")]
    InvalidCutCount { points: usize, length: usize },

    /// Not enough individuals to run the selection
    #[error("Population too small: {population} individuals, need at least {required}")]
    PopulationTooSmall { population: usize, required: usize },

    /// Selection operation failed
    #[error("Selection failed: {0}")]
    SelectionFailed(String),
}

/// Top-level error type for evolution operations
#[derive(Debug, Error)]
pub enum EvolutionError {
    /// Genome error
    #[error("Genome error: {0}")]
    Genome(#[from] GenomeError),

    /// Operator error
    #[error("Operator error: {0}")]
    Operator(#[from] OperatorError),

    /// The objective function failed
    #[error("Fitness evaluation failed: {0}")]
    FitnessEvaluation(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Configuration could not be parsed
    #[error("Configuration parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The engine has no population yet
    #[error("Empty population")]
    EmptyPopulation,

    /// The run already reached its generation count
    #[error("Evolution already terminated")]
    Terminated,
}

/// Result type alias for evolution operations
pub type EvoResult<T> = Result<T, EvolutionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genome_error_display() {
        let err = GenomeError::MalformedGenotype {
            expected: 16,
            actual: 15,
        };
        assert_eq!(
            err.to_string(),
            "Malformed genotype: expected 16 bits, got 15"
        );

        let err = GenomeError::DimensionMismatch {
            expected: 3,
            actual: 2,
        };
        assert_eq!(err.to_string(), "Dimension mismatch: expected 3, got 2");

        let err = GenomeError::InvalidBitChar('x');
        assert_eq!(err.to_string(), "Invalid bit character 'x'");
    }

    #[test]
    fn test_operator_error_display() {
        let err = OperatorError::LengthMismatch { left: 8, right: 16 };
        assert_eq!(
            err.to_string(),
            "Length mismatch: parent genotypes have 8 and 16 bits"
        );

        let err = OperatorError::InvalidCutCount {
            points: 8,
            length: 8,
        };
        assert_eq!(
            err.to_string(),
            "Invalid cut count: 8 points for a genotype of 8 bits"
        );

        let err = OperatorError::PopulationTooSmall {
            population: 2,
            required: 3,
        };
        assert_eq!(
            err.to_string(),
            "Population too small: 2 individuals, need at least 3"
        );
    }

    #[test]
    fn test_evolution_error_from_genome_error() {
        let genome_err = GenomeError::MalformedGenotype {
            expected: 8,
            actual: 7,
        };
        let evo_err: EvolutionError = genome_err.into();
        assert!(matches!(evo_err, EvolutionError::Genome(_)));
    }

    #[test]
    fn test_evolution_error_from_operator_error() {
        let op_err = OperatorError::InvalidCutCount {
            points: 0,
            length: 8,
        };
        let evo_err: EvolutionError = op_err.into();
        assert!(matches!(
            evo_err,
            EvolutionError::Operator(OperatorError::InvalidCutCount { .. })
        ));
    }

    #[test]
    fn test_evolution_error_from_json_error() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let evo_err: EvolutionError = json_err.into();
        assert!(evo_err.to_string().starts_with("Configuration parse error"));
    }
}
