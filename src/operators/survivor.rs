//! Survivor selection
//!
//! After crossover and mutation, each pairing has four evaluated candidates:
//! the two parents and their two children. Two of them are kept.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::OperatorError;
use crate::fitness::objective::OptimizationGoal;
use crate::genome::genome::Genome;
use crate::operators::selection::{draw_two_distinct, selection_weights};

/// Keeps 2 of 4 candidates, drawn without replacement in proportion to the
/// same direction-aware weights roulette selection uses
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct SurvivorSelector {
    pub goal: OptimizationGoal,
}

impl SurvivorSelector {
    pub fn new(goal: OptimizationGoal) -> Self {
        Self { goal }
    }

    /// Pick the indices (into `candidates`) of the two survivors
    ///
    /// Every candidate must already carry a fitness.
    pub fn select<R: Rng>(
        &self,
        candidates: &[Genome; 4],
        rng: &mut R,
    ) -> Result<[usize; 2], OperatorError> {
        let mut raw = [0.0; 4];
        for (slot, candidate) in raw.iter_mut().zip(candidates) {
            *slot = candidate.objective_value(self.goal).ok_or_else(|| {
                OperatorError::SelectionFailed(format!(
                    "survivor candidate {} has not been evaluated",
                    candidate.id()
                ))
            })?;
        }

        let weights = selection_weights(&raw, self.goal);
        let (first, second) = draw_two_distinct(&weights, rng)?;
        Ok([first, second])
    }
}
