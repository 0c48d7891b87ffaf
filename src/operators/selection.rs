//! Selection operators
//!
//! This module provides parent selection: tournament and roulette wheel,
//! wrapped in the closed [`SelectionStrategy`] set the engine dispatches on.

use log::warn;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, WeightedIndex};
use serde::{Deserialize, Serialize};

use crate::error::OperatorError;
use crate::fitness::objective::OptimizationGoal;
use crate::genome::genome::Genome;
use crate::operators::traits::SelectionOperator;

/// Floor added to every selection weight so that ties never zero them out
pub const WEIGHT_EPSILON: f64 = 1e-6;

/// Second-draw attempts before a tournament excludes the first winner outright
const MAX_RESAMPLES: usize = 32;

/// Direction-aware selection weights over raw objective values
///
/// Minimizing: `max - f + ε`. Maximizing: `f - min + ε`. Better values get
/// larger weights and every weight is at least `ε`.
pub fn selection_weights(raw: &[f64], goal: OptimizationGoal) -> Vec<f64> {
    match goal {
        OptimizationGoal::Minimize => {
            let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            raw.iter().map(|f| max - f + WEIGHT_EPSILON).collect()
        }
        OptimizationGoal::Maximize => {
            let min = raw.iter().copied().fold(f64::INFINITY, f64::min);
            raw.iter().map(|f| f - min + WEIGHT_EPSILON).collect()
        }
    }
}

/// Raw objective values of a pool, unevaluated genomes mapped to the worst value
pub(crate) fn raw_values(pool: &[Genome], goal: OptimizationGoal) -> Vec<f64> {
    pool.iter()
        .map(|g| goal.restore(g.fitness_or_worst()))
        .collect()
}

/// Draw two distinct indices with probability proportional to `weights`
///
/// The second draw runs over the weights with the first pick zeroed, which
/// is the same distribution as resampling until the draws differ.
pub(crate) fn draw_two_distinct<R: Rng>(
    weights: &[f64],
    rng: &mut R,
) -> Result<(usize, usize), OperatorError> {
    let n = weights.len();
    if n < 2 {
        return Err(OperatorError::PopulationTooSmall {
            population: n,
            required: 2,
        });
    }

    let first = match weighted(weights) {
        Ok(dist) => dist.sample(rng),
        Err(reason) => {
            warn!("selection weights unusable ({}), drawing uniformly", reason);
            let first = rng.gen_range(0..n);
            return Ok((first, uniform_other(n, first, rng)));
        }
    };

    let mut rest = weights.to_vec();
    rest[first] = 0.0;
    let second = match weighted(&rest) {
        Ok(dist) => dist.sample(rng),
        // every other weight was zero
        Err(_) => uniform_other(n, first, rng),
    };
    Ok((first, second))
}

fn weighted(weights: &[f64]) -> Result<WeightedIndex<f64>, String> {
    if weights.iter().any(|w| !w.is_finite()) {
        return Err("non-finite weight".to_string());
    }
    WeightedIndex::new(weights).map_err(|e| e.to_string())
}

/// Uniform index in `0..n` other than `excluded`
fn uniform_other<R: Rng>(n: usize, excluded: usize, rng: &mut R) -> usize {
    let pick = rng.gen_range(0..n - 1);
    if pick >= excluded {
        pick + 1
    } else {
        pick
    }
}

/// Tournament selection operator
///
/// Each parent is the best of `tournament_size` individuals sampled without
/// replacement.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TournamentSelection {
    /// Tournament size (number of individuals competing)
    pub tournament_size: usize,
    /// Direction used to compare competitors
    pub goal: OptimizationGoal,
}

impl TournamentSelection {
    /// Create a new tournament selection with the given size
    pub fn new(tournament_size: usize, goal: OptimizationGoal) -> Self {
        assert!(tournament_size >= 2, "Tournament size must be at least 2");
        Self {
            tournament_size,
            goal,
        }
    }

    /// Create binary tournament selection (size = 2)
    pub fn binary(goal: OptimizationGoal) -> Self {
        Self::new(2, goal)
    }

    fn beats(&self, a: &Genome, b: &Genome) -> bool {
        match (a.objective_value(self.goal), b.objective_value(self.goal)) {
            (Some(x), Some(y)) => self.goal.is_better(x, y),
            (Some(_), None) => true,
            _ => false,
        }
    }

    /// Run one tournament over `candidates` (indices into `pool`)
    fn tournament<R: Rng>(&self, candidates: &[usize], pool: &[Genome], rng: &mut R) -> usize {
        let size = self.tournament_size.min(candidates.len());
        let mut winner: Option<usize> = None;
        for &i in candidates.choose_multiple(rng, size) {
            match winner {
                Some(w) if !self.beats(&pool[i], &pool[w]) => {}
                _ => winner = Some(i),
            }
        }
        // candidates is never empty here
        winner.unwrap_or(candidates[0])
    }
}

impl SelectionOperator for TournamentSelection {
    fn select_pair<R: Rng>(
        &self,
        pool: &[Genome],
        rng: &mut R,
    ) -> Result<(usize, usize), OperatorError> {
        let required = self.tournament_size.max(2);
        if pool.len() < required {
            return Err(OperatorError::PopulationTooSmall {
                population: pool.len(),
                required,
            });
        }

        let all: Vec<usize> = (0..pool.len()).collect();
        let first = self.tournament(&all, pool, rng);
        let first_id = pool[first].id();

        for _ in 0..MAX_RESAMPLES {
            let second = self.tournament(&all, pool, rng);
            if pool[second].id() != first_id {
                return Ok((first, second));
            }
        }

        // the first winner keeps taking every tournament; leave it out
        let rest: Vec<usize> = all
            .into_iter()
            .filter(|&i| pool[i].id() != first_id)
            .collect();
        if rest.is_empty() {
            return Err(OperatorError::SelectionFailed(format!(
                "every individual shares genome id {}",
                first_id
            )));
        }
        Ok((first, self.tournament(&rest, pool, rng)))
    }
}

/// Roulette wheel selection (fitness proportionate)
///
/// Selection probability is proportional to the direction-aware weight of
/// [`selection_weights`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RouletteSelection {
    /// Direction used to weight individuals
    pub goal: OptimizationGoal,
}

impl RouletteSelection {
    /// Create a new roulette selection
    pub fn new(goal: OptimizationGoal) -> Self {
        Self { goal }
    }
}

impl SelectionOperator for RouletteSelection {
    fn select_pair<R: Rng>(
        &self,
        pool: &[Genome],
        rng: &mut R,
    ) -> Result<(usize, usize), OperatorError> {
        let weights = selection_weights(&raw_values(pool, self.goal), self.goal);
        draw_two_distinct(&weights, rng)
    }
}

/// The parent selection schemes the engine supports
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionStrategy {
    Tournament(TournamentSelection),
    Roulette(RouletteSelection),
}

impl SelectionStrategy {
    /// Tournament of `size` individuals
    pub fn tournament(size: usize, goal: OptimizationGoal) -> Self {
        Self::Tournament(TournamentSelection::new(size, goal))
    }

    /// Fitness-proportionate roulette
    pub fn roulette(goal: OptimizationGoal) -> Self {
        Self::Roulette(RouletteSelection::new(goal))
    }
}

impl SelectionOperator for SelectionStrategy {
    fn select_pair<R: Rng>(
        &self,
        pool: &[Genome],
        rng: &mut R,
    ) -> Result<(usize, usize), OperatorError> {
        match self {
            Self::Tournament(t) => t.select_pair(pool, rng),
            Self::Roulette(r) => r.select_pair(pool, rng),
        }
    }
}
