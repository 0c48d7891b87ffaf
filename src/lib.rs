//! # binary-evo
//!
//! A genetic algorithm over bit-encoded real vectors.
//!
//! Each dimension of a candidate solution is stored as a small
//! sign/exponent/mantissa float inside a fixed-width bit string. Evolution
//! works on the bits (multi-point crossover, bit-flip mutation) while the
//! objective sees the decoded, bounds-clamped real vector.
//!
//! ## Core Concepts
//!
//! - **Codec**: `BitCodec` quantizes each value with a configurable exponent
//!   and mantissa width; zero is exact, overflow saturates, underflow flushes
//! - **Survivor replacement**: two of each parent/child quartet survive,
//!   drawn in proportion to fitness
//! - **Degeneracy repair**: when one genotype dominates, the worst part of
//!   the population is replaced by fresh random genomes
//! - **Reproducibility**: every stochastic call takes the caller's RNG
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use binary_evo::prelude::*;
//! use rand::SeedableRng;
//!
//! # fn main() -> Result<(), EvolutionError> {
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//!
//! let result = BinaryGA::builder()
//!     .population_size(50)
//!     .search_space(3, Bounds::symmetric(10.0))
//!     .bits_per_var(16)
//!     .exponent_bits(5)
//!     .mutation_rate(0.01)
//!     .objective(Sphere::new(3))
//!     .build()?
//!     .run(200, &mut rng)?;
//!
//! println!("best {:?} -> {}", result.best_phenotype(), result.best_objective);
//! # Ok(())
//! # }
//! ```

pub mod algorithms;
pub mod diagnostics;
pub mod error;
pub mod fitness;
pub mod genome;
pub mod operators;
pub mod population;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithms::prelude::*;
    pub use crate::diagnostics::prelude::*;
    pub use crate::error::*;
    pub use crate::fitness::prelude::*;
    pub use crate::genome::prelude::*;
    pub use crate::operators::prelude::*;
    pub use crate::population::prelude::*;
}
