//! Genetic operators
//!
//! This module provides selection, crossover, mutation and survivor
//! selection operators over bit-string genotypes.

pub mod crossover;
pub mod mutation;
pub mod selection;
pub mod survivor;
pub mod traits;

pub mod prelude {
    pub use super::crossover::*;
    pub use super::mutation::*;
    pub use super::selection::*;
    pub use super::survivor::*;
    pub use super::traits::*;
}
