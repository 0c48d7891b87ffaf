//! Genome representation
//!
//! This module provides the bit-string genotype, the float codec that maps
//! it to a bounded real vector, and the `Genome` that ties the two together.

pub mod bit_string;
pub mod bounds;
pub mod codec;
#[allow(clippy::module_inception)]
pub mod genome;

pub mod prelude {
    pub use super::bit_string::*;
    pub use super::bounds::*;
    pub use super::codec::*;
    pub use super::genome::*;
}
