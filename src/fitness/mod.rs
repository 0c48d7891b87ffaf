//! Objective functions and benchmarks
//!
//! This module provides the objective abstraction the engine evaluates and a
//! couple of benchmark functions to plug into it.

pub mod benchmarks;
pub mod objective;

pub mod prelude {
    pub use super::benchmarks::*;
    pub use super::objective::*;
}
