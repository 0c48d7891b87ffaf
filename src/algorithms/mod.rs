//! Evolutionary algorithms
//!
//! This module provides the binary-encoded GA engine and its configuration.

pub mod binary_ga;
pub mod config;

pub mod prelude {
    pub use super::binary_ga::*;
    pub use super::config::*;
}
