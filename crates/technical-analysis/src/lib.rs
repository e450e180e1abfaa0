pub mod analyzer;
pub mod crossover;
pub mod indicators;

#[cfg(test)]
mod indicators_tests;

pub use analyzer::*;
pub use crossover::*;
pub use indicators::*;
