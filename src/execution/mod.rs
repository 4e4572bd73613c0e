//! Plan execution: the evaluator and the physical operators

pub mod aggregator;
pub mod executor;
pub mod expression;
pub mod join;
pub mod window;

pub use executor::Engine;
