//! Analysis modules.
//!
//! The aggregation layer: stateless queries over a dataset selection.

pub mod aggregator;

pub use aggregator::*;
