//! Fundscope - startup funding analytics.
//!
//! Loads a cleaned startup-funding CSV into an immutable [`dataset::Dataset`],
//! answers aggregation queries over it ([`analysis`]), bundles those answers
//! into per-view models ([`views`]) and renders them ([`report`]).

pub mod analysis;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod models;
pub mod report;
pub mod views;
