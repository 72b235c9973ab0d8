//! Sheet/inventory allocation optimizer for `cutplan`.
//!
//! Expands part requirements into instances, orders them, proposes placements
//! through a selectable strategy and orchestrates the sheet lifecycle, producing
//! a fully inspectable [`solution::Solution`]. Deterministic: identical inputs
//! yield identical placement sets.

pub mod config;
pub mod packer;
pub mod solution;
pub mod strategy;
