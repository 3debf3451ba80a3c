//! Output module for reporting on harvested data
//!
//! This module handles:
//! - Querying summary statistics from the store
//! - Printing them in a human-readable form

pub mod stats;

pub use stats::{load_statistics, print_statistics, HarvestStatistics};
