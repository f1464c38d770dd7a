//! Analysis modules.
//!
//! This module holds the matchup aggregation that sits between the Stats
//! API client and the output surfaces.

pub mod aggregator;

pub use aggregator::*;
