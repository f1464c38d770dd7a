//! MLB Stats API access.
//!
//! This module provides the rate-bounded HTTP client and the JSON
//! extraction helpers for the schedule, roster and hitting stats endpoints.

pub mod client;
pub mod error;
pub mod parse;

pub use client::{StatsApiClient, StatsApiConfig};
pub use error::StatsApiError;
