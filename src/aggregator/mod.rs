//! Aggregation of call records into line and scope statistics.
//!
//! This module turns raw call records into:
//! - Per-line stats (sums plus mean tensor-core ratio)
//! - Combined stats for scopes and whole files

pub mod lines;
pub mod stats;

// Re-export main types
pub use lines::LineLookup;
pub use stats::{Stats, StatsAccumulator};
