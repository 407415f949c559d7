//! Observability for the join engine.
//!
//! - `metrics` - counters and histograms for join attempts and meeting writes

pub mod metrics;
