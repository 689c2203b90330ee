//! Market-listing analyzer for TIV
//!
//! This crate provides the live-marketplace implementation of the
//! MarketScanner trait: it builds a search query from the catalog stage's
//! window (or synthesizes one from the descriptor), scrapes the aggregator's
//! result page into listings, and reduces them to price statistics.

mod scanner;
mod stats;

pub use scanner::{AggregatorScanner, ScannerConfig};
pub use stats::summarize;

// Re-export core types for convenience
pub use tiv_core::{Listing, MarketAnalysis, MarketScanner, SearchWindow};
