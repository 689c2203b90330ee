//! JP Cars integration for TIV
//!
//! This crate provides the JP Cars implementation of the PricingCatalog trait.

mod client;
mod config;


pub use client::JpCarsClient;
pub use config::JpCarsConfig;

// Re-export core types for convenience
pub use tiv_core::{CatalogValuation, Liquidity, PricingCatalog, SearchWindow};
