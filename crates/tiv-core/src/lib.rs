//! Core traits and types for TIV (Trade-In Valuator)
//!
//! This crate defines the fundamental traits and types used across the TIV
//! valuation pipeline. It provides the vehicle descriptor, the result types
//! produced by each pipeline stage, the provider-facing contracts
//! (registration lookup, pricing catalog, market scan, sales history, advice
//! synthesis, valuation store), and the error taxonomy, making the pipeline
//! test-friendly and provider-agnostic.

pub mod advice;
pub mod catalog;
pub mod error;
pub mod history;
pub mod market;
pub mod progress;
pub mod record;
pub mod registration;
pub mod store;
pub mod vehicle;

pub use advice::{Advice, AdviceSynthesizer};
pub use catalog::{CatalogValuation, Liquidity, PriceRange, PricingCatalog, SearchWindow};
pub use error::{Error, Result};
pub use history::{HistoricalSale, InternalComparison, SalesChannel, SalesHistory};
pub use market::{Listing, MarketAnalysis, MarketScanner};
pub use progress::{progress_channel, ProgressReceiver, ProgressSender, Stage, ValuationEvent};
pub use record::{ValuationRecord, ValuationStatus, ValuationType};
pub use registration::RegistrationLookup;
pub use store::ValuationStore;
pub use vehicle::{FuelType, Transmission, VehicleDescriptor};
