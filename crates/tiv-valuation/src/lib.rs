//! Valuation orchestration for TIV
//!
//! This crate sequences the trade-in pipeline: a concurrent stage-1 fan-out
//! (pricing catalog + internal sales history), a stage-2 market scan fed by
//! the catalog's window, a stage-3 advice synthesis over the merged context,
//! and a single audit insert on completion. Data-gathering failures degrade
//! to canonical fallback objects; a synthesis failure fails the run.

mod orchestrator;

pub use orchestrator::{StageTimeouts, ValuationOrchestrator};

// Re-export core types for convenience
pub use tiv_core::{
    Error, Result, Stage, ValuationEvent, ValuationRecord, ValuationStatus, VehicleDescriptor,
};
