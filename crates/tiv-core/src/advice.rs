//! Synthesized advice and the reasoning-step contract

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{CatalogValuation, InternalComparison, MarketAnalysis, Result, VehicleDescriptor};

/// The final trade-in recommendation shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advice {
    /// Proposed trade-in price in euros
    pub trade_in_price: f64,
    /// Supporting rationale in plain language
    pub rationale: String,
    /// Risk and caveat flags ("single data source", "slow mover", ...)
    pub risk_flags: Vec<String>,
    /// Model-reported confidence in its own recommendation (0.0 to 1.0)
    pub confidence: f64,
    /// Identifier of the model that produced this advice, kept for audit
    pub model_id: String,
}

/// Trait for the advice reasoning step
///
/// Unlike the data-gathering stages this call has no fallback object: a
/// failed synthesis fails the whole run, because an un-synthesized result
/// has no value to someone making a purchase decision.
#[async_trait]
pub trait AdviceSynthesizer: Send + Sync {
    /// Produce a recommendation from the full merged stage context
    ///
    /// Any of the three stage results may be its canonical fallback object;
    /// the synthesizer must treat "unavailable" as reduced evidence, not as
    /// an error.
    async fn synthesize(
        &self,
        descriptor: &VehicleDescriptor,
        catalog: &CatalogValuation,
        market: &MarketAnalysis,
        history: &InternalComparison,
    ) -> Result<Advice>;
}
