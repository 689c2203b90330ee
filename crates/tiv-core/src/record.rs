//! The persisted valuation record and its lifecycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Advice, CatalogValuation, InternalComparison, MarketAnalysis, VehicleDescriptor};

/// Lifecycle status of a valuation record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationStatus {
    InProgress,
    Completed,
    Failed,
}

/// Flow discriminator for records sharing the datastore with the plain
/// valuation flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationType {
    /// Trade-in valuation (this pipeline)
    TradeIn,
    /// Plain valuation without a trade-in context
    Valuation,
}

/// The auditable unit produced by one pipeline run
///
/// Created in-progress when a run starts, populated incrementally as stages
/// complete, and immutable once completed: a new valuation always creates a
/// new record instead of mutating a historical one. The orchestrator owns
/// the in-flight record exclusively; ownership moves to the store at
/// completion, after which the record is read-only to the rest of the
/// system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationRecord {
    /// Identifier assigned by the datastore at insert; `None` until then
    /// (and left `None` when the audit write fails)
    pub id: Option<String>,
    #[serde(rename = "taxatie_type")]
    pub valuation_type: ValuationType,
    pub descriptor: VehicleDescriptor,
    pub catalog: Option<CatalogValuation>,
    pub market: Option<MarketAnalysis>,
    pub history: Option<InternalComparison>,
    pub advice: Option<Advice>,
    /// Human-readable degradation warnings accumulated during the run
    pub warnings: Vec<String>,
    pub status: ValuationStatus,
    /// Overall confidence computed at completion, see
    /// [`compute_confidence`](ValuationRecord::compute_confidence)
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
}

impl ValuationRecord {
    /// Create a fresh in-progress trade-in record for one pipeline run
    pub fn new_trade_in(descriptor: VehicleDescriptor) -> Self {
        Self {
            id: None,
            valuation_type: ValuationType::TradeIn,
            descriptor,
            catalog: None,
            market: None,
            history: None,
            advice: None,
            warnings: Vec::new(),
            status: ValuationStatus::InProgress,
            confidence: 0.0,
            created_at: Utc::now(),
        }
    }

    /// Append a degradation warning
    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Whether any source degraded to its fallback object
    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Mark the run completed and freeze the overall confidence
    pub fn mark_completed(&mut self) {
        self.confidence = self.compute_confidence();
        self.status = ValuationStatus::Completed;
    }

    /// Mark the run failed
    pub fn mark_failed(&mut self) {
        self.status = ValuationStatus::Failed;
    }

    /// Overall confidence in the assembled record
    ///
    /// Weighs the catalog's self-reported confidence against the breadth of
    /// market and internal evidence:
    /// `0.5 * catalog + 0.3 * min(primary, 8)/8 + 0.2 * min(similar, 5)/5`.
    /// Fallback objects contribute zero, so an all-fallback run scores 0.0
    /// while its warnings explain why.
    pub fn compute_confidence(&self) -> f64 {
        let catalog_term = self
            .catalog
            .as_ref()
            .map(|catalog| catalog.confidence)
            .unwrap_or(0.0);
        let market_term = self
            .market
            .as_ref()
            .map(|market| market.primary_count.min(8) as f64 / 8.0)
            .unwrap_or(0.0);
        let history_term = self
            .history
            .as_ref()
            .map(|history| history.similar_sold.len().min(5) as f64 / 5.0)
            .unwrap_or(0.0);

        (0.5 * catalog_term + 0.3 * market_term + 0.2 * history_term).clamp(0.0, 1.0)
    }
}
