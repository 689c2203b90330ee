//! Progress events emitted by the orchestrator during a run
//!
//! The pipeline holds no global state; instead the orchestrator can carry an
//! optional event sender and emit a snapshot of the incrementally-populated
//! record after every stage. When no sender is attached, nothing is emitted
//! and the pipeline is unaffected.

use tokio::sync::mpsc;

use crate::ValuationRecord;

/// The pipeline stages a caller can observe completing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Pricing-catalog valuation (stage 1, concurrent with History)
    Catalog,
    /// Internal sales-history match (stage 1, concurrent with Catalog)
    History,
    /// Live market-listing scan (stage 2)
    MarketScan,
    /// Advice synthesis (stage 3)
    Advice,
}

impl Stage {
    /// Get the display name for this stage
    pub fn display_name(&self) -> &'static str {
        match self {
            Stage::Catalog => "catalog valuation",
            Stage::History => "internal sales history",
            Stage::MarketScan => "market scan",
            Stage::Advice => "advice synthesis",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One observable step of a valuation run
///
/// Every variant carries a clone of the in-flight record, so an observer
/// sees exactly the partial state the orchestrator holds at that moment.
#[derive(Debug, Clone)]
pub enum ValuationEvent {
    /// A stage finished (successfully or via fallback substitution)
    StageCompleted {
        stage: Stage,
        snapshot: ValuationRecord,
    },
    /// The run completed; the snapshot carries the final record
    Completed { snapshot: ValuationRecord },
    /// The run failed; the snapshot carries the failed record
    Failed {
        reason: String,
        snapshot: ValuationRecord,
    },
}

/// Sending half of a progress channel
pub type ProgressSender = mpsc::UnboundedSender<ValuationEvent>;

/// Receiving half of a progress channel
pub type ProgressReceiver = mpsc::UnboundedReceiver<ValuationEvent>;

/// Create an unbounded progress channel for one or more runs
pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    mpsc::unbounded_channel()
}
