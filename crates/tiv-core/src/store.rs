//! Valuation-store contract (audit persistence)

use async_trait::async_trait;

use crate::{Result, ValuationRecord};

/// Trait for the valuation datastore
///
/// Write-only from the pipeline's perspective: the orchestrator performs
/// exactly one insert per completed run and never updates a stored record.
#[async_trait]
pub trait ValuationStore: Send + Sync {
    /// Persist a completed record and return the assigned identifier
    async fn insert(&self, record: &ValuationRecord) -> Result<String>;
}
