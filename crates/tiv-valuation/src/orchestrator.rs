//! The pipeline orchestrator

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};

use tiv_core::{
    AdviceSynthesizer, CatalogValuation, Error, InternalComparison, MarketAnalysis,
    MarketScanner, PricingCatalog, ProgressSender, Result, SalesHistory, Stage, ValuationEvent,
    ValuationRecord, ValuationStore, VehicleDescriptor,
};

/// Per-stage timeout budgets
///
/// A timed-out call is treated identically to an errored one: fallback
/// substitution for the data-gathering stages, hard failure for synthesis.
#[derive(Debug, Clone, Copy)]
pub struct StageTimeouts {
    pub catalog: Duration,
    pub history: Duration,
    pub market: Duration,
    pub advice: Duration,
}

impl Default for StageTimeouts {
    fn default() -> Self {
        Self {
            catalog: Duration::from_secs(15),
            history: Duration::from_secs(10),
            market: Duration::from_secs(30),
            advice: Duration::from_secs(60),
        }
    }
}

/// The trade-in valuation orchestrator
///
/// Generic over the five collaborator contracts so every stage can be mocked
/// in tests. Each run owns its record exclusively; nothing is shared between
/// concurrent runs, so the orchestrator itself is freely shareable.
pub struct ValuationOrchestrator<C, H, M, A, S>
where
    C: PricingCatalog,
    H: SalesHistory,
    M: MarketScanner,
    A: AdviceSynthesizer,
    S: ValuationStore,
{
    catalog: Arc<C>,
    history: Arc<H>,
    market: Arc<M>,
    advisor: Arc<A>,
    store: Arc<S>,
    timeouts: StageTimeouts,
    progress: Option<ProgressSender>,
}

impl<C, H, M, A, S> ValuationOrchestrator<C, H, M, A, S>
where
    C: PricingCatalog,
    H: SalesHistory,
    M: MarketScanner,
    A: AdviceSynthesizer,
    S: ValuationStore,
{
    /// Create an orchestrator over the five collaborators
    pub fn new(
        catalog: Arc<C>,
        history: Arc<H>,
        market: Arc<M>,
        advisor: Arc<A>,
        store: Arc<S>,
    ) -> Self {
        Self {
            catalog,
            history,
            market,
            advisor,
            store,
            timeouts: StageTimeouts::default(),
            progress: None,
        }
    }

    /// Override the per-stage timeout budgets
    pub fn with_timeouts(mut self, timeouts: StageTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Attach a progress sender; a snapshot of the in-flight record is
    /// emitted after every stage
    pub fn with_progress(mut self, sender: ProgressSender) -> Self {
        self.progress = Some(sender);
        self
    }

    /// Run one trade-in valuation
    ///
    /// Validates the descriptor before issuing any provider call, runs the
    /// stages per the dependency graph, persists the completed record, and
    /// returns it. Two runs over the same descriptor always produce two
    /// independent records: market data is time-sensitive, so there is no
    /// caching.
    pub async fn run(&self, descriptor: VehicleDescriptor) -> Result<ValuationRecord> {
        // Rejected input still produces a terminal Failed event, so an
        // observer draining the progress channel always sees the run end
        if let Err(e) = descriptor.validate() {
            let mut record = ValuationRecord::new_trade_in(descriptor);
            record.mark_failed();
            self.emit(ValuationEvent::Failed {
                reason: e.to_string(),
                snapshot: record,
            });
            return Err(e);
        }

        let mut record = ValuationRecord::new_trade_in(descriptor.clone());
        info!(vehicle = %descriptor.summary(), "starting trade-in valuation");

        // Stage 1: catalog and history are independent, join both
        let (catalog_result, history_result) = futures::join!(
            guarded(
                self.timeouts.catalog,
                self.catalog.evaluate(&descriptor),
                CatalogValuation::unavailable,
            ),
            guarded(
                self.timeouts.history,
                self.history.match_comparables(&descriptor),
                InternalComparison::unavailable,
            ),
        );

        let (catalog, catalog_fell_back) = catalog_result;
        if catalog_fell_back {
            record.push_warning(CatalogValuation::UNAVAILABLE_NOTE);
        }
        record.catalog = Some(catalog.clone());
        self.emit_stage(Stage::Catalog, &record);

        let (history, history_fell_back) = history_result;
        if history_fell_back {
            record.push_warning(InternalComparison::UNAVAILABLE_NOTE);
        }
        record.history = Some(history.clone());
        self.emit_stage(Stage::History, &record);

        // Stage 2: strictly after the catalog call resolved, real or fallback
        let (market, market_fell_back) = guarded(
            self.timeouts.market,
            self.market.scan(&descriptor, &catalog.window),
            MarketAnalysis::unavailable,
        )
        .await;
        if market_fell_back {
            record.push_warning(MarketAnalysis::UNAVAILABLE_NOTE);
        }
        record.market = Some(market.clone());
        self.emit_stage(Stage::MarketScan, &record);

        // Stage 3: no fallback here; an un-synthesized result has no value
        // to the caller, so any failure fails the run
        let synthesis = timeout(
            self.timeouts.advice,
            self.advisor
                .synthesize(&descriptor, &catalog, &market, &history),
        )
        .await;

        let advice = match synthesis {
            Ok(Ok(advice)) => advice,
            Ok(Err(e)) => return Err(self.fail(record, e)),
            Err(_) => {
                return Err(self.fail(
                    record,
                    Error::Synthesis("advice synthesis timed out".to_string()),
                ));
            }
        };

        record.advice = Some(advice);
        record.mark_completed();
        self.emit_stage(Stage::Advice, &record);

        // The audit write never withholds the result from the caller
        match self.store.insert(&record).await {
            Ok(id) => {
                info!(id = %id, confidence = record.confidence, "valuation persisted");
                record.id = Some(id);
            }
            Err(e) => {
                error!(error = %e, "valuation completed but audit insert failed");
            }
        }

        self.emit(ValuationEvent::Completed {
            snapshot: record.clone(),
        });
        Ok(record)
    }

    /// Mark the record failed, emit the failure event, and normalize the
    /// error to the synthesis class
    fn fail(&self, mut record: ValuationRecord, cause: Error) -> Error {
        let cause = match cause {
            Error::Synthesis(_) => cause,
            other => Error::Synthesis(other.to_string()),
        };
        warn!(error = %cause, "valuation run failed");
        record.mark_failed();
        self.emit(ValuationEvent::Failed {
            reason: cause.to_string(),
            snapshot: record,
        });
        cause
    }

    fn emit_stage(&self, stage: Stage, record: &ValuationRecord) {
        self.emit(ValuationEvent::StageCompleted {
            stage,
            snapshot: record.clone(),
        });
    }

    fn emit(&self, event: ValuationEvent) {
        if let Some(sender) = &self.progress {
            // a dropped receiver is not the pipeline's problem
            let _ = sender.send(event);
        }
    }
}

/// Run a data-gathering call under its timeout budget
///
/// Returns the result plus whether the canonical fallback was substituted.
/// Never propagates the error: the shared policy is one uniform fallback
/// object per stage, not ad hoc recovery at call sites.
async fn guarded<T, Fut>(budget: Duration, call: Fut, fallback: fn() -> T) -> (T, bool)
where
    Fut: Future<Output = Result<T>>,
{
    match timeout(budget, call).await {
        Ok(Ok(value)) => (value, false),
        Ok(Err(e)) => {
            warn!(error = %e, "stage call failed, substituting fallback");
            (fallback(), true)
        }
        Err(_) => {
            warn!(budget_ms = budget.as_millis() as u64, "stage call timed out, substituting fallback");
            (fallback(), true)
        }
    }
}
