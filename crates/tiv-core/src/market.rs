//! Market-scan result types and the listing analyzer contract

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Result, SearchWindow, VehicleDescriptor};

/// One live marketplace listing matched by the scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Stable identity derived from the listing URL
    pub id: String,
    pub url: String,
    pub title: String,
    pub price: f64,
    pub mileage_km: Option<i64>,
    pub build_year: Option<i32>,
}

/// Price distribution over currently-listed comparable vehicles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAnalysis {
    pub lowest_price: f64,
    pub median_price: f64,
    pub highest_price: f64,
    /// Total listings matched by the filter
    pub listing_count: usize,
    /// Listings tightly matched on mileage and build year
    pub primary_count: usize,
    /// The filter parameters actually applied by the scan
    pub applied_filter: SearchWindow,
    pub listings: Vec<Listing>,
    /// Logical-deviation warnings ("comparable set too small", "scan failed")
    pub deviations: Vec<String>,
}

impl MarketAnalysis {
    /// Warning label used when the market scan is unreachable
    pub const UNAVAILABLE_NOTE: &'static str = "Market scan unavailable";

    /// Deviation recorded when fewer than [`MIN_PRIMARY`] tight comparables
    /// were found
    ///
    /// [`MIN_PRIMARY`]: MarketAnalysis::MIN_PRIMARY
    pub const TOO_SMALL_NOTE: &'static str = "comparable set too small";

    /// Minimum tight comparables for a statistically usable scan
    pub const MIN_PRIMARY: usize = 5;

    /// The canonical fallback object substituted when the scan fails or
    /// times out: all-zero statistics, no listings, one deviation
    pub fn unavailable() -> MarketAnalysis {
        MarketAnalysis {
            lowest_price: 0.0,
            median_price: 0.0,
            highest_price: 0.0,
            listing_count: 0,
            primary_count: 0,
            applied_filter: SearchWindow::empty(),
            listings: Vec::new(),
            deviations: vec![Self::UNAVAILABLE_NOTE.to_string()],
        }
    }

    /// Whether this is the canonical fallback object
    pub fn is_unavailable(&self) -> bool {
        *self == Self::unavailable()
    }
}

/// Trait for live market-listing analyzers
#[async_trait]
pub trait MarketScanner: Send + Sync {
    /// Scan live listings for comparables
    ///
    /// `window` is the catalog stage's output; an empty window makes the
    /// scanner synthesize its own filter from the descriptor.
    async fn scan(
        &self,
        descriptor: &VehicleDescriptor,
        window: &SearchWindow,
    ) -> Result<MarketAnalysis>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_is_all_zero() {
        let fallback = MarketAnalysis::unavailable();
        assert_eq!(fallback.lowest_price, 0.0);
        assert_eq!(fallback.median_price, 0.0);
        assert_eq!(fallback.highest_price, 0.0);
        assert_eq!(fallback.listing_count, 0);
        assert_eq!(fallback.primary_count, 0);
        assert!(fallback.listings.is_empty());
        assert_eq!(
            fallback.deviations,
            vec![MarketAnalysis::UNAVAILABLE_NOTE.to_string()]
        );
        assert!(fallback.is_unavailable());
    }

    #[test]
    fn test_fallback_is_canonical() {
        assert_eq!(MarketAnalysis::unavailable(), MarketAnalysis::unavailable());
    }
}
