//! Internal sales-history types and the history matcher contract

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Result, VehicleDescriptor};

/// Sales channel a historical vehicle was sold through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalesChannel {
    /// Sold to another trader
    Business,
    /// Sold to a private customer
    Consumer,
}

impl SalesChannel {
    /// Parse from the datastore's channel column
    pub fn from_str(s: &str) -> Option<SalesChannel> {
        match s.to_lowercase().as_str() {
            "business" | "b2b" | "trade" | "handel" => Some(SalesChannel::Business),
            "consumer" | "b2c" | "retail" | "particulier" => Some(SalesChannel::Consumer),
            _ => None,
        }
    }

    /// Get the display name for this channel
    pub fn display_name(&self) -> &'static str {
        match self {
            SalesChannel::Business => "business",
            SalesChannel::Consumer => "consumer",
        }
    }
}

impl std::fmt::Display for SalesChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One comparable vehicle from the dealer's own sold stock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSale {
    /// Short vehicle description as recorded at sale time
    pub vehicle: String,
    pub build_year: i32,
    pub mileage_km: i64,
    pub sold_price: f64,
    /// Realized margin on the deal
    pub margin: f64,
    pub days_to_sell: u32,
    pub channel: SalesChannel,
    pub sold_at: DateTime<Utc>,
}

/// Aggregates over the dealer's own comparable sales
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternalComparison {
    pub average_margin: f64,
    pub average_days_to_sell: f64,
    /// Comparables sold to traders in the trailing 12 months
    pub sold_business_12m: u32,
    /// Comparables sold to private customers in the trailing 12 months
    pub sold_consumer_12m: u32,
    pub similar_sold: Vec<HistoricalSale>,
    /// Descriptive note; set on the fallback object
    pub note: Option<String>,
}

impl InternalComparison {
    /// Warning label used when the sales-history source is unreachable
    pub const UNAVAILABLE_NOTE: &'static str = "Internal sales history unavailable";

    /// The canonical fallback object substituted when the history source
    /// fails or times out: all-zero aggregates, no comparables
    pub fn unavailable() -> InternalComparison {
        InternalComparison {
            average_margin: 0.0,
            average_days_to_sell: 0.0,
            sold_business_12m: 0,
            sold_consumer_12m: 0,
            similar_sold: Vec::new(),
            note: Some(Self::UNAVAILABLE_NOTE.to_string()),
        }
    }

    /// Whether this is the canonical fallback object
    pub fn is_unavailable(&self) -> bool {
        *self == Self::unavailable()
    }
}

/// Trait for dealer sales-history matchers
#[async_trait]
pub trait SalesHistory: Send + Sync {
    /// Find and aggregate historically-sold comparables for a descriptor
    async fn match_comparables(&self, descriptor: &VehicleDescriptor)
        -> Result<InternalComparison>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_is_all_zero() {
        let fallback = InternalComparison::unavailable();
        assert_eq!(fallback.average_margin, 0.0);
        assert_eq!(fallback.average_days_to_sell, 0.0);
        assert_eq!(fallback.sold_business_12m, 0);
        assert_eq!(fallback.sold_consumer_12m, 0);
        assert!(fallback.similar_sold.is_empty());
        assert!(fallback.is_unavailable());
    }

    #[test]
    fn test_channel_from_str() {
        assert_eq!(
            SalesChannel::from_str("particulier"),
            Some(SalesChannel::Consumer)
        );
        assert_eq!(
            SalesChannel::from_str("B2B"),
            Some(SalesChannel::Business)
        );
        assert_eq!(SalesChannel::from_str("auction"), None);
    }

    #[test]
    fn test_channel_serde_uses_snake_case() {
        let json = serde_json::to_string(&SalesChannel::Business).unwrap();
        assert_eq!(json, "\"business\"");
    }
}
