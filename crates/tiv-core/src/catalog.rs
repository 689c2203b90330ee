//! Pricing-catalog valuation types and the catalog provider contract

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{FuelType, Result, Transmission, VehicleDescriptor};

/// Inclusive price range in whole euros
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    /// The zero range used by fallback objects
    pub const ZERO: PriceRange = PriceRange { min: 0.0, max: 0.0 };

    /// Whether a value lies inside the range (inclusive)
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Liquidity (courant) classification of comparable stock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Liquidity {
    /// Fast turnover; comparable stock sells quickly
    High,
    /// Average turnover
    Medium,
    /// Slow turnover; shelf warmers
    Low,
    /// Not classified (fallback objects and unclassified models)
    Unknown,
}

impl Liquidity {
    /// Map a JP Cars courant class (1 = shelf warmer .. 5 = fast mover)
    pub fn from_courant_class(class: u8) -> Liquidity {
        match class {
            4 | 5 => Liquidity::High,
            3 => Liquidity::Medium,
            1 | 2 => Liquidity::Low,
            _ => Liquidity::Unknown,
        }
    }

    /// Get the display name for this classification
    pub fn display_name(&self) -> &'static str {
        match self {
            Liquidity::High => "high turnover",
            Liquidity::Medium => "medium turnover",
            Liquidity::Low => "low turnover",
            Liquidity::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Liquidity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Comparable-listing search window produced by the catalog stage
///
/// Carries the filter parameters for the market scan plus any
/// comparable-listing URLs the catalog provider already resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchWindow {
    pub brand: String,
    pub model: String,
    pub build_year_min: i32,
    pub build_year_max: i32,
    pub mileage_min: i64,
    pub mileage_max: i64,
    pub fuel_type: Option<FuelType>,
    pub transmission: Option<Transmission>,
    /// Comparable listings the catalog provider matched itself
    pub listing_urls: Vec<String>,
}

impl SearchWindow {
    /// The empty window carried by the catalog fallback object
    pub fn empty() -> SearchWindow {
        SearchWindow {
            brand: String::new(),
            model: String::new(),
            build_year_min: 0,
            build_year_max: 0,
            mileage_min: 0,
            mileage_max: 0,
            fuel_type: None,
            transmission: None,
            listing_urls: Vec::new(),
        }
    }

    /// Whether this window carries usable filter parameters
    pub fn is_empty(&self) -> bool {
        self.brand.is_empty() || self.model.is_empty()
    }

    /// Synthesize a window directly from a descriptor
    ///
    /// Used when the catalog stage fell back and produced no window: build
    /// year ±1, mileage ±25%, same fuel and transmission.
    pub fn from_descriptor(descriptor: &VehicleDescriptor) -> SearchWindow {
        let mileage = descriptor.mileage_km.unwrap_or(0).max(0);
        SearchWindow {
            brand: descriptor.brand.clone(),
            model: descriptor.model.clone(),
            build_year_min: descriptor.build_year - 1,
            build_year_max: descriptor.build_year + 1,
            mileage_min: mileage - mileage / 4,
            mileage_max: mileage + mileage / 4,
            fuel_type: descriptor.fuel_type,
            transmission: descriptor.transmission,
            listing_urls: Vec::new(),
        }
    }
}

/// Valuation as produced by the third-party pricing catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogValuation {
    /// Value of the bare model/engine/year combination
    pub base_value: f64,
    /// Value added by the selected factory options
    pub options_value: f64,
    /// Option-adjusted total value
    pub total_value: f64,
    pub range: PriceRange,
    /// Catalog-reported confidence in its own estimate (0.0 to 1.0)
    pub confidence: f64,
    pub liquidity: Liquidity,
    /// Expected days until a dealer resells this vehicle
    pub expected_resale_days: u32,
    /// Search window for the market-scan stage
    pub window: SearchWindow,
    /// Descriptive note; set on the fallback object
    pub note: Option<String>,
}

impl CatalogValuation {
    /// Warning label used when the catalog source is unreachable
    pub const UNAVAILABLE_NOTE: &'static str = "JP Cars data unavailable";

    /// The canonical fallback object substituted when the catalog source
    /// fails or times out: all-zero values, unknown liquidity, empty window
    pub fn unavailable() -> CatalogValuation {
        CatalogValuation {
            base_value: 0.0,
            options_value: 0.0,
            total_value: 0.0,
            range: PriceRange::ZERO,
            confidence: 0.0,
            liquidity: Liquidity::Unknown,
            expected_resale_days: 0,
            window: SearchWindow::empty(),
            note: Some(Self::UNAVAILABLE_NOTE.to_string()),
        }
    }

    /// Whether this is the canonical fallback object
    pub fn is_unavailable(&self) -> bool {
        *self == Self::unavailable()
    }
}

/// Trait for pricing-catalog providers (e.g. JP Cars)
#[async_trait]
pub trait PricingCatalog: Send + Sync {
    /// Produce a catalog valuation for a complete descriptor
    async fn evaluate(&self, descriptor: &VehicleDescriptor) -> Result<CatalogValuation>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_is_all_zero() {
        let fallback = CatalogValuation::unavailable();
        assert_eq!(fallback.base_value, 0.0);
        assert_eq!(fallback.options_value, 0.0);
        assert_eq!(fallback.total_value, 0.0);
        assert_eq!(fallback.range, PriceRange::ZERO);
        assert_eq!(fallback.confidence, 0.0);
        assert_eq!(fallback.liquidity, Liquidity::Unknown);
        assert_eq!(fallback.expected_resale_days, 0);
        assert!(fallback.window.is_empty());
        assert_eq!(
            fallback.note.as_deref(),
            Some(CatalogValuation::UNAVAILABLE_NOTE)
        );
        assert!(fallback.is_unavailable());
    }

    #[test]
    fn test_fallback_is_canonical() {
        assert_eq!(
            CatalogValuation::unavailable(),
            CatalogValuation::unavailable()
        );
    }

    #[test]
    fn test_courant_class_mapping() {
        assert_eq!(Liquidity::from_courant_class(5), Liquidity::High);
        assert_eq!(Liquidity::from_courant_class(4), Liquidity::High);
        assert_eq!(Liquidity::from_courant_class(3), Liquidity::Medium);
        assert_eq!(Liquidity::from_courant_class(2), Liquidity::Low);
        assert_eq!(Liquidity::from_courant_class(1), Liquidity::Low);
        assert_eq!(Liquidity::from_courant_class(0), Liquidity::Unknown);
        assert_eq!(Liquidity::from_courant_class(9), Liquidity::Unknown);
    }

    #[test]
    fn test_window_from_descriptor() {
        let descriptor = crate::VehicleDescriptor::new("Volkswagen", "Golf", 2019)
            .with_mileage(60_000)
            .with_fuel_type(crate::FuelType::Diesel)
            .with_transmission(crate::Transmission::Manual);

        let window = SearchWindow::from_descriptor(&descriptor);
        assert!(!window.is_empty());
        assert_eq!(window.build_year_min, 2018);
        assert_eq!(window.build_year_max, 2020);
        assert_eq!(window.mileage_min, 45_000);
        assert_eq!(window.mileage_max, 75_000);
        assert_eq!(window.fuel_type, Some(crate::FuelType::Diesel));
        assert!(window.listing_urls.is_empty());
    }

    #[test]
    fn test_empty_window_detection() {
        assert!(SearchWindow::empty().is_empty());
        assert!(CatalogValuation::unavailable().window.is_empty());
    }

    #[test]
    fn test_price_range_contains() {
        let range = PriceRange {
            min: 14_000.0,
            max: 17_500.0,
        };
        assert!(range.contains(14_000.0));
        assert!(range.contains(16_000.0));
        assert!(!range.contains(13_999.0));
        assert!(!range.contains(20_000.0));
    }
}
