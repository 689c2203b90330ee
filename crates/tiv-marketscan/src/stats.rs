//! Pure price statistics over parsed listings

use tiv_core::{Listing, MarketAnalysis, SearchWindow, VehicleDescriptor};

/// Reduce a parsed listing set to a MarketAnalysis
///
/// Primary comparables match the target tightly: mileage within ±20% and
/// build year within ±1. Deviations flag an empty scan and a primary set
/// smaller than [`MarketAnalysis::MIN_PRIMARY`]; the caller may append its
/// own fetch-failure deviations afterwards.
pub fn summarize(
    descriptor: &VehicleDescriptor,
    applied_filter: SearchWindow,
    listings: Vec<Listing>,
) -> MarketAnalysis {
    let mut prices: Vec<f64> = listings.iter().map(|l| l.price).collect();
    prices.sort_by(|a, b| a.total_cmp(b));

    let primary_count = listings
        .iter()
        .filter(|listing| is_primary(descriptor, listing))
        .count();

    let mut deviations = Vec::new();
    if listings.is_empty() {
        deviations.push("scan found no comparables".to_string());
    } else if primary_count < MarketAnalysis::MIN_PRIMARY {
        deviations.push(MarketAnalysis::TOO_SMALL_NOTE.to_string());
    }

    MarketAnalysis {
        lowest_price: prices.first().copied().unwrap_or(0.0),
        median_price: median(&prices),
        highest_price: prices.last().copied().unwrap_or(0.0),
        listing_count: listings.len(),
        primary_count,
        applied_filter,
        listings,
        deviations,
    }
}

/// Whether a listing is a tight comparable for the target vehicle
fn is_primary(descriptor: &VehicleDescriptor, listing: &Listing) -> bool {
    let year_close = listing
        .build_year
        .map(|year| (year - descriptor.build_year).abs() <= 1)
        .unwrap_or(false);

    let mileage_close = match (descriptor.mileage_km, listing.mileage_km) {
        (Some(target), Some(actual)) if target > 0 => {
            let deviation = (actual - target).abs() as f64 / target as f64;
            deviation <= 0.2
        }
        _ => false,
    };

    year_close && mileage_close
}

/// Median over a pre-sorted price slice
fn median(sorted: &[f64]) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiv_core::{FuelType, Transmission};

    fn golf() -> VehicleDescriptor {
        VehicleDescriptor::new("Volkswagen", "Golf", 2019)
            .with_mileage(60_000)
            .with_fuel_type(FuelType::Diesel)
            .with_transmission(Transmission::Manual)
    }

    fn listing(price: f64, mileage: i64, year: i32) -> Listing {
        Listing {
            id: format!("{:x}", md5::compute(format!("{}-{}", price, mileage))),
            url: format!("https://example.test/occasion/{}", price as i64),
            title: "Volkswagen Golf 1.6 TDI".to_string(),
            price,
            mileage_km: Some(mileage),
            build_year: Some(year),
        }
    }

    #[test]
    fn test_summarize_orders_price_statistics() {
        let listings = vec![
            listing(16_500.0, 58_000, 2019),
            listing(14_900.0, 65_000, 2019),
            listing(15_800.0, 61_000, 2020),
        ];
        let analysis = summarize(&golf(), SearchWindow::from_descriptor(&golf()), listings);

        assert_eq!(analysis.lowest_price, 14_900.0);
        assert_eq!(analysis.median_price, 15_800.0);
        assert_eq!(analysis.highest_price, 16_500.0);
        assert_eq!(analysis.listing_count, 3);
    }

    #[test]
    fn test_median_of_even_count() {
        let listings = vec![
            listing(14_000.0, 60_000, 2019),
            listing(15_000.0, 60_000, 2019),
            listing(16_000.0, 60_000, 2019),
            listing(17_000.0, 60_000, 2019),
        ];
        let analysis = summarize(&golf(), SearchWindow::from_descriptor(&golf()), listings);
        assert_eq!(analysis.median_price, 15_500.0);
    }

    #[test]
    fn test_primary_requires_tight_mileage_and_year() {
        let listings = vec![
            // tight on both
            listing(15_500.0, 66_000, 2019),
            // mileage off by 50%
            listing(13_000.0, 90_000, 2019),
            // year off by 3
            listing(12_000.0, 60_000, 2016),
            // unknown mileage
            Listing {
                mileage_km: None,
                ..listing(15_000.0, 0, 2019)
            },
        ];
        let analysis = summarize(&golf(), SearchWindow::from_descriptor(&golf()), listings);
        assert_eq!(analysis.primary_count, 1);
    }

    #[test]
    fn test_small_primary_set_flagged() {
        let listings = vec![listing(15_500.0, 60_000, 2019)];
        let analysis = summarize(&golf(), SearchWindow::from_descriptor(&golf()), listings);
        assert_eq!(
            analysis.deviations,
            vec![MarketAnalysis::TOO_SMALL_NOTE.to_string()]
        );
    }

    #[test]
    fn test_empty_scan_flagged() {
        let analysis = summarize(&golf(), SearchWindow::from_descriptor(&golf()), Vec::new());
        assert_eq!(analysis.listing_count, 0);
        assert_eq!(analysis.lowest_price, 0.0);
        assert_eq!(analysis.median_price, 0.0);
        assert_eq!(
            analysis.deviations,
            vec!["scan found no comparables".to_string()]
        );
    }

    #[test]
    fn test_large_primary_set_has_no_deviation() {
        let listings: Vec<Listing> = (0..6)
            .map(|i| listing(15_000.0 + i as f64 * 100.0, 58_000 + i * 500, 2019))
            .collect();
        let analysis = summarize(&golf(), SearchWindow::from_descriptor(&golf()), listings);
        assert_eq!(analysis.primary_count, 6);
        assert!(analysis.deviations.is_empty());
    }
}
