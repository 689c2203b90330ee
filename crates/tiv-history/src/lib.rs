//! Internal sales-history matcher for TIV
//!
//! This crate provides the CRM-datastore implementation of the SalesHistory
//! trait. Sold-vehicle rows are queried PostgREST-style from the backend and
//! reduced to the InternalComparison aggregates.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use tiv_core::{
    Error, HistoricalSale, InternalComparison, Result, SalesChannel, SalesHistory,
    VehicleDescriptor,
};

/// CRM datastore configuration for history queries
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Base URL of the CRM backend
    pub backend_url: String,
    /// Service key sent on every request
    pub service_key: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl HistoryConfig {
    /// Create configuration with explicit values
    pub fn new(backend_url: String, service_key: String) -> Self {
        Self {
            backend_url,
            service_key,
            timeout_secs: 10,
        }
    }
}

/// Sales-history client against the CRM datastore
pub struct HistoryClient {
    config: HistoryConfig,
    client: Client,
}

#[derive(Deserialize)]
struct SaleRow {
    vehicle: String,
    build_year: i32,
    mileage_km: i64,
    sold_price: f64,
    margin: f64,
    days_to_sell: u32,
    channel: String,
    sold_at: DateTime<Utc>,
}

impl HistoryClient {
    /// Comparables kept on the similar-vehicle list
    const MAX_SIMILAR: usize = 10;

    /// Create a new history client from configuration
    pub fn new(config: HistoryConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    async fn fetch_rows(&self, descriptor: &VehicleDescriptor) -> Result<Vec<SaleRow>> {
        let cutoff = (Utc::now() - Duration::days(365)).to_rfc3339();
        let url = format!("{}/rest/v1/vehicle_sales", self.config.backend_url);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.config.service_key)
            .header("Accept", "application/json")
            .query(&[
                ("brand", format!("eq.{}", descriptor.brand)),
                ("model", format!("eq.{}", descriptor.model)),
                ("sold_at", format!("gte.{}", cutoff)),
                ("order", "sold_at.desc".to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout("sales-history query timed out".to_string())
                } else {
                    Error::Network(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(Error::SourceUnavailable(format!(
                "sales-history query failed with status {}",
                response.status()
            )));
        }

        response
            .json::<Vec<SaleRow>>()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Reduce the trailing-12-month rows to the comparison aggregates
    fn reduce(descriptor: &VehicleDescriptor, rows: Vec<SaleRow>) -> InternalComparison {
        let sales: Vec<HistoricalSale> = rows
            .into_iter()
            .filter_map(|row| {
                let channel = SalesChannel::from_str(&row.channel)?;
                Some(HistoricalSale {
                    vehicle: row.vehicle,
                    build_year: row.build_year,
                    mileage_km: row.mileage_km,
                    sold_price: row.sold_price,
                    margin: row.margin,
                    days_to_sell: row.days_to_sell,
                    channel,
                    sold_at: row.sold_at,
                })
            })
            .collect();

        if sales.is_empty() {
            // No comparables is not a failure; zero aggregates with a note
            let mut comparison = InternalComparison::unavailable();
            comparison.note = Some("no comparable sales in the last 12 months".to_string());
            return comparison;
        }

        let count = sales.len() as f64;
        let average_margin = sales.iter().map(|s| s.margin).sum::<f64>() / count;
        let average_days_to_sell =
            sales.iter().map(|s| s.days_to_sell as f64).sum::<f64>() / count;
        let sold_business_12m = sales
            .iter()
            .filter(|s| s.channel == SalesChannel::Business)
            .count() as u32;
        let sold_consumer_12m = sales
            .iter()
            .filter(|s| s.channel == SalesChannel::Consumer)
            .count() as u32;

        // Rows arrive newest first; keep the close build years, capped
        let similar_sold: Vec<HistoricalSale> = sales
            .into_iter()
            .filter(|s| (s.build_year - descriptor.build_year).abs() <= 2)
            .take(Self::MAX_SIMILAR)
            .collect();

        InternalComparison {
            average_margin,
            average_days_to_sell,
            sold_business_12m,
            sold_consumer_12m,
            similar_sold,
            note: None,
        }
    }
}

#[async_trait]
impl SalesHistory for HistoryClient {
    async fn match_comparables(
        &self,
        descriptor: &VehicleDescriptor,
    ) -> Result<InternalComparison> {
        debug!(vehicle = %descriptor.summary(), "matching internal sales history");
        let rows = self.fetch_rows(descriptor).await?;
        Ok(Self::reduce(descriptor, rows))
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

    fn row(build_year: i32, margin: f64, days: u32, channel: &str) -> SaleRow {
        SaleRow {
            vehicle: "Volkswagen Golf 1.6 TDI".to_string(),
            build_year,
            mileage_km: 70_000,
            sold_price: 15_000.0,
            margin,
            days_to_sell: days,
            channel: channel.to_string(),
            sold_at: Utc::now(),
        }
    }

    #[test]
    fn test_reduce_computes_aggregates() {
        let rows = vec![
            row(2019, 1_200.0, 20, "consumer"),
            row(2018, 1_800.0, 40, "business"),
            row(2020, 900.0, 30, "consumer"),
        ];
        let comparison = HistoryClient::reduce(&golf(), rows);

        assert_eq!(comparison.average_margin, 1_300.0);
        assert_eq!(comparison.average_days_to_sell, 30.0);
        assert_eq!(comparison.sold_business_12m, 1);
        assert_eq!(comparison.sold_consumer_12m, 2);
        assert_eq!(comparison.similar_sold.len(), 3);
        assert!(comparison.note.is_none());
    }

    #[test]
    fn test_similar_list_bounds_build_year() {
        let rows = vec![
            row(2019, 1_000.0, 20, "consumer"),
            // four years older, counted in aggregates but not similar
            row(2015, 1_000.0, 20, "consumer"),
        ];
        let comparison = HistoryClient::reduce(&golf(), rows);
        assert_eq!(comparison.sold_consumer_12m, 2);
        assert_eq!(comparison.similar_sold.len(), 1);
        assert_eq!(comparison.similar_sold[0].build_year, 2019);
    }

    #[test]
    fn test_similar_list_is_capped() {
        let rows: Vec<SaleRow> = (0..20).map(|_| row(2019, 1_000.0, 20, "consumer")).collect();
        let comparison = HistoryClient::reduce(&golf(), rows);
        assert_eq!(comparison.similar_sold.len(), HistoryClient::MAX_SIMILAR);
    }

    #[test]
    fn test_unknown_channel_rows_dropped() {
        let rows = vec![
            row(2019, 1_000.0, 20, "consumer"),
            row(2019, 9_999.0, 99, "auction"),
        ];
        let comparison = HistoryClient::reduce(&golf(), rows);
        assert_eq!(comparison.average_margin, 1_000.0);
        assert_eq!(comparison.sold_consumer_12m, 1);
    }

    #[test]
    fn test_no_rows_yields_zero_aggregates_with_note() {
        let comparison = HistoryClient::reduce(&golf(), Vec::new());
        assert_eq!(comparison.average_margin, 0.0);
        assert_eq!(comparison.sold_business_12m, 0);
        assert!(comparison.similar_sold.is_empty());
        assert_eq!(
            comparison.note.as_deref(),
            Some("no comparable sales in the last 12 months")
        );
    }
}
