//! JP Cars pricing-catalog client implementation

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use tiv_core::{
    CatalogValuation, Error, Liquidity, PriceRange, PricingCatalog, Result, SearchWindow,
    VehicleDescriptor,
};

use crate::config::JpCarsConfig;

/// JP Cars valuation API client
pub struct JpCarsClient {
    config: JpCarsConfig,
    client: Client,
}

#[derive(Serialize)]
struct ValueRequest {
    brand: String,
    model: String,
    build_year: i32,
    mileage: i64,
    fuel: Option<String>,
    transmission: Option<String>,
    body_type: Option<String>,
    options: Vec<String>,
}

#[derive(Deserialize)]
struct ValueResponse {
    base_value: f64,
    options_value: f64,
    total_value: f64,
    value_min: f64,
    value_max: f64,
    confidence: f64,
    /// Courant class, 1 = shelf warmer .. 5 = fast mover
    courant: u8,
    expected_selling_days: u32,
    window: WindowResponse,
}

#[derive(Deserialize)]
struct WindowResponse {
    build_year_from: i32,
    build_year_to: i32,
    mileage_from: i64,
    mileage_to: i64,
    #[serde(default)]
    comparable_urls: Vec<String>,
}

impl JpCarsClient {
    /// Create a new JP Cars client from configuration
    pub fn new(config: JpCarsConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Create a new JP Cars client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = JpCarsConfig::from_env()?;
        Self::new(config)
    }

    /// Assemble the basic-auth header value from key and secret
    fn auth_header(&self) -> String {
        let credentials = format!("{}:{}", self.config.api_key, self.config.api_secret);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(credentials)
        )
    }

    fn build_request(descriptor: &VehicleDescriptor) -> ValueRequest {
        ValueRequest {
            brand: descriptor.brand.clone(),
            model: descriptor.model.clone(),
            build_year: descriptor.build_year,
            mileage: descriptor.mileage_km.unwrap_or(0),
            fuel: descriptor.fuel_type.map(|f| f.display_name().to_string()),
            transmission: descriptor
                .transmission
                .map(|t| t.display_name().to_string()),
            body_type: descriptor.body_type.clone(),
            options: descriptor.options.clone(),
        }
    }

    fn map_response(descriptor: &VehicleDescriptor, reply: ValueResponse) -> CatalogValuation {
        CatalogValuation {
            base_value: reply.base_value,
            options_value: reply.options_value,
            total_value: reply.total_value,
            range: PriceRange {
                min: reply.value_min,
                max: reply.value_max,
            },
            confidence: reply.confidence.clamp(0.0, 1.0),
            liquidity: Liquidity::from_courant_class(reply.courant),
            expected_resale_days: reply.expected_selling_days,
            window: SearchWindow {
                brand: descriptor.brand.clone(),
                model: descriptor.model.clone(),
                build_year_min: reply.window.build_year_from,
                build_year_max: reply.window.build_year_to,
                mileage_min: reply.window.mileage_from,
                mileage_max: reply.window.mileage_to,
                fuel_type: descriptor.fuel_type,
                transmission: descriptor.transmission,
                listing_urls: reply.window.comparable_urls,
            },
            note: None,
        }
    }
}

#[async_trait]
impl PricingCatalog for JpCarsClient {
    async fn evaluate(&self, descriptor: &VehicleDescriptor) -> Result<CatalogValuation> {
        let url = format!("{}/v2/vehicle/value", self.config.api_url);
        let request_body = Self::build_request(descriptor);

        debug!(vehicle = %descriptor.summary(), "requesting catalog valuation");

        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .header("Authorization", self.auth_header())
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout("JP Cars request timed out".to_string())
                } else {
                    Error::Network(e.to_string())
                }
            })?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication(
                "JP Cars rejected the API credentials".to_string(),
            ));
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::SourceUnavailable(format!(
                "JP Cars request failed with status {}: {}",
                status, error_text
            )));
        }

        let reply: ValueResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        Ok(Self::map_response(descriptor, reply))
    }
}
