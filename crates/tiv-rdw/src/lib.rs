//! RDW registration lookup for TIV
//!
//! This crate provides the RDW open-data implementation of the
//! RegistrationLookup trait. Two Socrata resources are consulted per plate:
//! the registered-vehicle resource (brand, trade name, body type, color,
//! first registration) and the fuel resource (fuel kind, engine power).

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use tiv_core::{Error, FuelType, RegistrationLookup, Result, VehicleDescriptor};

/// RDW open-data configuration
#[derive(Debug, Clone)]
pub struct RdwConfig {
    /// Base URL of the open-data host
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for RdwConfig {
    fn default() -> Self {
        Self {
            base_url: "https://opendata.rdw.nl".to_string(),
            timeout_secs: 10,
        }
    }
}

/// RDW registration lookup client
pub struct RdwClient {
    config: RdwConfig,
    client: Client,
    plate_shape: Regex,
}

#[derive(Deserialize)]
struct VehicleRow {
    merk: Option<String>,
    handelsbenaming: Option<String>,
    inrichting: Option<String>,
    eerste_kleur: Option<String>,
    datum_eerste_toelating: Option<String>,
}

#[derive(Deserialize)]
struct FuelRow {
    brandstof_omschrijving: Option<String>,
    nettomaximumvermogen: Option<String>,
}

/// Normalize a plate to registry form: uppercase, dashes and spaces stripped
pub fn normalize_plate(plate: &str) -> String {
    plate
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

impl RdwClient {
    /// Registered-vehicles resource (brand, body, color, first registration)
    const VEHICLE_RESOURCE: &'static str = "m9d7-ebf2";
    /// Fuel resource (fuel kind, net maximum power)
    const FUEL_RESOURCE: &'static str = "8ys7-d773";

    /// Create a new RDW client from configuration
    pub fn new(config: RdwConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        // Dutch sidecodes are all six alphanumerics once separators are gone
        let plate_shape = Regex::new(r"^[A-Z0-9]{6}$")
            .map_err(|e| Error::Configuration(e.to_string()))?;

        Ok(Self {
            config,
            client,
            plate_shape,
        })
    }

    /// Validate a normalized plate against the sidecode shape
    pub fn is_valid_plate(&self, normalized: &str) -> bool {
        self.plate_shape.is_match(normalized)
    }

    async fn fetch_rows<T: serde::de::DeserializeOwned>(
        &self,
        resource: &str,
        plate: &str,
    ) -> Result<Vec<T>> {
        let url = format!(
            "{}/resource/{}.json?kenteken={}",
            self.config.base_url, resource, plate
        );

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::SourceUnavailable(format!(
                "RDW resource {} returned status {}",
                resource,
                response.status()
            )));
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))
    }
}

#[async_trait]
impl RegistrationLookup for RdwClient {
    async fn lookup(&self, plate: &str) -> Result<Option<VehicleDescriptor>> {
        let normalized = normalize_plate(plate);
        if !self.is_valid_plate(&normalized) {
            return Err(Error::Validation(format!(
                "'{}' is not a valid Dutch plate",
                plate
            )));
        }

        debug!(plate = %normalized, "looking up registration");

        let vehicles: Vec<VehicleRow> =
            self.fetch_rows(Self::VEHICLE_RESOURCE, &normalized).await?;
        let Some(vehicle) = vehicles.into_iter().next() else {
            return Ok(None);
        };

        let brand = vehicle.merk.unwrap_or_default();
        let model = vehicle.handelsbenaming.unwrap_or_default();
        let build_year = vehicle
            .datum_eerste_toelating
            .as_deref()
            .and_then(parse_registration_year)
            .ok_or_else(|| {
                Error::Serialization("RDW row missing first-registration date".to_string())
            })?;

        let mut descriptor = VehicleDescriptor::new(brand, model, build_year);
        if let Some(body) = vehicle.inrichting {
            descriptor = descriptor.with_body_type(body);
        }
        if let Some(color) = vehicle.eerste_kleur {
            descriptor = descriptor.with_color(color);
        }

        // Fuel rows are best-effort: a missing fuel record is not an error,
        // validation will demand an explicit fuel type later anyway
        if let Ok(fuels) = self
            .fetch_rows::<FuelRow>(Self::FUEL_RESOURCE, &normalized)
            .await
        {
            if let Some(fuel) = fuels.into_iter().next() {
                if let Some(kind) = fuel
                    .brandstof_omschrijving
                    .as_deref()
                    .and_then(FuelType::from_str)
                {
                    descriptor = descriptor.with_fuel_type(kind);
                }
                if let Some(hp) = fuel
                    .nettomaximumvermogen
                    .as_deref()
                    .and_then(parse_power_hp)
                {
                    descriptor = descriptor.with_power(hp);
                }
            }
        }

        Ok(Some(descriptor))
    }
}

/// Parse the year out of an RDW date column (`YYYYMMDD`)
fn parse_registration_year(date: &str) -> Option<i32> {
    // get() instead of indexing: the column is network-sourced text
    date.get(..4)?.parse().ok()
}

/// Convert the registry's net maximum power (kW, decimal string) to hp
fn parse_power_hp(kw: &str) -> Option<u32> {
    let kw: f64 = kw.trim().parse().ok()?;
    if kw <= 0.0 {
        return None;
    }
    Some((kw * 1.36).round() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_plate() {
        assert_eq!(normalize_plate("gk-123-l"), "GK123L");
        assert_eq!(normalize_plate("GK 123 L"), "GK123L");
        assert_eq!(normalize_plate("12-AB-34"), "12AB34");
    }

    #[test]
    fn test_plate_shape_validation() {
        let client = RdwClient::new(RdwConfig::default()).unwrap();
        assert!(client.is_valid_plate("GK123L"));
        assert!(client.is_valid_plate("12AB34"));
        assert!(!client.is_valid_plate("GK123"));
        assert!(!client.is_valid_plate("GK-123-L"));
        assert!(!client.is_valid_plate(""));
    }

    #[tokio::test]
    async fn test_invalid_plate_rejected_before_any_request() {
        // base_url is unroutable; an issued request would error differently
        let client = RdwClient::new(RdwConfig {
            base_url: "http://invalid.localdomain".to_string(),
            timeout_secs: 1,
        })
        .unwrap();

        let err = client.lookup("not-a-plate!").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_parse_registration_year() {
        assert_eq!(parse_registration_year("20190315"), Some(2019));
        assert_eq!(parse_registration_year("1998"), Some(1998));
        assert_eq!(parse_registration_year("19x"), None);
        assert_eq!(parse_registration_year(""), None);
    }

    #[test]
    fn test_parse_registration_year_survives_multibyte_garbage() {
        // 'é' spans bytes 3..5, so byte 4 is not a char boundary
        assert_eq!(parse_registration_year("201é2024"), None);
        assert_eq!(parse_registration_year("日本語のみ"), None);
    }

    #[test]
    fn test_parse_power_hp() {
        // 85 kW is the common 1.6 TDI rating
        assert_eq!(parse_power_hp("85.00"), Some(116));
        assert_eq!(parse_power_hp("0"), None);
        assert_eq!(parse_power_hp("n/a"), None);
    }
}
