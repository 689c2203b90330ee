//! Vehicle descriptor: the normalized attribute record used as pipeline input

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Gearbox kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transmission {
    /// Automatic (incl. semi-automatic and CVT)
    Automatic,
    /// Manual gearbox
    Manual,
}

impl Transmission {
    /// Parse from string, accepting the Dutch registry spellings
    pub fn from_str(s: &str) -> Option<Transmission> {
        match s.to_lowercase().as_str() {
            "automatic" | "automaat" | "auto" | "a" => Some(Transmission::Automatic),
            "manual" | "handgeschakeld" | "handbak" | "m" => Some(Transmission::Manual),
            _ => None,
        }
    }

    /// Get the display name for this transmission
    pub fn display_name(&self) -> &'static str {
        match self {
            Transmission::Automatic => "Automatic",
            Transmission::Manual => "Manual",
        }
    }
}

impl std::fmt::Display for Transmission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Fuel kind as carried by registration data and the pricing catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelType {
    Petrol,
    Diesel,
    Electric,
    Hybrid,
    Lpg,
    Cng,
    Hydrogen,
}

impl FuelType {
    /// Parse from string, accepting the RDW fuel descriptions
    pub fn from_str(s: &str) -> Option<FuelType> {
        match s.to_lowercase().as_str() {
            "petrol" | "benzine" | "gasoline" => Some(FuelType::Petrol),
            "diesel" => Some(FuelType::Diesel),
            "electric" | "elektriciteit" | "elektrisch" | "ev" => Some(FuelType::Electric),
            "hybrid" | "hybride" => Some(FuelType::Hybrid),
            "lpg" => Some(FuelType::Lpg),
            "cng" | "aardgas" => Some(FuelType::Cng),
            "hydrogen" | "waterstof" => Some(FuelType::Hydrogen),
            _ => None,
        }
    }

    /// Get the display name for this fuel type
    pub fn display_name(&self) -> &'static str {
        match self {
            FuelType::Petrol => "Petrol",
            FuelType::Diesel => "Diesel",
            FuelType::Electric => "Electric",
            FuelType::Hybrid => "Hybrid",
            FuelType::Lpg => "LPG",
            FuelType::Cng => "CNG",
            FuelType::Hydrogen => "Hydrogen",
        }
    }
}

impl std::fmt::Display for FuelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Normalized vehicle attributes fed into the valuation pipeline
///
/// Mileage, fuel type and transmission are optional at the type level because
/// a registration lookup cannot supply them, but [`validate`] requires all
/// three before a pipeline run may start.
///
/// [`validate`]: VehicleDescriptor::validate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleDescriptor {
    pub brand: String,
    pub model: String,
    pub body_type: Option<String>,
    pub build_year: i32,
    pub model_year: Option<i32>,
    pub mileage_km: Option<i64>,
    pub fuel_type: Option<FuelType>,
    pub transmission: Option<Transmission>,
    pub power_hp: Option<u32>,
    pub color: Option<String>,
    pub trim: Option<String>,
    /// Factory option codes selected on this vehicle
    pub options: Vec<String>,
    /// Free-text search keywords (e.g. "panoramadak", "trekhaak")
    pub keywords: Vec<String>,
}

impl VehicleDescriptor {
    /// Create a descriptor with the identifying attributes
    pub fn new(brand: impl Into<String>, model: impl Into<String>, build_year: i32) -> Self {
        Self {
            brand: brand.into(),
            model: model.into(),
            body_type: None,
            build_year,
            model_year: None,
            mileage_km: None,
            fuel_type: None,
            transmission: None,
            power_hp: None,
            color: None,
            trim: None,
            options: Vec::new(),
            keywords: Vec::new(),
        }
    }

    /// Set the odometer reading in kilometers
    pub fn with_mileage(mut self, km: i64) -> Self {
        self.mileage_km = Some(km);
        self
    }

    /// Set the fuel type
    pub fn with_fuel_type(mut self, fuel: FuelType) -> Self {
        self.fuel_type = Some(fuel);
        self
    }

    /// Set the transmission
    pub fn with_transmission(mut self, transmission: Transmission) -> Self {
        self.transmission = Some(transmission);
        self
    }

    /// Set the body type
    pub fn with_body_type(mut self, body_type: impl Into<String>) -> Self {
        self.body_type = Some(body_type.into());
        self
    }

    /// Set the model year (may differ from the build year)
    pub fn with_model_year(mut self, year: i32) -> Self {
        self.model_year = Some(year);
        self
    }

    /// Set the engine power in horsepower
    pub fn with_power(mut self, hp: u32) -> Self {
        self.power_hp = Some(hp);
        self
    }

    /// Set the exterior color
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Set the trim level
    pub fn with_trim(mut self, trim: impl Into<String>) -> Self {
        self.trim = Some(trim.into());
        self
    }

    /// Add a factory option code
    pub fn with_option(mut self, code: impl Into<String>) -> Self {
        self.options.push(code.into());
        self
    }

    /// Add a free-text keyword
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keywords.push(keyword.into());
        self
    }

    /// Check completeness before a pipeline run
    ///
    /// Required: non-empty brand and model, a plausible build year, an
    /// explicit non-negative mileage, an explicit fuel type and an explicit
    /// transmission. The orchestrator rejects a descriptor that fails this
    /// check before issuing any provider call.
    pub fn validate(&self) -> Result<()> {
        if self.brand.trim().is_empty() {
            return Err(Error::Validation("brand must not be empty".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(Error::Validation("model must not be empty".to_string()));
        }

        let current_year = Utc::now().year();
        if self.build_year < 1900 || self.build_year > current_year + 1 {
            return Err(Error::Validation(format!(
                "build year {} out of range (1900..={})",
                self.build_year,
                current_year + 1
            )));
        }

        match self.mileage_km {
            None => {
                return Err(Error::Validation(
                    "mileage must be explicitly set".to_string(),
                ));
            }
            Some(km) if km < 0 => {
                return Err(Error::Validation(format!(
                    "mileage must not be negative (got {})",
                    km
                )));
            }
            Some(_) => {}
        }

        if self.fuel_type.is_none() {
            return Err(Error::Validation(
                "fuel type must be explicitly set".to_string(),
            ));
        }
        if self.transmission.is_none() {
            return Err(Error::Validation(
                "transmission must be explicitly set".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether the descriptor passes [`validate`](VehicleDescriptor::validate)
    pub fn is_complete(&self) -> bool {
        self.validate().is_ok()
    }

    /// One-line human-readable summary, used in prompts, logs and reports
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("{} {} ({})", self.brand, self.model, self.build_year)];
        if let Some(km) = self.mileage_km {
            parts.push(format!("{} km", km));
        }
        if let Some(fuel) = self.fuel_type {
            parts.push(fuel.display_name().to_string());
        }
        if let Some(transmission) = self.transmission {
            parts.push(transmission.display_name().to_string());
        }
        if let Some(ref trim) = self.trim {
            parts.push(trim.clone());
        }
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn golf_diesel() -> VehicleDescriptor {
        VehicleDescriptor::new("Volkswagen", "Golf", 2019)
            .with_mileage(60_000)
            .with_fuel_type(FuelType::Diesel)
            .with_transmission(Transmission::Manual)
    }

    #[test]
    fn test_complete_descriptor_validates() {
        assert!(golf_diesel().validate().is_ok());
        assert!(golf_diesel().is_complete());
    }

    #[test]
    fn test_negative_mileage_rejected() {
        let descriptor = golf_diesel().with_mileage(-1);
        let err = descriptor.validate().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("mileage"));
    }

    #[test]
    fn test_missing_mileage_rejected() {
        let mut descriptor = golf_diesel();
        descriptor.mileage_km = None;
        assert!(descriptor.validate().is_err());
    }

    #[test]
    fn test_missing_transmission_rejected() {
        let mut descriptor = golf_diesel();
        descriptor.transmission = None;
        let err = descriptor.validate().unwrap_err();
        assert!(err.to_string().contains("transmission"));
    }

    #[test]
    fn test_missing_fuel_rejected() {
        let mut descriptor = golf_diesel();
        descriptor.fuel_type = None;
        assert!(descriptor.validate().is_err());
    }

    #[test]
    fn test_empty_brand_rejected() {
        let descriptor = VehicleDescriptor::new("", "Golf", 2019)
            .with_mileage(60_000)
            .with_fuel_type(FuelType::Diesel)
            .with_transmission(Transmission::Manual);
        assert!(descriptor.validate().is_err());
    }

    #[test]
    fn test_implausible_build_year_rejected() {
        let descriptor = golf_diesel();
        let old = VehicleDescriptor {
            build_year: 1850,
            ..descriptor.clone()
        };
        let future = VehicleDescriptor {
            build_year: 2999,
            ..descriptor
        };
        assert!(old.validate().is_err());
        assert!(future.validate().is_err());
    }

    #[test]
    fn test_transmission_from_str() {
        assert_eq!(
            Transmission::from_str("manual"),
            Some(Transmission::Manual)
        );
        assert_eq!(
            Transmission::from_str("Handgeschakeld"),
            Some(Transmission::Manual)
        );
        assert_eq!(
            Transmission::from_str("automaat"),
            Some(Transmission::Automatic)
        );
        assert_eq!(Transmission::from_str("tiptronic-ish"), None);
    }

    #[test]
    fn test_fuel_type_from_str() {
        assert_eq!(FuelType::from_str("Benzine"), Some(FuelType::Petrol));
        assert_eq!(FuelType::from_str("diesel"), Some(FuelType::Diesel));
        assert_eq!(
            FuelType::from_str("Elektriciteit"),
            Some(FuelType::Electric)
        );
        assert_eq!(FuelType::from_str("waterstof"), Some(FuelType::Hydrogen));
        assert_eq!(FuelType::from_str("steam"), None);
    }

    #[test]
    fn test_summary_contains_key_attributes() {
        let summary = golf_diesel().summary();
        assert!(summary.contains("Volkswagen Golf (2019)"));
        assert!(summary.contains("60000 km"));
        assert!(summary.contains("Diesel"));
        assert!(summary.contains("Manual"));
    }

    #[test]
    fn test_builder_chaining() {
        let descriptor = golf_diesel()
            .with_body_type("hatchback")
            .with_color("grijs")
            .with_trim("Highline")
            .with_power(115)
            .with_option("PDC")
            .with_option("ACC")
            .with_keyword("trekhaak");

        assert_eq!(descriptor.body_type.as_deref(), Some("hatchback"));
        assert_eq!(descriptor.power_hp, Some(115));
        assert_eq!(descriptor.options.len(), 2);
        assert_eq!(descriptor.keywords, vec!["trekhaak".to_string()]);
    }

    #[test]
    fn test_display_names() {
        insta::assert_yaml_snapshot!(
            vec![
                Transmission::Automatic.to_string(),
                Transmission::Manual.to_string(),
                FuelType::Diesel.to_string(),
                FuelType::Lpg.to_string(),
            ],
            @r###"
        ---
        - Automatic
        - Manual
        - Diesel
        - LPG
        "###
        );
    }
}
