//! Manual entry: clap arguments to a vehicle descriptor

use clap::Args;

use tiv_core::{Error, FuelType, Result, Transmission, VehicleDescriptor};

/// Vehicle attributes entered by hand
///
/// Mileage and transmission are always explicit flags, never inferred: the
/// pipeline refuses to run without them. When a plate lookup supplied a base
/// descriptor, these flags overlay it.
#[derive(Debug, Clone, Args)]
pub struct VehicleArgs {
    /// Vehicle brand (e.g. Volkswagen)
    #[arg(long)]
    pub brand: Option<String>,

    /// Vehicle model (e.g. Golf)
    #[arg(long)]
    pub model: Option<String>,

    /// Build year
    #[arg(long)]
    pub build_year: Option<i32>,

    /// Model year, when it differs from the build year
    #[arg(long)]
    pub model_year: Option<i32>,

    /// Odometer reading in kilometers
    #[arg(long)]
    pub mileage: Option<i64>,

    /// Fuel type (petrol, diesel, electric, hybrid, lpg, cng, hydrogen)
    #[arg(long)]
    pub fuel: Option<String>,

    /// Transmission (automatic, manual)
    #[arg(long)]
    pub transmission: Option<String>,

    /// Body type (e.g. hatchback)
    #[arg(long)]
    pub body_type: Option<String>,

    /// Engine power in horsepower
    #[arg(long)]
    pub power: Option<u32>,

    /// Exterior color
    #[arg(long)]
    pub color: Option<String>,

    /// Trim level (e.g. Highline)
    #[arg(long)]
    pub trim: Option<String>,

    /// Factory option code, repeatable
    #[arg(long = "option")]
    pub options: Vec<String>,

    /// Free-text search keyword, repeatable
    #[arg(long = "keyword")]
    pub keywords: Vec<String>,
}

impl VehicleArgs {
    /// Build a descriptor, overlaying these flags onto an optional base
    ///
    /// The base is typically a registration-lookup result; every flag that
    /// was given wins over the base value. Without a base, brand, model and
    /// build year must be given here.
    pub fn into_descriptor(self, base: Option<VehicleDescriptor>) -> Result<VehicleDescriptor> {
        let mut descriptor = match base {
            Some(base) => base,
            None => {
                let brand = self.brand.clone().ok_or_else(|| {
                    Error::Validation("--brand is required without a plate lookup".to_string())
                })?;
                let model = self.model.clone().ok_or_else(|| {
                    Error::Validation("--model is required without a plate lookup".to_string())
                })?;
                let build_year = self.build_year.ok_or_else(|| {
                    Error::Validation(
                        "--build-year is required without a plate lookup".to_string(),
                    )
                })?;
                VehicleDescriptor::new(brand, model, build_year)
            }
        };

        if let Some(brand) = self.brand {
            descriptor.brand = brand;
        }
        if let Some(model) = self.model {
            descriptor.model = model;
        }
        if let Some(build_year) = self.build_year {
            descriptor.build_year = build_year;
        }
        if let Some(model_year) = self.model_year {
            descriptor.model_year = Some(model_year);
        }
        if let Some(mileage) = self.mileage {
            descriptor.mileage_km = Some(mileage);
        }
        if let Some(fuel) = self.fuel {
            descriptor.fuel_type = Some(FuelType::from_str(&fuel).ok_or_else(|| {
                Error::Validation(format!("unknown fuel type '{}'", fuel))
            })?);
        }
        if let Some(transmission) = self.transmission {
            descriptor.transmission =
                Some(Transmission::from_str(&transmission).ok_or_else(|| {
                    Error::Validation(format!("unknown transmission '{}'", transmission))
                })?);
        }
        if let Some(body_type) = self.body_type {
            descriptor.body_type = Some(body_type);
        }
        if let Some(power) = self.power {
            descriptor.power_hp = Some(power);
        }
        if let Some(color) = self.color {
            descriptor.color = Some(color);
        }
        if let Some(trim) = self.trim {
            descriptor.trim = Some(trim);
        }
        if !self.options.is_empty() {
            descriptor.options = self.options;
        }
        if !self.keywords.is_empty() {
            descriptor.keywords = self.keywords;
        }

        Ok(descriptor)
    }
}
