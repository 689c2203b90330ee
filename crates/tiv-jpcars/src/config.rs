//! JP Cars API configuration

use serde::{Deserialize, Serialize};
use std::env;

use tiv_core::{Error, Result};

/// Configuration for the JP Cars pricing-catalog client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JpCarsConfig {
    pub api_key: String,
    pub api_secret: String,
    pub api_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl JpCarsConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = env::var("JPCARS_API_KEY").map_err(|_| {
            Error::Configuration("JPCARS_API_KEY environment variable not found".to_string())
        })?;

        let api_secret = env::var("JPCARS_API_SECRET").map_err(|_| {
            Error::Configuration("JPCARS_API_SECRET environment variable not found".to_string())
        })?;

        let api_url = env::var("JPCARS_API_URL")
            .unwrap_or_else(|_| "https://api.jpcars.nl".to_string());

        let timeout_secs = env::var("JPCARS_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(15);

        Ok(Self {
            api_key,
            api_secret,
            api_url,
            timeout_secs,
        })
    }

    /// Create configuration with explicit credentials
    pub fn new(api_key: String, api_secret: String) -> Self {
        Self {
            api_key,
            api_secret,
            api_url: "https://api.jpcars.nl".to_string(),
            timeout_secs: 15,
        }
    }
}
