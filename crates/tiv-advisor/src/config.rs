//! Advisor LLM configuration

use serde::{Deserialize, Serialize};
use std::env;

use tiv_core::{Error, Result};

/// Configuration for the advice-synthesis LLM client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorConfig {
    pub api_key: String,
    /// Base URL of an OpenAI-compatible endpoint
    pub base_url: String,
    pub model: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl AdvisorConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = env::var("ADVISOR_API_KEY")
            .or_else(|_| env::var("OPENAI_API_KEY"))
            .map_err(|_| {
                Error::Configuration(
                    "ADVISOR_API_KEY or OPENAI_API_KEY environment variable not found".to_string(),
                )
            })?;

        let base_url = env::var("ADVISOR_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

        let model = env::var("ADVISOR_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let timeout_secs = env::var("ADVISOR_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(45);

        Ok(Self {
            api_key,
            base_url,
            model,
            timeout_secs,
        })
    }

    /// Create configuration with explicit values
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            base_url: "https://api.openai.com/v1".to_string(),
            model,
            timeout_secs: 45,
        }
    }
}
