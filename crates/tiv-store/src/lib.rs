//! Valuation-record persistence for TIV
//!
//! This crate provides the CRM-datastore implementation of the
//! ValuationStore trait: one POST per completed record into the shared
//! `taxaties` table, with the `taxatie_type` discriminator separating the
//! trade-in flow from the plain valuation flow.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use tiv_core::{Error, Result, ValuationRecord, ValuationStore};

/// CRM datastore configuration for record persistence
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL of the CRM backend
    pub backend_url: String,
    /// Service key sent on every request
    pub service_key: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl StoreConfig {
    /// Create configuration with explicit values
    pub fn new(backend_url: String, service_key: String) -> Self {
        Self {
            backend_url,
            service_key,
            timeout_secs: 10,
        }
    }
}

/// Record store against the CRM datastore
pub struct RestStore {
    config: StoreConfig,
    client: Client,
}

#[derive(Deserialize)]
struct InsertedRow {
    id: String,
}

impl RestStore {
    /// Create a new store client from configuration
    pub fn new(config: StoreConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Persistence(e.to_string()))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl ValuationStore for RestStore {
    async fn insert(&self, record: &ValuationRecord) -> Result<String> {
        let url = format!("{}/rest/v1/taxaties", self.config.backend_url);

        debug!(vehicle = %record.descriptor.summary(), "persisting valuation record");

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.config.service_key)
            .header("Content-Type", "application/json")
            // ask the datastore to echo the row so we learn the assigned id
            .header("Prefer", "return=representation")
            .json(record)
            .send()
            .await
            .map_err(|e| Error::Persistence(format!("insert request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Persistence(format!(
                "insert failed with status {}: {}",
                status, error_text
            )));
        }

        let rows: Vec<InsertedRow> = response
            .json()
            .await
            .map_err(|e| Error::Persistence(format!("malformed insert reply: {}", e)))?;

        rows.into_iter()
            .next()
            .map(|row| row.id)
            .ok_or_else(|| Error::Persistence("insert reply carried no row".to_string()))
    }
}
