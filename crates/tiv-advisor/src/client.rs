//! OpenAI-compatible advice-synthesis client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use tiv_core::{
    Advice, AdviceSynthesizer, CatalogValuation, Error, InternalComparison, MarketAnalysis,
    Result, VehicleDescriptor,
};

use crate::config::AdvisorConfig;

/// LLM client producing the final trade-in advice
///
/// Every failure in this client maps to the synthesis error class: unlike
/// the data-gathering stages, a failed synthesis fails the whole run.
pub struct AdvisorClient {
    config: AdvisorConfig,
    client: Client,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct AdviceReply {
    advised_price: f64,
    rationale: String,
    #[serde(default)]
    risk_flags: Vec<String>,
    confidence: f64,
}

impl AdvisorClient {
    /// Create a new advisor client from configuration
    pub fn new(config: AdvisorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Synthesis(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Create a new advisor client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = AdvisorConfig::from_env()?;
        Self::new(config)
    }

    /// Build the synthesis prompt from the full merged stage context
    ///
    /// Fallback-valued stage results are serialized too, explicitly flagged
    /// as unavailable, so the model treats them as reduced evidence instead
    /// of fabricating numbers for them.
    pub fn build_prompt(
        descriptor: &VehicleDescriptor,
        catalog: &CatalogValuation,
        market: &MarketAnalysis,
        history: &InternalComparison,
    ) -> String {
        let catalog_block = if catalog.is_unavailable() {
            "UNAVAILABLE (the pricing catalog could not be reached)".to_string()
        } else {
            serde_json::json!({
                "base_value": catalog.base_value,
                "options_value": catalog.options_value,
                "total_value": catalog.total_value,
                "range": catalog.range,
                "confidence": catalog.confidence,
                "liquidity": catalog.liquidity.display_name(),
                "expected_resale_days": catalog.expected_resale_days,
            })
            .to_string()
        };

        let market_block = if market.is_unavailable() {
            "UNAVAILABLE (the market scan could not be completed)".to_string()
        } else {
            serde_json::json!({
                "lowest_price": market.lowest_price,
                "median_price": market.median_price,
                "highest_price": market.highest_price,
                "listing_count": market.listing_count,
                "primary_count": market.primary_count,
                "deviations": market.deviations,
            })
            .to_string()
        };

        let history_block = if history.is_unavailable() {
            "UNAVAILABLE (the dealer's sales history could not be reached)".to_string()
        } else {
            serde_json::json!({
                "average_margin": history.average_margin,
                "average_days_to_sell": history.average_days_to_sell,
                "sold_business_12m": history.sold_business_12m,
                "sold_consumer_12m": history.sold_consumer_12m,
                "similar_sold_count": history.similar_sold.len(),
            })
            .to_string()
        };

        format!(
            "You are a used-car appraiser advising a dealership on a trade-in offer.

Vehicle: {}

Catalog valuation: {}
Live market scan: {}
Dealer sales history: {}

Determine a defensible trade-in price in euros. A trade-in offer must leave \
room for reconditioning and margin below the expected retail price. When a \
data source is marked UNAVAILABLE, lower your confidence and add a risk flag \
naming the missing source; never invent figures for it.

Output strictly valid JSON with fields:
- 'advised_price' (number, euros)
- 'rationale' (concise plain-language reasoning)
- 'risk_flags' (array of short strings, may be empty)
- 'confidence' (0.0 to 1.0)",
            descriptor.summary(),
            catalog_block,
            market_block,
            history_block
        )
    }

    /// Strip markdown code fences an LLM may wrap around its JSON
    pub fn clean_reply(content: &str) -> &str {
        content
            .trim()
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim()
    }

    fn parse_advice(&self, content: &str) -> Result<Advice> {
        let clean = Self::clean_reply(content);
        let reply: AdviceReply = serde_json::from_str(clean).map_err(|e| {
            Error::Synthesis(format!("unparseable advice JSON: {} ({})", e, clean))
        })?;

        if !reply.advised_price.is_finite() || reply.advised_price < 0.0 {
            return Err(Error::Synthesis(format!(
                "implausible advised price: {}",
                reply.advised_price
            )));
        }

        Ok(Advice {
            trade_in_price: reply.advised_price,
            rationale: reply.rationale,
            risk_flags: reply.risk_flags,
            confidence: reply.confidence.clamp(0.0, 1.0),
            model_id: self.config.model.clone(),
        })
    }
}

#[async_trait]
impl AdviceSynthesizer for AdvisorClient {
    async fn synthesize(
        &self,
        descriptor: &VehicleDescriptor,
        catalog: &CatalogValuation,
        market: &MarketAnalysis,
        history: &InternalComparison,
    ) -> Result<Advice> {
        let prompt = Self::build_prompt(descriptor, catalog, market, history);
        let url = format!("{}/chat/completions", self.config.base_url);

        debug!(model = %self.config.model, "requesting advice synthesis");

        let request_body = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "You are a helpful assistant that outputs JSON.".to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            temperature: 0.0,
        };

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| Error::Synthesis(format!("advisor request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Synthesis(format!(
                "advisor endpoint returned status {}: {}",
                status, error_text
            )));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Synthesis(format!("malformed advisor reply: {}", e)))?;

        let content = reply
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .ok_or_else(|| Error::Synthesis("advisor reply carried no content".to_string()))?;

        self.parse_advice(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiv_core::{FuelType, Liquidity, PriceRange, SearchWindow, Transmission};

    fn golf() -> VehicleDescriptor {
        VehicleDescriptor::new("Volkswagen", "Golf", 2019)
            .with_mileage(60_000)
            .with_fuel_type(FuelType::Diesel)
            .with_transmission(Transmission::Manual)
    }

    fn catalog() -> CatalogValuation {
        CatalogValuation {
            base_value: 15_000.0,
            options_value: 850.0,
            total_value: 15_850.0,
            range: PriceRange {
                min: 14_900.0,
                max: 16_700.0,
            },
            confidence: 0.9,
            liquidity: Liquidity::High,
            expected_resale_days: 21,
            window: SearchWindow::from_descriptor(&golf()),
            note: None,
        }
    }

    fn client() -> AdvisorClient {
        AdvisorClient::new(AdvisorConfig::new(
            "test_key".to_string(),
            "gpt-4o-mini".to_string(),
        ))
        .unwrap()
    }

    #[test]
    fn test_prompt_carries_vehicle_and_figures() {
        let prompt = AdvisorClient::build_prompt(
            &golf(),
            &catalog(),
            &MarketAnalysis::unavailable(),
            &InternalComparison::unavailable(),
        );
        assert!(prompt.contains("Volkswagen Golf (2019)"));
        assert!(prompt.contains("15850"));
        assert!(prompt.contains("strictly valid JSON"));
    }

    #[test]
    fn test_prompt_flags_fallback_sources_as_unavailable() {
        let prompt = AdvisorClient::build_prompt(
            &golf(),
            &CatalogValuation::unavailable(),
            &MarketAnalysis::unavailable(),
            &InternalComparison::unavailable(),
        );
        assert!(prompt.contains("UNAVAILABLE (the pricing catalog"));
        assert!(prompt.contains("UNAVAILABLE (the market scan"));
        assert!(prompt.contains("UNAVAILABLE (the dealer's sales history"));
        // no fabricated zero figures for the missing catalog
        assert!(!prompt.contains("\"total_value\":0"));
    }

    #[test]
    fn test_clean_reply_strips_fences() {
        assert_eq!(
            AdvisorClient::clean_reply("```json\n{\"a\":1}\n```"),
            "{\"a\":1}"
        );
        assert_eq!(AdvisorClient::clean_reply("{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn test_parse_advice_records_model_for_audit() {
        let advice = client()
            .parse_advice(
                r#"{"advised_price": 14200.0, "rationale": "priced under retail median",
                    "risk_flags": ["diesel demand softening"], "confidence": 0.8}"#,
            )
            .unwrap();
        assert_eq!(advice.trade_in_price, 14_200.0);
        assert_eq!(advice.risk_flags.len(), 1);
        assert_eq!(advice.model_id, "gpt-4o-mini");
    }

    #[test]
    fn test_parse_advice_defaults_missing_risk_flags() {
        let advice = client()
            .parse_advice(r#"{"advised_price": 100.0, "rationale": "r", "confidence": 0.5}"#)
            .unwrap();
        assert!(advice.risk_flags.is_empty());
    }

    #[test]
    fn test_unparseable_reply_is_synthesis_error() {
        let err = client().parse_advice("I think around 14k?").unwrap_err();
        assert!(matches!(err, Error::Synthesis(_)));
    }

    #[test]
    fn test_negative_price_rejected() {
        let err = client()
            .parse_advice(r#"{"advised_price": -5.0, "rationale": "r", "confidence": 0.5}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Synthesis(_)));
    }

    #[test]
    fn test_confidence_clamped() {
        let advice = client()
            .parse_advice(r#"{"advised_price": 100.0, "rationale": "r", "confidence": 3.0}"#)
            .unwrap();
        assert_eq!(advice.confidence, 1.0);
    }
}
