//! Aggregator scraping scanner

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use tiv_core::{
    Error, Listing, MarketAnalysis, MarketScanner, Result, SearchWindow, VehicleDescriptor,
};

use crate::stats::summarize;

/// Scanner configuration
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Base URL of the listing aggregator
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.gaspedaal.nl".to_string(),
            timeout_secs: 20,
        }
    }
}

/// Market scanner scraping a listing aggregator's result pages
pub struct AggregatorScanner {
    config: ScannerConfig,
    client: Client,
}

impl AggregatorScanner {
    const CARD_SELECTOR: &'static str = "article.occasion";
    const TITLE_SELECTOR: &'static str = ".occasion-title";
    const PRICE_SELECTOR: &'static str = ".occasion-price";
    const MILEAGE_SELECTOR: &'static str = ".occasion-mileage";
    const YEAR_SELECTOR: &'static str = ".occasion-year";
    const LINK_SELECTOR: &'static str = "a.occasion-link";

    /// Create a new scanner from configuration
    pub fn new(config: ScannerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Build the aggregator search URL for a window
    pub fn search_url(&self, window: &SearchWindow) -> Result<Url> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| Error::Configuration(e.to_string()))?;
        url.set_path("/zoeken");

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("merk", &window.brand.to_lowercase());
            query.append_pair("model", &window.model.to_lowercase());
            query.append_pair("bjmin", &window.build_year_min.to_string());
            query.append_pair("bjmax", &window.build_year_max.to_string());
            query.append_pair("kmmin", &window.mileage_min.to_string());
            query.append_pair("kmmax", &window.mileage_max.to_string());
            if let Some(fuel) = window.fuel_type {
                query.append_pair("brandstof", &fuel.display_name().to_lowercase());
            }
            if let Some(transmission) = window.transmission {
                query.append_pair(
                    "transmissie",
                    &transmission.display_name().to_lowercase(),
                );
            }
        }

        Ok(url)
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header("Accept", "text/html")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout("market scan request timed out".to_string())
                } else {
                    Error::Network(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(Error::SourceUnavailable(format!(
                "aggregator returned status {}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))
    }

    /// Parse listing cards out of a result page
    pub fn parse_listings(&self, html: &str) -> Vec<Listing> {
        let document = Html::parse_document(html);
        let card = Selector::parse(Self::CARD_SELECTOR).expect("static selector");
        let title = Selector::parse(Self::TITLE_SELECTOR).expect("static selector");
        let price = Selector::parse(Self::PRICE_SELECTOR).expect("static selector");
        let mileage = Selector::parse(Self::MILEAGE_SELECTOR).expect("static selector");
        let year = Selector::parse(Self::YEAR_SELECTOR).expect("static selector");
        let link = Selector::parse(Self::LINK_SELECTOR).expect("static selector");

        let mut listings = Vec::new();
        for element in document.select(&card) {
            let Some(url) = element
                .select(&link)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(|href| self.absolute_url(href))
            else {
                continue;
            };

            let Some(price) = element
                .select(&price)
                .next()
                .and_then(|el| parse_price(&el.text().collect::<String>()))
            else {
                continue;
            };

            let title = element
                .select(&title)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .unwrap_or_default();

            let mileage_km = element
                .select(&mileage)
                .next()
                .and_then(|el| parse_number(&el.text().collect::<String>()));

            let build_year = element
                .select(&year)
                .next()
                .and_then(|el| parse_number(&el.text().collect::<String>()))
                .map(|y| y as i32);

            listings.push(Listing {
                id: format!("{:x}", md5::compute(&url)),
                url,
                title,
                price,
                mileage_km,
                build_year,
            });
        }

        listings
    }

    fn absolute_url(&self, href: &str) -> String {
        if href.starts_with("http") {
            href.to_string()
        } else {
            format!("{}{}", self.config.base_url.trim_end_matches('/'), href)
        }
    }

    /// Drop listings sharing a URL hash with an earlier one
    fn dedupe(listings: Vec<Listing>) -> Vec<Listing> {
        let mut seen = std::collections::HashSet::new();
        listings
            .into_iter()
            .filter(|listing| seen.insert(listing.id.clone()))
            .collect()
    }
}

#[async_trait]
impl MarketScanner for AggregatorScanner {
    async fn scan(
        &self,
        descriptor: &VehicleDescriptor,
        window: &SearchWindow,
    ) -> Result<MarketAnalysis> {
        // An empty window means the catalog stage fell back; synthesize the
        // filter from the descriptor instead
        let filter = if window.is_empty() {
            SearchWindow::from_descriptor(descriptor)
        } else {
            window.clone()
        };

        let search_url = self.search_url(&filter)?;
        debug!(url = %search_url, "scanning market listings");

        let page = self.fetch_page(search_url.as_str()).await?;
        let mut listings = self.parse_listings(&page);
        let mut fetch_deviations = Vec::new();

        // Comparables the catalog already matched are fetched individually;
        // a single unreachable URL degrades the scan, it does not fail it
        for url in &filter.listing_urls {
            match self.fetch_page(url).await {
                Ok(page) => listings.extend(self.parse_listings(&page)),
                Err(e) => {
                    warn!(url = %url, error = %e, "window listing unreachable");
                    fetch_deviations.push(format!("comparable listing unreachable: {}", url));
                }
            }
        }

        let listings = Self::dedupe(listings);
        let mut analysis = summarize(descriptor, filter, listings);
        analysis.deviations.extend(fetch_deviations);
        Ok(analysis)
    }
}

/// Parse a localized price like "€ 15.950,-"
fn parse_price(text: &str) -> Option<f64> {
    let digits: String = text.chars().take_while(|c| *c != ',').filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Parse a localized integer like "60.000 km"
fn parse_number(text: &str) -> Option<i64> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiv_core::{FuelType, Transmission};

    const SAMPLE_PAGE: &str = r#"
    <html><body>
      <article class="occasion">
        <a class="occasion-link" href="/occasion/12345"></a>
        <span class="occasion-title">Volkswagen Golf 1.6 TDI Highline</span>
        <span class="occasion-price">&euro; 15.950,-</span>
        <span class="occasion-mileage">61.000 km</span>
        <span class="occasion-year">2019</span>
      </article>
      <article class="occasion">
        <a class="occasion-link" href="https://elders.test/occasion/9"></a>
        <span class="occasion-title">Volkswagen Golf 1.6 TDI</span>
        <span class="occasion-price">&euro; 14.750,-</span>
        <span class="occasion-mileage">78.500 km</span>
        <span class="occasion-year">2018</span>
      </article>
      <article class="occasion">
        <span class="occasion-title">Card without link is skipped</span>
        <span class="occasion-price">&euro; 1,-</span>
      </article>
    </body></html>
    "#;

    fn scanner() -> AggregatorScanner {
        AggregatorScanner::new(ScannerConfig::default()).unwrap()
    }

    #[test]
    fn test_parse_listings_from_result_page() {
        let listings = scanner().parse_listings(SAMPLE_PAGE);
        assert_eq!(listings.len(), 2);

        let first = &listings[0];
        assert_eq!(first.url, "https://www.gaspedaal.nl/occasion/12345");
        assert_eq!(first.title, "Volkswagen Golf 1.6 TDI Highline");
        assert_eq!(first.price, 15_950.0);
        assert_eq!(first.mileage_km, Some(61_000));
        assert_eq!(first.build_year, Some(2019));

        // absolute URLs pass through untouched
        assert_eq!(listings[1].url, "https://elders.test/occasion/9");
    }

    #[test]
    fn test_listing_identity_is_url_hash() {
        let listings = scanner().parse_listings(SAMPLE_PAGE);
        assert_eq!(
            listings[0].id,
            format!("{:x}", md5::compute(&listings[0].url))
        );
        assert_ne!(listings[0].id, listings[1].id);
    }

    #[test]
    fn test_dedupe_by_url_hash() {
        let mut listings = scanner().parse_listings(SAMPLE_PAGE);
        listings.extend(scanner().parse_listings(SAMPLE_PAGE));
        assert_eq!(AggregatorScanner::dedupe(listings).len(), 2);
    }

    #[test]
    fn test_search_url_carries_filter() {
        let descriptor = VehicleDescriptor::new("Volkswagen", "Golf", 2019)
            .with_mileage(60_000)
            .with_fuel_type(FuelType::Diesel)
            .with_transmission(Transmission::Manual);
        let window = SearchWindow::from_descriptor(&descriptor);

        let url = scanner().search_url(&window).unwrap();
        let query = url.query().unwrap();
        assert!(url.path().ends_with("/zoeken"));
        assert!(query.contains("merk=volkswagen"));
        assert!(query.contains("bjmin=2018"));
        assert!(query.contains("bjmax=2020"));
        assert!(query.contains("kmmin=45000"));
        assert!(query.contains("brandstof=diesel"));
        assert!(query.contains("transmissie=manual"));
    }

    #[test]
    fn test_parse_price_handles_separators() {
        assert_eq!(parse_price("€ 15.950,-"), Some(15_950.0));
        assert_eq!(parse_price("15950"), Some(15_950.0));
        assert_eq!(parse_price("op aanvraag"), None);
    }

    #[test]
    fn test_parse_number_handles_units() {
        assert_eq!(parse_number("61.000 km"), Some(61_000));
        assert_eq!(parse_number("2019"), Some(2019));
        assert_eq!(parse_number("-"), None);
    }
}
