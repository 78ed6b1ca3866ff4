//! HTTP client for the `OpenFoodFacts` product API.
//!
//! One `GET` per barcode, no retries. Every transport, status and payload
//! problem is folded into a [`LookupOutcome`] so the extractor can move on to
//! its next candidate.

use std::time::Duration;

use async_trait::async_trait;
use nutriscan_core::{AppConfig, BarcodeLookup, CanonicalBarcode, LookupOutcome, NutritionRecord};
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, warn};

use crate::error::FoodFactsError;
use crate::types::ProductResponse;

pub const DEFAULT_BASE_URL: &str = "https://world.openfoodfacts.net/api/v2/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_USER_AGENT: &str = "nutriscan/0.1 (barcode-nutrition)";
const MAX_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Client for the `OpenFoodFacts` v2 product endpoint.
///
/// Use [`FoodFactsClient::new`] for production or
/// [`FoodFactsClient::with_base_url`] to point at a mock server in tests.
pub struct FoodFactsClient {
    client: Client,
    base_url: Url,
}

impl FoodFactsClient {
    /// Creates a client pointed at the public `OpenFoodFacts` API.
    ///
    /// # Errors
    ///
    /// Returns [`FoodFactsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64) -> Result<Self, FoodFactsError> {
        Self::with_base_url(timeout_secs, DEFAULT_USER_AGENT, DEFAULT_BASE_URL)
    }

    /// Creates a client from the loaded application config.
    ///
    /// # Errors
    ///
    /// As [`FoodFactsClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, FoodFactsError> {
        Self::with_base_url(
            config.foodfacts_timeout_secs,
            &config.user_agent,
            &config.foodfacts_base_url,
        )
    }

    /// Creates a client with a custom base URL and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`FoodFactsError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`FoodFactsError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    pub fn with_base_url(
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, FoodFactsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(
                timeout_secs.min(MAX_CONNECT_TIMEOUT_SECS),
            ))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash, so `join` appends below the API root
        // instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| FoodFactsError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    /// URL of the product document for `barcode`.
    fn product_url(&self, barcode: &CanonicalBarcode) -> Option<Url> {
        self.base_url
            .join(&format!("product/{barcode}.json"))
            .ok()
    }

    /// Looks up one barcode.
    ///
    /// | response | outcome |
    /// |---|---|
    /// | 404 | `NotFound` |
    /// | other non-200 | `Error("API Error: <code> - <reason>")` |
    /// | body not JSON | `Error("Invalid response from API")` |
    /// | status flag not success | `NotFound` |
    /// | nutriments missing or empty | `Error("No nutrition data available")` |
    /// | nutriments present | `Found` |
    /// | timeout | `Error("Request timeout")` |
    /// | connection failure | `Error("Connection error")` |
    /// | other transport failure | `Error("Network error: <detail>")` |
    pub async fn fetch_product(&self, barcode: &CanonicalBarcode) -> LookupOutcome {
        let Some(url) = self.product_url(barcode) else {
            return LookupOutcome::Error(format!("Network error: invalid product URL for {barcode}"));
        };
        debug!(barcode = %barcode, url = %url, "fetching product");

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return transport_error(barcode, &e),
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(barcode = %barcode, "product not found (404)");
            return LookupOutcome::NotFound;
        }
        if status != StatusCode::OK {
            warn!(barcode = %barcode, status = status.as_u16(), "unexpected API status");
            return LookupOutcome::Error(format!(
                "API Error: {} - {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            ));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return transport_error(barcode, &e),
        };

        let Ok(parsed) = serde_json::from_str::<ProductResponse>(&body) else {
            warn!(barcode = %barcode, "response body is not a product document");
            return LookupOutcome::Error("Invalid response from API".to_string());
        };

        if !parsed.is_success() {
            debug!(
                barcode = %barcode,
                status_verbose = parsed.status_verbose.as_deref().unwrap_or(""),
                "product absent from database"
            );
            return LookupOutcome::NotFound;
        }

        let name = parsed.product_name().unwrap_or("").to_string();
        match parsed.into_nutriments() {
            Some(nutriments) => {
                debug!(
                    barcode = %barcode,
                    product = %name,
                    fields = nutriments.len(),
                    "product found"
                );
                LookupOutcome::Found(NutritionRecord::new(nutriments))
            }
            None => {
                debug!(barcode = %barcode, product = %name, "product has no nutriments");
                LookupOutcome::Error("No nutrition data available".to_string())
            }
        }
    }
}

#[async_trait]
impl BarcodeLookup for FoodFactsClient {
    async fn lookup(&self, barcode: &CanonicalBarcode) -> LookupOutcome {
        self.fetch_product(barcode).await
    }
}

fn transport_error(barcode: &CanonicalBarcode, e: &reqwest::Error) -> LookupOutcome {
    let reason = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection error".to_string()
    } else {
        format!("Network error: {e}")
    };
    warn!(barcode = %barcode, error = %e, reason = %reason, "product lookup failed");
    LookupOutcome::Error(reason)
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
