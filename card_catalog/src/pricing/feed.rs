//! Live price feed fetching and parsing

use crate::error::{CatalogError, Result};
use serde::Deserialize;
use std::time::Duration;

const USER_AGENT: &str = "card_catalog/1.0";

/// One row of a remote price feed. Other columns of the feed are ignored.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceRow {
    #[serde(default)]
    pub product_id: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub low_price: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub mid_price: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub high_price: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub market_price: Option<f64>,
}

/// Bounded retry with exponential backoff for feed downloads
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub retries: u32,
    /// Delay before the first retry; doubled for each following one
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            initial_backoff: Duration::from_millis(500),
        }
    }
}

/// Parse price feed CSV text
pub fn parse_price_rows(text: &str) -> Result<Vec<PriceRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}

/// Fetch one price feed (single attempt)
pub async fn fetch_price_rows(client: &reqwest::Client, url: &str) -> Result<Vec<PriceRow>> {
    let response = client
        .get(url)
        .header("User-Agent", USER_AGENT)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(CatalogError::HttpStatus(response.status()));
    }

    let text = response.text().await?;
    parse_price_rows(&text)
}

/// Fetch one price feed, retrying failed attempts according to `policy`
pub async fn fetch_with_retry(
    client: &reqwest::Client,
    url: &str,
    policy: RetryPolicy,
) -> Result<Vec<PriceRow>> {
    let mut backoff = policy.initial_backoff;
    let mut attempt = 0;

    loop {
        match fetch_price_rows(client, url).await {
            Ok(rows) => {
                log::debug!("Fetched {} price rows from {}", rows.len(), url);
                return Ok(rows);
            }
            Err(e) if attempt < policy.retries => {
                attempt += 1;
                log::warn!(
                    "Price feed {} failed ({}), retry {}/{} in {:?}",
                    url,
                    e,
                    attempt,
                    policy.retries,
                    backoff
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
            Err(e) => return Err(e),
        }
    }
}
