//! Merging fetched price rows into catalog records

use super::feed::{fetch_with_retry, PriceRow, RetryPolicy};
use crate::models::{CardRecord, PriceFields};
use crate::sets::PriceFeed;
use serde::Serialize;
use std::collections::HashMap;

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    /// Feed rows whose prices were written into a record
    pub updated: usize,
    /// Feed rows with a product ID that matched no record of that feed's file
    pub skipped: usize,
    /// Source files whose feed could not be fetched this cycle
    pub failed_feeds: Vec<String>,
}

/// Write the prices of `rows` into the records loaded from `source_file`.
///
/// Matching is by exact product ID within that file; each row updates at most
/// one record. Returns (updated, skipped).
pub fn apply_price_rows(
    records: &mut [CardRecord],
    source_file: &str,
    rows: &[PriceRow],
) -> (usize, usize) {
    let mut index: HashMap<String, usize> = HashMap::new();
    for (i, record) in records.iter().enumerate() {
        if record.source_file == source_file {
            index.entry(record.product_id.clone()).or_insert(i);
        }
    }

    let mut updated = 0;
    let mut skipped = 0;

    for row in rows {
        let product_id = row.product_id.trim();
        if product_id.is_empty() {
            continue;
        }

        match index.get(product_id) {
            Some(&i) => {
                records[i].prices = PriceFields {
                    low: row.low_price,
                    mid: row.mid_price,
                    high: row.high_price,
                    market: row.market_price,
                };
                updated += 1;
            }
            None => {
                log::debug!("{}: no local record for product {}", source_file, product_id);
                skipped += 1;
            }
        }
    }

    (updated, skipped)
}

/// Fetches every configured feed and applies it to a record list
#[derive(Debug, Clone)]
pub struct PriceReconciler {
    client: reqwest::Client,
    feeds: Vec<PriceFeed>,
    policy: RetryPolicy,
}

impl PriceReconciler {
    pub fn new(client: reqwest::Client, feeds: Vec<PriceFeed>, policy: RetryPolicy) -> Self {
        Self {
            client,
            feeds,
            policy,
        }
    }

    pub fn feeds(&self) -> &[PriceFeed] {
        &self.feeds
    }

    /// Refresh the price fields of `records` in place.
    ///
    /// All feeds are fetched concurrently; a feed that fails is reported in
    /// `failed_feeds` and its records keep their previous prices.
    pub async fn reconcile(&self, records: &mut [CardRecord]) -> ReconcileReport {
        let handles: Vec<_> = self
            .feeds
            .iter()
            .cloned()
            .map(|feed| {
                let client = self.client.clone();
                let policy = self.policy;
                tokio::spawn(async move {
                    let result = fetch_with_retry(&client, &feed.url, policy).await;
                    (feed, result)
                })
            })
            .collect();

        let mut report = ReconcileReport::default();

        for (feed, handle) in self.feeds.iter().zip(handles) {
            match handle.await {
                Ok((feed, Ok(rows))) => {
                    let (updated, skipped) = apply_price_rows(records, &feed.source_file, &rows);
                    log::info!(
                        "{}: {} prices updated, {} rows without local record",
                        feed.source_file,
                        updated,
                        skipped
                    );
                    report.updated += updated;
                    report.skipped += skipped;
                }
                Ok((feed, Err(e))) => {
                    log::warn!("Price feed for {} failed: {}", feed.source_file, e);
                    report.failed_feeds.push(feed.source_file);
                }
                Err(e) => {
                    log::error!("Price feed task for {} aborted: {}", feed.source_file, e);
                    report.failed_feeds.push(feed.source_file.clone());
                }
            }
        }

        report
    }
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
