//! Live price feeds and their reconciliation into the catalog

mod feed;
mod reconcile;

pub use feed::{fetch_price_rows, fetch_with_retry, parse_price_rows, PriceRow, RetryPolicy};
pub use reconcile::{apply_price_rows, PriceReconciler, ReconcileReport};
