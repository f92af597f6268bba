//! Card Catalog - TCG collection catalog service
//!
//! Merges per-set card datasets (CSV) with live price feeds into one cached,
//! release-ordered catalog, and serves faceted searches, deck list imports
//! and card images over HTTP.

pub mod catalog;
pub mod config;
pub mod dataset;
pub mod deck_import;
pub mod error;
pub mod filter;
pub mod image_cache;
pub mod models;
pub mod pricing;
pub mod sets;
pub mod web;

pub use catalog::{CatalogService, CatalogStatus, LoadReport};
pub use config::Config;
pub use deck_import::{import_deck_list, parse_deck_list, ImportReport};
pub use error::{CatalogError, Result};
pub use filter::{annotate_owned, apply_filters, FilterSelection};
pub use image_cache::{DownloadSummary, ImageCache};
pub use models::{CardRecord, CardType, DeckCard, DeckEntry, PriceFields};
pub use pricing::{PriceReconciler, ReconcileReport};
pub use sets::{SetEntry, SetRegistry};
