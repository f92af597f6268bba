//! Unified catalog: loading, caching and price refreshes

pub mod cache;
pub mod loader;
pub mod service;

pub use cache::{CatalogCache, Clock, ManualClock, SystemClock};
pub use loader::{load_catalog, read_all_datasets, sort_by_priority, LoadReport};
pub use service::{CatalogService, CatalogStatus};
