//! Runtime configuration

use crate::pricing::RetryPolicy;
use std::path::PathBuf;

/// Settings shared by the catalog service, image cache and web server
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the per-set dataset CSVs (and optional `sets.json`)
    pub data_dir: PathBuf,
    /// Directory for downloaded card images
    pub image_dir: PathBuf,
    pub port: u16,
    /// How long a loaded catalog is served before a full reload
    pub cache_ttl: chrono::Duration,
    pub retry: RetryPolicy,
    /// Parallel downloads for the bulk image download
    pub download_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            image_dir: default_image_dir(),
            port: 3001,
            cache_ttl: chrono::Duration::hours(24),
            retry: RetryPolicy::default(),
            download_concurrency: 8,
        }
    }
}

/// Returns the default image directory: ~/.cache/card_catalog/images
pub fn default_image_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("card_catalog")
        .join("images")
}
