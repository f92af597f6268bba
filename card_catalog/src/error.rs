//! Error types for card_catalog

use thiserror::Error;

/// Unified error type for catalog operations
#[derive(Debug, Error)]
pub enum CatalogError {
    /// File or directory access failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Failed to read or deserialize CSV data
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// HTTP request failed (network error, timeout, etc.)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP error status code
    #[error("HTTP error: {0}")]
    HttpStatus(reqwest::StatusCode),
    /// Failed to parse JSON (set manifest)
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// A price refresh was requested before any catalog was cached
    #[error("No catalog loaded yet")]
    NotLoaded,
    /// Another load or price refresh currently holds the catalog
    #[error("A catalog refresh is already in progress")]
    RefreshInProgress,
    /// Card number prefix does not map to a known set
    #[error("Unknown set: {0}")]
    UnknownSet(String),
    /// Image URL could not be parsed or uses an unsupported scheme
    #[error("Invalid image URL: {0}")]
    InvalidImageUrl(String),
    /// Failed to fetch image from URL
    #[error("Failed to fetch image from: {0}")]
    ImageFetchFailed(String),
    /// A blocking or spawned task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Result alias for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;
