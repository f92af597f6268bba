//! Persistent cache for card images
//!
//! Images are stored as files in the cache directory, named after the last
//! path segment of their high-resolution URL prefixed with a short digest of
//! the whole URL.

use crate::error::{CatalogError, Result};
use reqwest::Url;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

const USER_AGENT: &str = "card_catalog/1.0";

/// Thumbnail marker in catalog image URLs and its high-resolution replacement
const THUMBNAIL_SUFFIX: &str = "_200w.";
const HIGH_RES_SUFFIX: &str = "_in_1000x1000.";

/// Hex digits of the URL digest kept in cache file names
const URL_DIGEST_LEN: usize = 12;

/// Resolve the canonical high-resolution variant of a catalog image URL.
///
/// Only http(s) URLs are accepted. `.../588123_200w.jpg` becomes
/// `.../588123_in_1000x1000.jpg`; URLs without the thumbnail marker are kept.
pub fn resolve_image_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|_| CatalogError::InvalidImageUrl(raw.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(CatalogError::InvalidImageUrl(raw.to_string()));
    }

    if url.path().contains(THUMBNAIL_SUFFIX) {
        let path = url.path().replacen(THUMBNAIL_SUFFIX, HIGH_RES_SUFFIX, 1);
        let mut resolved = url;
        resolved.set_path(&path);
        return Ok(resolved);
    }

    Ok(url)
}

/// Content type for a cached file name
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}

/// Outcome of a bulk image download
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DownloadSummary {
    pub successful: usize,
    pub skipped: usize,
    pub total: usize,
    pub errors: Vec<String>,
}

/// Persistent cache for card images
#[derive(Debug, Clone)]
pub struct ImageCache {
    cache_dir: PathBuf,
}

impl ImageCache {
    /// Create a new image cache in `cache_dir`
    pub fn new(cache_dir: &Path) -> Self {
        // Create directory if needed
        if let Err(e) = std::fs::create_dir_all(cache_dir) {
            log::warn!("Failed to create image cache directory: {}", e);
        } else {
            log::info!("Image cache directory: {:?}", cache_dir);
        }

        Self {
            cache_dir: cache_dir.to_path_buf(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Cache file name for a resolved image URL.
    ///
    /// `<digest>_<segment>`: a short SHA-256 of the full URL keeps images from
    /// different hosts or paths apart, and the last path segment has everything
    /// outside `[A-Za-z0-9._-]` replaced so the name can never leave the cache
    /// directory.
    pub fn file_name(url: &Url) -> Option<String> {
        let segment = url.path_segments()?.next_back()?;
        let name: String = segment
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        if name.is_empty() || name.chars().all(|c| c == '.') {
            return None;
        }

        let digest = hex::encode(Sha256::digest(url.as_str().as_bytes()));
        Some(format!("{}_{}", &digest[..URL_DIGEST_LEN], name))
    }

    fn path(&self, file_name: &str) -> PathBuf {
        self.cache_dir.join(file_name)
    }

    /// Check if an image is cached
    pub async fn contains(&self, file_name: &str) -> bool {
        tokio::fs::try_exists(self.path(file_name))
            .await
            .unwrap_or(false)
    }

    /// Get a cached image
    pub async fn get(&self, file_name: &str) -> Option<Vec<u8>> {
        match tokio::fs::read(self.path(file_name)).await {
            Ok(bytes) => {
                log::debug!("Image cache hit for {}", file_name);
                Some(bytes)
            }
            Err(_) => None,
        }
    }

    /// Store an image in the cache
    pub async fn insert(&self, file_name: &str, bytes: &[u8]) -> Result<()> {
        tokio::fs::write(self.path(file_name), bytes).await?;
        log::debug!("Cached image {}", file_name);
        Ok(())
    }
}

/// Fetch image bytes from a URL
pub async fn fetch_image(client: &reqwest::Client, url: &Url) -> Result<Vec<u8>> {
    log::debug!("Fetching image from URL: {}", url);

    let response = client
        .get(url.clone())
        .header("User-Agent", USER_AGENT)
        .send()
        .await?;

    if response.status().is_success() {
        Ok(response.bytes().await?.to_vec())
    } else {
        Err(CatalogError::ImageFetchFailed(url.to_string()))
    }
}

/// A served image: cache file name and bytes
#[derive(Debug, Clone)]
pub struct CachedImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Fetch the high-resolution variant of `raw_url`, checking the cache first
pub async fn fetch_image_cached(
    cache: &ImageCache,
    client: &reqwest::Client,
    raw_url: &str,
) -> Result<CachedImage> {
    let url = resolve_image_url(raw_url)?;
    let file_name = ImageCache::file_name(&url)
        .ok_or_else(|| CatalogError::InvalidImageUrl(raw_url.to_string()))?;

    if let Some(bytes) = cache.get(&file_name).await {
        return Ok(CachedImage { file_name, bytes });
    }

    log::info!("Image cache miss for {}, fetching {}", file_name, url);
    let bytes = fetch_image(client, &url).await?;

    if let Err(e) = cache.insert(&file_name, &bytes).await {
        log::warn!("Failed to cache image {}: {}", file_name, e);
    }

    Ok(CachedImage { file_name, bytes })
}

/// Download every image in `urls` that is not cached yet.
///
/// Duplicate and empty URLs are ignored; at most `concurrency` downloads run
/// at once. Failures are collected per image and never stop the others.
pub async fn download_all<I, S>(
    cache: &ImageCache,
    client: &reqwest::Client,
    urls: I,
    concurrency: usize,
) -> DownloadSummary
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let unique: BTreeSet<String> = urls
        .into_iter()
        .map(|u| u.as_ref().trim().to_string())
        .filter(|u| !u.is_empty())
        .collect();

    let mut summary = DownloadSummary {
        total: unique.len(),
        ..Default::default()
    };

    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for raw_url in unique {
        let url = match resolve_image_url(&raw_url) {
            Ok(url) => url,
            Err(e) => {
                summary.errors.push(e.to_string());
                continue;
            }
        };
        let Some(file_name) = ImageCache::file_name(&url) else {
            summary
                .errors
                .push(CatalogError::InvalidImageUrl(raw_url).to_string());
            continue;
        };
        if cache.contains(&file_name).await {
            summary.skipped += 1;
            continue;
        }

        let cache = cache.clone();
        let client = client.clone();
        let semaphore = semaphore.clone();
        tasks.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| format!("{}: {}", url, e))?;
            let bytes = fetch_image(&client, &url)
                .await
                .map_err(|e| format!("{}: {}", url, e))?;
            cache
                .insert(&file_name, &bytes)
                .await
                .map_err(|e| format!("{}: {}", file_name, e))
        });
    }

    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(Ok(())) => summary.successful += 1,
            Ok(Err(message)) => {
                log::warn!("Image download failed: {}", message);
                summary.errors.push(message);
            }
            Err(e) => summary.errors.push(format!("download task failed: {}", e)),
        }
    }

    log::info!(
        "Image download: {} downloaded, {} already cached, {} failed of {}",
        summary.successful,
        summary.skipped,
        summary.errors.len(),
        summary.total
    );
    summary
}
