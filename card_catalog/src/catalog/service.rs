//! Shared catalog access for request handlers

use super::cache::{CatalogCache, Clock, SystemClock};
use super::loader::{load_catalog, LoadReport};
use crate::config::Config;
use crate::error::{CatalogError, Result};
use crate::models::CardRecord;
use crate::pricing::{PriceReconciler, ReconcileReport};
use crate::sets::SetRegistry;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Snapshot of the cache state
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStatus {
    pub loaded: bool,
    pub loaded_at: Option<DateTime<Utc>>,
    pub records: usize,
    pub stale: bool,
}

/// Owns the cached catalog and serialises loads and price refreshes.
///
/// Readers always get a complete list: refreshes work on a copy that is
/// swapped in when reconciliation has finished.
pub struct CatalogService {
    registry: SetRegistry,
    reconciler: PriceReconciler,
    cache: RwLock<CatalogCache>,
    /// Held for the duration of a load or refresh
    refresh_lock: Mutex<()>,
}

impl CatalogService {
    pub fn new(registry: SetRegistry, reconciler: PriceReconciler, cache: CatalogCache) -> Self {
        Self {
            registry,
            reconciler,
            cache: RwLock::new(cache),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Build a service from configuration using the wall clock
    pub fn from_config(config: &Config, client: reqwest::Client) -> Result<Self> {
        Self::from_config_with_clock(config, client, Arc::new(SystemClock))
    }

    pub fn from_config_with_clock(
        config: &Config,
        client: reqwest::Client,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let registry = SetRegistry::load(&config.data_dir)?;
        let reconciler = PriceReconciler::new(client, registry.price_feeds(), config.retry);
        let cache = CatalogCache::new(clock, config.cache_ttl);
        Ok(Self::new(registry, reconciler, cache))
    }

    pub fn registry(&self) -> &SetRegistry {
        &self.registry
    }

    /// The unified catalog, loading it when the cache is empty or expired
    pub async fn catalog(&self) -> Result<Arc<Vec<CardRecord>>> {
        if let Some(records) = self.cache.read().await.fresh() {
            return Ok(records);
        }

        let _guard = self.refresh_lock.lock().await;

        // Another caller may have loaded while we waited
        if let Some(records) = self.cache.read().await.fresh() {
            return Ok(records);
        }

        let (records, _) = self.load_locked().await?;
        Ok(records)
    }

    /// Force a full reload regardless of cache age
    pub async fn reload(&self) -> Result<LoadReport> {
        let _guard = self.refresh_lock.lock().await;
        let (_, report) = self.load_locked().await?;
        Ok(report)
    }

    async fn load_locked(&self) -> Result<(Arc<Vec<CardRecord>>, LoadReport)> {
        let (records, report) = load_catalog(&self.registry, &self.reconciler).await?;
        let records = Arc::new(records);
        self.cache.write().await.store(records.clone());
        Ok((records, report))
    }

    /// Re-fetch prices for the cached catalog without reloading datasets.
    ///
    /// Fails with `NotLoaded` when nothing is cached and with
    /// `RefreshInProgress` when a load or refresh is already running.
    pub async fn refresh_prices(&self) -> Result<ReconcileReport> {
        let _guard = self
            .refresh_lock
            .try_lock()
            .map_err(|_| CatalogError::RefreshInProgress)?;

        let current = self
            .cache
            .read()
            .await
            .current()
            .ok_or(CatalogError::NotLoaded)?;

        let mut working = current.as_ref().clone();
        let report = self.reconciler.reconcile(&mut working).await;
        if !self.cache.write().await.replace_records(Arc::new(working)) {
            log::warn!("Catalog was dropped during the price refresh, discarding refreshed prices");
        }

        log::info!(
            "Price refresh: {} updated, {} unmatched, {} feeds failed",
            report.updated,
            report.skipped,
            report.failed_feeds.len()
        );
        Ok(report)
    }

    /// The cached catalog if any, without triggering a load
    pub async fn cached(&self) -> Option<Arc<Vec<CardRecord>>> {
        self.cache.read().await.current()
    }

    /// Drop the cached catalog. Waits for a running load or refresh to finish
    /// so that it cannot store its result afterwards.
    pub async fn invalidate(&self) {
        let _guard = self.refresh_lock.lock().await;
        self.cache.write().await.invalidate();
    }

    pub async fn status(&self) -> CatalogStatus {
        let cache = self.cache.read().await;
        let records = cache.current();
        CatalogStatus {
            loaded: records.is_some(),
            loaded_at: cache.loaded_at(),
            records: records.map(|r| r.len()).unwrap_or(0),
            stale: cache.is_stale(),
        }
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
