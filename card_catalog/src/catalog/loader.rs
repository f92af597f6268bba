//! Building the unified catalog from the per-set datasets

use crate::dataset::read_dataset;
use crate::error::Result;
use crate::models::CardRecord;
use crate::pricing::{PriceReconciler, ReconcileReport};
use crate::sets::SetRegistry;
use serde::Serialize;

/// Statistics from a full catalog load
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    /// Dataset files that contributed records
    pub files_loaded: usize,
    /// Dataset files that could not be read or parsed
    pub files_skipped: Vec<String>,
    pub records: usize,
    pub prices: ReconcileReport,
}

/// Read every dataset in the registry and concatenate the records in table order.
///
/// A file that cannot be read or parsed is logged and left out.
/// Returns the records and the names of skipped files.
pub fn read_all_datasets(registry: &SetRegistry) -> (Vec<CardRecord>, Vec<String>) {
    let mut records = Vec::new();
    let mut skipped = Vec::new();

    for (code, file, path) in registry.dataset_files() {
        match read_dataset(&path, file, code) {
            Ok(set_records) => {
                log::debug!("Loaded {} records from {}", set_records.len(), file);
                records.extend(set_records);
            }
            Err(e) => {
                log::warn!("Skipping dataset {}: {}", path.display(), e);
                skipped.push(file.to_string());
            }
        }
    }

    (records, skipped)
}

/// Stable sort: records of ranked sets first in priority order, unranked after
/// them in their original relative order.
pub fn sort_by_priority(records: &mut [CardRecord], registry: &SetRegistry) {
    records.sort_by_key(|r| match registry.priority_rank(&r.set_code) {
        Some(rank) => (0, rank),
        None => (1, 0),
    });
}

/// Load datasets, reconcile prices against the live feeds and sort.
pub async fn load_catalog(
    registry: &SetRegistry,
    reconciler: &PriceReconciler,
) -> Result<(Vec<CardRecord>, LoadReport)> {
    // The data directory itself must be readable; individual files may fail
    tokio::fs::metadata(registry.data_dir()).await?;

    let blocking_registry = registry.clone();
    let (mut records, files_skipped) =
        tokio::task::spawn_blocking(move || read_all_datasets(&blocking_registry)).await?;

    let prices = reconciler.reconcile(&mut records).await;
    sort_by_priority(&mut records, registry);

    let report = LoadReport {
        files_loaded: registry.sets().len() - files_skipped.len(),
        files_skipped,
        records: records.len(),
        prices,
    };

    log::info!(
        "Catalog loaded: {} records from {} files ({} skipped), {} prices updated",
        report.records,
        report.files_loaded,
        report.files_skipped.len(),
        report.prices.updated
    );

    Ok((records, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DatasetRow;
    use crate::pricing::RetryPolicy;
    use crate::sets::SetEntry;
    use tempfile::TempDir;

    fn record(product_id: &str, ext_number: &str) -> CardRecord {
        DatasetRow {
            product_id: product_id.to_string(),
            ext_number: ext_number.to_string(),
            ..Default::default()
        }
        .into_record("any.csv", "XX")
    }

    fn registry_with_priority(dir: &std::path::Path, priority: &[&str]) -> SetRegistry {
        let sets = ["OP01", "OP09", "ST01"]
            .iter()
            .map(|code| SetEntry {
                code: code.to_string(),
                file: format!("{code}.csv"),
                price_url: None,
            })
            .collect();
        SetRegistry::new(dir, sets, priority.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_priority_sort() {
        let registry = registry_with_priority(std::path::Path::new("."), &["OP09", "OP01"]);
        let mut records = vec![
            record("a", "ST01-001"),
            record("b", "OP01-001"),
            record("c", "OP09-001"),
            record("d", "ST01-002"),
            record("e", "OP09-002"),
        ];

        sort_by_priority(&mut records, &registry);

        let ids: Vec<&str> = records.iter().map(|r| r.product_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "e", "b", "a", "d"]);
    }

    #[tokio::test]
    async fn test_load_skips_unparseable_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("OP01.csv"),
            "productId,extNumber\n1,OP01-001\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("OP09.csv"),
            "productId,extNumber\n9,OP09-001\n",
        )
        .unwrap();
        // Invalid UTF-8 makes the csv reader fail
        std::fs::write(
            dir.path().join("ST01.csv"),
            b"productId,name\n5,\xff\xfe\n".as_slice(),
        )
        .unwrap();

        let registry = registry_with_priority(dir.path(), &["OP09", "OP01"]);
        let reconciler =
            PriceReconciler::new(reqwest::Client::new(), vec![], RetryPolicy::default());

        let (records, report) = load_catalog(&registry, &reconciler).await.unwrap();

        let ids: Vec<&str> = records.iter().map(|r| r.product_id.as_str()).collect();
        assert_eq!(ids, vec!["9", "1"]);
        assert_eq!(report.files_loaded, 2);
        assert_eq!(report.files_skipped, vec!["ST01.csv".to_string()]);
        assert_eq!(records[0].source_file, "OP09.csv");
    }

    #[tokio::test]
    async fn test_load_fails_without_data_dir() {
        let registry = registry_with_priority(std::path::Path::new("/no/such/dir"), &[]);
        let reconciler =
            PriceReconciler::new(reqwest::Client::new(), vec![], RetryPolicy::default());

        assert!(load_catalog(&registry, &reconciler).await.is_err());
    }
}
