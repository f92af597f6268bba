//! Set registry: which dataset file belongs to which release, where its live
//! prices come from, and the order releases are listed in.

use crate::error::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the optional manifest in the data directory
pub const MANIFEST_FILE: &str = "sets.json";

/// Group metadata export that lives next to the datasets but holds no cards
pub const DEFAULT_METADATA_FILE: &str = "groups.csv";

/// Hand-maintained release order, most recent first
pub const DEFAULT_SET_PRIORITY: &[&str] = &[
    "OP11", "EB02", "OP10", "PRB01", "OP09", "OP08", "EB01", "OP07", "OP06", "OP05", "OP04",
    "OP03", "OP02", "OP01", "ST22", "ST21", "ST20", "ST19", "ST18", "ST17", "ST16", "ST15",
    "ST14", "ST13", "ST12", "ST11", "ST10", "ST09", "ST08", "ST07", "ST06", "ST05", "ST04",
    "ST03", "ST02", "ST01",
];

/// One release and its local dataset
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetEntry {
    /// Set identifier as printed in card numbers (e.g. "OP09")
    pub code: String,
    /// Dataset file name, relative to the data directory
    pub file: String,
    /// Remote CSV with current prices for this set
    #[serde(default)]
    pub price_url: Option<String>,
}

/// A remote price feed and the dataset file its rows apply to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceFeed {
    pub source_file: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Manifest {
    #[serde(default)]
    priority: Option<Vec<String>>,
    #[serde(default)]
    metadata_file: Option<String>,
    sets: Vec<SetEntry>,
}

/// Lookup tables for the per-set datasets
#[derive(Debug, Clone)]
pub struct SetRegistry {
    data_dir: PathBuf,
    sets: Vec<SetEntry>,
    priority: Vec<String>,
}

impl SetRegistry {
    /// Build a registry from explicit entries (used by tests and embedders)
    pub fn new(data_dir: impl Into<PathBuf>, sets: Vec<SetEntry>, priority: Vec<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            sets,
            priority,
        }
    }

    /// Load the registry for a data directory.
    ///
    /// Reads `sets.json` when present. Otherwise every `*.csv` file except the
    /// metadata file is a dataset named after its upper-cased stem, with no price feed.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let manifest_path = data_dir.join(MANIFEST_FILE);
        if manifest_path.exists() {
            let content = std::fs::read_to_string(&manifest_path)?;
            let manifest: Manifest = serde_json::from_str(&content)?;
            let metadata_file = manifest
                .metadata_file
                .unwrap_or_else(|| DEFAULT_METADATA_FILE.to_string());

            let sets: Vec<SetEntry> = manifest
                .sets
                .into_iter()
                .filter(|s| !s.file.eq_ignore_ascii_case(&metadata_file))
                .collect();
            log::info!(
                "Loaded set manifest {} ({} sets)",
                manifest_path.display(),
                sets.len()
            );

            return Ok(Self::new(
                data_dir,
                sets,
                manifest.priority.unwrap_or_else(default_priority),
            ));
        }

        let sets = discover_sets(data_dir)?;
        log::info!(
            "No {} in {}, discovered {} dataset files",
            MANIFEST_FILE,
            data_dir.display(),
            sets.len()
        );
        Ok(Self::new(data_dir, sets, default_priority()))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn sets(&self) -> &[SetEntry] {
        &self.sets
    }

    /// Dataset files in table order as (set code, file name, full path)
    pub fn dataset_files(&self) -> impl Iterator<Item = (&str, &str, PathBuf)> + '_ {
        self.sets
            .iter()
            .map(|s| (s.code.as_str(), s.file.as_str(), self.data_dir.join(&s.file)))
    }

    /// Look up the dataset entry for a set code (case-insensitive)
    pub fn find(&self, set_code: &str) -> Option<&SetEntry> {
        self.sets
            .iter()
            .find(|s| s.code.eq_ignore_ascii_case(set_code))
    }

    /// Every configured price feed
    pub fn price_feeds(&self) -> Vec<PriceFeed> {
        self.sets
            .iter()
            .filter_map(|s| {
                s.price_url.as_ref().map(|url| PriceFeed {
                    source_file: s.file.clone(),
                    url: url.clone(),
                })
            })
            .collect()
    }

    /// Position of a set code in the priority table
    pub fn priority_rank(&self, set_code: &str) -> Option<usize> {
        self.priority.iter().position(|p| p == set_code)
    }
}

fn default_priority() -> Vec<String> {
    DEFAULT_SET_PRIORITY.iter().map(|s| s.to_string()).collect()
}

fn discover_sets(data_dir: &Path) -> Result<Vec<SetEntry>> {
    let mut sets = Vec::new();

    for entry in std::fs::read_dir(data_dir)? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if !is_csv {
            continue;
        }

        let (Some(file), Some(stem)) = (
            path.file_name().and_then(|f| f.to_str()),
            path.file_stem().and_then(|s| s.to_str()),
        ) else {
            continue;
        };
        if file.eq_ignore_ascii_case(DEFAULT_METADATA_FILE) {
            continue;
        }

        sets.push(SetEntry {
            code: stem.to_uppercase(),
            file: file.to_string(),
            price_url: None,
        });
    }

    // read_dir order is platform dependent
    sets.sort_by(|a, b| a.file.cmp(&b.file));
    Ok(sets)
}
