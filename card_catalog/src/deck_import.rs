//! Deck list import.
//!
//! Each entry is resolved against the dataset of the set named by its card
//! number prefix. Datasets are read from disk for every import and never
//! touch the cached catalog.

use crate::dataset::read_dataset;
use crate::error::{CatalogError, Result};
use crate::models::{set_code_from_number, CardRecord, DeckCard, DeckEntry};
use crate::sets::SetRegistry;
use serde::Serialize;
use std::collections::HashMap;

/// Resolved deck list
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    /// Matched cards in input order
    pub cards: Vec<DeckCard>,
    /// Entries that matched no dataset row
    pub skipped: usize,
}

/// Parse a `QUANTITYxNUMBER` line such as `4xOP09-001` or `2 x ST01-012`
fn parse_deck_line(line: &str) -> Option<DeckEntry> {
    let (quantity, number) = line.trim().split_once(['x', 'X'])?;
    let quantity = quantity.trim().parse::<u32>().ok()?;
    let number = number.trim();
    if quantity == 0 || number.is_empty() {
        return None;
    }

    Some(DeckEntry {
        ext_number: number.to_string(),
        quantity,
    })
}

/// Parse a pasted deck list, one `QUANTITYxNUMBER` entry per line.
///
/// Blank and malformed lines are ignored.
pub fn parse_deck_list(text: &str) -> Vec<DeckEntry> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let entry = parse_deck_line(line);
            if entry.is_none() {
                log::debug!("Ignoring deck line: {}", line.trim());
            }
            entry
        })
        .collect()
}

/// Resolve deck entries against the per-set datasets.
///
/// Entries whose set is unknown or whose number is not in the set's dataset
/// are dropped and counted in `skipped`.
pub fn import_deck_list(registry: &SetRegistry, entries: &[DeckEntry]) -> ImportReport {
    // Each dataset is parsed at most once per import
    let mut datasets: HashMap<String, Option<Vec<CardRecord>>> = HashMap::new();
    let mut report = ImportReport::default();

    for entry in entries {
        let ext_number = entry.ext_number.trim();
        let rows = match load_set_for_number(registry, ext_number, &mut datasets) {
            Ok(rows) => rows,
            Err(e) => {
                log::debug!("Deck entry {} skipped: {}", ext_number, e);
                report.skipped += 1;
                continue;
            }
        };

        match rows.iter().find(|card| card.ext_number == ext_number) {
            Some(card) => report.cards.push(DeckCard {
                card: card.clone(),
                quantity: entry.quantity,
            }),
            None => {
                log::debug!("Deck entry {} not found in its dataset", ext_number);
                report.skipped += 1;
            }
        }
    }

    log::info!(
        "Deck import: {} cards matched, {} skipped",
        report.cards.len(),
        report.skipped
    );
    report
}

fn load_set_for_number<'a>(
    registry: &SetRegistry,
    ext_number: &str,
    datasets: &'a mut HashMap<String, Option<Vec<CardRecord>>>,
) -> Result<&'a [CardRecord]> {
    let set_code = set_code_from_number(ext_number)
        .ok_or_else(|| CatalogError::UnknownSet(ext_number.to_string()))?;
    let set = registry
        .find(set_code)
        .ok_or_else(|| CatalogError::UnknownSet(set_code.to_string()))?;

    let loaded = datasets.entry(set.code.clone()).or_insert_with(|| {
        let path = registry.data_dir().join(&set.file);
        match read_dataset(&path, &set.file, &set.code) {
            Ok(records) => Some(records),
            Err(e) => {
                log::warn!("Failed to read dataset {}: {}", path.display(), e);
                None
            }
        }
    });

    loaded
        .as_deref()
        .ok_or_else(|| CatalogError::UnknownSet(set.code.clone()))
}
