//! Reading per-set dataset files

use crate::error::Result;
use crate::models::{CardRecord, DatasetRow};
use std::io::Read;
use std::path::Path;

/// Read a dataset file into catalog records tagged with `source_file`.
///
/// Rows without a product ID are skipped. Any malformed row fails the whole file.
pub fn read_dataset(path: &Path, source_file: &str, set_code: &str) -> Result<Vec<CardRecord>> {
    let file = std::fs::File::open(path)?;
    read_dataset_from(file, source_file, set_code)
}

/// Same as [`read_dataset`] for any reader
pub fn read_dataset_from<R: Read>(
    reader: R,
    source_file: &str,
    set_code: &str,
) -> Result<Vec<CardRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for result in rdr.deserialize() {
        let row: DatasetRow = result?;
        if row.product_id.trim().is_empty() {
            skipped += 1;
            continue;
        }
        records.push(row.into_record(source_file, set_code));
    }

    if skipped > 0 {
        log::debug!("{}: skipped {} rows without productId", source_file, skipped);
    }

    Ok(records)
}
