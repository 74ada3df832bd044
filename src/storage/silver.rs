//! Silver layer: one consolidated CSV of flattened products

use crate::flatten::FlatProduct;
use crate::storage::traits::{StorageError, StorageResult};
use std::fs::OpenOptions;
use std::path::Path;

/// File name of the consolidated CSV inside the silver directory
pub const SILVER_FILE_NAME: &str = "data_raw.csv";

/// Appends rows to the silver CSV and returns its total row count
///
/// The header is written only when the file is new or empty. An existing
/// file whose header differs from `FlatProduct::FIELDS` is left untouched
/// and reported as `StorageError::SchemaMismatch`.
pub fn append_to_silver(path: &Path, rows: &[FlatProduct]) -> StorageResult<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let has_content = path.metadata().map(|m| m.len() > 0).unwrap_or(false);
    if has_content {
        check_header(path)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(!has_content)
        .from_writer(file);

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    count_silver_rows(path)
}

/// Number of data rows in the silver CSV; zero when it does not exist
pub fn count_silver_rows(path: &Path) -> StorageResult<usize> {
    if !path.exists() {
        return Ok(0);
    }

    let mut reader = csv::Reader::from_path(path)?;
    let mut count = 0;
    for record in reader.records() {
        record?;
        count += 1;
    }
    Ok(count)
}

fn check_header(path: &Path) -> StorageResult<()> {
    let mut reader = csv::Reader::from_path(path)?;
    let header = reader.headers()?;

    if header.iter().ne(FlatProduct::FIELDS.iter().copied()) {
        return Err(StorageError::SchemaMismatch {
            path: path.display().to_string(),
            detail: format!(
                "expected {} product columns, found {}",
                FlatProduct::FIELDS.len(),
                header.len()
            ),
        });
    }
    Ok(())
}
