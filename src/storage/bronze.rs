//! Bronze layer: raw records as returned by the API
//!
//! Each completed sub-category is written as one pretty-printed JSON array
//! named after the target. The discovered links of a category are kept next
//! to them in a single-column CSV.

use crate::storage::traits::{RecordSink, StorageError, StorageResult};
use crate::url::Target;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Column header of the links CSV
pub const LINKS_COLUMN: &str = "links";

/// Writes raw records to `<dir>/<target-name>.json`
///
/// Targets from different parents can share a last path segment and so a
/// file. The store remembers which slug wrote each file and warns when another
/// target replaces it.
#[derive(Debug, Clone)]
pub struct BronzeStore {
    dir: PathBuf,
    written: HashMap<PathBuf, String>,
    overwrites: usize,
}

impl BronzeStore {
    /// Creates the store, creating `dir` if needed
    pub fn new(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            written: HashMap::new(),
            overwrites: 0,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of files replaced by a different target since the store was created
    pub fn overwrites(&self) -> usize {
        self.overwrites
    }

    /// File that holds `target`'s raw records
    pub fn path_for(&self, target: &Target) -> PathBuf {
        self.dir.join(format!("{}.json", target.name()))
    }
}

impl RecordSink for BronzeStore {
    fn persist(&mut self, target: &Target, records: &[Value]) -> StorageResult<()> {
        let path = self.path_for(target);
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, records)?;
        writer.flush()?;
        tracing::debug!(path = %path.display(), records = records.len(), "Wrote bronze file");

        if let Some(previous) = self.written.insert(path.clone(), target.slug().to_string()) {
            if previous != target.slug() {
                self.overwrites += 1;
                tracing::warn!(
                    path = %path.display(),
                    previous = %previous,
                    slug = %target.slug(),
                    "Bronze file from an earlier target in this batch was overwritten"
                );
            }
        }
        Ok(())
    }
}

/// Writes the discovered links as a sorted single-column CSV
pub fn write_links_csv(path: &Path, links: &BTreeSet<String>) -> StorageResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([LINKS_COLUMN])?;
    for link in links {
        writer.write_record([link.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads the links column back, in file order
///
/// A missing file is reported as `StorageError::MissingInput`.
pub fn read_links_csv(path: &Path) -> StorageResult<Vec<String>> {
    if !path.exists() {
        return Err(StorageError::MissingInput(path.display().to_string()));
    }

    let mut reader = csv::Reader::from_path(path)?;
    let column = reader
        .headers()?
        .iter()
        .position(|h| h == LINKS_COLUMN)
        .ok_or_else(|| StorageError::SchemaMismatch {
            path: path.display().to_string(),
            detail: format!("no '{}' column", LINKS_COLUMN),
        })?;

    let mut links = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(link) = record.get(column).map(str::trim).filter(|l| !l.is_empty()) {
            links.push(link.to_string());
        }
    }
    Ok(links)
}

/// Lists the `*.json` files of a bronze directory as `(stem, path)`, sorted by name
pub fn list_bronze_files(dir: &Path) -> StorageResult<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            files.push((stem.to_string(), path.clone()));
        }
    }

    files.sort();
    Ok(files)
}
