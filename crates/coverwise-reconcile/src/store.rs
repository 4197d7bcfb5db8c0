//! CSV-backed reference datasets.
//!
//! Datasets are plain CSV files in one directory, read on every call. A
//! missing or unreadable file is not an error: callers get an empty result
//! and a warning is logged.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use coverwise_core::defaults::REFERENCE_DIR;
use coverwise_core::{ReferenceRow, Result};

use crate::ranking::MetricTable;

/// Reference datasets stored as CSV files under one directory.
#[derive(Debug, Clone)]
pub struct CsvReferenceStore {
    dir: PathBuf,
}

impl CsvReferenceStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory from `REFERENCE_DIR`, defaulting to the working directory.
    pub fn from_env() -> Self {
        Self::new(std::env::var("REFERENCE_DIR").unwrap_or_else(|_| REFERENCE_DIR.to_string()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, dataset: &str) -> PathBuf {
        self.dir.join(dataset)
    }

    /// Read a dataset, failing when the file is missing or unreadable.
    pub fn read(&self, dataset: &str) -> Result<String> {
        let text = std::fs::read_to_string(self.path(dataset))?;
        debug!(dataset, bytes = text.len(), "Reference dataset loaded");
        Ok(text)
    }

    /// Raw file contents, for embedding in prompts.
    pub fn load_raw(&self, dataset: &str) -> Option<String> {
        self.read(dataset)
            .map_err(|e| {
                warn!(dataset, path = %self.path(dataset).display(), error = %e, "Reference dataset not available");
            })
            .ok()
    }

    /// Rows keyed by the header line. Empty when the dataset is absent.
    pub fn load(&self, dataset: &str) -> Vec<ReferenceRow> {
        self.load_raw(dataset)
            .map(|text| parse_rows(&text))
            .unwrap_or_default()
    }

    /// Company metric table. Empty when the dataset is absent or malformed.
    pub fn load_metric_table(&self, dataset: &str) -> MetricTable {
        let Some(text) = self.load_raw(dataset) else {
            return MetricTable::new();
        };
        MetricTable::from_reference_csv(&text).unwrap_or_else(|e| {
            warn!(dataset, error = %e, "Failed to parse metric table");
            MetricTable::new()
        })
    }
}

/// Parse CSV text with a header line into rows.
///
/// Short records are padded with empty values; extra cells beyond the header
/// are ignored. Unreadable records are skipped.
pub fn parse_rows(text: &str) -> Vec<ReferenceRow> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(e) => {
            warn!(error = %e, "Failed to read reference header");
            return Vec::new();
        }
    };

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        match record {
            Ok(record) => rows.push(ReferenceRow::new(
                headers
                    .iter()
                    .enumerate()
                    .map(|(i, h)| (h.trim(), record.get(i).unwrap_or(""))),
            )),
            Err(e) => warn!(row = idx + 1, error = %e, "Skipping unreadable reference row"),
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const PLANS: &str = "\
Insurance Company,Base Plan Name,Room Rent
HDFC ERGO General Insurance,Optima Secure,No Limit
\"Niva Bupa Health Insurance, Ltd.\",ReAssure 2.0
";

    #[test]
    fn test_parse_rows() {
        let rows = parse_rows(PLANS);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Room Rent"), Some("No Limit"));
        assert_eq!(
            rows[1].get("Insurance Company"),
            Some("Niva Bupa Health Insurance, Ltd.")
        );
        assert_eq!(rows[1].get("Room Rent"), Some(""));
    }

    #[test]
    fn test_load_from_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("plans.csv"), PLANS).unwrap();
        let store = CsvReferenceStore::new(dir.path());

        assert_eq!(store.load("plans.csv").len(), 2);
        assert_eq!(store.load_raw("plans.csv").as_deref(), Some(PLANS));
    }

    #[test]
    fn test_missing_dataset_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = CsvReferenceStore::new(dir.path());

        assert!(store.load("absent.csv").is_empty());
        assert!(store.load_raw("absent.csv").is_none());
        assert!(store.load_metric_table("absent.csv").is_empty());
    }

    #[test]
    fn test_read_missing_dataset_is_io_error() {
        let dir = TempDir::new().unwrap();
        let store = CsvReferenceStore::new(dir.path());

        let err = store.read("absent.csv").unwrap_err();
        assert!(matches!(err, coverwise_core::Error::Io(_)));
        assert!(err.to_string().starts_with("I/O error:"));
    }

    #[test]
    fn test_load_metric_table() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("ratios.csv"),
            "Company,Claims Paid Ratio\n,\nBajaj Allianz General Insurance,90%\n",
        )
        .unwrap();
        let store = CsvReferenceStore::new(dir.path());

        let table = store.load_metric_table("ratios.csv");
        assert_eq!(table.lookup("Bajaj Allianz"), 90.0);
    }
}
