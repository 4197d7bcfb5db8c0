//! Ordering of recommended plans by insurer claims-paid ratio.

use std::io;

use tracing::debug;

use coverwise_core::defaults::COMPANY_HEADER_ROWS;
use coverwise_core::{CandidateRecommendation, Error, RecommendationGroup, Result};

/// Lookup key for an insurer name: lowercased, with `general insurance` and
/// then `insurance` removed, trimmed.
pub fn normalize_company_key(name: &str) -> String {
    name.to_lowercase()
        .replace("general insurance", "")
        .replace("insurance", "")
        .trim()
        .to_string()
}

/// Per-insurer metric, in reference file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricTable {
    entries: Vec<(String, f64)>,
}

impl MetricTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the metric for a company. An overwritten entry
    /// keeps its original position.
    pub fn insert(&mut self, company: &str, metric: f64) {
        let key = normalize_company_key(company);
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = metric,
            None => self.entries.push((key, metric)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Metric for a company: exact key match first, then the first entry where
    /// either key contains the other, else 0.0.
    pub fn lookup(&self, company: &str) -> f64 {
        let key = normalize_company_key(company);
        if key.is_empty() {
            return 0.0;
        }
        if let Some((_, metric)) = self.entries.iter().find(|(k, _)| *k == key) {
            return *metric;
        }
        self.entries
            .iter()
            .find(|(k, _)| !k.is_empty() && (k.contains(&key) || key.contains(k.as_str())))
            .map(|(_, metric)| *metric)
            .unwrap_or(0.0)
    }

    /// Parse the company performance dataset.
    ///
    /// The first two rows are headers. Column 0 holds the company name and
    /// column 1 the ratio, optionally suffixed with `%`. Rows whose ratio does
    /// not parse are skipped.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut table = Self::new();
        for (idx, record) in csv_reader.records().enumerate() {
            let record = record
                .map_err(|e| Error::Reference(format!("Failed to read row {}: {}", idx + 1, e)))?;
            if idx < COMPANY_HEADER_ROWS || record.len() < 2 {
                continue;
            }

            let company = record.get(0).unwrap_or("").trim();
            let ratio = record.get(1).unwrap_or("").replace('%', "");
            match ratio.trim().parse::<f64>() {
                Ok(metric) => table.insert(company, metric),
                Err(_) => debug!(company, ratio = %ratio, "Skipping row with unreadable ratio"),
            }
        }
        Ok(table)
    }

    pub fn from_reference_csv(text: &str) -> Result<Self> {
        Self::from_reader(text.as_bytes())
    }
}

impl<S: AsRef<str>> FromIterator<(S, f64)> for MetricTable {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (company, metric) in iter {
            table.insert(company.as_ref(), metric);
        }
        table
    }
}

/// Stable sort by metric, highest first. Unknown companies score 0.0.
pub fn rank_recommendations(items: &mut [CandidateRecommendation], table: &MetricTable) {
    items.sort_by(|a, b| {
        table
            .lookup(&b.company)
            .partial_cmp(&table.lookup(&a.company))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Rank the items inside every recommendation group. Group order is kept.
pub fn rank_groups(groups: &mut [RecommendationGroup], table: &MetricTable) {
    for group in groups.iter_mut() {
        rank_recommendations(&mut group.items, table);
    }
    debug!(
        group_count = groups.len(),
        table_size = table.len(),
        "Recommendations ranked"
    );
}
