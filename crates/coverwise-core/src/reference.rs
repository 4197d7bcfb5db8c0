//! Reference dataset rows and match results.

use serde::Serialize;

/// One record of a reference dataset: column name to value, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceRow {
    fields: Vec<(String, String)>,
}

impl ReferenceRow {
    pub fn new<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Value of a column, if the row has it.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == column)
            .map(|(_, v)| v.as_str())
    }

    /// Value of a column, or empty when the column is missing.
    pub fn get_or_empty(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A reference row accepted by the fuzzy matcher.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub row: ReferenceRow,
    /// Similarity clamped to `[0, 1]`.
    pub score: f64,
    /// Score before clamping; the containment bonus can push it past 1.
    pub raw_score: f64,
    /// Normalized organization query.
    pub query_org: String,
    /// Normalized plan query.
    pub query_plan: String,
}

impl MatchResult {
    /// Render the row as `column: value | column: value`, skipping blanks and
    /// `Not Applicable` cells.
    pub fn summary(&self) -> String {
        self.row
            .fields()
            .filter(|(_, v)| !v.trim().is_empty() && *v != "Not Applicable")
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}
