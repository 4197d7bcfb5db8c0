//! # coverwise-reconcile
//!
//! Deterministic post-processing for model output.
//!
//! This crate provides:
//! - Date parsing, age and tenure computation
//! - Sum insured normalization in Indian digit grouping
//! - Document normalization and product scoring
//! - Fuzzy matching of a policy against the plan reference dataset
//! - Ranking of recommendations by insurer claims-paid ratio
//! - A CSV-backed reference store
//!
//! Everything here is synchronous and pure apart from the reference store's
//! file reads.

pub mod dates;
pub mod matcher;
pub mod money;
pub mod ranking;
pub mod recompute;
pub mod store;

pub use dates::{age_on, describe_tenure, parse_date, tenure_between, Tenure};
pub use matcher::{match_reference, similarity, MatchColumns};
pub use money::{extract_amount, format_indian, normalize_sum_insured};
pub use ranking::{normalize_company_key, rank_groups, rank_recommendations, MetricTable};
pub use recompute::{normalize_document, product_score, recompute_ages};
pub use store::{parse_rows, CsvReferenceStore};
