//! Centralized default constants for coverwise.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates and the API binary reference these constants instead of defining
//! their own magic numbers.

// =============================================================================
// GENERATION
// =============================================================================

/// Model candidates in priority order. Standard models first for output quality.
pub const MODEL_CANDIDATES: &[&str] = &[
    "gemini-2.0-flash-exp",
    "gemini-1.5-pro",
    "gemini-1.5-flash",
    "gemini-2.5-flash",
    "gemini-2.5-pro",
    "gemini-3.0-flash",
    "gemini-2.5-flash-lite",
];

/// Default Gemini REST endpoint.
pub const GEMINI_URL: &str = "https://generativelanguage.googleapis.com";

/// Timeout for a single generation request (seconds).
pub const GEN_TIMEOUT_SECS: u64 = 120;

/// Temperature used for extraction and comparison requests.
pub const DETERMINISTIC_TEMPERATURE: f32 = 0.0;

// =============================================================================
// RECONCILIATION
// =============================================================================

/// A plan match must score strictly above this to be accepted.
pub const MATCH_THRESHOLD: f64 = 0.5;

/// Added to the similarity ratio when the query plan is contained in the row plan.
pub const CONTAINMENT_BONUS: f64 = 0.1;

/// Plan dataset column holding the insurer name.
pub const PLAN_COMPANY_COLUMN: &str = "Insurance Company";

/// Plan dataset column holding the plan name.
pub const PLAN_NAME_COLUMN: &str = "Base Plan Name";

/// Feature categories that count towards the product score.
pub const SCORED_CATEGORIES: [&str; 2] = ["Non-Negotiable Benefits", "Must Have"];

/// Feature status counted as a positive evaluation.
pub const POSITIVE_STATUS: &str = "Positive";

/// Maximum number of pros or cons returned from a comparison.
pub const MAX_PROS_CONS: usize = 7;

// =============================================================================
// REFERENCE DATA
// =============================================================================

/// Feature classification dataset.
pub const FEATURES_DATASET: &str = "features3.csv";

/// Company performance ratios dataset.
pub const COMPANY_DATASET: &str = "company_performance_ratios.csv";

/// Insurance plan dataset.
pub const PLANS_DATASET: &str = "Insurance_plan_dataset.csv";

/// Feature list used in the extraction prompt when the features dataset is missing.
pub const FALLBACK_FEATURES: &str = "Room Rent, NCB, Restoration, Waiting Periods, Co-pay";

/// Header rows preceding data in the company performance dataset.
pub const COMPANY_HEADER_ROWS: usize = 2;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 8000;

/// Largest accepted request body (policy uploads), in bytes.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Default directory holding the reference CSV files.
pub const REFERENCE_DIR: &str = ".";
