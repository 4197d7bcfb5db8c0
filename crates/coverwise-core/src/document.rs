//! Caller-facing document shapes.
//!
//! Field names and nesting are a contract with the frontend. Every struct keeps
//! unknown model-produced fields in `extra` so nothing the model returned is
//! dropped, and every known field is always serialized (empty rather than
//! absent).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::lenient;

// =============================================================================
// EXTRACTION
// =============================================================================

/// Structured facts extracted from a policy document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedDocument {
    #[serde(deserialize_with = "lenient::string")]
    pub company: String,
    #[serde(deserialize_with = "lenient::string")]
    pub plan: String,
    #[serde(deserialize_with = "lenient::string")]
    pub premium: String,
    #[serde(deserialize_with = "lenient::string")]
    pub coverage: String,
    #[serde(deserialize_with = "lenient::nested")]
    pub policy_details: PolicyDetails,
    #[serde(deserialize_with = "lenient::nested")]
    pub sum_insured: SumInsured,
    #[serde(deserialize_with = "lenient::list")]
    pub policy_holders: Vec<PolicyHolder>,
    #[serde(deserialize_with = "lenient::object")]
    pub features_found: Map<String, Value>,
    #[serde(deserialize_with = "lenient::string")]
    pub comprehensive_findings: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Policy dates and identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyDetails {
    /// Inception date exactly as printed on the document.
    #[serde(deserialize_with = "lenient::string")]
    pub start_date: String,
    /// Elapsed time since inception, `"<N> Years <M> Months"` once recomputed.
    #[serde(deserialize_with = "lenient::string")]
    pub vintage: String,
    #[serde(deserialize_with = "lenient::string")]
    pub plan: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Sum insured with its itemized breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SumInsured {
    #[serde(deserialize_with = "lenient::string")]
    pub total: String,
    #[serde(deserialize_with = "lenient::list")]
    pub components: Vec<SumInsuredComponent>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One itemized monetary component (base cover, bonus, deductible, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SumInsuredComponent {
    #[serde(deserialize_with = "lenient::string")]
    pub label: String,
    #[serde(deserialize_with = "lenient::string")]
    pub value: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SumInsuredComponent {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            extra: Map::new(),
        }
    }
}

/// A person insured under the policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyHolder {
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(deserialize_with = "lenient::string")]
    pub dob: String,
    #[serde(deserialize_with = "lenient::string")]
    pub age: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PolicyHolder {
    pub fn new(name: impl Into<String>, dob: impl Into<String>, age: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dob: dob.into(),
            age: age.into(),
            extra: Map::new(),
        }
    }
}

// =============================================================================
// COMPARISON
// =============================================================================

/// Result bundle of a policy comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonResult {
    #[serde(deserialize_with = "lenient::list")]
    pub feature_analysis: Vec<FeatureEvaluation>,
    #[serde(deserialize_with = "lenient::number")]
    pub product_score: f64,
    #[serde(deserialize_with = "lenient::nested")]
    pub current_policy_stats: PolicyStats,
    #[serde(deserialize_with = "lenient::list")]
    pub recommendations: Vec<RecommendationGroup>,
    #[serde(
        deserialize_with = "lenient::optional_string_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub pros: Option<Vec<String>>,
    #[serde(
        deserialize_with = "lenient::optional_string_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub cons: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ComparisonResult {
    /// Result returned when the model output could not be recovered at all.
    pub fn unparsed(company: &str) -> Self {
        let company = if company.is_empty() {
            "Unknown"
        } else {
            company
        };
        Self {
            pros: Some(vec!["Could not analyze policy details.".to_string()]),
            cons: Some(vec!["AI response was not in expected format.".to_string()]),
            current_policy_stats: PolicyStats {
                company: company.to_string(),
                csr: "N/A".to_string(),
                csr_rank: "N/A".to_string(),
                solvency: "N/A".to_string(),
                solvency_rank: "N/A".to_string(),
                complaints: "N/A".to_string(),
                complaints_rank: "N/A".to_string(),
                extra: Map::new(),
            },
            ..Default::default()
        }
    }
}

/// One feature judged against the current policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureEvaluation {
    #[serde(deserialize_with = "lenient::string")]
    pub category: String,
    #[serde(deserialize_with = "lenient::string")]
    pub feature: String,
    /// `"Positive"` or `"Negative"`.
    #[serde(deserialize_with = "lenient::string")]
    pub status: String,
    #[serde(deserialize_with = "lenient::string")]
    pub value: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FeatureEvaluation {
    pub fn new(category: &str, feature: &str, status: &str, value: &str) -> Self {
        Self {
            category: category.to_string(),
            feature: feature.to_string(),
            status: status.to_string(),
            value: value.to_string(),
            extra: Map::new(),
        }
    }
}

/// Insurer statistics for the existing policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyStats {
    #[serde(deserialize_with = "lenient::string")]
    pub company: String,
    #[serde(deserialize_with = "lenient::string")]
    pub csr: String,
    #[serde(deserialize_with = "lenient::string")]
    pub csr_rank: String,
    #[serde(deserialize_with = "lenient::string")]
    pub solvency: String,
    #[serde(deserialize_with = "lenient::string")]
    pub solvency_rank: String,
    #[serde(deserialize_with = "lenient::string")]
    pub complaints: String,
    #[serde(deserialize_with = "lenient::string")]
    pub complaints_rank: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A titled group of recommended plans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationGroup {
    #[serde(deserialize_with = "lenient::string")]
    pub category: String,
    #[serde(deserialize_with = "lenient::list")]
    pub items: Vec<CandidateRecommendation>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One recommended plan; the unit reordered by ranking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateRecommendation {
    #[serde(deserialize_with = "lenient::string")]
    pub company: String,
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "lenient::string")]
    pub plan_type: String,
    #[serde(deserialize_with = "lenient::number")]
    pub product_score: f64,
    #[serde(deserialize_with = "lenient::string")]
    pub premium: String,
    #[serde(deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(deserialize_with = "lenient::object")]
    pub stats: Map<String, Value>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub benefits: Vec<String>,
    #[serde(deserialize_with = "lenient::list")]
    pub non_negotiable: Vec<FeatureDelta>,
    #[serde(deserialize_with = "lenient::list")]
    pub must_have: Vec<FeatureDelta>,
    #[serde(deserialize_with = "lenient::list")]
    pub good_to_have: Vec<FeatureDelta>,
    #[serde(deserialize_with = "lenient::list")]
    pub special_features: Vec<FeatureDelta>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub red_flags: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CandidateRecommendation {
    pub fn for_company(company: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            ..Default::default()
        }
    }
}

/// Existing versus proposed value of one feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureDelta {
    #[serde(deserialize_with = "lenient::string")]
    pub feature: String,
    #[serde(deserialize_with = "lenient::string")]
    pub existing: String,
    #[serde(deserialize_with = "lenient::string")]
    pub proposed: String,
    /// `"Upgrade"` for significant wins, empty otherwise.
    #[serde(deserialize_with = "lenient::string")]
    pub status: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
