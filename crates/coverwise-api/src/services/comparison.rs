//! Policy comparison against the market.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};

use coverwise_core::defaults::{
    COMPANY_DATASET, DETERMINISTIC_TEMPERATURE, FEATURES_DATASET, MAX_PROS_CONS, PLANS_DATASET,
};
use coverwise_core::{
    ComparisonResult, ExtractedDocument, GenerationRequest, ReferenceRow, Result, Tool,
};
use coverwise_inference::{salvage, FallbackInvoker};
use coverwise_reconcile::{
    describe_tenure, match_reference, parse_rows, product_score, rank_groups, CsvReferenceStore,
    MatchColumns, MetricTable,
};

use super::run_blocking;
use crate::prompts::{comparison_prompt, verified_section, ComparisonContext};

/// Reference datasets loaded for one comparison.
#[derive(Debug, Default)]
struct ComparisonReferences {
    features_csv: String,
    company_csv: String,
    plans_csv: String,
    plan_rows: Vec<ReferenceRow>,
    metrics: MetricTable,
}

impl ComparisonReferences {
    fn load(store: &CsvReferenceStore) -> Self {
        let features_csv = store.load_raw(FEATURES_DATASET).unwrap_or_default();
        let company_csv = store.load_raw(COMPANY_DATASET).unwrap_or_default();
        let plans_csv = store.load_raw(PLANS_DATASET).unwrap_or_default();

        let metrics = MetricTable::from_reference_csv(&company_csv).unwrap_or_else(|e| {
            warn!(error = %e, "Company performance data unreadable, ranking disabled");
            MetricTable::new()
        });
        let plan_rows = parse_rows(&plans_csv);

        Self {
            features_csv,
            company_csv,
            plans_csv,
            plan_rows,
            metrics,
        }
    }

    /// Whether the company name appears anywhere in the performance data.
    fn knows_company(&self, company: &str) -> bool {
        let company = company.trim().to_lowercase();
        !company.is_empty() && self.company_csv.to_lowercase().contains(&company)
    }
}

/// Compares an extracted policy with market alternatives.
pub struct ComparisonService {
    invoker: FallbackInvoker,
    store: Arc<CsvReferenceStore>,
    columns: MatchColumns,
}

impl ComparisonService {
    pub fn new(invoker: FallbackInvoker, store: Arc<CsvReferenceStore>) -> Self {
        Self {
            invoker,
            store,
            columns: MatchColumns::default(),
        }
    }

    /// Produce a comparison for `document` as of `today`.
    ///
    /// Fails when every model candidate fails. The returned product
    /// score, pros/cons bounds and recommendation order are computed locally.
    #[instrument(skip(self, document), fields(subsystem = "api", component = "comparison", op = "compare", company = %document.company))]
    pub async fn compare(
        &self,
        document: &ExtractedDocument,
        today: NaiveDate,
    ) -> Result<ComparisonResult> {
        let store = Arc::clone(&self.store);
        let refs = run_blocking(move || ComparisonReferences::load(&store)).await?;

        let tenure = describe_tenure(&document.policy_details.start_date, today);
        let company_known = refs.knows_company(&document.company);
        if !company_known {
            debug!("Company not in performance data, using Others row");
        }

        let verified = match_reference(
            &document.company,
            &document.policy_details.plan,
            &refs.plan_rows,
            &self.columns,
        )
        .map(|m| verified_section(&m, &self.columns.organization, &self.columns.plan));

        let prompt = comparison_prompt(&ComparisonContext {
            document,
            tenure: &tenure,
            company_known,
            verified: verified.as_deref(),
            features_csv: &refs.features_csv,
            company_csv: &refs.company_csv,
            plans_csv: &refs.plans_csv,
        })?;
        let request = GenerationRequest::new(prompt)
            .with_tool(Tool::WebSearch)
            .with_temperature(DETERMINISTIC_TEMPERATURE);
        let generation = self.invoker.invoke(&request).await?;

        let parsed = salvage::<ComparisonResult>(&generation.text);
        let mut result = if parsed.outcome.is_degraded() {
            ComparisonResult::unparsed(&document.company)
        } else {
            parsed.value
        };

        if !result.feature_analysis.is_empty() {
            result.product_score = product_score(&result.feature_analysis);
        }
        clamp_pros_cons(&mut result);
        rank_groups(&mut result.recommendations, &refs.metrics);

        info!(
            model = %generation.model,
            salvage_outcome = parsed.outcome.as_str(),
            tenure = %tenure,
            verified_match = verified.is_some(),
            score = result.product_score,
            feature_count = result.feature_analysis.len(),
            group_count = result.recommendations.len(),
            "Policy compared"
        );
        Ok(result)
    }
}

/// At most seven pros and seven cons, and never more pros than cons.
/// Applies only when both lists are present.
pub fn clamp_pros_cons(result: &mut ComparisonResult) {
    if let (Some(pros), Some(cons)) = (result.pros.as_mut(), result.cons.as_mut()) {
        pros.truncate(MAX_PROS_CONS);
        cons.truncate(MAX_PROS_CONS);
        pros.truncate(cons.len());
    }
}
