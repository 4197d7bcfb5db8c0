//! Local recomputation of derived fields the model tends to get wrong.
//!
//! Model-reported ages, totals, tenure and scores are replaced with values
//! computed from the primary facts (dates of birth, itemized components,
//! inception date, per-feature verdicts). When a primary fact cannot be read
//! the model's value is kept.

use chrono::NaiveDate;
use tracing::debug;

use coverwise_core::defaults::{POSITIVE_STATUS, SCORED_CATEGORIES};
use coverwise_core::{ExtractedDocument, FeatureEvaluation, PolicyHolder};

use crate::dates::{age_on, parse_date, tenure_between};
use crate::money::normalize_sum_insured;

/// Recompute every derived field of an extracted document as of `today`.
///
/// Idempotent: normalizing an already-normalized document changes nothing.
pub fn normalize_document(mut doc: ExtractedDocument, today: NaiveDate) -> ExtractedDocument {
    recompute_ages(&mut doc.policy_holders, today);
    normalize_sum_insured(&mut doc.sum_insured);

    match parse_date(&doc.policy_details.start_date) {
        Some(start) => {
            doc.policy_details.vintage = tenure_between(start, today).to_string();
        }
        None if !doc.policy_details.start_date.trim().is_empty() => {
            debug!(
                start_date = %doc.policy_details.start_date,
                "Unreadable inception date, keeping reported vintage"
            );
        }
        None => {}
    }

    doc
}

/// Replace each holder's age with the age computed from their date of birth.
pub fn recompute_ages(holders: &mut [PolicyHolder], today: NaiveDate) {
    for holder in holders.iter_mut() {
        match parse_date(&holder.dob) {
            Some(birth) => holder.age = age_on(birth, today).to_string(),
            None if !holder.dob.trim().is_empty() => {
                debug!(dob = %holder.dob, "Unreadable date of birth, keeping reported age");
            }
            None => {}
        }
    }
}

/// Score out of 10: share of positive verdicts among scored categories,
/// rounded to one decimal (ties to even). 0.0 when nothing is scored.
pub fn product_score(features: &[FeatureEvaluation]) -> f64 {
    let scored = features
        .iter()
        .filter(|f| SCORED_CATEGORIES.contains(&f.category.as_str()));

    let (total, positive) = scored.fold((0usize, 0usize), |(total, positive), f| {
        (total + 1, positive + usize::from(f.status == POSITIVE_STATUS))
    });
    if total == 0 {
        return 0.0;
    }

    let score = positive as f64 / total as f64 * 10.0;
    (score * 10.0).round_ties_even() / 10.0
}
