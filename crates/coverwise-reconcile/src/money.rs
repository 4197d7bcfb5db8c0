//! Monetary amounts in Indian digit grouping.

use tracing::debug;

use coverwise_core::{SumInsured, SumInsuredComponent};

/// Integer rupee amount in a printed value.
///
/// Commas are removed, anything after the first `.` is discarded, then every
/// non-digit is dropped. Empty or oversized input reads as 0.
pub fn extract_amount(value: &str) -> i64 {
    let without_commas = value.trim().replace(',', "");
    let integer_part = without_commas.split('.').next().unwrap_or("");
    let digits: String = integer_part.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

/// Render with Indian grouping: last three digits, then groups of two.
///
/// `1000000` renders as `10,00,000`; negatives keep a leading `-`.
pub fn format_indian(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let sign = if amount < 0 { "-" } else { "" };
    if digits.len() <= 3 {
        return format!("{}{}", sign, digits);
    }

    let (head, last_three) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (front, pair) = rest.split_at(rest.len() - 2);
        groups.push(pair);
        rest = front;
    }
    groups.push(rest);
    groups.reverse();

    format!("{}{},{}", sign, groups.join(","), last_three)
}

fn is_percentage(label: &str) -> bool {
    label.contains('%') || label.contains("percent")
}

fn is_reduction(label: &str) -> bool {
    label.contains("deductible")
}

/// Recompute the sum insured from its components.
///
/// Percentage components and zero amounts are dropped. Deductibles reduce the
/// total. Retained values and the total are rewritten in Indian grouping.
pub fn normalize_sum_insured(sum: &mut SumInsured) {
    let mut total: i64 = 0;
    let mut kept: Vec<SumInsuredComponent> = Vec::with_capacity(sum.components.len());

    for mut component in std::mem::take(&mut sum.components) {
        let amount = extract_amount(&component.value);
        let label = component.label.to_lowercase();
        if amount == 0 || is_percentage(&label) {
            debug!(label = %component.label, value = %component.value, "Dropping sum insured component");
            continue;
        }

        total = if is_reduction(&label) {
            total.saturating_sub(amount)
        } else {
            total.saturating_add(amount)
        };
        component.value = format_indian(amount);
        kept.push(component);
    }

    sum.components = kept;
    sum.total = format_indian(total);
}
