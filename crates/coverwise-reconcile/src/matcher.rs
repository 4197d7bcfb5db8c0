//! Fuzzy lookup of a policy in the plan reference dataset.

use tracing::debug;

use coverwise_core::defaults::{
    CONTAINMENT_BONUS, MATCH_THRESHOLD, PLAN_COMPANY_COLUMN, PLAN_NAME_COLUMN,
};
use coverwise_core::{MatchResult, ReferenceRow};

/// Column names holding the organization and plan in a reference dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchColumns {
    pub organization: String,
    pub plan: String,
}

impl Default for MatchColumns {
    fn default() -> Self {
        Self {
            organization: PLAN_COMPANY_COLUMN.to_string(),
            plan: PLAN_NAME_COLUMN.to_string(),
        }
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Ratcliff/Obershelp similarity in `[0, 1]`: twice the matched characters
/// over the combined length. Two empty strings are identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

/// Characters covered by the longest common block, then recursively by the
/// blocks found on either side of it.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(a, b)];
    while let Some((a, b)) = pending.pop() {
        let (i, j, len) = longest_block(a, b);
        if len == 0 {
            continue;
        }
        matched += len;
        pending.push((&a[..i], &b[..j]));
        pending.push((&a[i + len..], &b[j + len..]));
    }
    matched
}

/// Longest common block as `(start_a, start_b, len)`. Among equally long
/// blocks the earliest in `a`, then in `b`, wins.
fn longest_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            let run = if ca == cb { prev[j] + 1 } else { 0 };
            curr[j + 1] = run;
            if run > best.2 {
                best = (i + 1 - run, j + 1 - run, run);
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    best
}

/// Best row for `(query_org, query_plan)`, if any scores above the threshold.
///
/// Rows whose organization neither contains nor is contained in the query
/// organization are skipped. Plan names are compared with [`similarity`], plus
/// a bonus when the query plan appears verbatim in the row's plan. On equal
/// scores the earlier row wins.
pub fn match_reference(
    query_org: &str,
    query_plan: &str,
    rows: &[ReferenceRow],
    columns: &MatchColumns,
) -> Option<MatchResult> {
    let org = normalize(query_org);
    let plan = normalize(query_plan);
    if plan.is_empty() || rows.is_empty() {
        return None;
    }

    let mut best: Option<(&ReferenceRow, f64)> = None;
    for row in rows {
        let row_org = normalize(row.get_or_empty(&columns.organization));
        if !row_org.contains(&org) && !org.contains(&row_org) {
            continue;
        }

        let row_plan = normalize(row.get_or_empty(&columns.plan));
        let mut score = similarity(&plan, &row_plan);
        if row_plan.contains(&plan) {
            score += CONTAINMENT_BONUS;
        }

        if best.map_or(true, |(_, top)| score > top) {
            best = Some((row, score));
        }
    }

    let (row, raw_score) = best.filter(|(_, score)| *score > MATCH_THRESHOLD)?;
    debug!(
        query_plan = %query_plan,
        matched_plan = %row.get_or_empty(&columns.plan),
        score = raw_score,
        "Reference plan matched"
    );
    Some(MatchResult {
        row: row.clone(),
        score: raw_score.clamp(0.0, 1.0),
        raw_score,
        query_org: org,
        query_plan: plan,
    })
}
