//! Best-effort recovery of JSON payloads from model output.
//!
//! Models routinely wrap JSON in markdown fences or surround it with prose.
//! The salvage ladder tries progressively looser readings of the text:
//!
//! 1. Strict parse of the trimmed text
//! 2. Strict parse of the interior of a ```` ```json ```` (or bare ```` ``` ````) fence
//! 3. Strict parse of the span from the first `{` to the last `}`
//! 4. `T::default()`
//!
//! A rung only counts when the JSON also deserializes into the target type.
//! Salvage never fails; degradation is reported through [`SalvageOutcome`].

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

/// Characters of raw text included in the warning when salvage gives up.
const RAW_PREVIEW_CHARS: usize = 500;

/// Which rung of the ladder produced the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalvageOutcome {
    /// Text was valid JSON as returned.
    Direct,
    /// JSON recovered from inside a code fence.
    Unfenced,
    /// JSON recovered from the outermost brace span.
    BraceSpan,
    /// Nothing recoverable; the default value was substituted.
    Default,
}

impl SalvageOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Unfenced => "unfenced",
            Self::BraceSpan => "brace_span",
            Self::Default => "default",
        }
    }

    /// True when the payload was not recovered and a default stands in for it.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Default)
    }
}

/// A salvaged value and how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct Salvaged<T> {
    pub value: T,
    pub outcome: SalvageOutcome,
}

/// Interior of the first code fence, if the text has one.
///
/// A ```` ```json ```` marker takes precedence over a bare fence. An unterminated
/// fence yields everything after the marker.
pub fn strip_code_fence(text: &str) -> Option<&str> {
    let (_, rest) = text
        .split_once("```json")
        .or_else(|| text.split_once("```"))?;
    Some(rest.split("```").next().unwrap_or(rest).trim())
}

/// Span from the first `{` to the last `}` inclusive.
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Candidate readings of `raw`, in ladder order.
fn readings(raw: &str) -> Vec<(&str, SalvageOutcome)> {
    let trimmed = raw.trim();
    let mut readings = vec![(trimmed, SalvageOutcome::Direct)];

    let unfenced = strip_code_fence(trimmed);
    if let Some(inner) = unfenced {
        readings.push((inner, SalvageOutcome::Unfenced));
        if let Some(span) = brace_span(inner) {
            readings.push((span, SalvageOutcome::BraceSpan));
        }
    }
    // The fence may have cut into the payload (a fence inside a string value),
    // so the raw brace span is still worth a try.
    if let Some(span) = brace_span(trimmed) {
        if !readings.iter().any(|(text, _)| *text == span) {
            readings.push((span, SalvageOutcome::BraceSpan));
        }
    }
    readings
}

/// Run the ladder without a target type.
///
/// Returns `None` when no rung yields valid JSON.
pub fn salvage_value(raw: &str) -> Option<(Value, SalvageOutcome)> {
    readings(raw).into_iter().find_map(|(text, outcome)| {
        serde_json::from_str::<Value>(text)
            .ok()
            .map(|value| (value, outcome))
    })
}

/// Recover a `T` from model output, falling back to `T::default()`.
pub fn salvage<T>(raw: &str) -> Salvaged<T>
where
    T: DeserializeOwned + Default,
{
    for (text, outcome) in readings(raw) {
        let Ok(value) = serde_json::from_str::<Value>(text) else {
            continue;
        };
        match serde_json::from_value::<T>(value) {
            Ok(value) => {
                debug!(
                    salvage_outcome = outcome.as_str(),
                    response_len = raw.len(),
                    "Payload recovered"
                );
                return Salvaged { value, outcome };
            }
            Err(e) => {
                debug!(
                    salvage_outcome = outcome.as_str(),
                    error = %e,
                    "JSON found but does not fit the expected shape"
                );
            }
        }
    }

    let preview: String = raw.chars().take(RAW_PREVIEW_CHARS).collect();
    warn!(
        response_len = raw.len(),
        raw_preview = %preview,
        "Failed to parse model output, substituting default"
    );
    Salvaged {
        value: T::default(),
        outcome: SalvageOutcome::Default,
    }
}
