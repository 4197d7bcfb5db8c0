//! Generation request model: candidates, requests, per-attempt config.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{BackendFailure, Error, Result};

/// Identifier of one backend model variant (e.g. `gemini-1.5-pro`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelCandidate(String);

impl ModelCandidate {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered, immutable list of model candidates, highest priority first.
///
/// Cloning is cheap; the list is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCandidates(Arc<[ModelCandidate]>);

impl ModelCandidates {
    /// Build a candidate list. Blank identifiers are skipped; an empty result is rejected.
    pub fn new<I, S>(ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let candidates: Vec<ModelCandidate> = ids
            .into_iter()
            .map(|id| id.as_ref().trim().to_string())
            .filter(|id| !id.is_empty())
            .map(ModelCandidate)
            .collect();

        if candidates.is_empty() {
            return Err(Error::Config(
                "model candidate list cannot be empty".to_string(),
            ));
        }
        Ok(Self(candidates.into()))
    }

    /// Parse a comma-separated list such as `"gemini-2.5-pro, gemini-1.5-flash"`.
    pub fn parse(list: &str) -> Result<Self> {
        Self::new(list.split(','))
    }

    /// The built-in priority list from [`crate::defaults::MODEL_CANDIDATES`].
    pub fn builtin() -> Self {
        Self(
            crate::defaults::MODEL_CANDIDATES
                .iter()
                .map(|id| ModelCandidate::new(*id))
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelCandidate> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&ModelCandidate> {
        self.0.first()
    }
}

/// Binary attachment sent alongside the prompt (the uploaded policy document).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Capabilities a request may ask the backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    /// Grounding with web search.
    WebSearch,
}

/// Output-format hint for a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Ask the backend for JSON output.
    Structured,
}

/// One logical request, submitted unchanged to each candidate in turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub attachment: Option<Attachment>,
    pub tools: Vec<Tool>,
    pub temperature: Option<f32>,
    /// Ask for JSON output when the backend can combine it with the requested tools.
    pub structured_output: bool,
}

impl GenerationRequest {
    /// A plain-text request asking for structured output.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            structured_output: true,
            ..Default::default()
        }
    }

    pub fn with_attachment(mut self, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        self.attachment = Some(Attachment {
            mime_type: mime_type.into(),
            data,
        });
        self
    }

    pub fn with_tool(mut self, tool: Tool) -> Self {
        if !self.tools.contains(&tool) {
            self.tools.push(tool);
        }
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn without_structured_output(mut self) -> Self {
        self.structured_output = false;
        self
    }
}

/// Backend configuration for one attempt, derived from the request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationConfig {
    pub response_format: Option<ResponseFormat>,
    pub tools: Vec<Tool>,
    pub temperature: Option<f32>,
}

impl GenerationConfig {
    /// Derive the attempt config. The JSON format hint cannot be combined with
    /// tools, so it is dropped whenever the request carries any.
    pub fn for_request(request: &GenerationRequest) -> Self {
        let response_format = if request.structured_output && request.tools.is_empty() {
            Some(ResponseFormat::Structured)
        } else {
            None
        };
        Self {
            response_format,
            tools: request.tools.clone(),
            temperature: request.temperature,
        }
    }
}

/// Outcome of calling one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Candidate answered; carries the response length in bytes.
    Succeeded { response_len: usize },
    Failed(BackendFailure),
}

/// One (candidate, outcome) pair, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationAttempt {
    pub model: ModelCandidate,
    pub outcome: AttemptOutcome,
    pub duration_ms: u64,
}

impl GenerationAttempt {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Succeeded { .. })
    }
}

/// Text produced by the first successful candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
    pub model: ModelCandidate,
    pub attempts: Vec<GenerationAttempt>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_preserve_order() {
        let candidates = ModelCandidates::new(["b-model", "a-model", "c-model"]).unwrap();
        let ids: Vec<&str> = candidates.iter().map(ModelCandidate::as_str).collect();
        assert_eq!(ids, vec!["b-model", "a-model", "c-model"]);
    }

    #[test]
    fn test_candidates_reject_empty() {
        let err = ModelCandidates::new(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_candidates_parse_trims_and_skips_blanks() {
        let candidates = ModelCandidates::parse(" gemini-2.5-pro, ,gemini-1.5-flash ").unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates.first().unwrap().as_str(), "gemini-2.5-pro");
    }

    #[test]
    fn test_candidates_parse_blank_is_error() {
        assert!(ModelCandidates::parse(" , ").is_err());
    }

    #[test]
    fn test_builtin_candidates_match_defaults() {
        let candidates = ModelCandidates::builtin();
        assert_eq!(candidates.len(), crate::defaults::MODEL_CANDIDATES.len());
        assert_eq!(candidates.first().unwrap().as_str(), "gemini-2.0-flash-exp");
    }

    #[test]
    fn test_config_keeps_format_hint_without_tools() {
        let request = GenerationRequest::new("extract").with_temperature(0.0);
        let config = GenerationConfig::for_request(&request);
        assert_eq!(config.response_format, Some(ResponseFormat::Structured));
        assert_eq!(config.temperature, Some(0.0));
    }

    #[test]
    fn test_config_drops_format_hint_with_tools() {
        let request = GenerationRequest::new("compare").with_tool(Tool::WebSearch);
        let config = GenerationConfig::for_request(&request);
        assert_eq!(config.response_format, None);
        assert_eq!(config.tools, vec![Tool::WebSearch]);
    }

    #[test]
    fn test_config_no_format_when_not_requested() {
        let request = GenerationRequest::new("free text").without_structured_output();
        assert_eq!(GenerationConfig::for_request(&request).response_format, None);
    }

    #[test]
    fn test_with_tool_deduplicates() {
        let request = GenerationRequest::new("x")
            .with_tool(Tool::WebSearch)
            .with_tool(Tool::WebSearch);
        assert_eq!(request.tools.len(), 1);
    }
}
