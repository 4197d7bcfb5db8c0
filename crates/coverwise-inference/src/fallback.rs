//! Ordered multi-model fallback.
//!
//! The candidate list is a priority-ordered resource pool: candidates are tried
//! one at a time and the first success wins. There is no quality comparison
//! across models and no parallel speculation.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, instrument, warn};

use coverwise_core::{
    AttemptOutcome, BackendFailure, Error, Generation, GenerationAttempt, GenerationBackend,
    GenerationConfig, GenerationRequest, ModelCandidates, Result,
};

/// Tries each model candidate in order until one produces text.
#[derive(Clone)]
pub struct FallbackInvoker {
    backend: Arc<dyn GenerationBackend>,
    candidates: ModelCandidates,
}

impl FallbackInvoker {
    pub fn new(backend: Arc<dyn GenerationBackend>, candidates: ModelCandidates) -> Self {
        Self {
            backend,
            candidates,
        }
    }

    pub fn candidates(&self) -> &ModelCandidates {
        &self.candidates
    }

    /// Submit `request` to each candidate in priority order.
    ///
    /// Returns the first successful response. When every candidate fails the
    /// error is [`Error::AllBackendsExhausted`] carrying the last cause.
    #[instrument(skip(self, request), fields(subsystem = "inference", component = "fallback", op = "invoke", backend = %self.backend.backend_name(), candidate_count = self.candidates.len(), prompt_len = request.prompt.len()))]
    pub async fn invoke(&self, request: &GenerationRequest) -> Result<Generation> {
        let config = GenerationConfig::for_request(request);
        if request.structured_output && config.response_format.is_none() {
            debug!(
                tool_count = request.tools.len(),
                "JSON format hint dropped: not composable with requested tools"
            );
        }

        let mut attempts = Vec::with_capacity(self.candidates.len());
        let mut last_failure: Option<BackendFailure> = None;

        for (index, model) in self.candidates.iter().enumerate() {
            let attempt = index + 1;
            let start = Instant::now();
            debug!(model = %model, attempt, "Attempting model");

            let outcome = self.backend.generate(model, request, &config).await;
            let duration_ms = start.elapsed().as_millis() as u64;

            match outcome {
                Ok(text) => {
                    info!(
                        model = %model,
                        attempt,
                        duration_ms,
                        response_len = text.len(),
                        "Generation succeeded"
                    );
                    attempts.push(GenerationAttempt {
                        model: model.clone(),
                        outcome: AttemptOutcome::Succeeded {
                            response_len: text.len(),
                        },
                        duration_ms,
                    });
                    return Ok(Generation {
                        text,
                        model: model.clone(),
                        attempts,
                    });
                }
                Err(failure) => {
                    warn!(
                        model = %model,
                        attempt,
                        duration_ms,
                        error = %failure,
                        "Model candidate failed, trying next"
                    );
                    attempts.push(GenerationAttempt {
                        model: model.clone(),
                        outcome: AttemptOutcome::Failed(failure.clone()),
                        duration_ms,
                    });
                    last_failure = Some(failure);
                }
            }
        }

        let last = last_failure.unwrap_or_else(|| {
            BackendFailure::Unavailable("no model candidates configured".to_string())
        });
        error!(attempted = attempts.len(), error = %last, "All model candidates failed");
        Err(Error::AllBackendsExhausted {
            attempted: attempts.len(),
            last,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockGenerationBackend;
    use coverwise_core::{ResponseFormat, Tool};

    fn candidates(ids: &[&str]) -> ModelCandidates {
        ModelCandidates::new(ids).unwrap()
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let mock = MockGenerationBackend::new()
            .with_response("m1", "first")
            .with_response("m2", "second");
        let invoker = FallbackInvoker::new(Arc::new(mock.clone()), candidates(&["m1", "m2"]));

        let generation = invoker.invoke(&GenerationRequest::new("hi")).await.unwrap();

        assert_eq!(generation.text, "first");
        assert_eq!(generation.model.as_str(), "m1");
        assert_eq!(mock.called_models(), vec!["m1"]);
    }

    #[tokio::test]
    async fn test_kth_success_stops_before_next_candidate() {
        let mock = MockGenerationBackend::new()
            .with_failure("m1", BackendFailure::Unavailable("down".into()))
            .with_failure("m2", BackendFailure::QuotaExceeded("429".into()))
            .with_response("m3", r#"{"ok": true}"#)
            .with_response("m4", "never");
        let invoker =
            FallbackInvoker::new(Arc::new(mock.clone()), candidates(&["m1", "m2", "m3", "m4"]));

        let generation = invoker.invoke(&GenerationRequest::new("hi")).await.unwrap();

        assert_eq!(generation.text, r#"{"ok": true}"#);
        assert_eq!(generation.model.as_str(), "m3");
        assert_eq!(mock.called_models(), vec!["m1", "m2", "m3"]);
        assert_eq!(generation.attempts.len(), 3);
        assert!(!generation.attempts[0].succeeded());
        assert!(generation.attempts[2].succeeded());
    }

    #[tokio::test]
    async fn test_all_fail_reports_last_cause() {
        let mock = MockGenerationBackend::new()
            .with_failure("m1", BackendFailure::Unavailable("down".into()))
            .with_failure("m2", BackendFailure::InvalidRequest("bad model".into()));
        let invoker = FallbackInvoker::new(Arc::new(mock.clone()), candidates(&["m1", "m2"]));

        let err = invoker.invoke(&GenerationRequest::new("hi")).await.unwrap_err();

        match err {
            Error::AllBackendsExhausted { attempted, last } => {
                assert_eq!(attempted, 2);
                assert_eq!(last, BackendFailure::InvalidRequest("bad model".into()));
            }
            other => panic!("Expected AllBackendsExhausted, got {:?}", other),
        }
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_attempts_are_sequential_in_priority_order() {
        let mock = MockGenerationBackend::new().with_default_failure(
            BackendFailure::Unavailable("down".into()),
        );
        let invoker =
            FallbackInvoker::new(Arc::new(mock.clone()), candidates(&["c", "a", "b"]));

        let _ = invoker.invoke(&GenerationRequest::new("hi")).await;

        assert_eq!(mock.called_models(), vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_format_hint_sent_without_tools() {
        let mock = MockGenerationBackend::new().with_default_response("{}");
        let invoker = FallbackInvoker::new(Arc::new(mock.clone()), candidates(&["m1"]));

        invoker
            .invoke(&GenerationRequest::new("extract").with_temperature(0.0))
            .await
            .unwrap();

        let call = &mock.get_calls()[0];
        assert_eq!(call.config.response_format, Some(ResponseFormat::Structured));
        assert_eq!(call.config.temperature, Some(0.0));
    }

    #[tokio::test]
    async fn test_format_hint_dropped_with_tools() {
        let mock = MockGenerationBackend::new().with_default_response("{}");
        let invoker = FallbackInvoker::new(Arc::new(mock.clone()), candidates(&["m1"]));

        invoker
            .invoke(&GenerationRequest::new("compare").with_tool(Tool::WebSearch))
            .await
            .unwrap();

        let call = &mock.get_calls()[0];
        assert_eq!(call.config.response_format, None);
        assert_eq!(call.config.tools, vec![Tool::WebSearch]);
    }

    #[tokio::test]
    async fn test_every_candidate_receives_same_request() {
        let mock = MockGenerationBackend::new()
            .with_failure("m1", BackendFailure::Unavailable("down".into()))
            .with_response("m2", "ok");
        let invoker = FallbackInvoker::new(Arc::new(mock.clone()), candidates(&["m1", "m2"]));

        invoker
            .invoke(&GenerationRequest::new("same prompt"))
            .await
            .unwrap();

        let prompts: Vec<String> = mock.get_calls().into_iter().map(|c| c.prompt).collect();
        assert_eq!(prompts, vec!["same prompt", "same prompt"]);
    }
}
