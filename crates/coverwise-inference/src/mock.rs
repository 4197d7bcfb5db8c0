//! Scripted generation backend for deterministic testing.
//!
//! Responses and failures are scripted per model candidate, and every call is
//! recorded so tests can assert which candidates were tried and with what
//! configuration.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use coverwise_inference::mock::MockGenerationBackend;
//! use coverwise_inference::BackendFailure;
//!
//! let backend = MockGenerationBackend::new()
//!     .with_failure("gemini-1.5-pro", BackendFailure::QuotaExceeded("429".into()))
//!     .with_response("gemini-1.5-flash", r#"{"company": "Care Health"}"#);
//! assert_eq!(backend.call_count(), 0);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use coverwise_core::{
    BackendFailure, GenerationBackend, GenerationConfig, GenerationRequest, ModelCandidate,
};

type Scripted = std::result::Result<String, BackendFailure>;

/// Mock generation backend for testing.
#[derive(Clone)]
pub struct MockGenerationBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    scripted: HashMap<String, Scripted>,
    default_outcome: Scripted,
    latency_ms: u64,
}

/// One recorded backend call.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub model: ModelCandidate,
    pub prompt: String,
    pub has_attachment: bool,
    pub config: GenerationConfig,
    pub timestamp: std::time::Instant,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            scripted: HashMap::new(),
            default_outcome: Err(BackendFailure::Unavailable(
                "no scripted response".to_string(),
            )),
            latency_ms: 0,
        }
    }
}

impl MockGenerationBackend {
    /// Create a mock where every unscripted model fails as unavailable.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Script a successful response for one model.
    pub fn with_response(mut self, model: impl Into<String>, text: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config)
            .scripted
            .insert(model.into(), Ok(text.into()));
        self
    }

    /// Script a failure for one model.
    pub fn with_failure(mut self, model: impl Into<String>, failure: BackendFailure) -> Self {
        Arc::make_mut(&mut self.config)
            .scripted
            .insert(model.into(), Err(failure));
        self
    }

    /// Response for every model without a script.
    pub fn with_default_response(mut self, text: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).default_outcome = Ok(text.into());
        self
    }

    /// Failure for every model without a script.
    pub fn with_default_failure(mut self, failure: BackendFailure) -> Self {
        Arc::make_mut(&mut self.config).default_outcome = Err(failure);
        self
    }

    /// Set simulated latency for every call.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        Arc::make_mut(&mut self.config).latency_ms = latency_ms;
        self
    }

    /// Get all logged calls for assertion.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.log().clone()
    }

    /// Models called, in call order.
    pub fn called_models(&self) -> Vec<String> {
        self.log()
            .iter()
            .map(|c| c.model.as_str().to_string())
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.log().len()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.log().clear()
    }

    fn log(&self) -> MutexGuard<'_, Vec<MockCall>> {
        self.call_log
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MockGenerationBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn generate(
        &self,
        model: &ModelCandidate,
        request: &GenerationRequest,
        config: &GenerationConfig,
    ) -> std::result::Result<String, BackendFailure> {
        self.log().push(MockCall {
            model: model.clone(),
            prompt: request.prompt.clone(),
            has_attachment: request.attachment.is_some(),
            config: config.clone(),
            timestamp: std::time::Instant::now(),
        });

        if self.config.latency_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(self.config.latency_ms)).await;
        }

        self.config
            .scripted
            .get(model.as_str())
            .cloned()
            .unwrap_or_else(|| self.config.default_outcome.clone())
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}
