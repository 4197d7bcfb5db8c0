//! Core traits for coverwise abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! (Gemini over HTTP, scripted mocks in tests) must satisfy.

use async_trait::async_trait;

use crate::error::BackendFailure;
use crate::models::{GenerationConfig, GenerationRequest, ModelCandidate};

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// Backend for text generation (LLM).
///
/// One call targets one model candidate. Implementations report every failure
/// as a [`BackendFailure`]; retrying across candidates is the caller's job.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text for `request` using `model` and the per-attempt `config`.
    async fn generate(
        &self,
        model: &ModelCandidate,
        request: &GenerationRequest,
        config: &GenerationConfig,
    ) -> std::result::Result<String, BackendFailure>;

    /// Short backend name used in logs (e.g. "gemini").
    fn backend_name(&self) -> &str;
}
