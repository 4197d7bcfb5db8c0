//! # coverwise-inference
//!
//! Generation side of the coverwise pipeline.
//!
//! This crate provides:
//! - An ordered fallback invoker over interchangeable model candidates
//! - A salvage parser that recovers JSON from decorated model output
//! - A Gemini `generateContent` backend (default, feature `gemini`)
//! - A scripted mock backend for tests (feature `mock`)
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use coverwise_inference::{salvage, FallbackInvoker, GeminiBackend};
//! use coverwise_core::{ExtractedDocument, GenerationRequest, ModelCandidates};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = Arc::new(GeminiBackend::from_env().unwrap());
//!     let invoker = FallbackInvoker::new(backend, ModelCandidates::builtin());
//!     let generation = invoker
//!         .invoke(&GenerationRequest::new("Extract the policy details"))
//!         .await
//!         .unwrap();
//!     let parsed = salvage::<ExtractedDocument>(&generation.text);
//!     println!("{:?} via {}", parsed.outcome, generation.model);
//! }
//! ```

pub mod fallback;
pub mod salvage;

#[cfg(feature = "gemini")]
pub mod gemini;

// Scripted generation backend for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use coverwise_core::*;

#[cfg(feature = "gemini")]
pub use gemini::{GeminiBackend, GeminiConfig};

pub use fallback::FallbackInvoker;
pub use salvage::{salvage, salvage_value, strip_code_fence, SalvageOutcome, Salvaged};
