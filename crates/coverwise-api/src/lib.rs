//! # coverwise-api
//!
//! HTTP surface for the coverwise policy pipeline: document extraction,
//! market comparison, and a liveness probe.

pub mod error;
pub mod handlers;
pub mod prompts;
pub mod services;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use coverwise_core::defaults::MAX_UPLOAD_BYTES;
use coverwise_inference::FallbackInvoker;
use coverwise_reconcile::CsvReferenceStore;

pub use error::ApiError;
use services::{ComparisonService, ExtractionService};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub extraction: Arc<ExtractionService>,
    pub comparison: Arc<ComparisonService>,
}

impl AppState {
    /// Both services share one invoker configuration and one reference store.
    pub fn new(invoker: FallbackInvoker, store: Arc<CsvReferenceStore>) -> Self {
        Self {
            extraction: Arc::new(ExtractionService::new(invoker.clone(), Arc::clone(&store))),
            comparison: Arc::new(ComparisonService::new(invoker, store)),
        }
    }
}

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// CORS policy from `ALLOWED_ORIGINS` (comma-separated). Any origin is
/// allowed when the variable is unset or empty.
fn cors_layer() -> CorsLayer {
    let origins: Vec<HeaderValue> = std::env::var("ALLOWED_ORIGINS")
        .unwrap_or_default()
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                HeaderValue::from_str(trimmed).ok()
            }
        })
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::permissive().allow_origin(AllowOrigin::list(origins))
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/api/extract", post(handlers::extract_policy))
        .route("/api/compare", post(handlers::compare_policy))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(cors_layer())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_BYTES))
        .with_state(state)
}
