//! Integration tests for the Gemini backend against a mock HTTP server.
//!
//! Verifies the wire format, status classification, and that the fallback
//! invoker moves past candidates the server rejects.

#![cfg(feature = "gemini")]

use std::sync::Arc;

use coverwise_inference::{
    BackendFailure, Error, FallbackInvoker, GeminiBackend, GeminiConfig, GenerationBackend,
    GenerationConfig, GenerationRequest, ModelCandidate, ModelCandidates, Tool,
};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> GeminiBackend {
    GeminiBackend::new(GeminiConfig {
        base_url: server.uri(),
        api_key: "test-key".to_string(),
        timeout_seconds: 10,
    })
    .expect("Failed to create backend")
}

fn text_response(parts: &[&str]) -> Value {
    let parts: Vec<Value> = parts.iter().map(|t| json!({ "text": t })).collect();
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": parts },
            "finishReason": "STOP"
        }]
    })
}

async fn call(
    backend: &GeminiBackend,
    model: &str,
    request: &GenerationRequest,
) -> Result<String, BackendFailure> {
    let config = GenerationConfig::for_request(request);
    backend
        .generate(&ModelCandidate::new(model), request, &config)
        .await
}

#[tokio::test]
async fn test_generate_concatenates_text_parts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-pro:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(text_response(&["{\"company\": ", "\"Care Health\"}"])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let text = call(&backend, "gemini-1.5-pro", &GenerationRequest::new("extract"))
        .await
        .unwrap();

    assert_eq!(text, "{\"company\": \"Care Health\"}");
}

#[tokio::test]
async fn test_structured_request_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response(&["{}"])))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let request = GenerationRequest::new("extract")
        .with_temperature(0.0)
        .with_attachment("application/pdf", b"hello".to_vec());
    call(&backend, "m1", &request).await.unwrap();

    let received = server.received_requests().await.unwrap();
    let body: Value = received[0].body_json().unwrap();
    assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    assert_eq!(body["generationConfig"]["temperature"], 0.0);
    assert_eq!(body["contents"][0]["parts"][0]["text"], "extract");
    assert_eq!(
        body["contents"][0]["parts"][1]["inlineData"],
        json!({ "mimeType": "application/pdf", "data": "aGVsbG8=" })
    );
    assert!(body.get("tools").is_none());
}

#[tokio::test]
async fn test_search_request_omits_format_hint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response(&["ok"])))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let request = GenerationRequest::new("compare")
        .with_tool(Tool::WebSearch)
        .with_temperature(0.0);
    call(&backend, "m1", &request).await.unwrap();

    let received = server.received_requests().await.unwrap();
    let body: Value = received[0].body_json().unwrap();
    assert_eq!(body["tools"], json!([{ "googleSearch": {} }]));
    assert!(body["generationConfig"].get("responseMimeType").is_none());
    assert_eq!(body["generationConfig"]["temperature"], 0.0);
}

#[tokio::test]
async fn test_rate_limit_is_quota_exceeded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("RESOURCE_EXHAUSTED"))
        .mount(&server)
        .await;

    let result = call(&backend_for(&server), "m1", &GenerationRequest::new("x")).await;
    match result {
        Err(BackendFailure::QuotaExceeded(msg)) => assert!(msg.contains("RESOURCE_EXHAUSTED")),
        other => panic!("Expected QuotaExceeded, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_model_is_invalid_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
        .mount(&server)
        .await;

    let result = call(&backend_for(&server), "gemini-9", &GenerationRequest::new("x")).await;
    assert!(matches!(result, Err(BackendFailure::InvalidRequest(_))));
}

#[tokio::test]
async fn test_server_error_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = call(&backend_for(&server), "m1", &GenerationRequest::new("x")).await;
    assert!(matches!(result, Err(BackendFailure::Unavailable(_))));
}

#[tokio::test]
async fn test_empty_candidates_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let result = call(&backend_for(&server), "m1", &GenerationRequest::new("x")).await;
    assert!(matches!(result, Err(BackendFailure::InvalidResponse(_))));
}

#[tokio::test]
async fn test_unreachable_server_is_unavailable() {
    let server = MockServer::start().await;
    let backend = backend_for(&server);
    drop(server);

    let result = call(&backend, "m1", &GenerationRequest::new("x")).await;
    assert!(matches!(result, Err(BackendFailure::Unavailable(_))));
}

#[tokio::test]
async fn test_fallback_skips_busy_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/busy-model:generateContent"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/ready-model:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response(&["{\"ok\": true}"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/spare-model:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response(&["unused"])))
        .expect(0)
        .mount(&server)
        .await;

    let invoker = FallbackInvoker::new(
        Arc::new(backend_for(&server)),
        ModelCandidates::new(["busy-model", "ready-model", "spare-model"]).unwrap(),
    );
    let generation = invoker.invoke(&GenerationRequest::new("x")).await.unwrap();

    assert_eq!(generation.text, "{\"ok\": true}");
    assert_eq!(generation.model.as_str(), "ready-model");
    assert_eq!(generation.attempts.len(), 2);
}

#[tokio::test]
async fn test_fallback_exhausted_reports_last_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/a:generateContent"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/b:generateContent"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let invoker = FallbackInvoker::new(
        Arc::new(backend_for(&server)),
        ModelCandidates::new(["a", "b"]).unwrap(),
    );
    let err = invoker.invoke(&GenerationRequest::new("x")).await.unwrap_err();

    match err {
        Error::AllBackendsExhausted { attempted, last } => {
            assert_eq!(attempted, 2);
            assert!(matches!(last, BackendFailure::QuotaExceeded(_)));
        }
        other => panic!("Expected AllBackendsExhausted, got {:?}", other),
    }
}
