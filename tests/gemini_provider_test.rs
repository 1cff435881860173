// ABOUTME: Integration tests for the Gemini provider against a local fake API server
// ABOUTME: Checks request shape, role mapping, content extraction, and error mapping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use common::init_test_logging;
use lexdraft_server::errors::ErrorCode;
use lexdraft_server::llm::{
    ChatMessage, ChatRequest, FallbackModels, GeminiProvider, GenerationAdapter,
    GenerationOptions, LlmProvider,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

const API_KEY: &str = "test-key-4f1c";

#[derive(Debug, Clone)]
struct SeenCall {
    call: String,
    query: Option<String>,
    api_key: Option<String>,
    body: Value,
}

#[derive(Clone)]
struct FakeGemini {
    status: StatusCode,
    reply: Value,
    seen: Arc<Mutex<Vec<SeenCall>>>,
}

async fn generate(
    State(fake): State<FakeGemini>,
    Path(call): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let api_key = headers
        .get("x-goog-api-key")
        .and_then(|value| value.to_str().ok())
        .map(ToOwned::to_owned);
    fake.seen.lock().unwrap().push(SeenCall {
        call,
        query,
        api_key,
        body,
    });
    (fake.status, Json(fake.reply.clone()))
}

async fn serve(status: StatusCode, reply: Value) -> (GeminiProvider, Arc<Mutex<Vec<SeenCall>>>) {
    init_test_logging();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/v1beta/models/:call", post(generate))
        .with_state(FakeGemini {
            status,
            reply,
            seen: Arc::clone(&seen),
        });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let provider = GeminiProvider::new(API_KEY, Duration::from_secs(5))
        .unwrap()
        .with_base_url(format!("http://{address}/v1beta/"));
    (provider, seen)
}

fn conversation() -> ChatRequest {
    ChatRequest::new(vec![
        ChatMessage::system("You are a legal document assistant."),
        ChatMessage::user("What is a warranty?"),
        ChatMessage::assistant("A promise about facts."),
        ChatMessage::user("And an indemnity?"),
    ])
    .with_model("gemini-1.5-pro")
    .with_temperature(0.7)
}

#[tokio::test]
async fn test_request_shape_and_text_extraction() {
    let (provider, seen) = serve(
        StatusCode::OK,
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "An indemnity " }, { "text": "shifts loss." }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 4, "totalTokenCount": 16 }
        }),
    )
    .await;

    let response = provider.complete(&conversation()).await.unwrap();

    assert_eq!(response.content, "An indemnity shifts loss.");
    assert_eq!(response.model, "gemini-1.5-pro");
    assert_eq!(response.finish_reason.as_deref(), Some("STOP"));
    assert_eq!(response.usage.unwrap().total_tokens, 16);

    let SeenCall {
        call,
        query,
        api_key,
        body,
    } = seen.lock().unwrap()[0].clone();
    assert_eq!(call, "gemini-1.5-pro:generateContent");
    assert_eq!(api_key.as_deref(), Some(API_KEY));
    assert!(query.is_none_or(|q| !q.contains(API_KEY)));
    assert_eq!(
        body["system_instruction"]["parts"][0]["text"],
        "You are a legal document assistant."
    );
    let roles: Vec<_> = body["contents"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["role"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(roles, vec!["user", "model", "user"]);
    assert!(body["generationConfig"]["maxOutputTokens"].is_null());
    assert_eq!(body["generationConfig"]["candidateCount"], 1);
}

#[tokio::test]
async fn test_rate_limit_becomes_retry_hint() {
    let (provider, _) = serve(
        StatusCode::TOO_MANY_REQUESTS,
        json!({ "error": { "message": "Quota exceeded. Please retry in 6.4s." } }),
    )
    .await;

    let error = provider.complete(&conversation()).await.unwrap_err();

    assert_eq!(error.code, ErrorCode::ExternalRateLimited);
    assert!(error.message.contains("7 seconds"), "{}", error.message);
}

#[tokio::test]
async fn test_server_error_is_external_service_error() {
    let (provider, _) = serve(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": { "message": "backend exploded" } }),
    )
    .await;

    let error = provider.complete(&conversation()).await.unwrap_err();

    assert_eq!(error.code, ErrorCode::ExternalServiceError);
    assert!(error.message.contains("backend exploded"));
}

#[tokio::test]
async fn test_empty_candidates_are_an_error() {
    let (provider, _) = serve(StatusCode::OK, json!({ "candidates": [] })).await;

    let error = provider.complete(&conversation()).await.unwrap_err();

    assert_eq!(error.code, ErrorCode::ExternalServiceError);
}

#[tokio::test]
async fn test_unreachable_api_never_exposes_key() {
    init_test_logging();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let provider = GeminiProvider::new(API_KEY, Duration::from_secs(2))
        .unwrap()
        .with_base_url(format!("http://{address}"));
    let adapter = GenerationAdapter::new(
        Arc::new(provider),
        FallbackModels::new(vec!["model-a".to_owned()]).unwrap(),
    );

    let error = adapter
        .generate_single_turn("What is a lien?", &GenerationOptions::default())
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::ProvidersExhausted);
    assert!(!error.message.contains(API_KEY), "{}", error.message);
    let source = std::error::Error::source(&error)
        .map(ToString::to_string)
        .unwrap_or_default();
    assert!(!source.contains(API_KEY), "{source}");
}

#[test]
fn test_provider_identity() {
    let provider = GeminiProvider::new("secret-api-key", Duration::from_secs(1)).unwrap();
    assert_eq!(provider.name(), "google");
    assert_eq!(provider.display_name(), "Google Gemini");
    assert_eq!(provider.default_model(), "gemini-2.0-flash");
    assert!(provider.available_models().contains(&"gemini-1.5-flash"));
    let debug = format!("{provider:?}");
    assert!(!debug.contains("secret-api-key"));
    assert!(debug.contains("[REDACTED]"));
}
