// ABOUTME: HTTP route assembly for the LexDraft API
// ABOUTME: Merges health, assistant, and conversation routes under a tracing layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Route module for the LexDraft server
//!
//! Each domain module holds route definitions and thin handlers that delegate
//! to the service layer. Callers identify themselves with the `x-user-id`
//! header; authenticating that value happens upstream of this server.

/// Legal assistant query routes
pub mod assistant;
/// Conversation lifecycle routes
pub mod conversations;
/// Health check routes
pub mod health;

pub use assistant::AssistantRoutes;
pub use conversations::ConversationRoutes;
pub use health::HealthRoutes;

use std::sync::Arc;

use axum::extract::Request;
use axum::http::HeaderMap;
use axum::Router;
use lexdraft_core::constants::network::USER_ID_HEADER;
use tower_http::trace::TraceLayer;
use tracing::{field, info_span, Span};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;

/// Header carrying a caller-supplied correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Full application router
pub fn router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .merge(HealthRoutes::routes())
        .merge(AssistantRoutes::routes(Arc::clone(&resources)))
        .merge(ConversationRoutes::routes(resources))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
}

fn request_span(request: &Request) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map_or_else(|| format!("req_{}", Uuid::new_v4().simple()), ToOwned::to_owned);

    info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
        user_id = field::Empty,
    )
}

/// Caller identity from the `x-user-id` header
///
/// # Errors
///
/// Returns `MissingRequiredField` when the header is absent, blank, or not UTF-8
pub fn require_user_id(headers: &HeaderMap) -> AppResult<String> {
    let user_id = headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::missing_field(USER_ID_HEADER))?;

    Span::current().record("user_id", user_id);
    Ok(user_id.to_owned())
}
