// ABOUTME: Legal assistant query route
// ABOUTME: Accepts a message with optional conversation and drafting context and returns the answer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use super::require_user_id;
use crate::errors::AppError;
use crate::resources::ServerResources;
use crate::services::QueryOptions;

/// Body of `POST /api/assistant/query`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// The user's question or instruction
    pub message: String,
    /// Conversation to ground the answer in
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// Kind of document under discussion
    #[serde(default)]
    pub document_type: Option<String>,
    /// Requested tone
    #[serde(default)]
    pub tone: Option<String>,
}

/// Assistant routes implementation
pub struct AssistantRoutes;

impl AssistantRoutes {
    /// Create the assistant routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/assistant/query", post(Self::query))
            .with_state(resources)
    }

    /// The user header is only required when the query targets a conversation
    async fn query(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Result<Json<QueryRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let Json(request) =
            body.map_err(|e| AppError::invalid_input(format!("Invalid request body: {e}")))?;

        let user_id = if request.conversation_id.is_some() {
            Some(require_user_id(&headers)?)
        } else {
            require_user_id(&headers).ok()
        };

        let answer = resources
            .legal_query
            .answer_legal_query(
                &request.message,
                QueryOptions {
                    conversation_id: request.conversation_id,
                    user_id,
                    document_type: request.document_type,
                    tone: request.tone,
                },
            )
            .await?;

        Ok((StatusCode::OK, Json(answer)).into_response())
    }
}
