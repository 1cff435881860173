// ABOUTME: Conversation lifecycle routes scoped to the calling user
// ABOUTME: Create, list, fetch, append messages, archive, restore, and soft-delete
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Conversation routes
//!
//! Every handler reads the caller from `x-user-id` and delegates to
//! [`ConversationService`](crate::services::ConversationService).

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use lexdraft_core::pagination::ListQuery;

use super::require_user_id;
use crate::errors::AppError;
use crate::resources::ServerResources;
use crate::services::{AddMessage, CreateConversation};

/// Conversation routes implementation
pub struct ConversationRoutes;

impl ConversationRoutes {
    /// Create all conversation routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/conversations",
                post(Self::create_conversation).get(Self::list_conversations),
            )
            .route(
                "/api/conversations/:id",
                get(Self::get_conversation).delete(Self::delete_conversation),
            )
            .route("/api/conversations/:id/messages", post(Self::add_message))
            .route(
                "/api/conversations/:id/archive",
                post(Self::archive_conversation),
            )
            .route(
                "/api/conversations/:id/restore",
                post(Self::restore_conversation),
            )
            .with_state(resources)
    }

    async fn create_conversation(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Option<Json<CreateConversation>>,
    ) -> Result<Response, AppError> {
        let user_id = require_user_id(&headers)?;
        let request = body.map(|Json(request)| request).unwrap_or_default();

        let conversation = resources.conversations.create(&user_id, request).await?;
        Ok((StatusCode::CREATED, Json(conversation)).into_response())
    }

    async fn list_conversations(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        query: Result<Query<ListQuery>, QueryRejection>,
    ) -> Result<Response, AppError> {
        let user_id = require_user_id(&headers)?;
        let Query(query) =
            query.map_err(|e| AppError::invalid_input(format!("Invalid query parameters: {e}")))?;

        let page = resources.conversations.list(&user_id, &query).await?;
        Ok((StatusCode::OK, Json(page)).into_response())
    }

    async fn get_conversation(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(conversation_id): Path<String>,
    ) -> Result<Response, AppError> {
        let user_id = require_user_id(&headers)?;
        let conversation = resources
            .conversations
            .get(&conversation_id, &user_id)
            .await?;
        Ok((StatusCode::OK, Json(conversation)).into_response())
    }

    async fn add_message(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(conversation_id): Path<String>,
        body: Result<Json<AddMessage>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let user_id = require_user_id(&headers)?;
        let Json(message) =
            body.map_err(|e| AppError::invalid_input(format!("Invalid request body: {e}")))?;

        let conversation = resources
            .conversations
            .add_message(&conversation_id, &user_id, message)
            .await?;
        Ok((StatusCode::OK, Json(conversation)).into_response())
    }

    async fn archive_conversation(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(conversation_id): Path<String>,
    ) -> Result<Response, AppError> {
        let user_id = require_user_id(&headers)?;
        let conversation = resources
            .conversations
            .archive(&conversation_id, &user_id)
            .await?;
        Ok((StatusCode::OK, Json(conversation)).into_response())
    }

    async fn restore_conversation(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(conversation_id): Path<String>,
    ) -> Result<Response, AppError> {
        let user_id = require_user_id(&headers)?;
        let conversation = resources
            .conversations
            .restore(&conversation_id, &user_id)
            .await?;
        Ok((StatusCode::OK, Json(conversation)).into_response())
    }

    async fn delete_conversation(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(conversation_id): Path<String>,
    ) -> Result<Response, AppError> {
        let user_id = require_user_id(&headers)?;
        resources
            .conversations
            .delete(&conversation_id, &user_id)
            .await?;
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }
}
