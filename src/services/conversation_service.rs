// ABOUTME: Conversation lifecycle service over the conversation store
// ABOUTME: Create, read, list, append, archive, restore, and soft-delete with input validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::Arc;

use lexdraft_core::constants::prompts::{DEFAULT_CONVERSATION_TITLE, DEFAULT_SEED_MESSAGE};
use lexdraft_core::models::{
    Conversation, ConversationStatus, ConversationSummary, MessageMetadata, MessageRole,
    NewConversation,
};
use lexdraft_core::pagination::{ListQuery, Page};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::database::ConversationStore;
use crate::errors::{AppError, AppResult};

/// Fields a caller may set when starting a conversation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversation {
    /// Title; blank or absent uses the default title
    pub title: Option<String>,
    /// Optional description
    pub description: Option<String>,
}

/// A message appended outside the query flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMessage {
    /// `user` or `assistant`
    pub role: MessageRole,
    /// Text body
    pub content: String,
    /// Metadata; defaults to type `chat`
    #[serde(default)]
    pub metadata: Option<MessageMetadata>,
}

/// Conversation CRUD scoped to the calling user
#[derive(Clone)]
pub struct ConversationService {
    store: Arc<dyn ConversationStore>,
}

impl ConversationService {
    /// Create a service over `store`
    #[must_use]
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    /// Start a conversation seeded with the default system message
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank user id, or a database error
    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        user_id: &str,
        request: CreateConversation,
    ) -> AppResult<Conversation> {
        let user_id = require_user(user_id)?;
        let title = request
            .title
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_CONVERSATION_TITLE.to_owned());
        let description = request
            .description
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty());

        let conversation = self
            .store
            .create(NewConversation {
                user_id: user_id.to_owned(),
                title,
                description,
                seed_system_message: DEFAULT_SEED_MESSAGE.to_owned(),
            })
            .await?;

        info!(conversation_id = %conversation.id, "Conversation created");
        Ok(conversation)
    }

    /// Load one conversation with its messages
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if it is missing, foreign, or deleted
    pub async fn get(&self, conversation_id: &str, user_id: &str) -> AppResult<Conversation> {
        let user_id = require_user(user_id)?;
        Ok(self.store.get_by_id(conversation_id, user_id).await?)
    }

    /// Page through the user's conversations
    ///
    /// # Errors
    ///
    /// Returns a validation error for out-of-range paging, or a database error
    pub async fn list(
        &self,
        user_id: &str,
        query: &ListQuery,
    ) -> AppResult<Page<ConversationSummary>> {
        let user_id = require_user(user_id)?;
        query.validate()?;
        Ok(self.store.list(user_id, query).await?)
    }

    /// Append a user or assistant message
    ///
    /// # Errors
    ///
    /// Returns a validation error for empty content or a `system` role, and
    /// `ResourceNotFound` if the conversation is not visible
    #[instrument(skip(self, message), fields(role = %message.role))]
    pub async fn add_message(
        &self,
        conversation_id: &str,
        user_id: &str,
        message: AddMessage,
    ) -> AppResult<Conversation> {
        let user_id = require_user(user_id)?;
        if message.content.trim().is_empty() {
            return Err(AppError::missing_field("content"));
        }
        if message.role == MessageRole::System {
            return Err(AppError::invalid_input(
                "System messages can only seed a new conversation",
            ));
        }

        Ok(self
            .store
            .append_message(
                conversation_id,
                user_id,
                message.role,
                &message.content,
                message.metadata.unwrap_or_default(),
            )
            .await?)
    }

    /// Hide an active conversation from the default listing
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` unless the conversation is active
    pub async fn archive(&self, conversation_id: &str, user_id: &str) -> AppResult<Conversation> {
        self.transition(conversation_id, user_id, ConversationStatus::Archived)
            .await
    }

    /// Make an archived conversation active again
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` unless the conversation is archived
    pub async fn restore(&self, conversation_id: &str, user_id: &str) -> AppResult<Conversation> {
        self.transition(conversation_id, user_id, ConversationStatus::Active)
            .await
    }

    /// Soft-delete; the conversation disappears from every read
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the conversation is not visible
    pub async fn delete(&self, conversation_id: &str, user_id: &str) -> AppResult<()> {
        self.transition(conversation_id, user_id, ConversationStatus::Deleted)
            .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(status = %status))]
    async fn transition(
        &self,
        conversation_id: &str,
        user_id: &str,
        status: ConversationStatus,
    ) -> AppResult<Conversation> {
        let user_id = require_user(user_id)?;
        let conversation = self
            .store
            .set_status(conversation_id, user_id, status)
            .await?;
        info!(conversation_id, "Conversation status changed");
        Ok(conversation)
    }
}

fn require_user(user_id: &str) -> AppResult<&str> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(AppError::missing_field("userId"));
    }
    Ok(trimmed)
}
