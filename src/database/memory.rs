// ABOUTME: Process-local conversation store over a tokio RwLock-guarded HashMap
// ABOUTME: Mirrors the SQLite store's owner scoping, soft delete, ordering, and paging
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use lexdraft_core::models::{
    Conversation, ConversationStatus, ConversationSummary, Message, MessageMetadata, MessageRole,
    MetadataType, NewConversation,
};
use lexdraft_core::pagination::{ListQuery, Page, SortField, SortOrder};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{now, ConversationStore, DatabaseError, DatabaseResult};

/// Conversation store held entirely in memory
#[derive(Default)]
pub struct InMemoryConversationStore {
    conversations: RwLock<HashMap<String, Conversation>>,
}

impl InMemoryConversationStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn visible<'a>(
    conversations: &'a HashMap<String, Conversation>,
    conversation_id: &str,
    user_id: &str,
) -> Option<&'a Conversation> {
    conversations
        .get(conversation_id)
        .filter(|c| c.user_id == user_id && c.status != ConversationStatus::Deleted)
}

fn visible_mut<'a>(
    conversations: &'a mut HashMap<String, Conversation>,
    conversation_id: &str,
    user_id: &str,
) -> Option<&'a mut Conversation> {
    conversations
        .get_mut(conversation_id)
        .filter(|c| c.user_id == user_id && c.status != ConversationStatus::Deleted)
}

fn compare(a: &ConversationSummary, b: &ConversationSummary, field: SortField) -> Ordering {
    let primary = match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn create(&self, new: NewConversation) -> DatabaseResult<Conversation> {
        let created_at = now();
        let conversation = Conversation {
            id: Uuid::new_v4().to_string(),
            user_id: new.user_id,
            title: new.title,
            description: new.description,
            status: ConversationStatus::Active,
            messages: vec![Message {
                role: MessageRole::System,
                content: new.seed_system_message,
                metadata: MessageMetadata::of(MetadataType::System),
                timestamp: created_at,
            }],
            created_at,
            updated_at: created_at,
        };

        self.conversations
            .write()
            .await
            .insert(conversation.id.clone(), conversation.clone());
        Ok(conversation)
    }

    async fn get_by_id(
        &self,
        conversation_id: &str,
        user_id: &str,
    ) -> DatabaseResult<Conversation> {
        let conversations = self.conversations.read().await;
        visible(&conversations, conversation_id, user_id)
            .cloned()
            .ok_or_else(|| DatabaseError::not_found(conversation_id))
    }

    async fn append_message(
        &self,
        conversation_id: &str,
        user_id: &str,
        role: MessageRole,
        content: &str,
        metadata: MessageMetadata,
    ) -> DatabaseResult<Conversation> {
        let mut conversations = self.conversations.write().await;
        let conversation = visible_mut(&mut conversations, conversation_id, user_id)
            .ok_or_else(|| DatabaseError::not_found(conversation_id))?;

        let timestamp = now();
        conversation.messages.push(Message {
            role,
            content: content.to_owned(),
            metadata,
            timestamp,
        });
        conversation.updated_at = timestamp;
        Ok(conversation.clone())
    }

    async fn set_status(
        &self,
        conversation_id: &str,
        user_id: &str,
        status: ConversationStatus,
    ) -> DatabaseResult<Conversation> {
        let mut conversations = self.conversations.write().await;
        let conversation = visible_mut(&mut conversations, conversation_id, user_id)
            .ok_or_else(|| DatabaseError::not_found(conversation_id))?;

        if !conversation.status.can_transition_to(status) {
            return Err(DatabaseError::InvalidTransition {
                from: conversation.status,
                to: status,
            });
        }

        conversation.status = status;
        conversation.updated_at = now();
        Ok(conversation.clone())
    }

    async fn list(
        &self,
        user_id: &str,
        query: &ListQuery,
    ) -> DatabaseResult<Page<ConversationSummary>> {
        let mut matching: Vec<ConversationSummary> = self
            .conversations
            .read()
            .await
            .values()
            .filter(|c| c.user_id == user_id && c.status != ConversationStatus::Deleted)
            .filter(|c| query.status.is_none_or(|status| c.status == status))
            .map(ConversationSummary::from)
            .collect();

        matching.sort_by(|a, b| {
            let ordering = compare(a, b, query.sort_by);
            match query.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let total = matching.len() as u64;
        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(query.limit as usize)
            .collect();

        Ok(Page::new(items, total, query))
    }
}
