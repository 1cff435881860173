// ABOUTME: Conversation store contract and database error types
// ABOUTME: SQLite and in-memory implementations share owner scoping and lifecycle rules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Conversation Store
//!
//! Every operation is scoped to the owning user: a conversation that exists
//! but belongs to someone else is reported as not found, exactly like one
//! that never existed or has been soft-deleted. Each append is atomic and
//! keeps insertion order; load-then-append sequences across calls are not.

/// Process-local store backed by a `HashMap`
pub mod memory;
/// `SQLite` store backed by sqlx
pub mod sqlite;

pub use memory::InMemoryConversationStore;
pub use sqlite::SqliteConversationStore;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use lexdraft_core::models::{
    Conversation, ConversationStatus, ConversationSummary, MessageMetadata, MessageRole,
    NewConversation,
};
use lexdraft_core::pagination::{ListQuery, Page};
use serde_json::json;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseUrl;
use crate::errors::{AppError, AppResult, ErrorCode};

/// Errors raised by conversation stores
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Missing, owned by another user, or soft-deleted
    #[error("Conversation {conversation_id} not found")]
    NotFound {
        /// Requested conversation
        conversation_id: String,
    },

    /// Status change not permitted from the current status
    #[error("Cannot change conversation status from {from} to {to}")]
    InvalidTransition {
        /// Current status
        from: ConversationStatus,
        /// Requested status
        to: ConversationStatus,
    },

    /// Query failed in the database driver
    #[error("Database query failed: {context}")]
    QueryError {
        /// What the store was doing
        context: String,
        /// Driver error, when there is one
        #[source]
        source: Option<sqlx::Error>,
    },

    /// Stored JSON could not be read or written
    #[error("Failed to serialize {context}")]
    Serialization {
        /// What was being (de)serialized
        context: String,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// A stored value could not be interpreted
    #[error("Stored data is invalid: {0}")]
    Corrupt(String),
}

impl DatabaseError {
    /// Shorthand for [`DatabaseError::NotFound`]
    #[must_use]
    pub fn not_found(conversation_id: &str) -> Self {
        Self::NotFound {
            conversation_id: conversation_id.to_owned(),
        }
    }

    /// Wrap a driver error with context
    #[must_use]
    pub fn query(context: impl Into<String>, source: sqlx::Error) -> Self {
        Self::QueryError {
            context: context.into(),
            source: Some(source),
        }
    }
}

impl From<DatabaseError> for AppError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound { conversation_id } => Self::not_found("Conversation")
                .with_details(json!({ "conversationId": conversation_id })),
            DatabaseError::InvalidTransition { from, to } => Self::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot change conversation status from {from} to {to}"),
            ),
            DatabaseError::Serialization { .. } => {
                Self::serialization(error.to_string()).with_source(error)
            }
            DatabaseError::QueryError { .. } | DatabaseError::Corrupt(_) => {
                Self::database(error.to_string()).with_source(error)
            }
        }
    }
}

/// Result alias for store operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Persistent record of conversations
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Create a conversation seeded with one system message
    async fn create(&self, new: NewConversation) -> DatabaseResult<Conversation>;

    /// Load an owned, non-deleted conversation with its messages in order
    async fn get_by_id(&self, conversation_id: &str, user_id: &str)
        -> DatabaseResult<Conversation>;

    /// Append one message and bump `updated_at`
    async fn append_message(
        &self,
        conversation_id: &str,
        user_id: &str,
        role: MessageRole,
        content: &str,
        metadata: MessageMetadata,
    ) -> DatabaseResult<Conversation>;

    /// Move to `status` if the transition is permitted
    async fn set_status(
        &self,
        conversation_id: &str,
        user_id: &str,
        status: ConversationStatus,
    ) -> DatabaseResult<Conversation>;

    /// One page of the user's conversations; deleted ones never appear
    async fn list(
        &self,
        user_id: &str,
        query: &ListQuery,
    ) -> DatabaseResult<Page<ConversationSummary>>;
}

/// Open the store selected by `url`
///
/// # Errors
///
/// Returns a database error if the `SQLite` pool cannot be opened or migrated
pub async fn open_store(url: &DatabaseUrl) -> AppResult<Arc<dyn ConversationStore>> {
    let store: Arc<dyn ConversationStore> = match url {
        DatabaseUrl::Memory => {
            info!("Using in-memory conversation store");
            Arc::new(InMemoryConversationStore::new())
        }
        DatabaseUrl::SQLiteMemory => Arc::new(SqliteConversationStore::in_memory().await?),
        DatabaseUrl::SQLite { .. } => {
            Arc::new(SqliteConversationStore::connect(&url.to_connection_string()).await?)
        }
    };
    Ok(store)
}

/// Current time at the precision stores persist
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
