// ABOUTME: Conversation, message, and lifecycle types shared by stores and services
// ABOUTME: Serialized with camelCase field names and RFC 3339 timestamps
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::AppError;

/// Author of a message within a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Instruction seeded when the conversation starts
    System,
    /// End user input
    User,
    /// Model reply
    Assistant,
}

impl MessageRole {
    /// Stored string form
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(Self::System),
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(AppError::invalid_input(format!(
                "Unknown message role: {other}"
            ))),
        }
    }
}

/// Closed set of operation tags persisted on each message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataType {
    /// Seed instruction
    System,
    /// Free-form conversation
    #[default]
    Chat,
    /// Document summary
    Summarize,
    /// Explanation of terms or clauses
    Explain,
    /// Risk or compliance analysis
    Analyze,
    /// Clause drafting
    Suggest,
    /// Tone or wording adjustment
    Adjust,
}

impl MetadataType {
    /// Stored string form
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Chat => "chat",
            Self::Summarize => "summarize",
            Self::Explain => "explain",
            Self::Analyze => "analyze",
            Self::Suggest => "suggest",
            Self::Adjust => "adjust",
        }
    }
}

impl fmt::Display for MetadataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    /// Visible and writable
    #[default]
    Active,
    /// Hidden from the default listing, restorable
    Archived,
    /// Soft-deleted, excluded from every read
    Deleted,
}

impl ConversationStatus {
    /// Stored string form
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
            Self::Deleted => "deleted",
        }
    }

    /// Whether moving from `self` to `next` is a permitted edge
    ///
    /// active -> archived, archived -> active, and active/archived -> deleted.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Active, Self::Archived)
                | (Self::Archived, Self::Active)
                | (Self::Active | Self::Archived, Self::Deleted)
        )
    }
}

impl fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConversationStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "archived" => Ok(Self::Archived),
            "deleted" => Ok(Self::Deleted),
            other => Err(AppError::invalid_input(format!(
                "Unknown conversation status: {other}"
            ))),
        }
    }
}

/// Message metadata: a required `type` tag plus free-form keys
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MessageMetadata {
    /// Operation that produced the message
    #[serde(rename = "type")]
    pub kind: MetadataType,
    /// Any other keys, kept verbatim
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl MessageMetadata {
    /// Metadata carrying only a type tag
    #[must_use]
    pub fn of(kind: MetadataType) -> Self {
        Self {
            kind,
            details: Map::new(),
        }
    }

    /// Attach an extra key
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }
}

/// A single turn within a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Author
    pub role: MessageRole,
    /// Text body
    pub content: String,
    /// Type tag and extra fields
    pub metadata: MessageMetadata,
    /// When the message was appended
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Build a message stamped with the current time
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>, metadata: MessageMetadata) -> Self {
        Self {
            role,
            content: content.into(),
            metadata,
            timestamp: Utc::now(),
        }
    }
}

/// A persisted dialogue owned by one user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// UUID v4 string
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Display title
    pub title: String,
    /// Optional longer description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Lifecycle status
    pub status: ConversationStatus,
    /// Messages in append order
    pub messages: Vec<Message>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Messages other than the system seed, in order
    pub fn dialogue(&self) -> impl Iterator<Item = &Message> {
        self.messages
            .iter()
            .filter(|message| message.role != MessageRole::System)
    }
}

/// Input for creating a conversation
#[derive(Debug, Clone)]
pub struct NewConversation {
    /// Owning user
    pub user_id: String,
    /// Display title
    pub title: String,
    /// Optional description
    pub description: Option<String>,
    /// Content of the mandatory seed system message
    pub seed_system_message: String,
}

/// Listing row for a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    /// Conversation ID
    pub id: String,
    /// Display title
    pub title: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Lifecycle status
    pub status: ConversationStatus,
    /// Number of stored messages, seed included
    pub message_count: u64,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl From<&Conversation> for ConversationSummary {
    fn from(conversation: &Conversation) -> Self {
        Self {
            id: conversation.id.clone(),
            title: conversation.title.clone(),
            description: conversation.description.clone(),
            status: conversation.status,
            message_count: conversation.messages.len() as u64,
            created_at: conversation.created_at,
            updated_at: conversation.updated_at,
        }
    }
}
