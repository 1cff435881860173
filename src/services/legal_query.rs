// ABOUTME: Legal query orchestration from intent classification to persisted answer
// ABOUTME: Classifies, prompts, generates with optional history, post-processes, and records turns
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Legal Query Orchestrator
//!
//! One request moves through intent resolution, prompt construction, optional
//! history load, generation, post-processing, and optional persistence of the
//! user and assistant turns. Only classification failures are absorbed; every
//! other failure reaches the caller. No lock is held across the generation
//! call, so two concurrent queries on one conversation may interleave appends.

use std::sync::Arc;
use std::time::Instant;

use lexdraft_core::constants::generation::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use lexdraft_core::models::{MessageMetadata, MessageRole, MetadataType};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::assistant::{
    build_system_prompt, extract_references, extract_suggestions, IntentClassifier,
};
use crate::database::ConversationStore;
use crate::errors::{AppError, AppResult};
use crate::llm::{GenerationAdapter, GenerationOptions, HistoryTurn};

/// Optional context for a query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    /// Conversation to ground the answer in and record it to
    pub conversation_id: Option<String>,
    /// Caller; required whenever `conversation_id` is set
    pub user_id: Option<String>,
    /// Kind of document under discussion (e.g. "NDA")
    pub document_type: Option<String>,
    /// Requested tone of voice
    pub tone: Option<String>,
}

/// Metadata describing how an answer was produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerMetadata {
    /// Derived metadata type of the query
    #[serde(rename = "type")]
    pub kind: MetadataType,
    /// Document type passed by the caller
    pub document_type: Option<String>,
    /// Tone passed by the caller
    pub tone: Option<String>,
    /// Milliseconds from the start of the operation to the end of generation
    pub response_time: u64,
    /// Legal citations found in the answer
    pub references: Vec<String>,
    /// Actionable lines found in the answer
    pub suggestions: Vec<String>,
    /// Provider identity
    pub provider: String,
    /// Model that produced the answer
    pub model: String,
}

impl AnswerMetadata {
    /// Stored form on the assistant message
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the metadata cannot be converted
    pub fn to_message_metadata(&self) -> AppResult<MessageMetadata> {
        Ok(serde_json::from_value(serde_json::to_value(self)?)?)
    }
}

/// Answer text with its metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryAnswer {
    /// Generated text
    pub text: String,
    /// How it was produced
    pub metadata: AnswerMetadata,
}

/// End-to-end legal query service
pub struct LegalQueryService {
    adapter: Arc<GenerationAdapter>,
    classifier: IntentClassifier,
    store: Arc<dyn ConversationStore>,
}

impl LegalQueryService {
    /// Create a service sharing `adapter` for classification and generation
    #[must_use]
    pub fn new(adapter: Arc<GenerationAdapter>, store: Arc<dyn ConversationStore>) -> Self {
        Self {
            classifier: IntentClassifier::new(Arc::clone(&adapter)),
            adapter,
            store,
        }
    }

    /// Answer `message`, grounding it in and recording it to a conversation when one is given
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for an empty message
    /// - `MissingRequiredField` for a conversation id without a user id
    /// - `ResourceNotFound` if the conversation is missing, foreign, or deleted
    /// - `ProvidersExhausted` if every model fails
    /// - `DatabaseError` if either turn cannot be appended
    #[instrument(
        skip_all,
        fields(conversation_id = options.conversation_id.as_deref(), user_id = options.user_id.as_deref())
    )]
    pub async fn answer_legal_query(
        &self,
        message: &str,
        options: QueryOptions,
    ) -> AppResult<QueryAnswer> {
        if message.trim().is_empty() {
            return Err(AppError::invalid_input("Message must not be empty"));
        }
        let conversation = match (options.conversation_id.as_deref(), options.user_id.as_deref())
        {
            (Some(conversation_id), Some(user_id)) => Some((conversation_id, user_id)),
            (Some(_), None) => return Err(AppError::missing_field("userId")),
            (None, _) => None,
        };

        let started = Instant::now();

        let intent = self.classifier.classify(message).await;
        let metadata_type = intent.metadata_type();
        let system_prompt = build_system_prompt(
            &intent,
            options.document_type.as_deref(),
            options.tone.as_deref(),
        );

        let history = match conversation {
            Some((conversation_id, user_id)) => {
                let loaded = self.store.get_by_id(conversation_id, user_id).await?;
                HistoryTurn::from_messages(loaded.dialogue())
            }
            None => Vec::new(),
        };

        let (text, model) = if history.is_empty() {
            let options = GenerationOptions {
                system_prompt: Some(system_prompt),
                temperature: Some(DEFAULT_TEMPERATURE),
                max_tokens: Some(DEFAULT_MAX_TOKENS),
            };
            let generation = self.adapter.generate_single_turn(message, &options).await?;
            (generation.text, generation.model)
        } else {
            let options = GenerationOptions {
                system_prompt: Some(system_prompt),
                temperature: Some(DEFAULT_TEMPERATURE),
                max_tokens: None,
            };
            let generation = self
                .adapter
                .generate_with_history(message, &history, &options)
                .await?;
            (generation.text, generation.model)
        };
        let response_time = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let metadata = AnswerMetadata {
            kind: metadata_type,
            document_type: options.document_type,
            tone: options.tone,
            response_time,
            references: extract_references(&text),
            suggestions: extract_suggestions(&text),
            provider: self.adapter.provider_name().to_owned(),
            model,
        };

        if let Some((conversation_id, user_id)) = conversation {
            self.store
                .append_message(
                    conversation_id,
                    user_id,
                    MessageRole::User,
                    message,
                    MessageMetadata::of(metadata_type),
                )
                .await?;
            self.store
                .append_message(
                    conversation_id,
                    user_id,
                    MessageRole::Assistant,
                    &text,
                    metadata.to_message_metadata()?,
                )
                .await?;
            debug!(conversation_id, "Recorded query turns");
        }

        info!(
            intent = %intent.kind,
            metadata_type = %metadata_type,
            model = %metadata.model,
            response_time_ms = response_time,
            references = metadata.references.len(),
            suggestions = metadata.suggestions.len(),
            "Answered legal query"
        );

        Ok(QueryAnswer { text, metadata })
    }
}
