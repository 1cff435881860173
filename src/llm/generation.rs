// ABOUTME: Generation adapter with ordered multi-model fallback over a single LLM provider
// ABOUTME: Offers single-turn and history-aware generation and reports which model answered
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Generation Adapter
//!
//! Wraps one [`LlmProvider`] and tries each model in [`FallbackModels`] in
//! order for the same logical request. A failed model is logged and skipped;
//! when every model fails the caller gets `ProvidersExhausted` with the last
//! underlying error as its source. Nothing is cached and no failure is
//! swallowed.

use std::slice::Iter;
use std::sync::Arc;

use lexdraft_core::constants::generation::DEFAULT_FALLBACK_MODELS;
use lexdraft_core::models::{Message, MessageRole};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::{ChatMessage, ChatRequest, LlmProvider};
use crate::errors::{AppError, AppResult};

/// Ordered, non-empty list of model identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackModels(Vec<String>);

impl FallbackModels {
    /// Build from an ordered list
    ///
    /// # Errors
    ///
    /// Returns a config error if the list is empty
    pub fn new(models: Vec<String>) -> AppResult<Self> {
        if models.is_empty() {
            return Err(AppError::config(
                "At least one generation model must be configured",
            ));
        }
        Ok(Self(models))
    }

    /// Iterate in fallback order
    pub fn iter(&self) -> Iter<'_, String> {
        self.0.iter()
    }

    /// Model identifiers in fallback order
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl Default for FallbackModels {
    fn default() -> Self {
        Self(
            DEFAULT_FALLBACK_MODELS
                .iter()
                .map(|m| (*m).to_owned())
                .collect(),
        )
    }
}

/// Optional generation hints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GenerationOptions {
    /// Instruction sent once as the system message
    pub system_prompt: Option<String>,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Output token cap; honored by single-turn generation only
    pub max_tokens: Option<u32>,
}

/// Speaker of a history turn in provider vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRole {
    /// The end user
    User,
    /// The model
    Model,
}

/// One prior turn replayed to the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    /// Speaker
    pub role: HistoryRole,
    /// Text of the turn
    pub content: String,
}

impl HistoryTurn {
    /// A user turn
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: HistoryRole::User,
            content: content.into(),
        }
    }

    /// A model turn
    #[must_use]
    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: HistoryRole::Model,
            content: content.into(),
        }
    }

    /// Convert stored messages to provider history
    ///
    /// System messages are dropped; `user` stays `user`, `assistant` becomes `model`.
    #[must_use]
    pub fn from_messages<'a>(messages: impl IntoIterator<Item = &'a Message>) -> Vec<Self> {
        messages
            .into_iter()
            .filter_map(|message| match message.role {
                MessageRole::System => None,
                MessageRole::User => Some(Self::user(message.content.clone())),
                MessageRole::Assistant => Some(Self::model(message.content.clone())),
            })
            .collect()
    }

    fn to_chat_message(&self) -> ChatMessage {
        match self.role {
            HistoryRole::User => ChatMessage::user(self.content.clone()),
            HistoryRole::Model => ChatMessage::assistant(self.content.clone()),
        }
    }
}

/// Result of a single-turn generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    /// Generated text
    pub text: String,
    /// Model that produced it
    pub model: String,
}

/// Result of a history-aware generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryGeneration {
    /// Generated text
    pub text: String,
    /// Model that produced it
    pub model: String,
    /// Input history plus the new user and model turns
    pub history: Vec<HistoryTurn>,
}

/// Provider adapter with ordered model fallback
pub struct GenerationAdapter {
    provider: Arc<dyn LlmProvider>,
    models: FallbackModels,
}

impl GenerationAdapter {
    /// Create an adapter over `provider` trying `models` in order
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, models: FallbackModels) -> Self {
        Self { provider, models }
    }

    /// Provider identity for result metadata
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Configured fallback order
    #[must_use]
    pub const fn models(&self) -> &FallbackModels {
        &self.models
    }

    /// Generate from a single prompt
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty prompt and `ProvidersExhausted`
    /// when every model fails
    #[instrument(skip_all, fields(provider = self.provider.name()))]
    pub async fn generate_single_turn(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> AppResult<Generation> {
        let mut messages = Self::system_messages(options);
        messages.push(ChatMessage::user(Self::checked_prompt(prompt)?));

        self.run_with_fallback(&messages, options.temperature, options.max_tokens)
            .await
    }

    /// Generate with prior turns replayed as chat history
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty prompt and `ProvidersExhausted`
    /// when every model fails
    #[instrument(skip_all, fields(provider = self.provider.name(), turns = history.len()))]
    pub async fn generate_with_history(
        &self,
        prompt: &str,
        history: &[HistoryTurn],
        options: &GenerationOptions,
    ) -> AppResult<HistoryGeneration> {
        let prompt = Self::checked_prompt(prompt)?;

        let mut messages = Self::system_messages(options);
        messages.extend(history.iter().map(HistoryTurn::to_chat_message));
        messages.push(ChatMessage::user(prompt));

        let generation = self
            .run_with_fallback(&messages, options.temperature, None)
            .await?;

        let mut updated = Vec::with_capacity(history.len() + 2);
        updated.extend_from_slice(history);
        updated.push(HistoryTurn::user(prompt));
        updated.push(HistoryTurn::model(generation.text.clone()));

        Ok(HistoryGeneration {
            text: generation.text,
            model: generation.model,
            history: updated,
        })
    }

    fn checked_prompt(prompt: &str) -> AppResult<&str> {
        if prompt.trim().is_empty() {
            return Err(AppError::invalid_input("Prompt must not be empty"));
        }
        Ok(prompt)
    }

    fn system_messages(options: &GenerationOptions) -> Vec<ChatMessage> {
        options
            .system_prompt
            .iter()
            .filter(|prompt| !prompt.trim().is_empty())
            .map(ChatMessage::system)
            .collect()
    }

    async fn run_with_fallback(
        &self,
        messages: &[ChatMessage],
        temperature: Option<f32>,
        max_tokens: Option<u32>,
    ) -> AppResult<Generation> {
        let mut last_error = None;

        for model in self.models.iter() {
            let mut request = ChatRequest::new(messages.to_vec()).with_model(model);
            request.temperature = temperature;
            request.max_tokens = max_tokens;

            match self.provider.complete(&request).await {
                Ok(response) => {
                    debug!(model = %model, "Generation succeeded");
                    return Ok(Generation {
                        text: response.content,
                        model: model.clone(),
                    });
                }
                Err(error) => {
                    warn!(model = %model, error = %error, "Model failed, trying next candidate");
                    last_error = Some(error);
                }
            }
        }

        Err(AppError::providers_exhausted(
            self.models.as_slice(),
            last_error,
        ))
    }
}
