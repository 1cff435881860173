// ABOUTME: Shared server resources wired once at startup and handed to every route
// ABOUTME: Owns the generation adapter, conversation store, and the services built on them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::ServerConfig;
use crate::database::{open_store, ConversationStore};
use crate::errors::AppResult;
use crate::llm::{FallbackModels, GeminiProvider, GenerationAdapter, LlmProvider};
use crate::services::{ConversationService, LegalQueryService};

/// Dependencies shared by request handlers
pub struct ServerResources {
    /// Conversation lifecycle operations
    pub conversations: ConversationService,
    /// Legal query orchestration
    pub legal_query: LegalQueryService,
}

impl ServerResources {
    /// Wire services over an existing adapter and store
    #[must_use]
    pub fn new(adapter: Arc<GenerationAdapter>, store: Arc<dyn ConversationStore>) -> Self {
        Self {
            conversations: ConversationService::new(Arc::clone(&store)),
            legal_query: LegalQueryService::new(adapter, store),
        }
    }

    /// Build the Gemini-backed adapter and the configured store
    ///
    /// # Errors
    ///
    /// Returns a config error without an API key or models, or a database
    /// error if the store cannot be opened
    pub async fn from_config(config: &ServerConfig) -> AppResult<Self> {
        let provider: Arc<dyn LlmProvider> = Arc::new(GeminiProvider::new(
            config.llm.require_api_key()?,
            Duration::from_secs(config.llm.timeout_secs),
        )?);
        let models = FallbackModels::new(config.llm.models.clone())?;
        info!(
            provider = provider.name(),
            display_name = provider.display_name(),
            models = ?models.as_slice(),
            "Generation adapter ready"
        );

        let store = open_store(&config.database).await?;
        Ok(Self::new(
            Arc::new(GenerationAdapter::new(provider, models)),
            store,
        ))
    }
}
