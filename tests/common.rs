// ABOUTME: Shared test utilities for integration tests
// ABOUTME: Quiet tracing init, a scripted LLM provider, and a conversation store that fails on demand
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used
)]
//! Shared test utilities for `lexdraft_server`

use std::collections::HashSet;
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use lexdraft_core::models::{
    Conversation, ConversationStatus, ConversationSummary, MessageMetadata, MessageRole,
    NewConversation,
};
use lexdraft_core::pagination::{ListQuery, Page};
use lexdraft_server::assistant::intent::CLASSIFIER_INSTRUCTION;
use lexdraft_server::database::{
    ConversationStore, DatabaseError, DatabaseResult, InMemoryConversationStore,
};
use lexdraft_server::errors::AppError;
use lexdraft_server::llm::{
    ChatRequest, ChatResponse, FallbackModels, GenerationAdapter, LlmProvider,
};
use lexdraft_server::resources::ServerResources;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Scripted LLM Provider
// ============================================================================

/// Provider answering from a script instead of the network
///
/// Requests whose first message is the classifier instruction receive
/// `classifier_reply` (or an error when it is `None`); every other request
/// receives `answer`. Models listed in `failing_models` always fail.
pub struct ScriptedProvider {
    pub classifier_reply: Option<String>,
    pub answer: String,
    pub failing_models: HashSet<String>,
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    pub fn new(answer: &str) -> Self {
        Self {
            classifier_reply: Some(r#"{"type":"general","confidence":0.9}"#.to_owned()),
            answer: answer.to_owned(),
            failing_models: HashSet::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_classifier_reply(mut self, reply: Option<&str>) -> Self {
        self.classifier_reply = reply.map(ToOwned::to_owned);
        self
    }

    pub fn failing(mut self, models: &[&str]) -> Self {
        self.failing_models = models.iter().map(|m| (*m).to_owned()).collect();
        self
    }

    /// Recorded requests in call order
    pub fn recorded(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Recorded requests that were not classification calls
    pub fn generation_requests(&self) -> Vec<ChatRequest> {
        self.recorded()
            .into_iter()
            .filter(|request| !is_classification(request))
            .collect()
    }
}

fn is_classification(request: &ChatRequest) -> bool {
    request
        .messages
        .first()
        .is_some_and(|m| m.role == MessageRole::System && m.content == CLASSIFIER_INSTRUCTION)
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    fn display_name(&self) -> &'static str {
        "Scripted"
    }

    fn default_model(&self) -> &str {
        "model-a"
    }

    fn available_models(&self) -> &'static [&'static str] {
        &["model-a", "model-b", "model-c"]
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.requests.lock().unwrap().push(request.clone());

        let model = request.model.clone().unwrap_or_default();
        if self.failing_models.contains(&model) {
            return Err(AppError::external_service(
                "Scripted",
                format!("{model} unavailable"),
            ));
        }

        let content = if is_classification(request) {
            self.classifier_reply
                .clone()
                .ok_or_else(|| AppError::external_service("Scripted", "classifier offline"))?
        } else {
            self.answer.clone()
        };

        Ok(ChatResponse {
            content,
            model,
            usage: None,
            finish_reason: Some("STOP".to_owned()),
        })
    }
}

/// Three-model fallback order used across tests
pub fn test_models() -> FallbackModels {
    FallbackModels::new(vec![
        "model-a".to_owned(),
        "model-b".to_owned(),
        "model-c".to_owned(),
    ])
    .unwrap()
}

/// Adapter over `provider` with [`test_models`]
pub fn adapter_for(provider: Arc<ScriptedProvider>) -> Arc<GenerationAdapter> {
    Arc::new(GenerationAdapter::new(provider, test_models()))
}

// ============================================================================
// Failing Store
// ============================================================================

/// In-memory store that can reject appends of one role
pub struct FailingStore {
    inner: InMemoryConversationStore,
    fail_role: Option<MessageRole>,
    appended: Mutex<Vec<MessageRole>>,
}

impl FailingStore {
    pub fn failing_on(role: MessageRole) -> Self {
        Self {
            inner: InMemoryConversationStore::new(),
            fail_role: Some(role),
            appended: Mutex::new(Vec::new()),
        }
    }

    /// Roles of appends that reached the inner store
    pub fn appended_roles(&self) -> Vec<MessageRole> {
        self.appended.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConversationStore for FailingStore {
    async fn create(&self, new: NewConversation) -> DatabaseResult<Conversation> {
        self.inner.create(new).await
    }

    async fn get_by_id(
        &self,
        conversation_id: &str,
        user_id: &str,
    ) -> DatabaseResult<Conversation> {
        self.inner.get_by_id(conversation_id, user_id).await
    }

    async fn append_message(
        &self,
        conversation_id: &str,
        user_id: &str,
        role: MessageRole,
        content: &str,
        metadata: MessageMetadata,
    ) -> DatabaseResult<Conversation> {
        if self.fail_role == Some(role) {
            return Err(DatabaseError::QueryError {
                context: format!("simulated failure appending {role} message"),
                source: None,
            });
        }
        self.appended.lock().unwrap().push(role);
        self.inner
            .append_message(conversation_id, user_id, role, content, metadata)
            .await
    }

    async fn set_status(
        &self,
        conversation_id: &str,
        user_id: &str,
        status: ConversationStatus,
    ) -> DatabaseResult<Conversation> {
        self.inner.set_status(conversation_id, user_id, status).await
    }

    async fn list(
        &self,
        user_id: &str,
        query: &ListQuery,
    ) -> DatabaseResult<Page<ConversationSummary>> {
        self.inner.list(user_id, query).await
    }
}

// ============================================================================
// Resources
// ============================================================================

/// Server resources over a scripted provider and a fresh in-memory store
pub fn test_resources(provider: Arc<ScriptedProvider>) -> Arc<ServerResources> {
    init_test_logging();
    Arc::new(ServerResources::new(
        adapter_for(provider),
        Arc::new(InMemoryConversationStore::new()),
    ))
}

/// A new conversation request for `user_id`
pub fn new_conversation(user_id: &str, title: &str) -> NewConversation {
    NewConversation {
        user_id: user_id.to_owned(),
        title: title.to_owned(),
        description: None,
        seed_system_message: "You are a legal document assistant.".to_owned(),
    }
}
