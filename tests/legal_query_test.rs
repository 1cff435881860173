// ABOUTME: Integration tests for end-to-end legal query orchestration
// ABOUTME: Covers validation, single-turn and history paths, metadata, and persistence failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;

use common::{adapter_for, init_test_logging, new_conversation, FailingStore, ScriptedProvider};
use lexdraft_core::models::{MessageRole, MetadataType};
use lexdraft_server::database::{ConversationStore, InMemoryConversationStore};
use lexdraft_server::errors::ErrorCode;
use lexdraft_server::services::{LegalQueryService, QueryOptions};

const ANSWER: &str = "Under Section 7 of the Contract Act the clause is valid.\n\
Consider adding a cure period.\n\
Review the notice clause.";

fn service_with(
    provider: Arc<ScriptedProvider>,
    store: Arc<dyn ConversationStore>,
) -> LegalQueryService {
    init_test_logging();
    LegalQueryService::new(adapter_for(provider), store)
}

fn in_conversation(conversation_id: &str, user_id: &str) -> QueryOptions {
    QueryOptions {
        conversation_id: Some(conversation_id.to_owned()),
        user_id: Some(user_id.to_owned()),
        ..QueryOptions::default()
    }
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_empty_message_fails_before_any_provider_call() {
    let provider = Arc::new(ScriptedProvider::new(ANSWER));
    let service = service_with(
        Arc::clone(&provider),
        Arc::new(InMemoryConversationStore::new()),
    );

    let error = service
        .answer_legal_query(" \n\t", QueryOptions::default())
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::InvalidInput);
    assert!(provider.recorded().is_empty());
}

#[tokio::test]
async fn test_conversation_without_user_is_validation_error() {
    let provider = Arc::new(ScriptedProvider::new(ANSWER));
    let service = service_with(
        Arc::clone(&provider),
        Arc::new(InMemoryConversationStore::new()),
    );

    let error = service
        .answer_legal_query(
            "Explain this",
            QueryOptions {
                conversation_id: Some("abc".to_owned()),
                ..QueryOptions::default()
            },
        )
        .await
        .unwrap_err();

    assert!(error.code.is_validation());
    assert!(provider.recorded().is_empty());
}

// ============================================================================
// Single Turn
// ============================================================================

#[tokio::test]
async fn test_single_turn_answer_has_full_metadata() {
    let provider = Arc::new(
        ScriptedProvider::new(ANSWER).with_classifier_reply(Some(r#"{"type":"analyze","confidence":0.7}"#)),
    );
    let service = service_with(
        Arc::clone(&provider),
        Arc::new(InMemoryConversationStore::new()),
    );

    let answer = service
        .answer_legal_query(
            "Is this indemnity clause enforceable?",
            QueryOptions {
                document_type: Some("NDA".to_owned()),
                tone: Some("plain".to_owned()),
                ..QueryOptions::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(answer.text, ANSWER);
    let metadata = &answer.metadata;
    assert_eq!(metadata.provider, "google");
    assert_eq!(metadata.model, "model-a");
    assert_eq!(metadata.kind, MetadataType::Analyze);
    assert_eq!(metadata.document_type.as_deref(), Some("NDA"));
    assert_eq!(metadata.tone.as_deref(), Some("plain"));
    assert!(metadata
        .references
        .contains(&"Section 7 of the Contract Act".to_owned()));
    assert_eq!(
        metadata.suggestions,
        vec![
            "Consider adding a cure period.".to_owned(),
            "Review the notice clause.".to_owned()
        ]
    );

    let generation = &provider.generation_requests()[0];
    assert_eq!(generation.max_tokens, Some(1000));
    assert_eq!(generation.temperature, Some(0.7));
    let system = &generation.messages[0].content;
    assert!(system.contains("risks"), "{system}");
    assert!(system.contains("The document is a NDA."));
}

#[tokio::test]
async fn test_classifier_failure_still_answers() {
    let provider = Arc::new(ScriptedProvider::new(ANSWER).with_classifier_reply(None));
    let service = service_with(
        Arc::clone(&provider),
        Arc::new(InMemoryConversationStore::new()),
    );

    let answer = service
        .answer_legal_query("What is consideration?", QueryOptions::default())
        .await
        .unwrap();

    assert_eq!(answer.metadata.kind, MetadataType::Chat);
    assert_eq!(answer.text, ANSWER);
}

#[tokio::test]
async fn test_all_models_failing_surfaces_exhaustion() {
    let provider = Arc::new(
        ScriptedProvider::new(ANSWER).failing(&["model-a", "model-b", "model-c"]),
    );
    let service = service_with(provider, Arc::new(InMemoryConversationStore::new()));

    let error = service
        .answer_legal_query("What is consideration?", QueryOptions::default())
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::ProvidersExhausted);
}

// ============================================================================
// Conversation Grounding
// ============================================================================

#[tokio::test]
async fn test_conversation_turns_are_recorded_and_replayed() {
    let provider = Arc::new(
        ScriptedProvider::new(ANSWER).with_classifier_reply(Some(r#"{"type":"explain"}"#)),
    );
    let store: Arc<dyn ConversationStore> = Arc::new(InMemoryConversationStore::new());
    let service = service_with(Arc::clone(&provider), Arc::clone(&store));
    let conversation = store
        .create(new_conversation("user-1", "Lease"))
        .await
        .unwrap();

    service
        .answer_legal_query("First question", in_conversation(&conversation.id, "user-1"))
        .await
        .unwrap();

    // Only the seed existed, so the first answer is single-turn
    assert_eq!(provider.generation_requests()[0].max_tokens, Some(1000));

    service
        .answer_legal_query("Second question", in_conversation(&conversation.id, "user-1"))
        .await
        .unwrap();

    let second = &provider.generation_requests()[1];
    assert_eq!(second.max_tokens, None);
    let replayed: Vec<_> = second
        .messages
        .iter()
        .skip(1)
        .map(|m| (m.role, m.content.as_str()))
        .collect();
    assert_eq!(
        replayed,
        vec![
            (MessageRole::User, "First question"),
            (MessageRole::Assistant, ANSWER),
            (MessageRole::User, "Second question"),
        ]
    );

    let stored = store.get_by_id(&conversation.id, "user-1").await.unwrap();
    assert_eq!(stored.messages.len(), 5);
    let user_turn = &stored.messages[3];
    assert_eq!(user_turn.role, MessageRole::User);
    assert_eq!(user_turn.metadata.kind, MetadataType::Explain);
    assert!(user_turn.metadata.details.is_empty());
    let assistant_turn = &stored.messages[4];
    assert_eq!(assistant_turn.role, MessageRole::Assistant);
    assert_eq!(assistant_turn.metadata.kind, MetadataType::Explain);
    assert_eq!(assistant_turn.metadata.details["provider"], "google");
    assert_eq!(assistant_turn.metadata.details["model"], "model-a");
    assert!(assistant_turn.metadata.details["responseTime"].is_u64());
}

#[tokio::test]
async fn test_foreign_conversation_is_not_found() {
    let provider = Arc::new(ScriptedProvider::new(ANSWER));
    let store: Arc<dyn ConversationStore> = Arc::new(InMemoryConversationStore::new());
    let service = service_with(Arc::clone(&provider), Arc::clone(&store));
    let conversation = store
        .create(new_conversation("owner", "Private"))
        .await
        .unwrap();

    let error = service
        .answer_legal_query("Peek", in_conversation(&conversation.id, "intruder"))
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::ResourceNotFound);
    assert!(provider.generation_requests().is_empty());
}

#[tokio::test]
async fn test_assistant_append_failure_fails_the_query() {
    let provider = Arc::new(ScriptedProvider::new(ANSWER));
    let store = Arc::new(FailingStore::failing_on(MessageRole::Assistant));
    let service = service_with(provider, Arc::clone(&store) as Arc<dyn ConversationStore>);
    let conversation = store
        .create(new_conversation("user-1", "Doomed"))
        .await
        .unwrap();

    let error = service
        .answer_legal_query("Question", in_conversation(&conversation.id, "user-1"))
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::DatabaseError);
    assert_eq!(store.appended_roles(), vec![MessageRole::User]);
}

#[tokio::test]
async fn test_user_append_failure_skips_assistant_append() {
    let provider = Arc::new(ScriptedProvider::new(ANSWER));
    let store = Arc::new(FailingStore::failing_on(MessageRole::User));
    let service = service_with(provider, Arc::clone(&store) as Arc<dyn ConversationStore>);
    let conversation = store
        .create(new_conversation("user-1", "Doomed"))
        .await
        .unwrap();

    let error = service
        .answer_legal_query("Question", in_conversation(&conversation.id, "user-1"))
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::DatabaseError);
    assert!(store.appended_roles().is_empty());
}
