// ABOUTME: Domain service layer shared by the HTTP routes and library callers
// ABOUTME: Legal query orchestration and conversation lifecycle management
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Domain service layer
//!
//! Services hold the business rules; routes only translate HTTP to calls here.

/// Conversation create, read, list, append, and status changes
pub mod conversation_service;

/// Answering a legal query end to end
pub mod legal_query;

pub use conversation_service::{AddMessage, ConversationService, CreateConversation};
pub use legal_query::{AnswerMetadata, LegalQueryService, QueryAnswer, QueryOptions};
