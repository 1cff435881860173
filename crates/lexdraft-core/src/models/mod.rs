// ABOUTME: Data models for persisted legal-assistant conversations
// ABOUTME: Re-exports conversation, message, and lifecycle types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Data Models
//!
//! A [`Conversation`] owns an ordered list of [`Message`]s. Every conversation
//! starts with exactly one system message; later messages are only ever
//! appended. Status changes follow [`ConversationStatus::can_transition_to`].

mod conversation;

pub use conversation::{
    Conversation, ConversationStatus, ConversationSummary, Message, MessageMetadata, MessageRole,
    MetadataType, NewConversation,
};
