// ABOUTME: Core types and constants for the LexDraft legal assistant backend
// ABOUTME: Foundation crate with error handling, conversation models, pagination, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # LexDraft Core
//!
//! Shared types for the LexDraft server. This crate changes rarely and carries
//! no I/O, so the server crate can depend on it without pulling in the HTTP
//! client or database stack.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **models**: Conversations, messages, and lifecycle status
//! - **pagination**: Page-number listing parameters and the `Page` envelope
//! - **constants**: Generation defaults, prompt text, and limits

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Page-number pagination for listings
pub mod pagination;

/// Conversation data model
pub mod models;
