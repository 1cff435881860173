// ABOUTME: Library entry point for the LexDraft legal drafting assistant server
// ABOUTME: Exposes generation, assistant, persistence, service, and HTTP layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # LexDraft Server
//!
//! A conversation-grounded legal drafting assistant. A query is classified
//! into an intent, turned into a system prompt, answered by a generative
//! model with ordered multi-model fallback, mined for legal references and
//! suggestions, and optionally recorded into a persistent conversation.
//!
//! ## Architecture
//!
//! - **llm**: provider trait, Gemini client, and the fallback generation adapter
//! - **assistant**: intent classification, prompt building, response extraction
//! - **database**: conversation store trait with `SQLite` and in-memory backends
//! - **services**: query orchestration and conversation lifecycle
//! - **routes**: axum HTTP surface
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use lexdraft_server::config::ServerConfig;
//! use lexdraft_server::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("LexDraft configured on {}", config.bind_address());
//!     Ok(())
//! }
//! ```

/// Intent classification, prompt building, and response extraction
pub mod assistant;

/// Environment configuration
pub mod config;

/// Conversation persistence
pub mod database;

/// Error types shared with `lexdraft-core`
pub mod errors;

/// Generation providers and the fallback adapter
pub mod llm;

/// Tracing subscriber setup
pub mod logging;

/// Shared handler dependencies
pub mod resources;

/// HTTP routes
pub mod routes;

/// Domain services
pub mod services;
