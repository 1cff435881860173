// ABOUTME: Configuration module for server, store, and generation settings
// ABOUTME: Environment-only configuration; the binary layers CLI overrides on top
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org
//! Configuration module for the LexDraft server
//!
//! - **Environment**: `ServerConfig` assembled from environment variables
//! - **Database**: conversation store selection from `DATABASE_URL`
//! - **LLM**: API key, fallback model order, and HTTP timeout

/// Database URL parsing
pub mod database;
/// Environment and server configuration
pub mod environment;
/// Generation backend configuration
pub mod llm;

pub use database::DatabaseUrl;
pub use environment::ServerConfig;
pub use llm::LlmConfig;
