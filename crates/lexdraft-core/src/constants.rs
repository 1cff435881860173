// ABOUTME: Application constants for generation defaults, prompts, and pagination
// ABOUTME: Pure data grouped by domain; no runtime configuration lives here
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Constants module
//!
//! Values here are compiled in. Anything operators may want to change is read
//! from the environment by the server's config module instead.

/// Service identity
pub mod service {
    /// Service name reported by `/health` and startup logs
    pub const SERVICE_NAME: &str = "lexdraft-server";
    /// Crate version
    pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// Network defaults
pub mod network {
    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 8081;
    /// Default bind address
    pub const DEFAULT_HOST: &str = "127.0.0.1";
    /// Header carrying the caller's user id
    pub const USER_ID_HEADER: &str = "x-user-id";
}

/// Generation defaults
pub mod generation {
    /// Provider identity reported in answer metadata for Gemini
    pub const GOOGLE_PROVIDER: &str = "google";
    /// Fallback model order, most capable and cheapest first
    pub const DEFAULT_FALLBACK_MODELS: &[&str] =
        &["gemini-2.0-flash", "gemini-1.5-flash", "gemini-1.5-pro"];
    /// Temperature for answer generation
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;
    /// Output token cap for single-turn answers
    pub const DEFAULT_MAX_TOKENS: u32 = 1000;
    /// Temperature for intent classification
    pub const CLASSIFIER_TEMPERATURE: f32 = 0.1;
    /// Per-call HTTP timeout in seconds
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
}

/// Intent classification
pub mod intent {
    /// Intent label used when classification fails
    pub const GENERAL_INTENT: &str = "general";
    /// Confidence used when absent or when classification fails
    pub const DEFAULT_CONFIDENCE: f64 = 0.95;
}

/// Prompt text
pub mod prompts {
    /// Opening sentence of every system prompt
    pub const BASE_INSTRUCTION: &str = "You are a legal document assistant.";
    /// Title given to conversations created without one
    pub const DEFAULT_CONVERSATION_TITLE: &str = "New Conversation";
    /// Seed system message for new conversations
    pub const DEFAULT_SEED_MESSAGE: &str = "You are a legal document assistant. Help the user draft, review, and understand legal documents.";
    /// Tone applied to adjust requests that name none
    pub const DEFAULT_TONE: &str = "formal";
}

/// Listing limits
pub mod pagination {
    /// Default page size
    pub const DEFAULT_PAGE_LIMIT: u32 = 10;
    /// Largest page size accepted
    pub const MAX_PAGE_LIMIT: u32 = 100;
}
