// ABOUTME: Legal assistant building blocks used by the query orchestrator
// ABOUTME: Intent classification, system-prompt construction, and response post-processing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Assistant
//!
//! - **intent**: classify a query into summarize/explain/analyze/suggest/adjust/general
//! - **prompts**: build the system instruction for the classified intent
//! - **references**: pull citations and suggestion lines out of generated text

/// Intent classification
pub mod intent;
/// System-prompt construction
pub mod prompts;
/// Reference and suggestion extraction
pub mod references;

pub use intent::{metadata_type_for, parse_intent, ClassificationError, Intent, IntentClassifier};
pub use prompts::build_system_prompt;
pub use references::{extract_references, extract_suggestions};
