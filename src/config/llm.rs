// ABOUTME: Generation backend configuration: API key, fallback model order, and timeout
// ABOUTME: Loaded from GEMINI_API_KEY and the LEXDRAFT_LLM_* environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::env;
use std::fmt::{Debug, Formatter, Result as FmtResult};

use lexdraft_core::constants::generation::{DEFAULT_FALLBACK_MODELS, DEFAULT_TIMEOUT_SECS};

use crate::errors::{AppError, AppResult};

/// Generation backend settings
#[derive(Clone)]
pub struct LlmConfig {
    /// Gemini API key; required before the server can answer queries
    pub api_key: Option<String>,
    /// Models tried in order for every request
    pub models: Vec<String>,
    /// Per-call HTTP timeout in seconds
    pub timeout_secs: u64,
}

impl LlmConfig {
    /// Environment variable holding the API key
    pub const API_KEY_ENV_VAR: &'static str = "GEMINI_API_KEY";
    /// Environment variable holding the comma-separated model list
    pub const MODELS_ENV_VAR: &'static str = "LEXDRAFT_LLM_MODELS";
    /// Environment variable holding the per-call timeout
    pub const TIMEOUT_ENV_VAR: &'static str = "LEXDRAFT_LLM_TIMEOUT_SECS";

    /// Load from environment
    ///
    /// # Errors
    ///
    /// Returns a config error if the timeout is not a positive integer or the
    /// model list is present but empty
    pub fn from_env() -> AppResult<Self> {
        let api_key = env::var(Self::API_KEY_ENV_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty());

        let models = match env::var(Self::MODELS_ENV_VAR) {
            Ok(raw) => parse_model_list(&raw),
            Err(_) => DEFAULT_FALLBACK_MODELS
                .iter()
                .map(|m| (*m).to_owned())
                .collect(),
        };
        if models.is_empty() {
            return Err(AppError::config(format!(
                "{} must name at least one model",
                Self::MODELS_ENV_VAR
            )));
        }

        let timeout_secs = match env::var(Self::TIMEOUT_ENV_VAR) {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    AppError::config(format!(
                        "{} must be a positive integer, got '{raw}'",
                        Self::TIMEOUT_ENV_VAR
                    ))
                })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key,
            models,
            timeout_secs,
        })
    }

    /// The API key, or a config error naming the variable to set
    ///
    /// # Errors
    ///
    /// Returns a config error when no key is configured
    pub fn require_api_key(&self) -> AppResult<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            AppError::config(format!(
                "{} environment variable not set",
                Self::API_KEY_ENV_VAR
            ))
        })
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            models: DEFAULT_FALLBACK_MODELS
                .iter()
                .map(|m| (*m).to_owned())
                .collect(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Debug for LlmConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("models", &self.models)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Split a comma-separated list, dropping blanks
#[must_use]
pub fn parse_model_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_owned)
        .collect()
}
