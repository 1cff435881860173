// ABOUTME: Server configuration assembled from environment variables
// ABOUTME: Combines network binding, store selection, and generation backend settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Environment-based configuration management

use std::env;

use lexdraft_core::constants::network::{DEFAULT_HOST, DEFAULT_HTTP_PORT};
use tracing::info;

use super::database::DatabaseUrl;
use super::llm::LlmConfig;
use crate::errors::{AppError, AppResult};

/// Top-level server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// HTTP API port
    pub http_port: u16,
    /// Conversation store selection
    pub database: DatabaseUrl,
    /// Generation backend
    pub llm: LlmConfig,
}

impl ServerConfig {
    /// Environment variable for the HTTP port
    pub const HTTP_PORT_ENV_VAR: &'static str = "LEXDRAFT_HTTP_PORT";

    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a config error if any variable is present but malformed
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");

        let http_port = match env::var(Self::HTTP_PORT_ENV_VAR) {
            Ok(raw) => raw.trim().parse::<u16>().map_err(|e| {
                AppError::config(format!(
                    "Invalid {} value '{raw}': {e}",
                    Self::HTTP_PORT_ENV_VAR
                ))
            })?,
            Err(_) => DEFAULT_HTTP_PORT,
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.into()),
            http_port,
            database: DatabaseUrl::from_env()?,
            llm: LlmConfig::from_env()?,
        })
    }

    /// Socket address string for the listener
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }

    /// One-line summary safe for logs
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "LexDraft configuration: bind={}, database={}, models=[{}], timeout={}s, api_key={}",
            self.bind_address(),
            self.database,
            self.llm.models.join(", "),
            self.llm.timeout_secs,
            if self.llm.api_key.is_some() {
                "set"
            } else {
                "missing"
            }
        )
    }
}
