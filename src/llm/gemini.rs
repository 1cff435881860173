// ABOUTME: Google Gemini provider calling the Generative Language generateContent endpoint
// ABOUTME: Maps chat roles to Gemini roles, sends system_instruction, and maps API errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Gemini Provider
//!
//! Implementation of [`LlmProvider`] for Google's Gemini models.
//!
//! The API key comes from `GEMINI_API_KEY` (see [`crate::config::LlmConfig`])
//! and travels in the `x-goog-api-key` header, never in the URL.
//! Every HTTP call carries the configured client timeout; there is no retry
//! here because model fallback happens one layer up.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use async_trait::async_trait;
use lexdraft_core::constants::generation::GOOGLE_PROVIDER;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::{ChatMessage, ChatRequest, ChatResponse, LlmProvider, MessageRole, TokenUsage};
use crate::errors::{AppError, AppResult, ErrorCode};

/// Default model to use
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Models this provider is known to work with
const AVAILABLE_MODELS: &[&str] = &[
    "gemini-2.0-flash",
    "gemini-1.5-flash",
    "gemini-1.5-pro",
    "gemini-2.5-flash",
];

/// Base URL for the Gemini API
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Service label used in error messages
const SERVICE_LABEL: &str = "Gemini";

// ============================================================================
// API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "system_instruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TextPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    candidate_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    usage_metadata: Option<UsageMetadata>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
    total_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Google Gemini LLM provider
pub struct GeminiProvider {
    api_key: String,
    client: Client,
    base_url: String,
    default_model: String,
}

impl GeminiProvider {
    /// Create a provider whose HTTP calls time out after `timeout`
    ///
    /// # Errors
    ///
    /// Returns a config error if the HTTP client cannot be built
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key: api_key.into(),
            client,
            base_url: API_BASE_URL.to_owned(),
            default_model: DEFAULT_MODEL.to_owned(),
        })
    }

    /// Point the provider at a different API root
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Gemini calls the assistant role "model"; system text goes in `system_instruction`
    const fn convert_role(role: MessageRole) -> &'static str {
        match role {
            MessageRole::System | MessageRole::User => "user",
            MessageRole::Assistant => "model",
        }
    }

    fn build_url(&self, model: &str) -> String {
        format!("{}/models/{model}:generateContent", self.base_url)
    }

    fn text_content(role: Option<&str>, text: &str) -> GeminiContent {
        GeminiContent {
            role: role.map(str::to_owned),
            parts: vec![TextPart {
                text: Some(text.to_owned()),
            }],
        }
    }

    fn build_gemini_request(request: &ChatRequest) -> GeminiRequest {
        let mut contents = Vec::with_capacity(request.messages.len());
        let mut system_texts: Vec<&str> = Vec::new();

        for ChatMessage { role, content } in &request.messages {
            if *role == MessageRole::System {
                system_texts.push(content);
            } else {
                contents.push(Self::text_content(Some(Self::convert_role(*role)), content));
            }
        }

        let system_instruction =
            (!system_texts.is_empty()).then(|| Self::text_content(None, &system_texts.join("\n\n")));

        let generation_config = (request.temperature.is_some() || request.max_tokens.is_some())
            .then_some(GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
                candidate_count: 1,
            });

        GeminiRequest {
            contents,
            system_instruction,
            generation_config,
        }
    }

    fn extract_content(response: &GeminiResponse) -> AppResult<(String, Option<String>)> {
        let candidate = response
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .ok_or_else(|| {
                AppError::external_service(SERVICE_LABEL, "No candidates in response")
            })?;

        let text: String = candidate
            .content
            .as_ref()
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect()
            })
            .unwrap_or_default();

        if text.is_empty() {
            let reason = candidate.finish_reason.as_deref().unwrap_or("unknown");
            return Err(AppError::external_service(
                SERVICE_LABEL,
                format!("Empty response (finish reason: {reason})"),
            ));
        }

        Ok((text, candidate.finish_reason.clone()))
    }

    fn convert_usage(metadata: &UsageMetadata) -> TokenUsage {
        TokenUsage {
            prompt_tokens: metadata.prompt_token_count.unwrap_or(0),
            completion_tokens: metadata.candidates_token_count.unwrap_or(0),
            total_tokens: metadata.total_token_count.unwrap_or(0),
        }
    }

    /// Map a non-success HTTP status to an error
    ///
    /// 429 becomes `ExternalRateLimited` with a retry hint when Gemini gives one.
    fn map_api_error(status: u16, response_text: &str) -> AppError {
        let message = serde_json::from_str::<GeminiResponse>(response_text)
            .ok()
            .and_then(|r| r.error)
            .map_or_else(|| response_text.to_owned(), |e| e.message);

        if status == 429 {
            AppError::new(
                ErrorCode::ExternalRateLimited,
                Self::extract_quota_message(&message),
            )
        } else {
            AppError::external_service(SERVICE_LABEL, format!("API error ({status}): {message}"))
        }
    }

    /// Turn "... Please retry in 6.4s." into a whole-second retry hint
    fn extract_quota_message(message: &str) -> String {
        let seconds = message
            .split_once("Please retry in ")
            .and_then(|(_, rest)| rest.split_once('s'))
            .and_then(|(value, _)| value.trim().parse::<f64>().ok());

        match seconds {
            Some(seconds) => format!(
                "AI service quota exceeded. Please try again in {} seconds.",
                seconds.ceil() as u64
            ),
            None => "AI service quota exceeded. Please wait a moment and try again.".to_owned(),
        }
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        GOOGLE_PROVIDER
    }

    fn display_name(&self) -> &'static str {
        "Google Gemini"
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn available_models(&self) -> &'static [&'static str] {
        AVAILABLE_MODELS
    }

    #[instrument(skip(self, request), fields(model = %request.model.as_deref().unwrap_or(&self.default_model)))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let model = request.model.as_deref().unwrap_or(&self.default_model);
        let gemini_request = Self::build_gemini_request(request);

        debug!(
            turns = gemini_request.contents.len(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(self.build_url(model))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&gemini_request)
            .send()
            .await
            .map_err(|e| {
                AppError::external_service(
                    SERVICE_LABEL,
                    format!("HTTP request failed: {}", e.without_url()),
                )
            })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            AppError::external_service(
                SERVICE_LABEL,
                format!("Failed to read response: {}", e.without_url()),
            )
        })?;

        if !status.is_success() {
            error!(status = %status, "Gemini API error");
            return Err(Self::map_api_error(status.as_u16(), &response_text));
        }

        let gemini_response: GeminiResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                error!(error = %e, "Failed to parse Gemini response");
                AppError::external_service(SERVICE_LABEL, format!("Unparseable response: {e}"))
            })?;

        if let Some(api_error) = &gemini_response.error {
            return Err(AppError::external_service(
                SERVICE_LABEL,
                api_error.message.clone(),
            ));
        }

        let (content, finish_reason) = Self::extract_content(&gemini_response)?;
        debug!(chars = content.len(), "Received Gemini response");

        Ok(ChatResponse {
            content,
            model: model.to_owned(),
            usage: gemini_response
                .usage_metadata
                .as_ref()
                .map(Self::convert_usage),
            finish_reason,
        })
    }
}

impl Debug for GeminiProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GeminiProvider")
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_puts_system_text_in_system_instruction() {
        let request = ChatRequest::new(vec![
            ChatMessage::system("You are a legal document assistant."),
            ChatMessage::user("Hi"),
            ChatMessage::assistant("Hello"),
        ])
        .with_temperature(0.7);

        let json = serde_json::to_value(GeminiProvider::build_gemini_request(&request)).unwrap();

        assert_eq!(
            json["system_instruction"]["parts"][0]["text"],
            "You are a legal document assistant."
        );
        assert_eq!(json["contents"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][1]["role"], "model");
        assert_eq!(json["generationConfig"]["candidateCount"], 1);
        assert!(json["generationConfig"].get("maxOutputTokens").is_none());
    }

    #[test]
    fn test_quota_message_rounds_up() {
        let message = GeminiProvider::extract_quota_message(
            "Resource has been exhausted. Please retry in 6.406453963s.",
        );
        assert_eq!(
            message,
            "AI service quota exceeded. Please try again in 7 seconds."
        );

        let fallback = GeminiProvider::extract_quota_message("quota exceeded");
        assert!(fallback.contains("wait a moment"));
    }

    #[test]
    fn test_map_api_error_statuses() {
        let body = r#"{"error":{"message":"Please retry in 2s."}}"#;
        let limited = GeminiProvider::map_api_error(429, body);
        assert_eq!(limited.code, ErrorCode::ExternalRateLimited);

        let failed = GeminiProvider::map_api_error(500, "boom");
        assert_eq!(failed.code, ErrorCode::ExternalServiceError);
        assert!(failed.message.contains("boom"));
    }
}
