// ABOUTME: Intent classifier asking the generation adapter to label a legal query
// ABOUTME: Parses strict or brace-embedded JSON and degrades to the general intent on failure
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Intent Classification
//!
//! One low-temperature generation call labels the query. [`IntentClassifier::try_classify`]
//! reports why classification failed; [`IntentClassifier::classify`] is the single
//! place where that failure collapses to [`Intent::general`].

use std::sync::Arc;

use lexdraft_core::constants::generation::CLASSIFIER_TEMPERATURE;
use lexdraft_core::constants::intent::{DEFAULT_CONFIDENCE, GENERAL_INTENT};
use lexdraft_core::models::MetadataType;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::errors::AppError;
use crate::llm::{GenerationAdapter, GenerationOptions};

/// Instruction sent with every classification request
pub const CLASSIFIER_INSTRUCTION: &str = "You classify legal assistant requests. \
Respond with a single JSON object and nothing else, shaped as \
{\"type\": string, \"clauseType\": string (optional), \"confidence\": number between 0 and 1}. \
Valid types: summarize, explain, analyze, suggest, adjust, general. \
Use clauseType only for suggest requests, naming the clause (for example confidentiality or termination).";

/// Classified purpose of a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    /// Label as returned by the classifier
    #[serde(rename = "type")]
    pub kind: String,
    /// Clause the user wants drafted, for suggest requests
    #[serde(default, alias = "clause_type", skip_serializing_if = "Option::is_none")]
    pub clause_type: Option<String>,
    /// Classifier confidence in [0, 1]
    #[serde(default = "default_confidence", deserialize_with = "lenient_confidence")]
    pub confidence: f64,
}

const fn default_confidence() -> f64 {
    DEFAULT_CONFIDENCE
}

/// Accept a number, a numeric string, or null; anything unusable is the default
fn lenient_confidence<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let confidence = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(confidence.unwrap_or(DEFAULT_CONFIDENCE))
}

impl Intent {
    /// The intent used whenever classification fails
    #[must_use]
    pub fn general() -> Self {
        Self {
            kind: GENERAL_INTENT.to_owned(),
            clause_type: None,
            confidence: DEFAULT_CONFIDENCE,
        }
    }

    /// Persisted metadata tag for this intent
    #[must_use]
    pub fn metadata_type(&self) -> MetadataType {
        metadata_type_for(&self.kind)
    }
}

/// Why a classification attempt failed
#[derive(Debug, Error)]
pub enum ClassificationError {
    /// The generation call itself failed
    #[error("classification request failed: {0}")]
    Generation(#[source] AppError),
    /// No JSON object could be parsed from the response
    #[error("classifier response is not an intent object: {excerpt}")]
    Unparseable {
        /// Leading part of the raw response
        excerpt: String,
    },
    /// The object parsed but its type was blank
    #[error("classifier returned an empty intent type")]
    MissingType,
}

/// Parse a classifier response
///
/// Tries the whole text as JSON first, then the span from the first `{` to
/// the last `}`. Confidence is clamped into [0, 1].
///
/// # Errors
///
/// Returns `Unparseable` when neither attempt yields an intent object and
/// `MissingType` when the type is blank
pub fn parse_intent(raw: &str) -> Result<Intent, ClassificationError> {
    let trimmed = raw.trim();

    let parsed = serde_json::from_str::<Intent>(trimmed).ok().or_else(|| {
        let start = trimmed.find('{')?;
        let end = trimmed.rfind('}')?;
        (start < end)
            .then(|| serde_json::from_str::<Intent>(&trimmed[start..=end]).ok())
            .flatten()
    });

    let mut intent = parsed.ok_or_else(|| ClassificationError::Unparseable {
        excerpt: trimmed.chars().take(80).collect(),
    })?;

    intent.kind = intent.kind.trim().to_owned();
    if intent.kind.is_empty() {
        return Err(ClassificationError::MissingType);
    }
    intent.confidence = if intent.confidence.is_nan() {
        DEFAULT_CONFIDENCE
    } else {
        intent.confidence.clamp(0.0, 1.0)
    };

    Ok(intent)
}

/// Map a classifier label (or synonym) to a persisted metadata type
///
/// Labels are compared after lowercasing and dropping non-alphanumerics, so
/// `DocumentReview`, `document_review`, and `document review` are the same.
/// Unmapped labels become `chat`.
#[must_use]
pub fn metadata_type_for(label: &str) -> MetadataType {
    let normalized: String = label
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();

    match normalized.as_str() {
        "summarize" | "summarise" | "summary" | "summarization" | "documentsummary" => {
            MetadataType::Summarize
        }
        "explain" | "explanation" | "clarify" | "clarification" | "definition"
        | "clauseexplanation" => MetadataType::Explain,
        "analyze" | "analyse" | "analysis" | "documentreview" | "review" | "riskassessment"
        | "compliancecheck" | "contractanalysis" => MetadataType::Analyze,
        "suggest" | "suggestion" | "clausegeneration" | "clausesuggestion" | "draft"
        | "drafting" | "generateclause" => MetadataType::Suggest,
        "adjust" | "adjustment" | "rewrite" | "rephrase" | "toneadjustment" | "tonechange" => {
            MetadataType::Adjust
        }
        _ => MetadataType::Chat,
    }
}

/// Classifier backed by the generation adapter
pub struct IntentClassifier {
    adapter: Arc<GenerationAdapter>,
}

impl IntentClassifier {
    /// Create a classifier sharing `adapter`
    #[must_use]
    pub const fn new(adapter: Arc<GenerationAdapter>) -> Self {
        Self { adapter }
    }

    /// Classify, reporting the failure reason
    ///
    /// # Errors
    ///
    /// Returns a [`ClassificationError`] if generation or parsing fails
    pub async fn try_classify(&self, message: &str) -> Result<Intent, ClassificationError> {
        let options = GenerationOptions {
            system_prompt: Some(CLASSIFIER_INSTRUCTION.to_owned()),
            temperature: Some(CLASSIFIER_TEMPERATURE),
            max_tokens: None,
        };

        let generation = self
            .adapter
            .generate_single_turn(message, &options)
            .await
            .map_err(ClassificationError::Generation)?;

        parse_intent(&generation.text)
    }

    /// Classify, falling back to the general intent on any failure
    #[instrument(skip_all)]
    pub async fn classify(&self, message: &str) -> Intent {
        match self.try_classify(message).await {
            Ok(intent) => {
                debug!(intent = %intent.kind, confidence = intent.confidence, "Intent classified");
                intent
            }
            Err(error) => {
                warn!(error = %error, "Intent classification failed, using general intent");
                Intent::general()
            }
        }
    }
}
