// ABOUTME: System-prompt builder mapping intent, document type, and tone to an instruction
// ABOUTME: Pure and deterministic; no I/O
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use lexdraft_core::constants::prompts::{BASE_INSTRUCTION, DEFAULT_TONE};

use super::intent::Intent;

/// Build the system instruction for one query
///
/// The clause is chosen by `intent.kind`, compared case-insensitively. Blank
/// `document_type` or `tone` values count as absent.
#[must_use]
pub fn build_system_prompt(
    intent: &Intent,
    document_type: Option<&str>,
    tone: Option<&str>,
) -> String {
    let document_type = non_blank(document_type);
    let tone = non_blank(tone);
    let kind = intent.kind.trim().to_lowercase();

    let clause = match kind.as_str() {
        "summarize" => {
            "Provide a clear and concise summary of the key points, obligations, and terms."
                .to_owned()
        }
        "explain" => "Explain the legal concepts and terminology in plain language.".to_owned(),
        "analyze" => {
            "Analyze the content for potential risks, ambiguities, and compliance issues."
                .to_owned()
        }
        "suggest" => match non_blank(intent.clause_type.as_deref()) {
            Some(clause_type) => format!(
                "Suggest appropriate {clause_type} clause language that protects the user's interests."
            ),
            None => "Suggest appropriate clause language for the situation described.".to_owned(),
        },
        "adjust" => format!(
            "Rewrite the provided language in a {} tone while preserving its legal meaning.",
            tone.unwrap_or(DEFAULT_TONE)
        ),
        _ => "Provide accurate, helpful legal information and note when a qualified lawyer should be consulted."
            .to_owned(),
    };

    let mut prompt = format!("{BASE_INSTRUCTION} {clause}");

    if let Some(document_type) = document_type {
        prompt.push_str(&format!(" The document is a {document_type}."));
    }

    if kind != "adjust" {
        if let Some(tone) = tone {
            prompt.push_str(&format!(" Use a {tone} tone in your response."));
        }
    }

    prompt
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
