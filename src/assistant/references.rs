// ABOUTME: Post-processing of generated legal text into references and actionable suggestions
// ABOUTME: Regex-based citation extraction and verb-prefixed suggestion line detection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Response post-processor
//!
//! Both extractors are pure and never fail: no match yields an empty list.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static SECTION_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    // Section 12, Article 5A, Section 3 of the Contract Act
    Regex::new(
        r"\b(?:Section|Article)\s+\d+[A-Za-z]?(?:\s+of\s+the\s+[A-Z][A-Za-z]*(?:\s+[A-Z][A-Za-z]*)*\s+Act)?",
    )
    .ok()
});

static CASE_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    // Smith v. Jones
    Regex::new(r"\b[A-Z][A-Za-z]+\s+v\.\s+[A-Z][A-Za-z]+").ok()
});

static STATUTE_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    // Companies Act, Data Protection Act, 2018
    Regex::new(r"\b(?:[A-Z][a-z]+\s+)+Act(?:,\s*\d{4})?").ok()
});

/// Lines starting with one of these are suggestions
pub const SUGGESTION_VERBS: &[&str] = &[
    "Consider", "Ensure", "Review", "Verify", "Confirm", "Add", "Remove", "Update", "Check",
    "Include", "Exclude",
];

/// Extract legal references in pattern order, first occurrence kept
#[must_use]
pub fn extract_references(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    [&SECTION_PATTERN, &CASE_PATTERN, &STATUTE_PATTERN]
        .into_iter()
        .filter_map(|pattern| pattern.as_ref())
        .flat_map(|pattern| pattern.find_iter(text))
        .map(|found| found.as_str().to_owned())
        .filter(|reference| seen.insert(reference.clone()))
        .collect()
}

/// Extract trimmed lines that start with a suggestion verb, in original order
#[must_use]
pub fn extract_suggestions(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| {
            SUGGESTION_VERBS
                .iter()
                .any(|verb| line.starts_with(verb))
        })
        .map(str::to_owned)
        .collect()
}
