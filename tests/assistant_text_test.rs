// ABOUTME: Integration tests for system-prompt construction and response post-processing
// ABOUTME: Covers intent clauses, document and tone sentences, references, and suggestion lines
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::collections::HashSet;

use lexdraft_server::assistant::{
    build_system_prompt, extract_references, extract_suggestions, Intent,
};

fn intent(kind: &str) -> Intent {
    Intent {
        kind: kind.to_owned(),
        ..Intent::general()
    }
}

// ============================================================================
// System Prompt
// ============================================================================

#[test]
fn test_every_prompt_starts_with_base_instruction() {
    for kind in ["summarize", "explain", "analyze", "suggest", "adjust", "general", "other"] {
        let prompt = build_system_prompt(&intent(kind), None, None);
        assert!(
            prompt.starts_with("You are a legal document assistant."),
            "{kind}: {prompt}"
        );
    }
}

#[test]
fn test_adjust_uses_requested_tone_only_once() {
    let prompt = build_system_prompt(&intent("adjust"), None, Some("casual"));
    assert!(prompt.contains("casual tone"));
    assert!(!prompt.contains("formal tone"));
    assert_eq!(prompt.matches("tone").count(), 1);
}

#[test]
fn test_adjust_defaults_to_formal() {
    let prompt = build_system_prompt(&intent("Adjust"), None, None);
    assert!(prompt.contains("formal tone"));
}

#[test]
fn test_suggest_names_clause_type() {
    let suggest = Intent {
        kind: "suggest".to_owned(),
        clause_type: Some("confidentiality".to_owned()),
        confidence: 0.9,
    };
    let prompt = build_system_prompt(&suggest, None, None);
    assert!(prompt.contains("confidentiality clause"));

    let without = build_system_prompt(&intent("suggest"), None, None);
    assert!(without.contains("Suggest appropriate clause language"));
}

#[test]
fn test_document_type_and_tone_sentences() {
    let prompt = build_system_prompt(&intent("SUMMARIZE"), Some("NDA"), Some("plain"));
    assert!(prompt.contains("summary"));
    assert!(prompt.ends_with("The document is a NDA. Use a plain tone in your response."));

    let blank = build_system_prompt(&intent("summarize"), Some("  "), Some(""));
    assert!(!blank.contains("The document is"));
    assert!(!blank.contains("Use a"));
}

#[test]
fn test_prompt_is_deterministic() {
    let a = build_system_prompt(&intent("analyze"), Some("lease"), Some("formal"));
    let b = build_system_prompt(&intent("analyze"), Some("lease"), Some("formal"));
    assert_eq!(a, b);
}

// ============================================================================
// References
// ============================================================================

#[test]
fn test_references_include_section_and_case_without_duplicates() {
    let refs = extract_references("See Section 12 of the Contract Act and Smith v. Jones.");

    assert!(refs.iter().any(|r| r.starts_with("Section 12")));
    assert!(refs.contains(&"Smith v. Jones".to_owned()));
    let unique: HashSet<_> = refs.iter().collect();
    assert_eq!(unique.len(), refs.len());
}

#[test]
fn test_repeated_references_are_kept_once_in_first_seen_order() {
    let refs = extract_references(
        "Article 5A applies. Roe v. Wade is cited. Article 5A applies again. Roe v. Wade again.",
    );
    assert_eq!(refs, vec!["Article 5A".to_owned(), "Roe v. Wade".to_owned()]);
}

#[test]
fn test_empty_text_has_no_references() {
    assert!(extract_references("").is_empty());
    assert!(extract_references("nothing to cite here").is_empty());
}

// ============================================================================
// Suggestions
// ============================================================================

#[test]
fn test_suggestion_lines_are_trimmed_and_ordered() {
    let suggestions = extract_suggestions("Consider revising.\nThe sky is blue.\nReview clause 4.");
    assert_eq!(
        suggestions,
        vec!["Consider revising.".to_owned(), "Review clause 4.".to_owned()]
    );
}

#[test]
fn test_indented_suggestions_and_non_matches() {
    let text = "  Ensure notice is in writing.  \nconsider lowercase\n\tAdd a survival clause.";
    assert_eq!(
        extract_suggestions(text),
        vec![
            "Ensure notice is in writing.".to_owned(),
            "Add a survival clause.".to_owned()
        ]
    );
}
