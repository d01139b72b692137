// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Write-time classification: kind, scope, importance, and tags.
//!
//! Classification is ordered rule precedence: preference phrasing beats
//! factual self-statements, which beat goal vocabulary, then project,
//! transient, and emotional vocabulary, with "fact" as the default. Messages
//! often match several buckets; the first match wins and the order is a
//! deliberate tie-break policy, tunable but load-bearing.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::record::{MemoryKind, MemoryScope};

static PREFERENCE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"\bi prefer\b", r"\bmy favorite\b", r"\bi like\b", r"\bi usually\b"]
        .iter()
        .map(|p| Regex::new(p).expect("static pattern compiles"))
        .collect()
});

static FACT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"\bmy name is\b", r"\bi am\b", r"\bi'm\b", r"\bi work\b", r"\bi study\b"]
        .iter()
        .map(|p| Regex::new(p).expect("static pattern compiles"))
        .collect()
});

const EMOTIONAL_TOKENS: &[&str] = &[
    "love", "hate", "angry", "excited", "anxious", "important", "critical", "never", "always",
];
const GOAL_TOKENS: &[&str] = &[
    "goal", "plan", "roadmap", "target", "build", "launch", "ship", "deadline",
];
const PROJECT_TOKENS: &[&str] = &["project", "repo", "feature", "api", "frontend", "backend"];
const TRANSIENT_TOKENS: &[&str] = &["today", "tomorrow", "this week", "right now", "currently"];
const URGENCY_TOKENS: &[&str] = &["remember", "important", "don't forget", "must"];

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "that", "this", "with", "from", "have", "has", "had", "was", "were",
    "are", "you", "your", "but", "not", "they", "them", "its", "it's", "our", "out", "all",
    "can", "will", "just", "about", "into", "over", "than", "then", "when", "what", "who",
    "how", "why", "very", "been", "being", "would", "could", "should", "there", "their",
];

/// Normalize message text: collapse whitespace, strip leading/trailing
/// sentence punctuation, cap length at `max_chars`.
pub fn normalize_text(message: &str, max_chars: usize) -> String {
    let collapsed = message.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed.trim_matches(|c| matches!(c, '.' | '!' | '?')).trim();
    trimmed.chars().take(max_chars).collect()
}

/// Classify the memory kind of a normalized message.
pub fn classify_kind(message: &str) -> MemoryKind {
    let text = message.to_lowercase();
    if PREFERENCE_PATTERNS.iter().any(|p| p.is_match(&text)) {
        return MemoryKind::Preference;
    }
    if FACT_PATTERNS.iter().any(|p| p.is_match(&text)) {
        return MemoryKind::Fact;
    }
    if GOAL_TOKENS.iter().any(|t| text.contains(t)) {
        return MemoryKind::Goal;
    }
    if PROJECT_TOKENS.iter().any(|t| text.contains(t)) {
        return MemoryKind::Project;
    }
    if TRANSIENT_TOKENS.iter().any(|t| text.contains(t)) {
        return MemoryKind::Transient;
    }
    if EMOTIONAL_TOKENS.iter().any(|t| text.contains(t)) {
        return MemoryKind::Emotional;
    }
    MemoryKind::Fact
}

/// Infer scope from phrasing when no valid explicit hint was supplied.
pub fn detect_scope(message: &str) -> MemoryScope {
    let text = message.to_lowercase();
    if text.contains("this project") || text.contains("in this repo") {
        return MemoryScope::Project;
    }
    if text.contains("in this conversation") {
        return MemoryScope::Conversation;
    }
    if text.contains("global rule") || text.contains("for everyone") {
        return MemoryScope::Global;
    }
    MemoryScope::User
}

/// Score importance from kind base plus additive signals.
///
/// The result leaves headroom below 1.0 so reinforcement can still nudge
/// frequently-retrieved records upward.
pub fn score_importance(message: &str, kind: &MemoryKind, previous_similar_count: u32) -> f64 {
    let base = match kind {
        MemoryKind::Fact => 0.62,
        MemoryKind::Preference => 0.68,
        MemoryKind::Emotional => 0.55,
        MemoryKind::Goal => 0.78,
        MemoryKind::Project => 0.66,
        MemoryKind::Transient => 0.42,
        MemoryKind::Summary(_) => 0.5,
    };
    let text = message.to_lowercase();
    let emotional_signal = if EMOTIONAL_TOKENS.iter().any(|t| text.contains(t)) {
        0.12
    } else {
        0.0
    };
    let reinforcement_boost = (f64::from(previous_similar_count) * 0.04).min(0.2);
    let explicit_boost = if URGENCY_TOKENS.iter().any(|t| text.contains(t)) {
        0.08
    } else {
        0.0
    };
    (base + emotional_signal + reinforcement_boost + explicit_boost).clamp(0.0, 0.95)
}

/// Iterate significant lowercase tokens of a message: alphanumeric words of
/// at least three characters, minus stopwords.
pub fn significant_tokens(message: &str) -> impl Iterator<Item = String> + '_ {
    message
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|w| w.trim_matches('\'').to_lowercase())
        .filter(|w| w.len() >= 3 && !STOPWORDS.contains(&w.as_str()))
}

/// Extract the top-`limit` most frequent significant tokens, ties broken
/// lexicographically.
pub fn extract_tags(message: &str, limit: usize) -> Vec<String> {
    let mut counts: HashMap<String, u32> = HashMap::new();
    for token in significant_tokens(message) {
        *counts.entry(token).or_insert(0) += 1;
    }
    let mut ranked: Vec<(String, u32)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.into_iter().take(limit).map(|(token, _)| token).collect()
}
