// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory domain types for the semantic memory engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Classification of a memory record.
///
/// Every record resolves to exactly one kind. Summary records created by
/// compression wrap the kind they were compacted from, so a compacted
/// preference bucket yields `Summary(Preference)` ("preference_summary" on
/// the wire).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum MemoryKind {
    Fact,
    Preference,
    Emotional,
    Goal,
    Project,
    Transient,
    Summary(Box<MemoryKind>),
}

impl MemoryKind {
    /// Serialized label, e.g. "goal" or "goal_summary".
    pub fn label(&self) -> String {
        match self {
            MemoryKind::Fact => "fact".to_string(),
            MemoryKind::Preference => "preference".to_string(),
            MemoryKind::Emotional => "emotional".to_string(),
            MemoryKind::Goal => "goal".to_string(),
            MemoryKind::Project => "project".to_string(),
            MemoryKind::Transient => "transient".to_string(),
            MemoryKind::Summary(inner) => format!("{}_summary", inner.label()),
        }
    }

    /// Parse from a serialized label. Unknown labels resolve to `Fact`.
    pub fn from_label(s: &str) -> Self {
        if let Some(base) = s.strip_suffix("_summary") {
            return MemoryKind::Summary(Box::new(MemoryKind::from_label(base)));
        }
        match s {
            "preference" => MemoryKind::Preference,
            "emotional" => MemoryKind::Emotional,
            "goal" => MemoryKind::Goal,
            "project" => MemoryKind::Project,
            "transient" => MemoryKind::Transient,
            _ => MemoryKind::Fact,
        }
    }
}

impl From<MemoryKind> for String {
    fn from(kind: MemoryKind) -> Self {
        kind.label()
    }
}

impl From<String> for MemoryKind {
    fn from(s: String) -> Self {
        MemoryKind::from_label(&s)
    }
}

impl std::fmt::Display for MemoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Visibility/applicability tier of a memory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryScope {
    Global,
    User,
    Conversation,
    Project,
}

impl MemoryScope {
    /// Serialized label.
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryScope::Global => "global",
            MemoryScope::User => "user",
            MemoryScope::Conversation => "conversation",
            MemoryScope::Project => "project",
        }
    }

    /// Parse from a label; returns `None` for unknown scopes so callers can
    /// fall back to phrasing inference.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "global" => Some(MemoryScope::Global),
            "user" => Some(MemoryScope::User),
            "conversation" => Some(MemoryScope::Conversation),
            "project" => Some(MemoryScope::Project),
            _ => None,
        }
    }
}

impl std::fmt::Display for MemoryScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The unit of long-term knowledge stored by the engine.
///
/// Identity and owner are immutable after creation; everything else is
/// mutated only by the engine's reinforcement, decay, and compression paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Unique identifier.
    pub id: String,
    /// Identity namespace this record belongs to (one per end user).
    pub owner_id: String,
    /// Normalized, length-capped content. Never empty.
    pub content: String,
    pub kind: MemoryKind,
    pub scope: MemoryScope,
    /// Decaying scalar priority in [0, 1].
    pub importance_score: f64,
    /// Times this record has been retrieved into context.
    pub reinforcement_count: u32,
    /// Multiplicative per-maintenance-cycle importance shrink, in (0, 1].
    pub decay_factor: f64,
    /// Lowercase significant tokens extracted at ingestion.
    pub tags: Vec<String>,
    /// Message the record originated from, if any.
    #[serde(default)]
    pub source_message_id: Option<String>,
    /// Embedding vector plus the identity of the model that produced it.
    pub embedding: Vec<f32>,
    pub embedding_model: String,
    pub embedding_provider: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub last_accessed: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_archived: bool,
    #[serde(default)]
    pub archived_at: Option<DateTime<Utc>>,
    /// Open key/value document preserved verbatim across engine updates.
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl MemoryRecord {
    /// Creates a new record with clamped importance and decay factor.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        owner_id: &str,
        content: &str,
        kind: MemoryKind,
        scope: MemoryScope,
        importance_score: f64,
        decay_factor: f64,
        tags: Vec<String>,
        source_message_id: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            content: content.trim().to_string(),
            kind,
            scope,
            importance_score: importance_score.clamp(0.0, 1.0),
            reinforcement_count: 0,
            decay_factor: decay_factor.clamp(0.01, 1.0),
            tags,
            source_message_id,
            embedding: Vec::new(),
            embedding_model: String::new(),
            embedding_provider: String::new(),
            created_at: now,
            updated_at: now,
            last_accessed: None,
            is_active: true,
            is_archived: false,
            archived_at: None,
            metadata: serde_json::Map::new(),
        }
    }

    /// Applies the retrieval reinforcement side effect: bump count, nudge
    /// importance (capped at 0.99), refresh access timestamps.
    pub fn reinforce(&mut self, now: DateTime<Utc>) {
        self.reinforcement_count += 1;
        self.importance_score = (self.importance_score + 0.01).min(0.99);
        self.last_accessed = Some(now);
        self.updated_at = now;
    }

    /// Marks the record inactive and archived with an archive timestamp.
    pub fn archive(&mut self, now: DateTime<Utc>) {
        self.is_active = false;
        self.is_archived = true;
        self.archived_at = Some(now);
        self.updated_at = now;
    }
}

/// A stored record with its raw similarity to a query vector.
#[derive(Debug, Clone)]
pub struct VectorHit {
    pub record: MemoryRecord,
    pub similarity: f64,
}

/// One row of ranked retrieval output, consumed by the orchestrator and UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRow {
    /// 1-based rank within the selection.
    pub rank: usize,
    pub memory_id: String,
    pub content: String,
    pub kind: MemoryKind,
    pub scope: MemoryScope,
    pub importance_score: f64,
    pub similarity_score: f64,
    pub recency_weight: f64,
    pub final_score: f64,
    pub reinforcement_count: u32,
    pub created_at: DateTime<Utc>,
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_label_roundtrip() {
        for kind in [
            MemoryKind::Fact,
            MemoryKind::Preference,
            MemoryKind::Emotional,
            MemoryKind::Goal,
            MemoryKind::Project,
            MemoryKind::Transient,
            MemoryKind::Summary(Box::new(MemoryKind::Goal)),
        ] {
            let label = kind.label();
            assert_eq!(MemoryKind::from_label(&label), kind);
        }
    }

    #[test]
    fn summary_kind_label() {
        let kind = MemoryKind::Summary(Box::new(MemoryKind::Preference));
        assert_eq!(kind.label(), "preference_summary");
    }

    #[test]
    fn unknown_kind_defaults_to_fact() {
        assert_eq!(MemoryKind::from_label("whimsy"), MemoryKind::Fact);
    }

    #[test]
    fn kind_serde_uses_labels() {
        let kind = MemoryKind::Summary(Box::new(MemoryKind::Fact));
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, "\"fact_summary\"");
        let parsed: MemoryKind = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, kind);
    }

    #[test]
    fn scope_parse_rejects_unknown() {
        assert_eq!(MemoryScope::parse("project"), Some(MemoryScope::Project));
        assert_eq!(MemoryScope::parse(" GLOBAL "), Some(MemoryScope::Global));
        assert_eq!(MemoryScope::parse("office"), None);
    }

    #[test]
    fn create_clamps_scores() {
        let record = MemoryRecord::create(
            "u1",
            "likes espresso",
            MemoryKind::Preference,
            MemoryScope::User,
            1.7,
            0.0,
            vec![],
            None,
        );
        assert!((record.importance_score - 1.0).abs() < f64::EPSILON);
        assert!((record.decay_factor - 0.01).abs() < f64::EPSILON);
        assert!(record.is_active);
        assert!(!record.is_archived);
    }

    #[test]
    fn reinforce_bumps_and_caps() {
        let mut record = MemoryRecord::create(
            "u1",
            "x y z",
            MemoryKind::Fact,
            MemoryScope::User,
            0.985,
            0.985,
            vec![],
            None,
        );
        let now = Utc::now();
        record.reinforce(now);
        assert_eq!(record.reinforcement_count, 1);
        assert!((record.importance_score - 0.99).abs() < 1e-9);
        assert_eq!(record.last_accessed, Some(now));
        assert!(record.last_accessed.unwrap() >= record.created_at);

        record.reinforce(now);
        // Already at the cap, stays there.
        assert!((record.importance_score - 0.99).abs() < 1e-9);
        assert_eq!(record.reinforcement_count, 2);
    }

    #[test]
    fn archive_implies_inactive() {
        let mut record = MemoryRecord::create(
            "u1",
            "old news",
            MemoryKind::Transient,
            MemoryScope::User,
            0.2,
            0.9,
            vec![],
            None,
        );
        record.archive(Utc::now());
        assert!(!record.is_active);
        assert!(record.is_archived);
        assert!(record.archived_at.is_some());
    }

    #[test]
    fn record_serde_roundtrip_preserves_metadata() {
        let mut record = MemoryRecord::create(
            "u1",
            "works on the parser",
            MemoryKind::Project,
            MemoryScope::Project,
            0.66,
            0.985,
            vec!["parser".to_string()],
            Some("msg-9".to_string()),
        );
        record
            .metadata
            .insert("domain".to_string(), serde_json::json!("compilers"));

        let json = serde_json::to_string(&record).unwrap();
        let parsed: MemoryRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, record.id);
        assert_eq!(parsed.kind, MemoryKind::Project);
        assert_eq!(parsed.metadata["domain"], serde_json::json!("compilers"));
    }
}
