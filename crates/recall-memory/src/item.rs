use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::persist::{iso, iso_opt};

/// Mutually exclusive classification of a memory item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryKind {
    Conversation,
    Fact,
    Preference,
    Emotion,
    Context,
}

impl MemoryKind {
    pub const ALL: [MemoryKind; 5] = [
        MemoryKind::Conversation,
        MemoryKind::Fact,
        MemoryKind::Preference,
        MemoryKind::Emotion,
        MemoryKind::Context,
    ];

    /// Lower-case name, as persisted and as matched against search queries.
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryKind::Conversation => "conversation",
            MemoryKind::Fact => "fact",
            MemoryKind::Preference => "preference",
            MemoryKind::Emotion => "emotion",
            MemoryKind::Context => "context",
        }
    }

    /// Human-readable label used when memories are rendered into a prompt.
    pub fn label(&self) -> &'static str {
        match self {
            MemoryKind::Conversation => "Conversation memory",
            MemoryKind::Fact => "Fact memory",
            MemoryKind::Preference => "Preference memory",
            MemoryKind::Emotion => "Emotion memory",
            MemoryKind::Context => "Context memory",
        }
    }
}

impl fmt::Display for MemoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemoryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        MemoryKind::ALL
            .into_iter()
            .find(|k| k.as_str() == lower)
            .ok_or_else(|| {
                let valid: Vec<&str> = MemoryKind::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown memory kind '{s}' (expected one of: {})", valid.join(", "))
            })
    }
}

/// A retained unit of knowledge extracted from one conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MemoryKind,
    /// Original turn text, verbatim.
    pub content: String,
    /// Heuristic value in [0.0, 1.0]; drives admission and eviction.
    pub importance: f64,
    #[serde(rename = "timestamp", with = "iso")]
    pub created_at: DateTime<Utc>,
    pub source_conversation: String,
    /// Labels from every matched classification rule, not only the winning kind.
    pub tags: Vec<String>,
    #[serde(default)]
    pub compressed: bool,
    #[serde(default)]
    pub access_count: u64,
    #[serde(default, with = "iso_opt")]
    pub last_accessed: Option<DateTime<Utc>>,
    /// Store-local insertion order, used to break score ties.
    #[serde(skip)]
    pub(crate) seq: u64,
}

impl MemoryItem {
    pub fn new(
        id: impl Into<String>,
        kind: MemoryKind,
        content: impl Into<String>,
        importance: f64,
        source_conversation: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            content: content.into(),
            importance: clamp_unit(importance),
            created_at: Utc::now(),
            source_conversation: source_conversation.into(),
            tags: Vec::new(),
            compressed: false,
            access_count: 0,
            last_accessed: None,
            seq: 0,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Record a read.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.access_count += 1;
        self.last_accessed = Some(now);
    }

    /// Re-establish the item invariants after deserialization or import.
    pub(crate) fn normalize(&mut self) {
        self.importance = clamp_unit(self.importance);
        if self.access_count == 0 {
            self.last_accessed = None;
        }
    }
}

/// Clamp to [0, 1]; NaN counts as zero.
pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

/// Digest of one processed conversation. Replaced wholesale on reprocessing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub conversation_id: String,
    #[serde(rename = "summary")]
    pub summary_text: String,
    /// At most five short excerpts.
    pub key_points: Vec<String>,
    pub participants: Vec<String>,
    #[serde(rename = "timestamp", with = "iso")]
    pub created_at: DateTime<Utc>,
    pub duration_minutes: f64,
    pub memory_count: usize,
}
