use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate view of a [`MemoryStore`](crate::MemoryStore).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreStatistics {
    pub total_memories: usize,
    /// Item count per kind name.
    pub memory_types: BTreeMap<String, usize>,
    pub average_importance: f64,
    /// Current item count over `max_memory_items`.
    #[serde(rename = "compression_ratio")]
    pub utilization: f64,
    pub oldest_memory: Option<DateTime<Utc>>,
    pub newest_memory: Option<DateTime<Utc>>,
}

/// Store statistics plus conversation-level aggregates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStatistics {
    #[serde(flatten)]
    pub store: StoreStatistics,
    pub total_conversations: usize,
    pub average_memories_per_conversation: f64,
    pub total_duration_minutes: f64,
}
