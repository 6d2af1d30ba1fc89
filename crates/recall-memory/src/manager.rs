use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use recall_core::{RecallError, Result, Speaker, Turn};

use crate::context::extract_keywords;
use crate::item::{ConversationSummary, MemoryItem, MemoryKind};
use crate::persist::{self, FileMetadata, SummaryFile, iso};
use crate::policy::CompressionPolicy;
use crate::stats::MemoryStatistics;
use crate::store::{MemoryStore, age_cutoff};

const MAX_KEY_POINTS: usize = 5;
const USER_KEY_POINT_WINDOW: usize = 5;
const ASSISTANT_KEY_POINT_WINDOW: usize = 3;
/// Turns at or below this many characters never become key points.
const KEY_POINT_MIN_CHARS: usize = 20;
const KEY_POINT_EXCERPT_CHARS: usize = 50;
/// Above this share of capacity, [`SessionMemoryManager::maintain`] prunes.
const MAINTENANCE_UTILIZATION: f64 = 0.8;

/// Text part of a conversation summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryDraft {
    pub summary_text: String,
    pub key_points: Vec<String>,
}

/// What [`SessionMemoryManager::process_conversation`] produced.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationOutcome {
    pub conversation_id: String,
    pub memory_ids: Vec<String>,
    pub memory_count: usize,
    pub summary: SummaryDraft,
    pub duration_minutes: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PruneReport {
    pub memories_removed: usize,
    pub summaries_removed: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub memories: usize,
    pub summaries: usize,
    /// Items dropped by the compression pass when the merge overflowed capacity.
    pub evicted: usize,
}

#[derive(Serialize)]
struct ExportDocument<'a> {
    memories: Vec<&'a MemoryItem>,
    conversation_summaries: Vec<&'a ConversationSummary>,
    statistics: MemoryStatistics,
    #[serde(with = "iso")]
    export_timestamp: DateTime<Utc>,
}

#[derive(Deserialize)]
struct ImportDocument {
    #[serde(default)]
    memories: Vec<MemoryItem>,
    #[serde(default)]
    conversation_summaries: Vec<ConversationSummary>,
}

/// One [`MemoryStore`] plus per-conversation summaries, persisted side by side.
pub struct SessionMemoryManager {
    store: MemoryStore,
    summaries: HashMap<String, ConversationSummary>,
    memory_file: PathBuf,
    summary_file: PathBuf,
}

impl SessionMemoryManager {
    /// Build the store and restore whatever state exists on disk. Each file
    /// independently falls back to empty if it is missing or corrupt.
    pub fn open(
        policy: CompressionPolicy,
        memory_file: impl Into<PathBuf>,
        summary_file: impl Into<PathBuf>,
    ) -> Result<Self> {
        let memory_file = memory_file.into();
        let summary_file = summary_file.into();
        let mut store = MemoryStore::new(policy)?;

        for path in [&memory_file, &summary_file] {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)?;
            }
        }

        if memory_file.exists() {
            store.load(&memory_file);
        }

        let mut manager = Self {
            store,
            summaries: HashMap::new(),
            memory_file,
            summary_file,
        };
        if manager.summary_file.exists() {
            manager.load_summaries();
        }
        Ok(manager)
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut MemoryStore {
        &mut self.store
    }

    pub fn memory_file(&self) -> &Path {
        &self.memory_file
    }

    pub fn summary_file(&self) -> &Path {
        &self.summary_file
    }

    /// Extract memories from a conversation, replace its summary, and persist
    /// both files. `participants` defaults to `["User", "AI"]` when empty.
    pub fn process_conversation(
        &mut self,
        turns: &[Turn],
        conversation_id: &str,
        participants: &[String],
    ) -> Result<ConversationOutcome> {
        info!(conversation_id, turns = turns.len(), "processing conversation");

        let duration_minutes = conversation_duration_minutes(turns);
        let memory_ids = self.store.ingest(turns, conversation_id);
        let draft = summarize(turns, conversation_id);

        let participants = if participants.is_empty() {
            vec!["User".to_string(), "AI".to_string()]
        } else {
            participants.to_vec()
        };

        self.summaries.insert(
            conversation_id.to_string(),
            ConversationSummary {
                conversation_id: conversation_id.to_string(),
                summary_text: draft.summary_text.clone(),
                key_points: draft.key_points.clone(),
                participants,
                created_at: Utc::now(),
                duration_minutes,
                memory_count: memory_ids.len(),
            },
        );

        self.flush()?;

        Ok(ConversationOutcome {
            conversation_id: conversation_id.to_string(),
            memory_count: memory_ids.len(),
            memory_ids,
            summary: draft,
            duration_minutes,
        })
    }

    /// Memories relevant to the live conversation, queried by keywords drawn
    /// from its most recent turns.
    pub fn contextual_memories(&mut self, turns: &[Turn], limit: usize) -> Vec<MemoryItem> {
        let query = extract_keywords(turns).join(" ");
        let memories = self.store.search(&query, limit);
        info!(found = memories.len(), "retrieved contextual memories");
        memories
    }

    pub fn search(&mut self, query: &str, kind: Option<MemoryKind>, limit: usize) -> Vec<MemoryItem> {
        match kind {
            Some(kind) => self.store.search_by_kind(query, kind, limit),
            None => self.store.search(query, limit),
        }
    }

    pub fn summary(&self, conversation_id: &str) -> Option<&ConversationSummary> {
        self.summaries.get(conversation_id)
    }

    pub fn summaries(&self) -> impl Iterator<Item = &ConversationSummary> {
        self.summaries.values()
    }

    pub fn statistics(&self) -> MemoryStatistics {
        let total_conversations = self.summaries.len();
        let (average, total_duration) = if total_conversations == 0 {
            (0.0, 0.0)
        } else {
            let memories: usize = self.summaries.values().map(|s| s.memory_count).sum();
            let duration: f64 = self.summaries.values().map(|s| s.duration_minutes).sum();
            (memories as f64 / total_conversations as f64, duration)
        };

        MemoryStatistics {
            store: self.store.statistics(),
            total_conversations,
            average_memories_per_conversation: average,
            total_duration_minutes: total_duration,
        }
    }

    /// Prune rarely-read memories and every summary older than `days`, then
    /// persist both files.
    pub fn compress_old_data(&mut self, days: i64) -> Result<PruneReport> {
        let memories_removed = self.store.prune_older_than(days);

        let before = self.summaries.len();
        if let Some(cutoff) = age_cutoff(Utc::now(), days) {
            self.summaries.retain(|_, s| s.created_at >= cutoff);
        }
        let summaries_removed = before - self.summaries.len();
        info!(days, summaries_removed, "pruned old conversation summaries");

        self.flush()?;
        Ok(PruneReport {
            memories_removed,
            summaries_removed,
        })
    }

    /// True once the store holds more than 80% of its capacity.
    pub fn needs_maintenance(&self) -> bool {
        let capacity = self.store.policy().max_memory_items as f64;
        self.store.len() as f64 > capacity * MAINTENANCE_UTILIZATION
    }

    /// Run [`compress_old_data`](Self::compress_old_data) only when the store
    /// is near capacity.
    pub fn maintain(&mut self, days: i64) -> Result<Option<PruneReport>> {
        if !self.needs_maintenance() {
            return Ok(None);
        }
        self.compress_old_data(days).map(Some)
    }

    /// Write items, summaries, and current statistics into one JSON document.
    pub fn export(&self, path: &Path) -> Result<()> {
        let mut summaries: Vec<&ConversationSummary> = self.summaries.values().collect();
        summaries.sort_by(|a, b| a.conversation_id.cmp(&b.conversation_id));

        let doc = ExportDocument {
            memories: self.store.items().collect(),
            conversation_summaries: summaries,
            statistics: self.statistics(),
            export_timestamp: Utc::now(),
        };
        persist::write_json_atomic(path, &doc)?;
        info!(path = %path.display(), "exported memory data");
        Ok(())
    }

    /// Merge an exported document into the live maps, overwriting on id
    /// collision. The document is parsed in full before anything is merged,
    /// so a failure leaves the live state untouched.
    pub fn import(&mut self, path: &Path) -> Result<ImportReport> {
        let doc: ImportDocument = persist::read_json(path).map_err(|e| {
            error!(path = %path.display(), error = %e, "failed to import memory data");
            RecallError::Import {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;

        let mut report = ImportReport {
            memories: doc.memories.len(),
            summaries: doc.conversation_summaries.len(),
            evicted: 0,
        };

        for item in doc.memories {
            self.store.insert(item);
        }
        for summary in doc.conversation_summaries {
            self.summaries.insert(summary.conversation_id.clone(), summary);
        }
        if self.store.len() > self.store.policy().max_memory_items {
            report.evicted = self.store.compress();
        }

        info!(
            path = %path.display(),
            memories = report.memories,
            summaries = report.summaries,
            evicted = report.evicted,
            "imported memory data"
        );
        Ok(report)
    }

    /// Persist the store and the summary map.
    pub fn flush(&self) -> Result<()> {
        self.store.save(&self.memory_file)?;
        self.save_summaries()
    }

    fn save_summaries(&self) -> Result<()> {
        let mut summaries: Vec<ConversationSummary> = self.summaries.values().cloned().collect();
        summaries.sort_by(|a, b| a.conversation_id.cmp(&b.conversation_id));
        let file = SummaryFile {
            metadata: Some(FileMetadata::for_summaries(summaries.len())),
            summaries,
        };
        persist::write_json_atomic(&self.summary_file, &file)?;
        info!(path = %self.summary_file.display(), count = self.summaries.len(), "saved conversation summaries");
        Ok(())
    }

    fn load_summaries(&mut self) {
        match persist::read_json::<SummaryFile>(&self.summary_file) {
            Ok(file) => {
                self.summaries = file
                    .summaries
                    .into_iter()
                    .map(|s| (s.conversation_id.clone(), s))
                    .collect();
                info!(count = self.summaries.len(), "loaded conversation summaries");
            }
            Err(e) => {
                warn!(path = %self.summary_file.display(), error = %e, "failed to load conversation summaries, starting empty");
                self.summaries.clear();
            }
        }
    }
}

/// Minutes between the first and last timestamped non-metadata turns, in the
/// order given. Zero with fewer than two timestamps.
fn conversation_duration_minutes(turns: &[Turn]) -> f64 {
    let mut stamps = turns
        .iter()
        .filter(|t| !t.is_metadata())
        .filter_map(|t| t.timestamp);

    let Some(start) = stamps.next() else {
        return 0.0;
    };
    let Some(end) = stamps.last() else {
        return 0.0;
    };
    (end - start).num_milliseconds() as f64 / 60_000.0
}

fn summarize(turns: &[Turn], conversation_id: &str) -> SummaryDraft {
    let user: Vec<&Turn> = turns.iter().filter(|t| t.speaker() == Speaker::User).collect();
    let assistant: Vec<&Turn> = turns
        .iter()
        .filter(|t| t.speaker() == Speaker::Assistant)
        .collect();

    let summary_text = format!(
        "Conversation {} contains {} user messages and {} assistant replies.",
        conversation_id,
        user.len(),
        assistant.len()
    );

    let mut key_points: Vec<String> = Vec::new();
    key_points.extend(key_points_from(&user, USER_KEY_POINT_WINDOW, "User"));
    key_points.extend(key_points_from(&assistant, ASSISTANT_KEY_POINT_WINDOW, "AI"));
    key_points.truncate(MAX_KEY_POINTS);

    SummaryDraft {
        summary_text,
        key_points,
    }
}

/// Excerpts from the last `window` turns that are long enough to matter.
fn key_points_from<'a>(
    turns: &'a [&'a Turn],
    window: usize,
    prefix: &'a str,
) -> impl Iterator<Item = String> + 'a {
    let start = turns.len().saturating_sub(window);
    turns[start..]
        .iter()
        .filter(|t| t.content.chars().count() > KEY_POINT_MIN_CHARS)
        .map(move |t| {
            let excerpt: String = t.content.chars().take(KEY_POINT_EXCERPT_CHARS).collect();
            format!("{prefix}: {excerpt}...")
        })
}
