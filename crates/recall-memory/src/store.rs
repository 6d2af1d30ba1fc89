use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info, warn};

use recall_core::{Result, Turn};

use crate::classify::classify;
use crate::item::{MemoryItem, MemoryKind};
use crate::persist::{self, FileMetadata, MemoryFile};
use crate::policy::CompressionPolicy;
use crate::stats::StoreStatistics;

/// Minimum relevance for a search hit.
pub const RELEVANCE_THRESHOLD: f64 = 0.3;
/// Recently-read items earn up to this much on top of their eviction score.
const RECENT_ACCESS_BONUS: f64 = 0.2;
/// Score lost per day since the last read.
const RECENT_ACCESS_DECAY: f64 = 0.1;
/// Access-frequency credit per read, capped at 1.0.
const ACCESS_STEP: f64 = 0.1;
/// Items read at least this often survive age-based pruning.
const PRUNE_ACCESS_EXEMPTION: u64 = 2;

/// Bounded mapping from id to [`MemoryItem`] with scored admission, eviction,
/// and lexical relevance search.
pub struct MemoryStore {
    policy: CompressionPolicy,
    memories: HashMap<String, MemoryItem>,
    next_seq: u64,
}

impl MemoryStore {
    /// Create an empty store. Fails if the policy is invalid.
    pub fn new(policy: CompressionPolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self {
            policy,
            memories: HashMap::new(),
            next_seq: 0,
        })
    }

    pub fn policy(&self) -> &CompressionPolicy {
        &self.policy
    }

    pub fn len(&self) -> usize {
        self.memories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memories.is_empty()
    }

    /// Iterate items without access bookkeeping, in insertion order.
    pub fn items(&self) -> impl Iterator<Item = &MemoryItem> {
        let mut items: Vec<&MemoryItem> = self.memories.values().collect();
        items.sort_by_key(|m| m.seq);
        items.into_iter()
    }

    /// Look up an item without counting it as a read.
    pub fn peek(&self, id: &str) -> Option<&MemoryItem> {
        self.memories.get(id)
    }

    /// Read an item, updating its access bookkeeping.
    pub fn get(&mut self, id: &str) -> Option<&MemoryItem> {
        let item = self.memories.get_mut(id)?;
        item.touch(Utc::now());
        Some(item)
    }

    pub fn remove(&mut self, id: &str) -> Option<MemoryItem> {
        self.memories.remove(id)
    }

    pub fn clear(&mut self) {
        self.memories.clear();
    }

    /// Insert or replace a fully-formed item. Does not trigger eviction.
    pub fn insert(&mut self, mut item: MemoryItem) -> Option<MemoryItem> {
        item.normalize();
        item.seq = self.bump_seq();
        self.memories.insert(item.id.clone(), item)
    }

    /// Classify every turn and admit those scoring at least the admission
    /// threshold. Evicts whenever the store grows past capacity. Returns the
    /// ids of all admitted items, including any evicted again later in the
    /// same call.
    pub fn ingest(&mut self, turns: &[Turn], conversation_id: &str) -> Vec<String> {
        let total = turns.len();
        let mut ids = Vec::new();

        for (position, turn) in turns.iter().enumerate() {
            if turn.is_metadata() || turn.content.is_empty() {
                continue;
            }

            let scored = classify(&turn.content, position, total);
            if scored.importance < self.policy.compression_threshold {
                debug!(position, importance = scored.importance, "turn below admission threshold");
                continue;
            }

            let created_at = Utc::now();
            let id = self.generate_id(&turn.content, created_at);
            let mut item = MemoryItem::new(
                id.clone(),
                scored.kind,
                turn.content.clone(),
                scored.importance,
                conversation_id,
            )
            .with_tags(scored.tags)
            .with_created_at(created_at);
            item.seq = self.bump_seq();

            debug!(%id, kind = %item.kind, importance = item.importance, "admitted memory");
            self.memories.insert(id.clone(), item);
            ids.push(id);

            if self.memories.len() > self.policy.max_memory_items {
                self.compress();
            }
        }

        info!(conversation_id, added = ids.len(), total = self.memories.len(), "ingested conversation");
        ids
    }

    /// Evict down to `floor(count * compression_ratio)` items, keeping the
    /// highest compression scores. Returns the number evicted.
    pub fn compress(&mut self) -> usize {
        let before = self.memories.len();
        let keep = self.policy.retained_after_compression(before);

        let evicted: Vec<String> = rank_for_eviction(self.memories.values(), &self.policy, Utc::now())
            .into_iter()
            .skip(keep)
            .map(|(item, _)| item.id.clone())
            .collect();

        for id in &evicted {
            self.memories.remove(id);
        }

        info!(kept = self.memories.len(), evicted = evicted.len(), "compressed memory store");
        evicted.len()
    }

    /// Rank items by lexical relevance to `query`.
    ///
    /// Every stored item counts as read, whether or not it is returned.
    pub fn search(&mut self, query: &str, limit: usize) -> Vec<MemoryItem> {
        let now = Utc::now();
        for item in self.memories.values_mut() {
            item.touch(now);
        }

        let query_lower = query.to_lowercase();
        let tokens: Vec<&str> = query_lower.split_whitespace().collect();

        let mut scored: Vec<(&MemoryItem, f64)> = self
            .memories
            .values()
            .map(|m| (m, relevance(m, &query_lower, &tokens)))
            .filter(|(_, score)| *score > RELEVANCE_THRESHOLD)
            .collect();

        scored.sort_by(|a, b| by_score_desc(a, b));
        scored
            .into_iter()
            .take(limit)
            .map(|(m, _)| m.clone())
            .collect()
    }

    /// [`search`](Self::search), keeping only hits of one kind.
    pub fn search_by_kind(&mut self, query: &str, kind: MemoryKind, limit: usize) -> Vec<MemoryItem> {
        let mut hits = self.search(query, limit);
        hits.retain(|m| m.kind == kind);
        hits
    }

    /// Delete items created more than `days` ago that were read fewer than
    /// two times. Returns the number removed.
    pub fn prune_older_than(&mut self, days: i64) -> usize {
        let Some(cutoff) = age_cutoff(Utc::now(), days) else {
            debug!(days, "age cutoff predates representable time, nothing to prune");
            return 0;
        };
        let before = self.memories.len();
        self.memories
            .retain(|_, m| !(m.created_at < cutoff && m.access_count < PRUNE_ACCESS_EXEMPTION));
        let removed = before - self.memories.len();
        info!(days, removed, "pruned old memories");
        removed
    }

    pub fn statistics(&self) -> StoreStatistics {
        if self.memories.is_empty() {
            return StoreStatistics::default();
        }

        let mut memory_types = BTreeMap::new();
        for m in self.memories.values() {
            *memory_types.entry(m.kind.as_str().to_string()).or_insert(0) += 1;
        }
        let count = self.memories.len();
        let total_importance: f64 = self.memories.values().map(|m| m.importance).sum();

        StoreStatistics {
            total_memories: count,
            memory_types,
            average_importance: total_importance / count as f64,
            utilization: count as f64 / self.policy.max_memory_items as f64,
            oldest_memory: self.memories.values().map(|m| m.created_at).min(),
            newest_memory: self.memories.values().map(|m| m.created_at).max(),
        }
    }

    /// Write every item to `path`, replacing the file atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = MemoryFile {
            metadata: Some(FileMetadata::for_memories(self.memories.len())),
            memories: self.items().cloned().collect(),
        };
        persist::write_json_atomic(path, &file)?;
        info!(path = %path.display(), count = self.memories.len(), "saved memories");
        Ok(())
    }

    /// Replace the whole item set with the contents of `path`. A missing or
    /// corrupt file leaves the store empty. Returns the number loaded.
    pub fn load(&mut self, path: &Path) -> usize {
        self.memories.clear();
        match persist::read_json::<MemoryFile>(path) {
            Ok(file) => {
                for item in file.memories {
                    self.insert(item);
                }
                info!(path = %path.display(), count = self.memories.len(), "loaded memories");
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load memories, starting empty");
            }
        }
        self.memories.len()
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// `mem_<unix seconds>_<hash>`, re-hashed with a counter until unused.
    fn generate_id(&self, content: &str, created_at: DateTime<Utc>) -> String {
        let nanos = created_at.timestamp_nanos_opt().unwrap_or_default();
        let mut attempt: u64 = 0;
        loop {
            let mut hasher = blake3::Hasher::new();
            hasher.update(content.as_bytes());
            hasher.update(&nanos.to_le_bytes());
            hasher.update(&attempt.to_le_bytes());
            let hex = hasher.finalize().to_hex();
            let id = format!("mem_{}_{}", created_at.timestamp(), &hex[..12]);
            if !self.memories.contains_key(&id) {
                return id;
            }
            attempt += 1;
        }
    }
}

/// `now` minus `days`, or `None` when that instant is out of range.
pub(crate) fn age_cutoff(now: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    Duration::try_days(days).and_then(|d| now.checked_sub_signed(d))
}

/// Eviction value of an item at `now`. Higher survives longer.
pub fn compression_score(item: &MemoryItem, policy: &CompressionPolicy, now: DateTime<Utc>) -> f64 {
    let mut score = item.importance;

    let access_weight = (item.access_count as f64 * ACCESS_STEP).min(1.0);
    score += access_weight * policy.access_frequency_weight;

    let age_days = (now - item.created_at).num_days() as f64;
    let age_decay = (1.0 - age_days * policy.age_decay_factor).max(0.0);
    score *= age_decay;

    if let Some(last) = item.last_accessed {
        let days_since_access = (now - last).num_days() as f64;
        let recent_weight = (1.0 - days_since_access * RECENT_ACCESS_DECAY).max(0.0);
        score += recent_weight * RECENT_ACCESS_BONUS;
    }

    score
}

/// Score every item and sort best-first. Ties keep insertion order.
fn rank_for_eviction<'a>(
    items: impl Iterator<Item = &'a MemoryItem>,
    policy: &CompressionPolicy,
    now: DateTime<Utc>,
) -> Vec<(&'a MemoryItem, f64)> {
    let mut ranked: Vec<(&MemoryItem, f64)> = items
        .map(|m| (m, compression_score(m, policy, now)))
        .collect();
    ranked.sort_by(|a, b| by_score_desc(a, b));
    ranked
}

fn by_score_desc(a: &(&MemoryItem, f64), b: &(&MemoryItem, f64)) -> Ordering {
    b.1.partial_cmp(&a.1)
        .unwrap_or(Ordering::Equal)
        .then(a.0.seq.cmp(&b.0.seq))
}

/// Weighted keyword, tag, and kind-name overlap, in [0, 1].
pub fn relevance(item: &MemoryItem, query_lower: &str, tokens: &[&str]) -> f64 {
    let content_lower = item.content.to_lowercase();

    let keyword_score = if tokens.is_empty() {
        0.0
    } else {
        let hits = tokens.iter().filter(|t| content_lower.contains(*t)).count();
        hits as f64 / tokens.len() as f64
    };

    let tag_score = if item.tags.is_empty() {
        0.0
    } else {
        let hits = item.tags.iter().filter(|t| query_lower.contains(t.as_str())).count();
        hits as f64 / item.tags.len() as f64
    };

    let type_score = if query_lower.contains(item.kind.as_str()) { 0.1 } else { 0.0 };

    keyword_score * 0.6 + tag_score * 0.3 + type_score * 0.1
}
