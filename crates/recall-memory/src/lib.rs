//! # recall-memory
//!
//! Bounded memory for a conversational agent:
//!
//! - **MemoryStore**: classifies and scores conversation turns, evicts the
//!   lowest-value items once over capacity, answers lexical relevance queries,
//!   and persists its items as JSON.
//! - **SessionMemoryManager**: wraps one store with a per-conversation summary
//!   map and coordinates end-of-conversation processing, pruning, and
//!   import/export.
//!
//! Both are single-writer structures. Callers serialize access.

pub mod classify;
pub mod context;
pub mod item;
pub mod manager;
pub mod persist;
pub mod policy;
pub mod stats;
pub mod store;

pub use classify::{Classification, classify};
pub use context::{extract_keywords, format_memory_context};
pub use item::{ConversationSummary, MemoryItem, MemoryKind};
pub use manager::{ConversationOutcome, ImportReport, PruneReport, SessionMemoryManager, SummaryDraft};
pub use policy::CompressionPolicy;
pub use stats::{MemoryStatistics, StoreStatistics};
pub use store::MemoryStore;
