use anyhow::Context;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use recall_config::MemoryConfig;
use recall_core::Turn;
use recall_memory::{MemoryKind, format_memory_context};

use super::open_manager;

/// Parse a JSON array of turns.
pub(super) fn read_turns(path: &Path) -> recall_core::Result<Vec<Turn>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read turn file {}", path.display()))?;
    let turns: Vec<Turn> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of turns", path.display()))?;
    Ok(turns)
}

pub(super) fn cmd_ingest(
    config: &MemoryConfig,
    file: &Path,
    conversation: Option<String>,
    participants: Vec<String>,
) -> recall_core::Result<()> {
    let turns = read_turns(file)?;
    let conversation_id = conversation.unwrap_or_else(|| format!("conv_{}", Uuid::new_v4().simple()));

    let mut manager = open_manager(config)?;
    let outcome = manager.process_conversation(&turns, &conversation_id, &participants)?;

    if let Some(report) = manager.maintain(config.retention_days)? {
        info!(
            memories_removed = report.memories_removed,
            summaries_removed = report.summaries_removed,
            "store near capacity, pruned old data"
        );
    }

    println!("Conversation: {}", outcome.conversation_id);
    println!("   Memories stored: {}", outcome.memory_count);
    println!("   Duration: {:.1} min", outcome.duration_minutes);
    println!("   {}", outcome.summary.summary_text);
    for point in &outcome.summary.key_points {
        println!("   • {point}");
    }
    Ok(())
}

pub(super) fn cmd_search(
    config: &MemoryConfig,
    query: &str,
    kind: Option<MemoryKind>,
    limit: Option<usize>,
    json: bool,
) -> recall_core::Result<()> {
    let mut manager = open_manager(config)?;
    let hits = manager.search(query, kind, limit.unwrap_or(config.context_limit));
    // Searching updates access bookkeeping on every item.
    manager.flush()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    if hits.is_empty() {
        println!("No memories match '{query}'");
        return Ok(());
    }
    for m in &hits {
        println!("[{}] {:.2}  {}", m.kind, m.importance, m.content);
        println!("    id: {}  from: {}", m.id, m.source_conversation);
    }
    Ok(())
}

pub(super) fn cmd_context(
    config: &MemoryConfig,
    file: &Path,
    limit: Option<usize>,
) -> recall_core::Result<()> {
    let turns = read_turns(file)?;
    let mut manager = open_manager(config)?;
    let memories = manager.contextual_memories(&turns, limit.unwrap_or(config.context_limit));
    manager.flush()?;

    if !memories.is_empty() {
        println!("{}", format_memory_context(&memories));
    }
    Ok(())
}

pub(super) fn cmd_stats(config: &MemoryConfig, json: bool) -> recall_core::Result<()> {
    let manager = open_manager(config)?;
    let stats = manager.statistics();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let store = &stats.store;
    println!("Memories: {} / {}", store.total_memories, manager.store().policy().max_memory_items);
    println!("   Utilization: {:.1}%", store.utilization * 100.0);
    println!("   Average importance: {:.3}", store.average_importance);
    for (kind, count) in &store.memory_types {
        println!("   {kind}: {count}");
    }
    if let (Some(oldest), Some(newest)) = (store.oldest_memory, store.newest_memory) {
        println!("   Oldest: {}", oldest.format("%Y-%m-%d %H:%M:%S"));
        println!("   Newest: {}", newest.format("%Y-%m-%d %H:%M:%S"));
    }
    println!("Conversations: {}", stats.total_conversations);
    println!("   Memories per conversation: {:.1}", stats.average_memories_per_conversation);
    println!("   Total duration: {:.1} min", stats.total_duration_minutes);
    Ok(())
}

pub(super) fn cmd_prune(
    config: &MemoryConfig,
    days: Option<i64>,
    if_needed: bool,
) -> recall_core::Result<()> {
    let days = days.unwrap_or(config.retention_days);
    let mut manager = open_manager(config)?;

    let report = if if_needed {
        match manager.maintain(days)? {
            Some(report) => report,
            None => {
                println!("Store below maintenance threshold, nothing pruned");
                return Ok(());
            }
        }
    } else {
        manager.compress_old_data(days)?
    };

    println!(
        "Pruned {} memories and {} summaries older than {} days",
        report.memories_removed, report.summaries_removed, days
    );
    Ok(())
}

pub(super) fn cmd_summary(
    config: &MemoryConfig,
    conversation_id: &str,
    json: bool,
) -> recall_core::Result<()> {
    let manager = open_manager(config)?;
    let Some(summary) = manager.summary(conversation_id) else {
        return Err(recall_core::RecallError::Memory(format!(
            "no summary for conversation '{conversation_id}'"
        )));
    };

    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!("Conversation: {}", summary.conversation_id);
    println!("   {}", summary.summary_text);
    println!("   Participants: {}", summary.participants.join(", "));
    println!("   Memories: {}", summary.memory_count);
    println!("   Duration: {:.1} min", summary.duration_minutes);
    println!("   Recorded: {}", summary.created_at.format("%Y-%m-%d %H:%M:%S"));
    for point in &summary.key_points {
        println!("   • {point}");
    }
    Ok(())
}
