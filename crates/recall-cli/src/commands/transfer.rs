use std::path::Path;

use recall_config::MemoryConfig;

use super::open_manager;

pub(super) fn cmd_export(config: &MemoryConfig, path: &Path) -> recall_core::Result<()> {
    let manager = open_manager(config)?;
    manager.export(path)?;
    println!(
        "Exported {} memories and {} summaries to {}",
        manager.store().len(),
        manager.summaries().count(),
        path.display()
    );
    Ok(())
}

/// Merge an export into the configured store and persist the result.
pub(super) fn cmd_import(config: &MemoryConfig, path: &Path) -> recall_core::Result<()> {
    let mut manager = open_manager(config)?;
    let report = manager.import(path)?;
    manager.flush()?;
    println!(
        "Imported {} memories and {} summaries from {}",
        report.memories,
        report.summaries,
        path.display()
    );
    if report.evicted > 0 {
        println!(
            "   Store over capacity after merge, evicted {} and kept {}",
            report.evicted,
            manager.store().len()
        );
    }
    Ok(())
}
