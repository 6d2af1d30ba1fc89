use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration, mapped from `recall.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecallConfig {
    pub memory: MemoryConfig,
    pub logging: LoggingConfig,
}

// ── Memory ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Item count above which the store evicts.
    pub max_memory_items: usize,
    /// Minimum importance (0.0-1.0) a turn needs to be admitted.
    pub compression_threshold: f64,
    /// Fraction of items kept by each eviction pass, in (0, 1].
    pub compression_ratio: f64,
    /// Score lost per day of age during eviction.
    pub age_decay_factor: f64,
    /// Weight of access frequency in the eviction score.
    pub access_frequency_weight: f64,
    /// Default age threshold for `prune`, in days.
    pub retention_days: i64,
    /// Default number of memories returned for contextual queries.
    pub context_limit: usize,
    /// Where memory items are persisted.
    pub memory_file: PathBuf,
    /// Where conversation summaries are persisted.
    pub summary_file: PathBuf,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_memory_items: 1000,
            compression_threshold: 0.3,
            compression_ratio: 0.7,
            age_decay_factor: 0.1,
            access_frequency_weight: 0.3,
            retention_days: 30,
            context_limit: 5,
            memory_file: PathBuf::from("memory/memories.json"),
            summary_file: PathBuf::from("memory/summaries.json"),
        }
    }
}

// ── Logging ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Output format: "pretty", "json", "compact".
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

// ── Validation ─────────────────────────────────────────────────

/// A single config validation issue.
#[derive(Debug)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
    pub severity: WarningSeverity,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.severity {
            WarningSeverity::Error => "error",
            WarningSeverity::Warning => "warning",
            WarningSeverity::Info => "info",
        };
        write!(f, "{}: {}: {}", label, self.field, self.message)?;
        if let Some(ref h) = self.hint {
            write!(f, "\n   hint: {}", h)?;
        }
        Ok(())
    }
}

impl RecallConfig {
    /// Validate the config and return a list of warnings/errors.
    /// Returns `Err` with all messages joined if any severity is Error.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, String> {
        let mut warnings = Vec::new();
        let mem = &self.memory;

        // ── Capacity ───
        if mem.max_memory_items == 0 {
            warnings.push(ConfigWarning {
                field: "memory.max_memory_items".into(),
                message: "max_memory_items is 0, nothing could ever be retained".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 1000".into()),
            });
        }

        // ── Compression ratio ───
        if !(mem.compression_ratio > 0.0 && mem.compression_ratio <= 1.0) {
            warnings.push(ConfigWarning {
                field: "memory.compression_ratio".into(),
                message: format!("ratio {} is out of range", mem.compression_ratio),
                severity: WarningSeverity::Error,
                hint: Some("Must be greater than 0.0 and at most 1.0".into()),
            });
        } else if mem.compression_ratio == 1.0 {
            warnings.push(ConfigWarning {
                field: "memory.compression_ratio".into(),
                message: "ratio 1.0 never shrinks the store".into(),
                severity: WarningSeverity::Warning,
                hint: Some("0.7 keeps the top 70% on each eviction pass".into()),
            });
        }

        // ── Admission threshold ───
        if !(0.0..=1.0).contains(&mem.compression_threshold) {
            warnings.push(ConfigWarning {
                field: "memory.compression_threshold".into(),
                message: format!("threshold {} is out of range", mem.compression_threshold),
                severity: WarningSeverity::Error,
                hint: Some("Importance scores range 0.0-1.0".into()),
            });
        }

        // ── Score weights ───
        if mem.age_decay_factor < 0.0 || !mem.age_decay_factor.is_finite() {
            warnings.push(ConfigWarning {
                field: "memory.age_decay_factor".into(),
                message: format!("decay factor {} must be a non-negative number", mem.age_decay_factor),
                severity: WarningSeverity::Error,
                hint: None,
            });
        }
        if mem.access_frequency_weight < 0.0 || !mem.access_frequency_weight.is_finite() {
            warnings.push(ConfigWarning {
                field: "memory.access_frequency_weight".into(),
                message: format!("weight {} must be a non-negative number", mem.access_frequency_weight),
                severity: WarningSeverity::Error,
                hint: None,
            });
        }

        if mem.retention_days <= 0 {
            warnings.push(ConfigWarning {
                field: "memory.retention_days".into(),
                message: "retention of 0 days prunes every rarely-read memory".into(),
                severity: WarningSeverity::Warning,
                hint: Some("Set to e.g. 30".into()),
            });
        }

        // ── File paths ───
        if mem.memory_file.as_os_str().is_empty() {
            warnings.push(ConfigWarning {
                field: "memory.memory_file".into(),
                message: "memory file path is empty".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 'memory/memories.json'".into()),
            });
        }
        if mem.summary_file.as_os_str().is_empty() {
            warnings.push(ConfigWarning {
                field: "memory.summary_file".into(),
                message: "summary file path is empty".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 'memory/summaries.json'".into()),
            });
        } else if mem.summary_file == mem.memory_file {
            warnings.push(ConfigWarning {
                field: "memory.summary_file".into(),
                message: "summaries and memories share one file and will overwrite each other".into(),
                severity: WarningSeverity::Warning,
                hint: None,
            });
        }

        // ── Logging format ───
        let valid_formats = ["pretty", "json", "compact"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.format".into(),
                message: format!("unknown log format '{}'", self.logging.format),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_formats.join(", "))),
            });
        }

        // ── Logging level ───
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.level".into(),
                message: format!("unknown log level '{}'", self.logging.level),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_levels.join(", "))),
            });
        }

        // Check for hard errors
        let errors: Vec<String> = warnings
            .iter()
            .filter(|w| w.severity == WarningSeverity::Error)
            .map(|w| format!("{}: {}", w.field, w.message))
            .collect();

        if !errors.is_empty() {
            return Err(format!("Configuration errors:\n  • {}", errors.join("\n  • ")));
        }

        Ok(warnings)
    }
}
