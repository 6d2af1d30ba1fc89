//! On-disk formats and crash-safe JSON writes.
//!
//! Every file is rewritten in full through a temporary sibling file that is
//! renamed over the destination only after the bytes are flushed to disk.
//! A failed write leaves the previous file intact and the temporary removed.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use recall_core::{RecallError, Result};

use crate::item::{ConversationSummary, MemoryItem};

/// Format version written into every file header.
pub const FORMAT_VERSION: &str = "1.0";

/// Header shared by the memory and summary files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetadata {
    pub version: String,
    #[serde(with = "iso")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_memories: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_summaries: Option<usize>,
}

impl FileMetadata {
    fn now() -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            created_at: Utc::now(),
            total_memories: None,
            total_summaries: None,
        }
    }

    pub fn for_memories(count: usize) -> Self {
        Self {
            total_memories: Some(count),
            ..Self::now()
        }
    }

    pub fn for_summaries(count: usize) -> Self {
        Self {
            total_summaries: Some(count),
            ..Self::now()
        }
    }
}

/// `{metadata, memories: [...]}`
#[derive(Debug, Serialize, Deserialize)]
pub struct MemoryFile {
    #[serde(default)]
    pub metadata: Option<FileMetadata>,
    #[serde(default)]
    pub memories: Vec<MemoryItem>,
}

/// `{metadata, summaries: [...]}`
#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryFile {
    #[serde(default)]
    pub metadata: Option<FileMetadata>,
    #[serde(default)]
    pub summaries: Vec<ConversationSummary>,
}

/// Serialize `value` as pretty JSON and atomically replace `path` with it.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let dir = parent_dir(path);
    std::fs::create_dir_all(&dir).map_err(|e| persistence_error(path, e))?;

    let bytes = serde_json::to_vec_pretty(value)?;

    // Dropping `tmp` on any early return deletes the temporary file.
    let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| persistence_error(path, e))?;
    tmp.write_all(&bytes).map_err(|e| persistence_error(path, e))?;
    tmp.as_file().sync_all().map_err(|e| persistence_error(path, e))?;
    tmp.persist(path).map_err(|e| persistence_error(path, e.error))?;
    Ok(())
}

/// Read and deserialize a JSON document.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read(path)?;
    Ok(serde_json::from_slice(&raw)?)
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn persistence_error(path: &Path, err: std::io::Error) -> RecallError {
    RecallError::Persistence {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

/// ISO-8601 timestamps. Reads offset-less values as UTC.
pub mod iso {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        recall_core::parse_timestamp(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'")))
    }
}

/// Optional ISO-8601 timestamps, `null` when absent.
pub mod iso_opt {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => s.serialize_str(&ts.to_rfc3339()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(d)? {
            None => Ok(None),
            Some(raw) => recall_core::parse_timestamp(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'"))),
        }
    }
}
