use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Role string the agent layer uses for bookkeeping entries. Never classified.
pub const METADATA_ROLE: &str = "metadata";

/// A single conversational turn handed to the store by the agent layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: String,
    #[serde(default)]
    pub content: String,
    /// When the turn happened. Accepts ISO-8601 strings or Unix epoch seconds.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_timestamp"
    )]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Who produced a turn, derived from the free-form role string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
    Metadata,
    Other,
}

impl Turn {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            timestamp: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("human", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("ai", content)
    }

    pub fn metadata(content: impl Into<String>) -> Self {
        Self::new(METADATA_ROLE, content)
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Classify the role. `human`/`user` and `ai`/`assistant` are synonyms.
    pub fn speaker(&self) -> Speaker {
        match self.role.to_ascii_lowercase().as_str() {
            "human" | "user" => Speaker::User,
            "ai" | "assistant" => Speaker::Assistant,
            METADATA_ROLE => Speaker::Metadata,
            _ => Speaker::Other,
        }
    }

    pub fn is_metadata(&self) -> bool {
        self.speaker() == Speaker::Metadata
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(String),
    Epoch(f64),
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawTimestamp> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(RawTimestamp::Text(s)) => parse_timestamp(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{s}'"))),
        Some(RawTimestamp::Epoch(secs)) => {
            let millis = (secs * 1000.0).round() as i64;
            Utc.timestamp_millis_opt(millis)
                .single()
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("epoch out of range: {secs}")))
        }
    }
}

/// Parse an ISO-8601 timestamp. Values without an offset are taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}
