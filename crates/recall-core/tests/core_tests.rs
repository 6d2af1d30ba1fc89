#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use recall_core::*;

    // ── Turn tests ─────────────────────────────────────────────

    #[test]
    fn test_turn_constructors() {
        let turn = Turn::user("hello");
        assert_eq!(turn.role, "human");
        assert_eq!(turn.content, "hello");
        assert!(turn.timestamp.is_none());
        assert_eq!(turn.speaker(), Speaker::User);
        assert_eq!(Turn::assistant("hi").speaker(), Speaker::Assistant);
        assert!(Turn::metadata("{}").is_metadata());
    }

    #[test]
    fn test_speaker_synonyms() {
        assert_eq!(Turn::new("user", "x").speaker(), Speaker::User);
        assert_eq!(Turn::new("Assistant", "x").speaker(), Speaker::Assistant);
        assert_eq!(Turn::new("METADATA", "x").speaker(), Speaker::Metadata);
        assert_eq!(Turn::new("tool", "x").speaker(), Speaker::Other);
    }

    #[test]
    fn test_turn_deserialize_iso_timestamp() {
        let json = r#"{"role":"human","content":"hi","timestamp":"2024-03-01T10:15:00Z"}"#;
        let turn: Turn = serde_json::from_str(json).unwrap();
        assert_eq!(
            turn.timestamp,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 0).unwrap())
        );
    }

    #[test]
    fn test_turn_deserialize_naive_timestamp_as_utc() {
        let json = r#"{"role":"ai","content":"ok","timestamp":"2024-03-01T10:15:00.250000"}"#;
        let turn: Turn = serde_json::from_str(json).unwrap();
        let ts = turn.timestamp.unwrap();
        assert_eq!(ts.timestamp(), Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 0).unwrap().timestamp());
        assert_eq!(ts.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_turn_deserialize_epoch_timestamp() {
        let json = r#"{"role":"human","content":"hi","timestamp":1700000000.5}"#;
        let turn: Turn = serde_json::from_str(json).unwrap();
        let ts = turn.timestamp.unwrap();
        assert_eq!(ts.timestamp(), 1_700_000_000);
        assert_eq!(ts.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn test_turn_missing_optional_fields() {
        let turn: Turn = serde_json::from_str(r#"{"role":"human"}"#).unwrap();
        assert!(turn.content.is_empty());
        assert!(turn.timestamp.is_none());
    }

    #[test]
    fn test_turn_rejects_garbage_timestamp() {
        let json = r#"{"role":"human","content":"hi","timestamp":"yesterday-ish"}"#;
        assert!(serde_json::from_str::<Turn>(json).is_err());
    }

    #[test]
    fn test_turn_serde_roundtrip() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let turn = Turn::user("round trip").with_timestamp(ts);
        let json = serde_json::to_string(&turn).unwrap();
        let restored: Turn = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, turn);
    }

    #[test]
    fn test_parse_timestamp_variants() {
        assert!(parse_timestamp("2024-01-02T03:04:05+08:00").is_some());
        assert!(parse_timestamp("2024-01-02 03:04:05").is_some());
        assert!(parse_timestamp("not a date").is_none());
    }

    // ── Error tests ────────────────────────────────────────────

    #[test]
    fn test_error_display() {
        let err = RecallError::Memory("something broke".into());
        assert!(err.to_string().contains("something broke"));
    }

    #[test]
    fn test_validation_error_display() {
        let err = RecallError::invalid("compression_ratio", "must be in (0, 1]");
        let msg = err.to_string();
        assert!(msg.contains("compression_ratio"));
        assert!(msg.contains("(0, 1]"));
    }

    #[test]
    fn test_persistence_error_names_path() {
        let err = RecallError::Persistence {
            path: "/tmp/memories.json".into(),
            reason: "disk full".into(),
        };
        assert!(err.to_string().contains("/tmp/memories.json"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: RecallError = io.into();
        assert!(matches!(err, RecallError::Io(_)));
    }
}
