#[cfg(test)]
mod tests {
    use recall_config::ConfigLoader;
    use recall_config::schema::*;
    use std::io::Write;
    use std::path::PathBuf;

    // ── Default tests ──────────────────────────────────────────

    #[test]
    fn test_memory_config_defaults() {
        let config = MemoryConfig::default();
        assert_eq!(config.max_memory_items, 1000);
        assert_eq!(config.compression_threshold, 0.3);
        assert_eq!(config.compression_ratio, 0.7);
        assert_eq!(config.age_decay_factor, 0.1);
        assert_eq!(config.access_frequency_weight, 0.3);
        assert_eq!(config.retention_days, 30);
        assert_eq!(config.memory_file, PathBuf::from("memory/memories.json"));
        assert_eq!(config.summary_file, PathBuf::from("memory/summaries.json"));
    }

    #[test]
    fn test_logging_config_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, "pretty");
    }

    #[test]
    fn test_defaults_validate_cleanly() {
        let warnings = RecallConfig::default().validate().unwrap();
        assert!(warnings.is_empty());
    }

    // ── TOML roundtrip tests ───────────────────────────────────

    #[test]
    fn test_config_toml_roundtrip() {
        let config = RecallConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let restored: RecallConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(restored.memory.max_memory_items, config.memory.max_memory_items);
        assert_eq!(restored.memory.memory_file, config.memory.memory_file);
        assert_eq!(restored.logging.level, config.logging.level);
    }

    #[test]
    fn test_partial_toml_applies_defaults() {
        let toml_str = r#"
[memory]
max_memory_items = 50
"#;
        let config = ConfigLoader::parse(toml_str).unwrap();
        assert_eq!(config.memory.max_memory_items, 50);
        // Defaults should fill in
        assert_eq!(config.memory.compression_ratio, 0.7);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = ConfigLoader::parse("").unwrap();
        assert_eq!(config.memory.max_memory_items, 1000);
    }

    // ── Validation tests ───────────────────────────────────────

    #[test]
    fn test_zero_capacity_rejected() {
        let mut config = RecallConfig::default();
        config.memory.max_memory_items = 0;
        let err = config.validate().unwrap_err();
        assert!(err.contains("memory.max_memory_items"));
    }

    #[test]
    fn test_ratio_out_of_range_rejected() {
        for ratio in [0.0, -0.5, 1.5, f64::NAN] {
            let mut config = RecallConfig::default();
            config.memory.compression_ratio = ratio;
            let err = config.validate().unwrap_err();
            assert!(err.contains("memory.compression_ratio"), "ratio {ratio}");
        }
    }

    #[test]
    fn test_ratio_of_one_is_a_warning() {
        let mut config = RecallConfig::default();
        config.memory.compression_ratio = 1.0;
        let warnings = config.validate().unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].severity, WarningSeverity::Warning);
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let mut config = RecallConfig::default();
        config.memory.compression_threshold = 1.2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_weights_rejected() {
        let mut config = RecallConfig::default();
        config.memory.age_decay_factor = -0.1;
        config.memory.access_frequency_weight = -1.0;
        let err = config.validate().unwrap_err();
        assert!(err.contains("age_decay_factor"));
        assert!(err.contains("access_frequency_weight"));
    }

    #[test]
    fn test_shared_file_is_a_warning() {
        let mut config = RecallConfig::default();
        config.memory.summary_file = config.memory.memory_file.clone();
        let warnings = config.validate().unwrap();
        assert!(warnings.iter().any(|w| w.field == "memory.summary_file"));
    }

    #[test]
    fn test_unknown_log_format_is_a_warning() {
        let mut config = RecallConfig::default();
        config.logging.format = "xml".into();
        let warnings = config.validate().unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].to_string().contains("logging.format"));
    }

    // ── Loader tests ───────────────────────────────────────────

    #[test]
    fn test_resolve_path_explicit_wins() {
        let explicit = PathBuf::from("/tmp/custom.toml");
        assert_eq!(ConfigLoader::resolve_path(Some(&explicit)), explicit);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recall.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "[memory]\nmax_memory_items = 10\ncompression_ratio = 0.5").unwrap();
        drop(f);

        let loader = ConfigLoader::load(Some(&path)).unwrap();
        let config = loader.get();
        assert_eq!(config.memory.compression_ratio, 0.5);
        assert_eq!(loader.path(), path.as_path());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let loader = ConfigLoader::load(Some(&path)).unwrap();
        assert_eq!(loader.get().memory.compression_threshold, 0.3);
    }

    #[test]
    fn test_load_invalid_toml_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[memory\nmax_memory_items = ").unwrap();
        let err = ConfigLoader::load(Some(&path)).err().unwrap();
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn test_load_invalid_values_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invalid.toml");
        std::fs::write(&path, "[memory]\ncompression_ratio = 2.0\n").unwrap();
        let err = ConfigLoader::load(Some(&path)).err().unwrap();
        assert!(err.to_string().contains("compression_ratio"));
    }
}
