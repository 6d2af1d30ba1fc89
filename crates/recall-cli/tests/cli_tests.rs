#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use recall_cli::Cli;
    use recall_cli::commands::policy_from;
    use recall_config::MemoryConfig;
    use recall_memory::CompressionPolicy;

    #[test]
    fn test_command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ingest_with_participants() {
        let parsed = Cli::try_parse_from([
            "recall",
            "ingest",
            "turns.json",
            "--conversation",
            "conv_1",
            "-p",
            "Ann",
            "-p",
            "Bot",
        ]);
        assert!(parsed.is_ok());
    }

    #[test]
    fn test_parse_search_kind() {
        assert!(Cli::try_parse_from(["recall", "search", "tea", "--kind", "preference", "-n", "3"]).is_ok());
        assert!(Cli::try_parse_from(["recall", "search", "tea", "--kind", "Fact"]).is_ok());
        assert!(Cli::try_parse_from(["recall", "search", "tea", "--kind", "gossip"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        assert!(Cli::try_parse_from(["recall", "stats", "--json", "-v"]).is_ok());
        assert!(Cli::try_parse_from(["recall", "stats", "--config", "x.toml", "--log-level", "warn"]).is_ok());
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["recall", "stats", "--verbose", "--quiet"]).is_err());
    }

    #[test]
    fn test_missing_subcommand_is_an_error() {
        assert!(Cli::try_parse_from(["recall"]).is_err());
    }

    #[test]
    fn test_default_config_maps_to_default_policy() {
        assert_eq!(policy_from(&MemoryConfig::default()), CompressionPolicy::default());
    }

    #[test]
    fn test_policy_follows_config() {
        let config = MemoryConfig {
            max_memory_items: 50,
            compression_ratio: 0.5,
            ..MemoryConfig::default()
        };
        let policy = policy_from(&config);
        assert_eq!(policy.max_memory_items, 50);
        assert_eq!(policy.compression_ratio, 0.5);
        assert!(policy.validate().is_ok());
    }
}
