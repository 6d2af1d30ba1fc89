use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use std::path::PathBuf;

use recall_config::{ConfigLoader, MemoryConfig, RecallConfig};
use recall_core::RecallError;
use recall_memory::{CompressionPolicy, MemoryKind, SessionMemoryManager};

mod memory;
mod transfer;

/// Recall: bounded conversational memory with scored eviction
#[derive(Parser)]
#[command(name = "recall", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to recall.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level override (e.g. debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store memories and a summary from a JSON array of turns
    Ingest {
        /// Turn file: [{"role": "human", "content": "...", "timestamp": "..."}, ...]
        file: PathBuf,
        /// Conversation id (a fresh one is generated if omitted)
        #[arg(long)]
        conversation: Option<String>,
        /// Participant name, repeatable (defaults to User and AI)
        #[arg(short, long = "participant")]
        participants: Vec<String>,
    },
    /// Search stored memories by lexical relevance
    Search {
        query: String,
        /// Only return memories of this kind (conversation, fact, preference, emotion, context)
        #[arg(short, long)]
        kind: Option<MemoryKind>,
        /// Maximum number of results (defaults to memory.context_limit)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print memories relevant to a live conversation as prompt context
    Context {
        /// Turn file holding the conversation so far
        file: PathBuf,
        /// Maximum number of memories (defaults to memory.context_limit)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Show store and conversation statistics
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove old, rarely-read memories and old conversation summaries
    Prune {
        /// Age cutoff in days (defaults to memory.retention_days)
        #[arg(short, long)]
        days: Option<i64>,
        /// Only prune when the store is near capacity
        #[arg(long)]
        if_needed: bool,
    },
    /// Export memories, summaries, and statistics to one JSON file
    Export { path: PathBuf },
    /// Merge a previously exported file into the store
    Import { path: PathBuf },
    /// Show the stored summary of one conversation
    Summary {
        conversation_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show current configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show version and build info
    Version,
    /// Generate shell completions for bash, zsh, or fish
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    pub fn run(self) -> recall_core::Result<()> {
        let config_loader = ConfigLoader::load(self.config.as_deref())?;
        let config = config_loader.get();

        // --verbose > --quiet > --log-level > config
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            self.log_level.as_deref().unwrap_or(&config.logging.level)
        };
        init_tracing(log_level, &config.logging.format);

        match self.command {
            Commands::Ingest {
                file,
                conversation,
                participants,
            } => memory::cmd_ingest(&config.memory, &file, conversation, participants),
            Commands::Search {
                query,
                kind,
                limit,
                json,
            } => memory::cmd_search(&config.memory, &query, kind, limit, json),
            Commands::Context { file, limit } => memory::cmd_context(&config.memory, &file, limit),
            Commands::Stats { json } => memory::cmd_stats(&config.memory, json),
            Commands::Prune { days, if_needed } => memory::cmd_prune(&config.memory, days, if_needed),
            Commands::Export { path } => transfer::cmd_export(&config.memory, &path),
            Commands::Import { path } => transfer::cmd_import(&config.memory, &path),
            Commands::Summary {
                conversation_id,
                json,
            } => memory::cmd_summary(&config.memory, &conversation_id, json),
            Commands::Config { json } => Self::cmd_config(&config, json),
            Commands::Version => Self::cmd_version(),
            Commands::Completions { shell } => Self::cmd_completions(shell),
        }
    }

    fn cmd_config(config: &RecallConfig, json: bool) -> recall_core::Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(config)?);
        } else {
            println!(
                "{}",
                toml::to_string_pretty(config).map_err(|e| RecallError::Config(e.to_string()))?
            );
        }
        Ok(())
    }

    fn cmd_version() -> recall_core::Result<()> {
        println!("recall v{}", env!("CARGO_PKG_VERSION"));
        println!("   Target: {}", std::env::consts::ARCH);
        println!("   OS: {}", std::env::consts::OS);
        #[cfg(debug_assertions)]
        println!("   Profile: debug");
        #[cfg(not(debug_assertions))]
        println!("   Profile: release");
        Ok(())
    }

    fn cmd_completions(shell: Shell) -> recall_core::Result<()> {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "recall", &mut std::io::stdout());
        Ok(())
    }
}

/// `RUST_LOG` wins over the resolved level.
fn init_tracing(level: &str, format: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    if format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Scoring and capacity knobs from the `[memory]` section.
pub fn policy_from(config: &MemoryConfig) -> CompressionPolicy {
    CompressionPolicy {
        max_memory_items: config.max_memory_items,
        compression_threshold: config.compression_threshold,
        compression_ratio: config.compression_ratio,
        age_decay_factor: config.age_decay_factor,
        access_frequency_weight: config.access_frequency_weight,
    }
}

fn open_manager(config: &MemoryConfig) -> recall_core::Result<SessionMemoryManager> {
    SessionMemoryManager::open(
        policy_from(config),
        &config.memory_file,
        &config.summary_file,
    )
}
