use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::schema::RecallConfig;

/// Loads the Recall configuration once at startup.
pub struct ConfigLoader {
    config: RecallConfig,
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Resolve the config path: explicit path > RECALL_CONFIG env > ~/.recall/recall.toml
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var("RECALL_CONFIG") {
            return PathBuf::from(p);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".recall")
            .join("recall.toml")
    }

    /// Load the config from disk, falling back to defaults.
    pub fn load(path: Option<&Path>) -> recall_core::Result<Self> {
        let config_path = Self::resolve_path(path);
        let config = if config_path.exists() {
            info!(?config_path, "loading configuration");
            let raw = std::fs::read_to_string(&config_path)?;
            Self::parse(&raw).map_err(|e| {
                recall_core::RecallError::Config(format!(
                    "failed to parse {}: {}",
                    config_path.display(),
                    e
                ))
            })?
        } else {
            warn!(?config_path, "config file not found, using defaults");
            RecallConfig::default()
        };

        let config = Self::apply_env_overrides(config);

        // Warnings are logged, errors abort
        match config.validate() {
            Ok(warnings) => {
                for w in &warnings {
                    warn!("{}", w);
                }
            }
            Err(e) => {
                return Err(recall_core::RecallError::Config(e));
            }
        }

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Parse a TOML document into a config without touching the environment.
    pub fn parse(raw: &str) -> Result<RecallConfig, toml::de::Error> {
        toml::from_str::<RecallConfig>(raw)
    }

    /// Get a snapshot of the loaded config.
    pub fn get(&self) -> RecallConfig {
        self.config.clone()
    }

    /// Path the config was resolved from (may not exist).
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Apply env var overrides (RECALL_LOG_LEVEL, RECALL_MAX_MEMORY_ITEMS, etc.)
    fn apply_env_overrides(mut config: RecallConfig) -> RecallConfig {
        if let Ok(v) = std::env::var("RECALL_LOG_LEVEL") {
            config.logging.level = v;
        }
        if let Ok(v) = std::env::var("RECALL_MAX_MEMORY_ITEMS") {
            match v.parse::<usize>() {
                Ok(max) => config.memory.max_memory_items = max,
                Err(_) => warn!(value = %v, "ignoring non-numeric RECALL_MAX_MEMORY_ITEMS"),
            }
        }
        if let Ok(v) = std::env::var("RECALL_MEMORY_FILE") {
            config.memory.memory_file = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("RECALL_SUMMARY_FILE") {
            config.memory.summary_file = PathBuf::from(v);
        }
        config
    }
}
