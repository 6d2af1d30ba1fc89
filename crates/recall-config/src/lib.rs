//! # recall-config
//!
//! Configuration for the Recall memory store. Reads from `recall.toml` and
//! environment variables, in that precedence order. The resulting config is
//! immutable once the store is constructed.

pub mod schema;
pub mod loader;

pub use schema::RecallConfig;
pub use schema::{ConfigWarning, LoggingConfig, MemoryConfig, WarningSeverity};
pub use loader::ConfigLoader;
