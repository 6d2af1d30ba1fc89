//! # recall-cli
//!
//! Command-line interface for the Recall memory store.
//!
//! ## Commands
//!
//! - `recall ingest`: Store memories and a summary from a conversation file
//! - `recall search`: Lexical relevance search over stored memories
//! - `recall context`: Render memories relevant to a live conversation
//! - `recall stats`: Store and conversation statistics
//! - `recall prune`: Drop old, rarely-read memories and old summaries
//! - `recall export` / `recall import`: Move memory data between stores
//! - `recall summary`: Show one conversation summary
//! - `recall config`: Show the effective configuration

pub mod commands;

pub use commands::Cli;
