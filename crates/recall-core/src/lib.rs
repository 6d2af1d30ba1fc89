//! # recall-core
//!
//! Core types and primitives shared by every crate in the Recall workspace:
//! the unified error type and the conversation turn consumed by the store.

pub mod error;
pub mod turn;

pub use error::{RecallError, Result};
pub use turn::{METADATA_ROLE, Speaker, Turn, parse_timestamp};
