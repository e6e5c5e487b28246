//! # mediadeck-shared
//!
//! Record types and helpers shared by every Mediadeck crate: the
//! [`MediaEntry`] post model, the [`PromptEntry`] generation record, timestamp
//! parsing, and the well-known label constants.

pub mod constants;
pub mod error;
pub mod time;
pub mod types;

pub use error::TimestampError;
pub use types::{MediaEntry, MediaId, PromptEntry};
