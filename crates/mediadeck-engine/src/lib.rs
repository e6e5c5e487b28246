//! Client-side media library engine.
//!
//! [`MediaLibrary`] ties the components together: the multi-key post index,
//! the month timeline, the viewer cursor, the thumbnail cache, the staging
//! queue and the persisted prompt history. The component crates are
//! re-exported so hosts only need to depend on this one.

pub mod config;
pub mod library;
pub mod provider;
pub mod telemetry;

mod error;

pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use library::MediaLibrary;
pub use provider::{MediaPage, MediaProvider};
pub use telemetry::init_tracing;

pub use mediadeck_buffers as buffers;
pub use mediadeck_index as index;
pub use mediadeck_shared as shared;
pub use mediadeck_store as store;
