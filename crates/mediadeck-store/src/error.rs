use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the snapshot directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot file is not valid JSON or has the wrong shape.
    #[error("Snapshot format error: {0}")]
    Json(#[from] serde_json::Error),

    /// The snapshot was written by a newer, incompatible format.
    #[error("Unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// Renaming the temporary snapshot into place failed.
    #[error("Failed to persist snapshot: {0}")]
    Persist(#[from] tempfile::PersistError),

    /// The in-memory store's lock was poisoned by a panicking writer.
    #[error("Snapshot store lock poisoned")]
    Poisoned,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
