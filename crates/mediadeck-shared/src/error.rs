use thiserror::Error;

/// Why a provider timestamp could not be turned into a point in time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error("Timestamp is empty")]
    Empty,

    #[error("Unrecognised timestamp format: {0:?}")]
    Unrecognised(String),
}
