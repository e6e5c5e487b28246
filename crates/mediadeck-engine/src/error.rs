use mediadeck_index::IndexError;
use mediadeck_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("History store error: {0}")]
    Store(#[from] StoreError),

    #[error("Index inconsistency: {0}")]
    Index(#[from] IndexError),

    /// The data provider failed to deliver a page.
    #[error("Provider error: {0:#}")]
    Provider(anyhow::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
