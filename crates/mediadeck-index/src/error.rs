use mediadeck_shared::MediaId;
use thiserror::Error;

/// A broken link between the id map and a secondary index.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// A secondary bucket lists an id the primary map does not hold.
    #[error("{kind} bucket {key:?} references unknown entry {id}")]
    DanglingMember {
        kind: &'static str,
        key: String,
        id: MediaId,
    },

    /// An indexed entry declares a key whose bucket does not list it.
    #[error("entry {id} is missing from {kind} bucket {key:?}")]
    MissingMember {
        kind: &'static str,
        key: String,
        id: MediaId,
    },

    /// A bucket survived after its last member left.
    #[error("{kind} bucket {key:?} is empty")]
    EmptyBucket { kind: &'static str, key: String },
}
