//! Error types for clipkeep-fetch.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FetchError>;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("clip {0} has no download URL")]
    MissingUrl(String),

    #[error("clip title {0:?} is not a usable file name")]
    InvalidTitle(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("download cancelled")]
    Cancelled,

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FetchError {
    /// Whether the failure happened on the local side rather than the network.
    pub fn is_persistence(&self) -> bool {
        matches!(self, FetchError::Io { .. } | FetchError::InvalidTitle(_))
    }

    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| FetchError::Io { path, source }
    }

    pub(crate) fn network<E: std::error::Error>(err: E) -> Self {
        FetchError::Network(err.to_string())
    }
}
