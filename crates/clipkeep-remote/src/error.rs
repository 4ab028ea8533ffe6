//! Error types for clipkeep-remote.

use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RemoteError>;

/// The four request shapes the camera service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    ListAvailable,
    CreateClip,
    ClipStatus,
    DeleteClip,
}

impl Endpoint {
    /// Whether repeating the call has no additional remote effect.
    ///
    /// Creating a clip starts a new generation job on every call.
    pub fn is_idempotent(self) -> bool {
        !matches!(self, Endpoint::CreateClip)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::ListAvailable => write!(f, "get_available"),
            Endpoint::CreateClip => write!(f, "clips.request"),
            Endpoint::ClipStatus => write!(f, "clips.get"),
            Endpoint::DeleteClip => write!(f, "clips.delete"),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// The service was unreachable or answered with a non-success status.
    #[error("{endpoint}: transport failure: {reason}")]
    Transport {
        endpoint: Endpoint,
        reason: String,
        transient: bool,
    },

    /// The service answered, but the response was not what the endpoint promises.
    #[error("{endpoint}: request rejected: {reason}")]
    Rejected { endpoint: Endpoint, reason: String },
}

/// Coarse classification used in failure reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    RequestRejected,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Transport => write!(f, "TransportError"),
            ErrorKind::RequestRejected => write!(f, "RequestRejected"),
        }
    }
}

impl RemoteError {
    pub fn transport(endpoint: Endpoint, reason: impl Into<String>, transient: bool) -> Self {
        Self::Transport {
            endpoint,
            reason: reason.into(),
            transient,
        }
    }

    pub fn rejected(endpoint: Endpoint, reason: impl Into<String>) -> Self {
        Self::Rejected {
            endpoint,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RemoteError::Transport { .. } => ErrorKind::Transport,
            RemoteError::Rejected { .. } => ErrorKind::RequestRejected,
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        match self {
            RemoteError::Transport { endpoint, .. } | RemoteError::Rejected { endpoint, .. } => {
                *endpoint
            }
        }
    }

    /// Transient failures are worth retrying on idempotent endpoints.
    pub fn is_transient(&self) -> bool {
        matches!(self, RemoteError::Transport { transient: true, .. })
    }

    pub(crate) fn from_reqwest(endpoint: Endpoint, err: reqwest::Error) -> Self {
        let transient = err.is_timeout()
            || err.is_connect()
            || err.status().is_some_and(is_transient_status);
        Self::transport(endpoint, err.to_string(), transient)
    }

    pub(crate) fn from_status(endpoint: Endpoint, status: reqwest::StatusCode) -> Self {
        Self::transport(endpoint, format!("HTTP {status}"), is_transient_status(status))
    }
}

fn is_transient_status(status: reqwest::StatusCode) -> bool {
    status.is_server_error()
        || status == reqwest::StatusCode::REQUEST_TIMEOUT
        || status == reqwest::StatusCode::TOO_MANY_REQUESTS
}
