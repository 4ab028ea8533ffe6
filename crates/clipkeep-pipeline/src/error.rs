//! Error types for clipkeep-pipeline.

use std::fmt;

use clipkeep_fetch::FetchError;
use clipkeep_remote::{ClipId, ErrorKind, RemoteError};
use thiserror::Error;

/// The only error that aborts a run: without a listing there is no work.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to list recorded segments: {0}")]
    Listing(#[source] RemoteError),
}

/// Per-segment stage that can fail after listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Request,
    Poll,
    Download,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Request => write!(f, "request"),
            Stage::Poll => write!(f, "poll"),
            Stage::Download => write!(f, "download"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Cause {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("remote generation of clip {clip} failed")]
    Generation { clip: ClipId },

    #[error("clip not ready after {attempts} status checks")]
    TimedOut { attempts: u32 },

    #[error(transparent)]
    Download(#[from] FetchError),

    #[error("cancelled")]
    Cancelled,
}

impl Cause {
    /// Name of the failure class, as shown in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Cause::Remote(err) => match err.kind() {
                ErrorKind::Transport => "TransportError",
                ErrorKind::RequestRejected => "RequestRejected",
            },
            Cause::Generation { .. } => "GenerationFailed",
            Cause::TimedOut { .. } => "TimedOut",
            Cause::Download(err) if err.is_persistence() => "PersistenceError",
            Cause::Download(_) => "TransportError",
            Cause::Cancelled => "Cancelled",
        }
    }
}

/// A segment-scoped failure, tagged with the stage it happened in.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {cause}")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub cause: Cause,
}

impl StageError {
    pub fn new(stage: Stage, cause: impl Into<Cause>) -> Self {
        Self {
            stage,
            cause: cause.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.cause.kind()
    }
}
