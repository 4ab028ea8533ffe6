use std::fmt;

/// Phases of a single clip download.
///
/// Downloads progress through these phases in order:
/// Connecting → Downloading → Completed, or end in Failed at any point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPhase {
    /// Request sent, waiting for the response headers.
    #[default]
    Connecting,

    /// Streaming the body into the destination file.
    Downloading,

    /// File written and synced.
    Completed,

    /// The download ended without a complete file. Byte counts are not reported.
    Failed,
}

impl fmt::Display for FetchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchPhase::Connecting => write!(f, "Connecting"),
            FetchPhase::Downloading => write!(f, "Downloading"),
            FetchPhase::Completed => write!(f, "Completed"),
            FetchPhase::Failed => write!(f, "Failed"),
        }
    }
}

/// Progress snapshot handed to the progress callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub phase: FetchPhase,

    /// Bytes written to the destination file so far.
    pub bytes_downloaded: u64,

    /// Total expected bytes, if the server sent a Content-Length.
    pub total_bytes: Option<u64>,
}
