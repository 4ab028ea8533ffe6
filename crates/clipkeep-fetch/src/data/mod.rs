//! Immutable data types for clip downloads.

pub mod options;
pub mod progress;
pub mod result;

pub use options::DownloadOptions;
pub use progress::{FetchPhase, Progress};
pub use result::DownloadResult;
