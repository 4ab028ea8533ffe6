use std::path::{Path, PathBuf};

use crate::error::FetchError;

/// Outcome of one clip download.
///
/// Only [`DownloadResult::Saved`] licenses deleting the remote clip.
#[derive(Debug)]
pub enum DownloadResult {
    Saved { path: PathBuf, bytes: u64 },
    Failed(FetchError),
}

impl DownloadResult {
    pub fn success(&self) -> bool {
        matches!(self, DownloadResult::Saved { .. })
    }

    pub fn local_path(&self) -> Option<&Path> {
        match self {
            DownloadResult::Saved { path, .. } => Some(path),
            DownloadResult::Failed(_) => None,
        }
    }
}
