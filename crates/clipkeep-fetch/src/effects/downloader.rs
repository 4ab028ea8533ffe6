use std::path::{Path, PathBuf};

use clipkeep_remote::ClipHandle;
use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::data::{DownloadOptions, DownloadResult, FetchPhase, Progress};
use crate::effects::http::{Body, HttpClient};
use crate::error::{FetchError, Result};

/// Saves a generated clip as `<output_dir>/<title>.<extension>`.
///
/// The title is supplied by the caller, not taken from the remote record.
/// An existing file of the same name is overwritten, so re-running over the
/// same segment is harmless. A transfer that fails midway leaves the partial
/// file in place; the failure is logged with its path.
pub struct ClipDownloader<C: HttpClient> {
    client: C,
    options: DownloadOptions,
    cancel: CancellationToken,
}

impl<C: HttpClient> ClipDownloader<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            options: DownloadOptions::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_options(mut self, options: DownloadOptions) -> Self {
        self.options = options;
        self
    }

    /// Abort the connect and the body transfer once `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Local path a clip with `title` is written to.
    pub fn destination(&self, title: &str) -> Result<PathBuf> {
        let usable = !title.is_empty()
            && title != "."
            && title != ".."
            && !title.contains(['/', '\\', '\0']);
        if !usable {
            return Err(FetchError::InvalidTitle(title.to_string()));
        }

        Ok(self
            .options
            .output_dir
            .join(format!("{title}.{}", self.options.extension)))
    }

    /// Download a clip that has finished generating into `<title>.<extension>`.
    ///
    /// Never returns an error: failures are reported as [`DownloadResult::Failed`].
    pub async fn download(&self, handle: &ClipHandle, title: &str) -> DownloadResult {
        match self.try_download(handle, title).await {
            Ok((path, bytes)) => {
                info!(clip = %handle.id, path = %path.display(), bytes, "downloaded");
                DownloadResult::Saved { path, bytes }
            }
            Err(err) => {
                warn!(clip = %handle.id, error = %err, "download failed");
                self.report_progress(Progress {
                    phase: FetchPhase::Failed,
                    bytes_downloaded: 0,
                    total_bytes: None,
                });
                DownloadResult::Failed(err)
            }
        }
    }

    async fn try_download(&self, handle: &ClipHandle, title: &str) -> Result<(PathBuf, u64)> {
        let url = handle
            .download_url
            .as_deref()
            .ok_or_else(|| FetchError::MissingUrl(handle.id.to_string()))?;
        let destination = self.destination(title)?;

        self.report_progress(Progress {
            phase: FetchPhase::Connecting,
            bytes_downloaded: 0,
            total_bytes: None,
        });
        info!(clip = %handle.id, url, "downloading");

        let body = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(FetchError::Cancelled),
            body = self.client.stream(url) => body.map_err(FetchError::network)?,
        };

        tokio::fs::create_dir_all(&self.options.output_dir)
            .await
            .map_err(FetchError::io(&self.options.output_dir))?;
        let mut file = File::create(&destination)
            .await
            .map_err(FetchError::io(&destination))?;

        let written = self.write_body(body, &mut file, &destination).await;
        if let Err(ref err) = written {
            warn!(
                path = %destination.display(),
                error = %err,
                "transfer interrupted; partial file left in place"
            );
        }
        let bytes_downloaded = written?;

        Ok((destination, bytes_downloaded))
    }

    async fn write_body(&self, body: Body<C::Error>, file: &mut File, destination: &Path) -> Result<u64> {
        let total_bytes = body.content_length;
        let mut chunks = body.chunks;
        let mut bytes_downloaded = 0u64;

        self.report_progress(Progress {
            phase: FetchPhase::Downloading,
            bytes_downloaded,
            total_bytes,
        });

        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(FetchError::Cancelled),
                next = chunks.next() => next,
            };
            let Some(chunk) = next else { break };
            let chunk = chunk.map_err(FetchError::network)?;
            file.write_all(&chunk)
                .await
                .map_err(FetchError::io(destination))?;
            bytes_downloaded += chunk.len() as u64;

            self.report_progress(Progress {
                phase: FetchPhase::Downloading,
                bytes_downloaded,
                total_bytes,
            });
        }

        file.flush().await.map_err(FetchError::io(destination))?;
        file.sync_all().await.map_err(FetchError::io(destination))?;

        self.report_progress(Progress {
            phase: FetchPhase::Completed,
            bytes_downloaded,
            total_bytes,
        });

        Ok(bytes_downloaded)
    }

    fn report_progress(&self, progress: Progress) {
        if let Some(ref callback) = self.options.on_progress {
            callback(&progress);
        }
    }
}
