use chrono::Local;
use clipkeep_fetch::{ClipDownloader, DownloadResult, FetchError, HttpClient};
use clipkeep_remote::{CameraConfig, CameraService, ClipRequest, RecordedSegment};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info, info_span, warn};

use crate::data::{Archived, Outcome, PollPolicy, Removal, RunSummary, SegmentReport, SkipReason};
use crate::error::{Cause, PipelineError, Stage, StageError};
use crate::poller::ClipPoller;

/// Drives every listed segment through request, poll, download and delete.
///
/// Segments are processed strictly one after another. Nothing is shared
/// between segments except the run configuration.
pub struct Pipeline<S: CameraService, C: HttpClient> {
    service: S,
    downloader: ClipDownloader<C>,
    poller: ClipPoller,
    cancel: CancellationToken,
}

impl<S: CameraService, C: HttpClient> Pipeline<S, C> {
    pub fn new(service: S, downloader: ClipDownloader<C>) -> Self {
        let cancel = CancellationToken::new();
        Self {
            service,
            downloader: downloader.with_cancellation(cancel.clone()),
            poller: ClipPoller::default(),
            cancel,
        }
    }

    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.poller = ClipPoller::new(policy);
        self
    }

    /// Observe `cancel` between segments, while waiting between status checks
    /// and during downloads.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.downloader = self.downloader.with_cancellation(cancel.clone());
        self.cancel = cancel;
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// List segments and archive each of them.
    ///
    /// Only a listing failure aborts the run.
    pub async fn run(&self, config: &CameraConfig) -> Result<RunSummary, PipelineError> {
        let segments = self
            .service
            .list_segments(config)
            .await
            .map_err(PipelineError::Listing)?;
        info!(count = segments.len(), threshold = config.threshold, "segments discovered");

        let mut summary = RunSummary::default();
        for (index, segment) in segments.iter().enumerate() {
            if self.cancel.is_cancelled() {
                summary.cancelled = true;
                summary.unprocessed = segments.len() - index;
                warn!(unprocessed = summary.unprocessed, "run cancelled");
                break;
            }

            let span = info_span!("segment", start = segment.start(), end = segment.end());
            let outcome = self.process(config, segment).instrument(span).await;
            summary.reports.push(SegmentReport {
                segment: *segment,
                outcome,
            });
        }

        if !summary.cancelled && self.cancel.is_cancelled() {
            summary.cancelled = true;
        }

        info!(
            processed = summary.processed(),
            archived = summary.archived().count(),
            failed = summary.failures().count(),
            skipped = summary.skipped(),
            "run finished"
        );
        Ok(summary)
    }

    /// Archive one segment, recording any failure against it.
    pub async fn process(&self, config: &CameraConfig, segment: &RecordedSegment) -> Outcome {
        if !segment.has_video() {
            info!("segment has no video, skipping");
            return Outcome::Skipped(SkipReason::NoVideo);
        }

        match self.archive(config, segment).await {
            Ok(archived) => Outcome::Archived(archived),
            Err(err) => {
                warn!(
                    start = segment.start(),
                    end = segment.end(),
                    stage = %err.stage,
                    kind = err.kind(),
                    error = %err,
                    "segment failed"
                );
                Outcome::Failed(err)
            }
        }
    }

    async fn archive(&self, config: &CameraConfig, segment: &RecordedSegment) -> Result<Archived, StageError> {
        let request = ClipRequest::for_segment(segment, &Local)
            .map_err(|e| StageError::new(Stage::Request, e))?;

        // Submitted at most once: a repeat would start a second remote job.
        let requested = self
            .service
            .request_clip(config, &request)
            .await
            .map_err(|e| StageError::new(Stage::Request, e))?;
        info!(
            clip = %requested.id,
            title = %request.title,
            duration = request.duration_seconds,
            "clip requested"
        );

        let ready = self
            .poller
            .wait_ready(&self.service, config, &requested, &self.cancel)
            .await
            .map_err(|cause| StageError::new(Stage::Poll, cause))?;

        // The file stem comes from the segment start, never from the server's title.
        let (path, bytes) = match self.downloader.download(&ready, &request.title).await {
            DownloadResult::Saved { path, bytes } => (path, bytes),
            DownloadResult::Failed(err) => {
                warn!(clip = %ready.id, "remote clip kept because the local copy failed");
                let cause = match err {
                    FetchError::Cancelled => Cause::Cancelled,
                    err => Cause::Download(err),
                };
                return Err(StageError::new(Stage::Download, cause));
            }
        };

        let removal = match self.service.delete_clip(config, &ready.id).await {
            Ok(status) => {
                info!(clip = %ready.id, %status, "deleted");
                Removal::Deleted(status)
            }
            Err(err) => {
                warn!(clip = %ready.id, error = %err, "remote clip could not be deleted");
                Removal::Leaked(err)
            }
        };

        Ok(Archived {
            clip: ready.id,
            path,
            bytes,
            removal,
        })
    }
}
