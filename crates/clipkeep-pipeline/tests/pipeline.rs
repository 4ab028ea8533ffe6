//! End-to-end pipeline behaviour against scripted in-memory fakes.

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use chrono::Local;
use clipkeep_fetch::{Body, ClipDownloader, DownloadOptions, HttpClient};
use clipkeep_pipeline::{
    Cause, Outcome, Pipeline, PipelineError, PollPolicy, Removal, SkipReason, Stage,
};
use clipkeep_remote::{
    CameraConfig, CameraService, ClipHandle, ClipId, ClipRequest, Endpoint, Endpoints,
    RecordedSegment, RemoteError, clip_title,
};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    List,
    Request(ClipRequest),
    Status(ClipId),
    Delete(ClipId),
}

/// Remote service double with a mutable clip store.
///
/// Deleting a clip removes the segment it was requested for from later
/// listings, as the real service does once the recording is archived.
#[derive(Default)]
struct FakeService {
    segments: Mutex<Vec<RecordedSegment>>,
    list_error: Mutex<Option<RemoteError>>,
    requests: Mutex<VecDeque<Result<ClipHandle, RemoteError>>>,
    statuses: Mutex<VecDeque<Result<ClipHandle, RemoteError>>>,
    deletions: Mutex<VecDeque<Result<String, RemoteError>>>,
    requested_starts: Mutex<HashMap<ClipId, i64>>,
    cancel_on_status: Mutex<Option<CancellationToken>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeService {
    fn with_segments(segments: Vec<RecordedSegment>) -> Self {
        let service = Self::default();
        *service.segments.lock().unwrap() = segments;
        service
    }

    fn push_request(&self, response: Result<ClipHandle, RemoteError>) -> &Self {
        self.requests.lock().unwrap().push_back(response);
        self
    }

    fn push_status(&self, response: Result<ClipHandle, RemoteError>) -> &Self {
        self.statuses.lock().unwrap().push_back(response);
        self
    }

    fn push_deletion(&self, response: Result<String, RemoteError>) -> &Self {
        self.deletions.lock().unwrap().push_back(response);
        self
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| matches(c)).count()
    }
}

impl CameraService for FakeService {
    async fn list_segments(&self, _config: &CameraConfig) -> Result<Vec<RecordedSegment>, RemoteError> {
        self.calls.lock().unwrap().push(Call::List);
        if let Some(err) = self.list_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.segments.lock().unwrap().clone())
    }

    async fn request_clip(
        &self,
        _config: &CameraConfig,
        request: &ClipRequest,
    ) -> Result<ClipHandle, RemoteError> {
        self.calls.lock().unwrap().push(Call::Request(request.clone()));
        let response = self
            .requests
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(pending(&format!("clip-{}", request.start_time))));
        if let Ok(ref handle) = response {
            self.requested_starts
                .lock()
                .unwrap()
                .insert(handle.id.clone(), request.start_time);
        }
        response
    }

    async fn clip_status(&self, _config: &CameraConfig, id: &ClipId) -> Result<ClipHandle, RemoteError> {
        self.calls.lock().unwrap().push(Call::Status(id.clone()));
        if let Some(token) = self.cancel_on_status.lock().unwrap().as_ref() {
            token.cancel();
        }
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ready(&id.0)))
    }

    async fn delete_clip(&self, _config: &CameraConfig, id: &ClipId) -> Result<String, RemoteError> {
        self.calls.lock().unwrap().push(Call::Delete(id.clone()));
        let response = self
            .deletions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("ok".to_string()));
        if response.is_ok() {
            if let Some(start) = self.requested_starts.lock().unwrap().get(id).copied() {
                self.segments.lock().unwrap().retain(|s| s.start() != start);
            }
        }
        response
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct TestError(String);

#[derive(Clone, Default)]
struct FakeHttp {
    fail: bool,
    fetched: Arc<Mutex<Vec<String>>>,
}

impl HttpClient for FakeHttp {
    type Error = TestError;

    async fn stream(&self, url: &str) -> Result<Body<TestError>, TestError> {
        self.fetched.lock().unwrap().push(url.to_string());
        if self.fail {
            return Err(TestError("connection refused".into()));
        }
        let chunks = vec![Ok(Bytes::from_static(b"ftyp")), Ok(Bytes::from_static(b"mdat"))];
        Ok(Body {
            content_length: Some(8),
            chunks: Box::pin(futures_util::stream::iter(chunks)),
        })
    }
}

fn config() -> CameraConfig {
    CameraConfig {
        camera_id: "CAMERA_ID".into(),
        uuid: "CAMERA_UUID".into(),
        cookie: "user_token=abc".into(),
        threshold: 1651804500,
        endpoints: Endpoints::default(),
    }
}

fn segment(start: i64, end: i64) -> RecordedSegment {
    RecordedSegment::new(start, end, true).unwrap()
}

fn pending(id: &str) -> ClipHandle {
    ClipHandle {
        id: ClipId::from(id),
        title: "title".into(),
        is_generated: false,
        is_error: false,
        download_url: None,
    }
}

fn ready(id: &str) -> ClipHandle {
    ClipHandle {
        is_generated: true,
        download_url: Some(format!("https://clips.example/{id}.mp4")),
        ..pending(id)
    }
}

fn titled(mut handle: ClipHandle, start: i64) -> ClipHandle {
    handle.title = clip_title(start, &Local).unwrap();
    handle
}

fn pipeline(service: FakeService, http: FakeHttp, dir: &Path) -> Pipeline<FakeService, FakeHttp> {
    let downloader =
        ClipDownloader::new(http).with_options(DownloadOptions::default().output_dir(dir));
    Pipeline::new(service, downloader).with_poll_policy(PollPolicy::default())
}

#[tokio::test(start_paused = true)]
async fn archives_segment_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let start = 1650150728;
    let service = FakeService::with_segments(vec![segment(start, 1650151328)]);
    service
        .push_request(Ok(pending("7")))
        .push_status(Ok(pending("7")))
        .push_status(Ok(pending("7")))
        .push_status(Ok(titled(ready("7"), start)));

    let pipeline = pipeline(service, FakeHttp::default(), dir.path());
    let summary = pipeline.run(&config()).await.unwrap();

    let title = clip_title(start, &Local).unwrap();
    assert_eq!(
        pipeline.service().calls(),
        vec![
            Call::List,
            Call::Request(ClipRequest {
                start_time: start,
                duration_seconds: 600,
                title: title.clone(),
            }),
            Call::Status(ClipId::from("7")),
            Call::Status(ClipId::from("7")),
            Call::Status(ClipId::from("7")),
            Call::Delete(ClipId::from("7")),
        ]
    );

    assert!(summary.is_clean());
    let (_, archived) = summary.archived().next().unwrap();
    assert_eq!(archived.path, dir.path().join(format!("{title}.mp4")));
    assert_eq!(archived.bytes, 8);
    assert!(matches!(&archived.removal, Removal::Deleted(status) if status == "ok"));
    assert_eq!(std::fs::read(&archived.path).unwrap(), b"ftypmdat");
}

#[tokio::test(start_paused = true)]
async fn waits_poll_interval_between_checks() {
    let dir = tempfile::tempdir().unwrap();
    let service = FakeService::with_segments(vec![segment(100, 160)]);
    service
        .push_status(Ok(pending("clip-100")))
        .push_status(Ok(pending("clip-100")));

    let started = tokio::time::Instant::now();
    let summary = pipeline(service, FakeHttp::default(), dir.path())
        .run(&config())
        .await
        .unwrap();

    assert!(summary.is_clean());
    assert_eq!(started.elapsed(), Duration::from_secs(20));
}

#[tokio::test(start_paused = true)]
async fn rejected_request_skips_to_next_segment() {
    let dir = tempfile::tempdir().unwrap();
    let service = FakeService::with_segments(vec![segment(100, 160), segment(200, 230)]);
    service.push_request(Err(RemoteError::rejected(
        Endpoint::CreateClip,
        "response has no items[0]",
    )));

    let pipeline = pipeline(service, FakeHttp::default(), dir.path());
    let summary = pipeline.run(&config()).await.unwrap();
    let service = pipeline.service();

    let failures: Vec<_> = summary.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0.start(), 100);
    assert_eq!(failures[0].1.stage, Stage::Request);
    assert_eq!(failures[0].1.kind(), "RequestRejected");

    assert_eq!(service.count(|c| matches!(c, Call::Request(_))), 2);
    assert_eq!(
        service.count(|c| matches!(c, Call::Status(id) if id.0 == "clip-100")),
        0
    );
    assert_eq!(summary.archived().count(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_download_keeps_remote_clip() {
    let dir = tempfile::tempdir().unwrap();
    let service = FakeService::with_segments(vec![segment(100, 160)]);
    let http = FakeHttp {
        fail: true,
        ..FakeHttp::default()
    };

    let pipeline = pipeline(service, http.clone(), dir.path());
    let summary = pipeline.run(&config()).await.unwrap();

    assert_eq!(http.fetched.lock().unwrap().len(), 1);
    assert_eq!(pipeline.service().count(|c| matches!(c, Call::Delete(_))), 0);

    let (_, err) = summary.failures().next().unwrap();
    assert_eq!(err.stage, Stage::Download);
    assert!(matches!(err.cause, Cause::Download(_)));
    assert!(!summary.is_clean());
}

#[tokio::test(start_paused = true)]
async fn delete_runs_exactly_once_per_saved_download() {
    let dir = tempfile::tempdir().unwrap();
    let service =
        FakeService::with_segments(vec![segment(100, 160), segment(200, 260), segment(300, 360)]);

    let pipeline = pipeline(service, FakeHttp::default(), dir.path());
    let summary = pipeline.run(&config()).await.unwrap();

    let deleted: Vec<_> = pipeline
        .service()
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::Delete(id) => Some(id),
            _ => None,
        })
        .collect();
    let archived: Vec<_> = summary.archived().map(|(_, a)| a.clip.clone()).collect();
    assert_eq!(deleted, archived);
    assert_eq!(archived.len(), 3);

    for (segment, archived) in summary.archived() {
        let expected = format!("{}.mp4", clip_title(segment.start(), &Local).unwrap());
        assert_eq!(archived.path, dir.path().join(expected));
        assert!(archived.path.exists());
    }
}

#[tokio::test(start_paused = true)]
async fn server_title_never_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let first = 1650150728;
    let second = 1650151928;
    let service = FakeService::with_segments(vec![segment(first, first + 600), segment(second, second + 60)]);
    for id in ["a", "b"] {
        service.push_request(Ok(pending(id))).push_status(Ok(ClipHandle {
            title: "new exp".into(),
            ..ready(id)
        }));
    }

    let summary = pipeline(service, FakeHttp::default(), dir.path())
        .run(&config())
        .await
        .unwrap();

    assert!(summary.is_clean());
    let paths: Vec<_> = summary.archived().map(|(_, a)| a.path.clone()).collect();
    assert_eq!(
        paths,
        vec![
            dir.path().join(format!("{}.mp4", clip_title(first, &Local).unwrap())),
            dir.path().join(format!("{}.mp4", clip_title(second, &Local).unwrap())),
        ]
    );
    for path in &paths {
        assert_eq!(std::fs::read(path).unwrap(), b"ftypmdat");
    }
    assert!(!dir.path().join("new exp.mp4").exists());
}

#[tokio::test(start_paused = true)]
async fn path_like_server_title_still_archives() {
    let dir = tempfile::tempdir().unwrap();
    let service = FakeService::with_segments(vec![segment(100, 160)]);
    service.push_status(Ok(ClipHandle {
        title: "front/door".into(),
        ..ready("clip-100")
    }));

    let pipeline = pipeline(service, FakeHttp::default(), dir.path());
    let summary = pipeline.run(&config()).await.unwrap();

    assert!(summary.is_clean());
    assert_eq!(summary.archived().count(), 1);
    assert_eq!(pipeline.service().count(|c| matches!(c, Call::Delete(_))), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_delete_is_a_leak_not_a_failure() {
    let dir = tempfile::tempdir().unwrap();
    let service = FakeService::with_segments(vec![segment(100, 160), segment(200, 260)]);
    service.push_deletion(Err(RemoteError::transport(
        Endpoint::DeleteClip,
        "connection reset",
        true,
    )));

    let summary = pipeline(service, FakeHttp::default(), dir.path())
        .run(&config())
        .await
        .unwrap();

    assert!(summary.is_clean());
    assert_eq!(summary.archived().count(), 2);
    assert_eq!(summary.leaked(), 1);
}

#[tokio::test(start_paused = true)]
async fn polling_times_out_at_bound() {
    let dir = tempfile::tempdir().unwrap();
    let service = FakeService::with_segments(vec![segment(100, 160)]);
    for _ in 0..5 {
        service.push_status(Ok(pending("clip-100")));
    }

    let downloader = ClipDownloader::new(FakeHttp::default())
        .with_options(DownloadOptions::default().output_dir(dir.path()));
    let pipeline = Pipeline::new(service, downloader)
        .with_poll_policy(PollPolicy::default().max_attempts(3));
    let summary = pipeline.run(&config()).await.unwrap();

    let (_, err) = summary.failures().next().unwrap();
    assert_eq!(err.stage, Stage::Poll);
    assert!(matches!(err.cause, Cause::TimedOut { attempts: 3 }));
    assert_eq!(pipeline.service().count(|c| matches!(c, Call::Status(_))), 3);
    assert_eq!(pipeline.service().count(|c| matches!(c, Call::Delete(_))), 0);
}

#[tokio::test(start_paused = true)]
async fn status_transport_error_fails_segment_without_download() {
    let dir = tempfile::tempdir().unwrap();
    let service = FakeService::with_segments(vec![segment(100, 160)]);
    service.push_status(Err(RemoteError::transport(
        Endpoint::ClipStatus,
        "HTTP 500",
        true,
    )));
    let http = FakeHttp::default();

    let summary = pipeline(service, http.clone(), dir.path())
        .run(&config())
        .await
        .unwrap();

    let (_, err) = summary.failures().next().unwrap();
    assert_eq!(err.stage, Stage::Poll);
    assert_eq!(err.kind(), "TransportError");
    assert!(http.fetched.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn empty_listing_is_a_clean_empty_run() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(FakeService::default(), FakeHttp::default(), dir.path());

    let summary = pipeline.run(&config()).await.unwrap();

    assert_eq!(pipeline.service().calls(), vec![Call::List]);
    assert_eq!(summary.processed(), 0);
    assert!(summary.is_clean());
}

#[tokio::test(start_paused = true)]
async fn listing_failure_aborts_run() {
    let dir = tempfile::tempdir().unwrap();
    let service = FakeService::default();
    *service.list_error.lock().unwrap() = Some(RemoteError::transport(
        Endpoint::ListAvailable,
        "HTTP 401 Unauthorized",
        false,
    ));

    let result = pipeline(service, FakeHttp::default(), dir.path())
        .run(&config())
        .await;

    assert!(matches!(result, Err(PipelineError::Listing(_))));
}

#[tokio::test(start_paused = true)]
async fn segments_without_video_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let service = FakeService::with_segments(vec![RecordedSegment::new(100, 160, false).unwrap()]);

    let pipeline = pipeline(service, FakeHttp::default(), dir.path());
    let summary = pipeline.run(&config()).await.unwrap();

    assert_eq!(pipeline.service().calls(), vec![Call::List]);
    assert!(matches!(
        summary.reports[0].outcome,
        Outcome::Skipped(SkipReason::NoVideo)
    ));
    assert_eq!(summary.skipped(), 1);
}

#[tokio::test(start_paused = true)]
async fn rerun_after_archive_makes_no_requests() {
    let dir = tempfile::tempdir().unwrap();
    let service = FakeService::with_segments(vec![segment(100, 160)]);

    let pipeline = pipeline(service, FakeHttp::default(), dir.path());
    let first = pipeline.run(&config()).await.unwrap();
    assert_eq!(first.archived().count(), 1);

    let second = pipeline.run(&config()).await.unwrap();
    assert_eq!(second.processed(), 0);
    assert_eq!(pipeline.service().count(|c| matches!(c, Call::Request(_))), 1);
}

#[tokio::test(start_paused = true)]
async fn cancelled_before_start_processes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let service = FakeService::with_segments(vec![segment(100, 160), segment(200, 260)]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let pipeline = pipeline(service, FakeHttp::default(), dir.path()).with_cancellation(cancel);
    let summary = pipeline.run(&config()).await.unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.unprocessed, 2);
    assert_eq!(summary.processed(), 0);
    assert_eq!(pipeline.service().count(|c| matches!(c, Call::Request(_))), 0);
}

#[tokio::test(start_paused = true)]
async fn cancellation_interrupts_polling_and_stops_run() {
    let dir = tempfile::tempdir().unwrap();
    let service = FakeService::with_segments(vec![segment(100, 160), segment(200, 260)]);
    service.push_status(Ok(pending("clip-100")));
    let cancel = CancellationToken::new();
    *service.cancel_on_status.lock().unwrap() = Some(cancel.clone());

    let pipeline = pipeline(service, FakeHttp::default(), dir.path()).with_cancellation(cancel);
    let summary = pipeline.run(&config()).await.unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.unprocessed, 1);
    let (_, err) = summary.failures().next().unwrap();
    assert_eq!(err.stage, Stage::Poll);
    assert!(matches!(err.cause, Cause::Cancelled));
    assert_eq!(pipeline.service().count(|c| matches!(c, Call::Status(_))), 1);
}

/// Cancels the run once connected, then never yields a byte.
struct StallingHttp {
    cancel: CancellationToken,
}

impl HttpClient for StallingHttp {
    type Error = TestError;

    async fn stream(&self, _url: &str) -> Result<Body<TestError>, TestError> {
        self.cancel.cancel();
        Ok(Body {
            content_length: None,
            chunks: Box::pin(futures_util::stream::pending()),
        })
    }
}

#[tokio::test(start_paused = true)]
async fn cancellation_interrupts_stalled_download() {
    let dir = tempfile::tempdir().unwrap();
    let service = FakeService::with_segments(vec![segment(100, 160), segment(200, 260)]);
    let cancel = CancellationToken::new();
    let downloader = ClipDownloader::new(StallingHttp {
        cancel: cancel.clone(),
    })
    .with_options(DownloadOptions::default().output_dir(dir.path()));
    let pipeline = Pipeline::new(service, downloader).with_cancellation(cancel);

    let summary = tokio::time::timeout(Duration::from_secs(24 * 60 * 60), pipeline.run(&config()))
        .await
        .expect("run should return once cancelled")
        .unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.unprocessed, 1);
    let (_, err) = summary.failures().next().unwrap();
    assert_eq!(err.stage, Stage::Download);
    assert!(matches!(err.cause, Cause::Cancelled));
    assert_eq!(pipeline.service().count(|c| matches!(c, Call::Delete(_))), 0);
}
