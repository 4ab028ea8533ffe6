use std::future::Future;

use tracing::warn;

use crate::core::retry_delay;
use crate::data::{CameraConfig, ClipHandle, ClipId, ClipRequest, RecordedSegment, RetryPolicy};
use crate::effects::CameraService;
use crate::error::{Endpoint, Result};

/// Wraps a [`CameraService`] with bounded exponential backoff.
///
/// Only transient transport failures on idempotent endpoints are retried.
/// `request_clip` is passed through untouched: repeating it would create a
/// second remote job for the same segment.
#[derive(Debug, Clone)]
pub struct Retrying<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: CameraService> Retrying<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    async fn with_retry<T, F, Fut>(&self, endpoint: Endpoint, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut retry_count = 0;
        loop {
            match call().await {
                Err(err)
                    if endpoint.is_idempotent()
                        && err.is_transient()
                        && retry_count < self.policy.max_retries =>
                {
                    let delay = retry_delay(retry_count, self.policy.backoff);
                    warn!(
                        %endpoint,
                        error = %err,
                        retry = retry_count + 1,
                        delay_ms = delay.as_millis() as u64,
                        "transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    retry_count += 1;
                }
                outcome => return outcome,
            }
        }
    }
}

impl<S: CameraService> CameraService for Retrying<S> {
    async fn list_segments(&self, config: &CameraConfig) -> Result<Vec<RecordedSegment>> {
        let inner = &self.inner;
        self.with_retry(Endpoint::ListAvailable, move || inner.list_segments(config))
            .await
    }

    async fn request_clip(&self, config: &CameraConfig, request: &ClipRequest) -> Result<ClipHandle> {
        self.inner.request_clip(config, request).await
    }

    async fn clip_status(&self, config: &CameraConfig, id: &ClipId) -> Result<ClipHandle> {
        let inner = &self.inner;
        self.with_retry(Endpoint::ClipStatus, move || inner.clip_status(config, id))
            .await
    }

    async fn delete_clip(&self, config: &CameraConfig, id: &ClipId) -> Result<String> {
        let inner = &self.inner;
        self.with_retry(Endpoint::DeleteClip, move || inner.delete_clip(config, id))
            .await
    }
}
