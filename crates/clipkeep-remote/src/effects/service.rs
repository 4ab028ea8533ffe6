use std::future::Future;

use crate::data::{CameraConfig, ClipHandle, ClipId, ClipRequest, RecordedSegment};
use crate::error::Result;

/// The four calls the camera service exposes.
///
/// Every call receives the run's [`CameraConfig`] by reference; implementations
/// keep no per-run state of their own.
///
/// # Implementations
///
/// - [`NestService`](crate::NestService): production implementation using `reqwest`
/// - [`Retrying`](crate::Retrying): decorator adding backoff to idempotent calls
/// - Scripted fakes in tests
pub trait CameraService: Send + Sync {
    /// Recorded time ranges up to `config.threshold`, in service order.
    fn list_segments(
        &self,
        config: &CameraConfig,
    ) -> impl Future<Output = Result<Vec<RecordedSegment>>> + Send;

    /// Start generating a durable clip. Each call creates a new remote job.
    fn request_clip(
        &self,
        config: &CameraConfig,
        request: &ClipRequest,
    ) -> impl Future<Output = Result<ClipHandle>> + Send;

    /// Fresh snapshot of a clip's generation status.
    fn clip_status(
        &self,
        config: &CameraConfig,
        id: &ClipId,
    ) -> impl Future<Output = Result<ClipHandle>> + Send;

    /// Delete the remote clip record and return the service's status description.
    fn delete_clip(
        &self,
        config: &CameraConfig,
        id: &ClipId,
    ) -> impl Future<Output = Result<String>> + Send;
}
