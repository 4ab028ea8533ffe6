use std::time::Duration;

use chrono::Utc;
use reqwest::header;
use reqwest::{Client, RequestBuilder};
use tracing::debug;

use crate::data::config::{ORIGIN, REFERER};
use crate::data::wire;
use crate::data::{CameraConfig, ClipHandle, ClipId, ClipRequest, RecordedSegment};
use crate::effects::CameraService;
use crate::error::{Endpoint, RemoteError, Result};

/// Production client for the Nest camera clip service.
#[derive(Debug, Clone)]
pub struct NestService {
    client: Client,
}

impl NestService {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a client with a per-request timeout.
    pub fn new() -> reqwest::Result<Self> {
        let client = Client::builder().timeout(Self::REQUEST_TIMEOUT).build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn authorized(builder: RequestBuilder, config: &CameraConfig) -> RequestBuilder {
        builder
            .header(header::COOKIE, &config.cookie)
            .header(header::ORIGIN, ORIGIN)
            .header(header::REFERER, REFERER)
    }

    async fn send(&self, endpoint: Endpoint, builder: RequestBuilder) -> Result<Vec<u8>> {
        let response = builder
            .send()
            .await
            .map_err(|e| RemoteError::from_reqwest(endpoint, e))?;

        let status = response.status();
        debug!(%endpoint, %status, "response received");
        if !status.is_success() {
            return Err(RemoteError::from_status(endpoint, status));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RemoteError::from_reqwest(endpoint, e))?;
        Ok(body.to_vec())
    }
}

impl CameraService for NestService {
    async fn list_segments(&self, config: &CameraConfig) -> Result<Vec<RecordedSegment>> {
        let query = [
            ("uuid", config.camera_id.clone()),
            ("end_time", config.threshold.to_string()),
            ("_", Utc::now().timestamp_millis().to_string()),
        ];
        let builder = self
            .client
            .get(config.endpoints.list_available())
            .query(&query);

        let body = self
            .send(Endpoint::ListAvailable, Self::authorized(builder, config))
            .await?;
        wire::decode_segments(&body)
    }

    async fn request_clip(&self, config: &CameraConfig, request: &ClipRequest) -> Result<ClipHandle> {
        let form = [
            ("uuid", config.uuid.clone()),
            ("title", request.title.clone()),
            ("start_date", request.start_time.to_string()),
            ("is_public", "false".to_string()),
            ("length", request.duration_seconds.to_string()),
            ("target_length", "false".to_string()),
            ("donate_video", "false".to_string()),
        ];
        let builder = self.client.post(config.endpoints.clips_request()).form(&form);

        let body = self
            .send(Endpoint::CreateClip, Self::authorized(builder, config))
            .await?;
        wire::decode_clip(Endpoint::CreateClip, &body)
    }

    async fn clip_status(&self, config: &CameraConfig, id: &ClipId) -> Result<ClipHandle> {
        let builder = self
            .client
            .get(config.endpoints.clips_get())
            .query(&[("id", id.0.as_str())]);

        let body = self
            .send(Endpoint::ClipStatus, Self::authorized(builder, config))
            .await?;
        wire::decode_clip(Endpoint::ClipStatus, &body)
    }

    async fn delete_clip(&self, config: &CameraConfig, id: &ClipId) -> Result<String> {
        let builder = self
            .client
            .post(config.endpoints.clips_delete())
            .form(&[("id", id.0.as_str())]);

        let body = self
            .send(Endpoint::DeleteClip, Self::authorized(builder, config))
            .await?;
        wire::decode_deletion(&body)
    }
}
