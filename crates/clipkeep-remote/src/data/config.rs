use std::fmt;
use std::time::Duration;

pub const DEFAULT_LISTING_HOST: &str = "https://nexusapi-us1.camera.home.nest.com";
pub const DEFAULT_CLIP_HOST: &str = "https://webapi.camera.home.nest.com";

/// Fixed `Origin` header sent with every request.
pub const ORIGIN: &str = "https://home.nest.com";
/// Fixed `Referer` header sent with every request.
pub const REFERER: &str = "https://home.nest.com/";

/// Read-only run parameters identifying the camera and the credential.
///
/// `camera_id` addresses the listing endpoint while `uuid` addresses clip
/// creation. The service documents no relationship between the two, so both
/// are required.
#[derive(Clone, PartialEq, Eq)]
pub struct CameraConfig {
    pub camera_id: String,
    pub uuid: String,
    /// Session cookie sent verbatim as the `Cookie` header.
    pub cookie: String,
    /// Upper bound (unix seconds) on the segments to consider.
    pub threshold: i64,
    pub endpoints: Endpoints,
}

impl fmt::Debug for CameraConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CameraConfig")
            .field("camera_id", &self.camera_id)
            .field("uuid", &self.uuid)
            .field("cookie", &"<redacted>")
            .field("threshold", &self.threshold)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

/// Base URLs of the two hosts the service is split across.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub listing_host: String,
    pub clip_host: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            listing_host: DEFAULT_LISTING_HOST.to_string(),
            clip_host: DEFAULT_CLIP_HOST.to_string(),
        }
    }
}

impl Endpoints {
    pub fn list_available(&self) -> String {
        format!("{}/get_available", self.listing_host.trim_end_matches('/'))
    }

    pub fn clips_request(&self) -> String {
        self.clip_api("clips.request")
    }

    pub fn clips_get(&self) -> String {
        self.clip_api("clips.get")
    }

    pub fn clips_delete(&self) -> String {
        self.clip_api("clips.delete")
    }

    fn clip_api(&self, name: &str) -> String {
        format!("{}/api/{name}", self.clip_host.trim_end_matches('/'))
    }
}

/// Bounded exponential backoff for idempotent calls.
///
/// Total attempts = 1 (initial) + `max_retries`. The delay before retry N
/// (0-indexed) is `backoff * 2^N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }
}
