//! Layered run configuration.
//!
//! Lowest to highest precedence: built-in defaults, the `--config` file
//! (JSON, or TOML by extension), `clipkeep.toml` in the working directory,
//! `CLIPKEEP_*` environment variables, command-line flags.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clipkeep_fetch::DownloadOptions;
use clipkeep_pipeline::PollPolicy;
use clipkeep_remote::{
    CameraConfig, DEFAULT_CLIP_HOST, DEFAULT_LISTING_HOST, Endpoints, RetryPolicy,
};
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml},
};
use serde::{Deserialize, Deserializer, de};
use thiserror::Error;

use crate::cli::app::Overrides;

pub const LOCAL_CONFIG: &str = "clipkeep.toml";
pub const ENV_PREFIX: &str = "CLIPKEEP_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Figment(#[from] figment::Error),
    #[error("`{0}` must not be empty")]
    Empty(&'static str),
    #[error("`{field}` must be at least {min}")]
    TooSmall { field: &'static str, min: u64 },
}

#[derive(Clone, Deserialize)]
pub struct Settings {
    #[serde(deserialize_with = "text")]
    pub camera_id: String,
    #[serde(deserialize_with = "text")]
    pub uuid: String,
    #[serde(deserialize_with = "text")]
    pub cookie: String,
    #[serde(deserialize_with = "unix_seconds")]
    pub threshold: i64,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_max_polls")]
    pub max_poll_attempts: u32,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
    #[serde(default = "default_listing_host")]
    pub listing_host: String,
    #[serde(default = "default_clip_host")]
    pub clip_host: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_poll_interval() -> u64 {
    PollPolicy::default().interval.as_secs()
}

fn default_max_polls() -> u32 {
    PollPolicy::default().max_attempts
}

fn default_max_retries() -> u32 {
    RetryPolicy::default().max_retries
}

fn default_retry_backoff() -> u64 {
    RetryPolicy::default().backoff.as_millis() as u64
}

fn default_listing_host() -> String {
    DEFAULT_LISTING_HOST.to_string()
}

fn default_clip_host() -> String {
    DEFAULT_CLIP_HOST.to_string()
}

/// Config files and environment values may carry ids and timestamps either
/// as numbers or as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Text(String),
}

fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Int(value) => value.to_string(),
        Scalar::Text(value) => value,
    })
}

fn unix_seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match Scalar::deserialize(deserializer)? {
        Scalar::Int(value) => Ok(value),
        Scalar::Text(value) => value
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("`{value}` is not a unix timestamp"))),
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("camera_id", &self.camera_id)
            .field("uuid", &self.uuid)
            .field("cookie", &"<redacted>")
            .field("threshold", &self.threshold)
            .field("output_dir", &self.output_dir)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("max_poll_attempts", &self.max_poll_attempts)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("listing_host", &self.listing_host)
            .field("clip_host", &self.clip_host)
            .finish()
    }
}

impl Settings {
    pub fn figment(config_path: &Path, overrides: &Overrides) -> Figment {
        let figment = match config_path.extension().and_then(OsStr::to_str) {
            Some("toml") => Figment::new().merge(Toml::file(config_path)),
            _ => Figment::new().merge(Json::file(config_path)),
        };

        figment
            .merge(Toml::file(LOCAL_CONFIG))
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::globals(overrides))
    }

    pub fn load(config_path: &Path, overrides: &Overrides) -> Result<Self, ConfigError> {
        let settings: Settings = Self::figment(config_path, overrides).extract()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("camera_id", &self.camera_id),
            ("uuid", &self.uuid),
            ("cookie", &self.cookie),
            ("listing_host", &self.listing_host),
            ("clip_host", &self.clip_host),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Empty(field));
            }
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::TooSmall {
                field: "poll_interval_secs",
                min: 1,
            });
        }
        if self.max_poll_attempts == 0 {
            return Err(ConfigError::TooSmall {
                field: "max_poll_attempts",
                min: 1,
            });
        }
        Ok(())
    }

    pub fn camera_config(&self) -> CameraConfig {
        CameraConfig {
            camera_id: self.camera_id.clone(),
            uuid: self.uuid.clone(),
            cookie: self.cookie.clone(),
            threshold: self.threshold,
            endpoints: Endpoints {
                listing_host: self.listing_host.clone(),
                clip_host: self.clip_host.clone(),
            },
        }
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::default()
            .interval(Duration::from_secs(self.poll_interval_secs))
            .max_attempts(self.max_poll_attempts)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .max_retries(self.max_retries)
            .backoff(Duration::from_millis(self.retry_backoff_ms))
    }

    pub fn download_options(&self) -> DownloadOptions {
        DownloadOptions::default().output_dir(&self.output_dir)
    }
}
