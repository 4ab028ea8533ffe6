//! Immutable data types for talking to the camera service.
//!
//! Configuration is constructed once per run and passed by reference to every
//! call. Domain records are produced by the decoders in [`wire`] and are never
//! patched in place afterwards.

pub mod config;
pub mod model;
pub mod wire;

pub use config::{
    CameraConfig, DEFAULT_CLIP_HOST, DEFAULT_LISTING_HOST, Endpoints, RetryPolicy,
};
pub use model::{ClipHandle, ClipId, ClipRequest, InvalidSegment, RecordedSegment};
