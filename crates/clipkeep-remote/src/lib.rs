//! Typed client for the camera clip service.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Immutable run configuration, domain records and wire decoders
//! - [`core`] - Pure transformations (clip titles, retry delays)
//! - [`effects`] - The [`CameraService`] seam, its reqwest implementation and
//!   the retrying decorator
//!
//! # Key Features
//!
//! - **Typed decoding**: every endpoint has its own decoder that fails fast with
//!   [`RemoteError::Rejected`] when a required field is missing
//! - **Selective retry**: [`Retrying`] retries only idempotent calls, never clip creation
//! - **Mechanism-only**: no orchestration; the pipeline crate decides what to call and when

pub mod core;
pub mod data;
pub mod effects;
mod error;

pub use core::{TITLE_FORMAT, clip_title, retry_delay};
pub use data::{
    CameraConfig, ClipHandle, ClipId, ClipRequest, DEFAULT_CLIP_HOST, DEFAULT_LISTING_HOST,
    Endpoints, InvalidSegment, RecordedSegment, RetryPolicy,
};
pub use effects::{CameraService, NestService, Retrying};
pub use error::{Endpoint, ErrorKind, RemoteError, Result};
