//! Streaming download of generated clips into local media files.
//!
//! # Architecture
//!
//! - [`data`] - Download options, progress snapshots and the download outcome
//! - [`effects`] - The [`HttpClient`] seam and the [`ClipDownloader`]
//!
//! A failed download is an expected outcome, not an error: [`ClipDownloader::download`]
//! always returns a [`DownloadResult`] and the caller branches on it.

pub mod data;
pub mod effects;
mod error;

pub use data::{DownloadOptions, DownloadResult, FetchPhase, Progress};
pub use effects::{Body, BoxStream, ClipDownloader, HttpClient};

#[cfg(feature = "reqwest")]
pub use effects::ReqwestClient;

pub use error::{FetchError, Result};
