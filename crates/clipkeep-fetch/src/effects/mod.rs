//! Network and filesystem effects.

mod downloader;
mod http;

pub use downloader::ClipDownloader;
pub use http::{Body, BoxStream, HttpClient};

#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
