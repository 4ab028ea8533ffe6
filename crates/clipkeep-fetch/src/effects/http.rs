use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

/// A boxed stream type for HTTP response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// An open response body.
pub struct Body<E> {
    /// Value of the Content-Length header, if any.
    pub content_length: Option<u64>,
    pub chunks: BoxStream<'static, Result<Bytes, E>>,
}

/// Asynchronous HTTP client abstraction.
///
/// Implementations handle their own redirect following and timeouts, and must
/// map non-success statuses to an error rather than streaming the error page.
///
/// # Implementations
///
/// - [`ReqwestClient`]: Production implementation using `reqwest`
/// - Mock implementations for testing
pub trait HttpClient: Send + Sync {
    type Error: std::error::Error + Send + 'static;

    /// Open a streaming GET for `url`.
    fn stream(&self, url: &str) -> impl Future<Output = Result<Body<Self::Error>, Self::Error>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use std::time::Duration;

    use futures_util::StreamExt;

    use super::*;

    /// Production HTTP client implementation using reqwest.
    ///
    /// A transfer may take arbitrarily long overall, but no single connect or
    /// read may stall past its timeout.
    #[derive(Debug, Clone)]
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
        pub const READ_TIMEOUT: Duration = Duration::from_secs(30);

        pub fn new() -> reqwest::Result<Self> {
            let client = reqwest::Client::builder()
                .connect_timeout(Self::CONNECT_TIMEOUT)
                .read_timeout(Self::READ_TIMEOUT)
                .build()?;
            Ok(Self { client })
        }

        pub fn with_client(client: reqwest::Client) -> Self {
            Self { client }
        }
    }

    impl HttpClient for ReqwestClient {
        type Error = reqwest::Error;

        async fn stream(&self, url: &str) -> Result<Body<Self::Error>, Self::Error> {
            let response = self.client.get(url).send().await?.error_for_status()?;
            let content_length = response.content_length();
            let chunks = response.bytes_stream().map(|chunk| chunk.map(Bytes::from));

            Ok(Body {
                content_length,
                chunks: Box::pin(chunks),
            })
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;
