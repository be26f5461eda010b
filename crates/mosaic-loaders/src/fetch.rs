#![forbid(unsafe_code)]

//! Transport capability behind the built-in loaders.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use thiserror::Error;
use url::Url;

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, FetchError>> + Send>>;

/// Transport errors. Cloneable so they can travel through shared futures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("HTTP {status} for URL: {url}")]
    HttpStatus { status: u16, url: String },
    #[error("transport error: {0}")]
    Transport(String),
}

/// A whole response body.
#[derive(Debug, Clone)]
pub struct FetchedBody {
    pub bytes: Bytes,
    /// Content type reported by the transport, if any.
    pub content_type: Option<String>,
}

/// A streaming response body, with length and content type when known up
/// front.
pub struct FetchedStream {
    pub total: Option<u64>,
    pub content_type: Option<String>,
    pub body: ByteStream,
}

/// Byte transport for loaders. Implemented by [`HttpFetch`] for real
/// deployments and by in-memory fakes in tests.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Get the whole body at once.
    async fn get(&self, url: &Url) -> Result<FetchedBody, FetchError>;

    /// Stream the body.
    async fn stream(&self, url: &Url) -> Result<FetchedStream, FetchError>;
}

/// HTTP transport over a shared connection pool.
#[derive(Clone, Debug)]
pub struct HttpFetch {
    inner: reqwest::Client,
}

impl HttpFetch {
    /// # Panics
    ///
    /// Panics if the `reqwest::Client` builder fails to build.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: reqwest::Client::builder()
                .build()
                .expect("failed to build reqwest client"),
        }
    }

    async fn send(&self, url: &Url) -> Result<reqwest::Response, FetchError> {
        let resp = self
            .inner
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(resp)
    }
}

impl Default for HttpFetch {
    fn default() -> Self {
        Self::new()
    }
}

fn content_type_of(resp: &reqwest::Response) -> Option<String> {
    resp.headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

#[async_trait]
impl Fetch for HttpFetch {
    async fn get(&self, url: &Url) -> Result<FetchedBody, FetchError> {
        let resp = self.send(url).await?;
        let content_type = content_type_of(&resp);
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(FetchedBody {
            bytes,
            content_type,
        })
    }

    async fn stream(&self, url: &Url) -> Result<FetchedStream, FetchError> {
        let resp = self.send(url).await?;
        let total = resp.content_length();
        let content_type = content_type_of(&resp);
        let body: ByteStream = Box::pin(
            resp.bytes_stream()
                .map_err(|e| FetchError::Transport(e.to_string())),
        );
        Ok(FetchedStream {
            total,
            content_type,
            body,
        })
    }
}
