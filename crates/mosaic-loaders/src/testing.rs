#![forbid(unsafe_code)]

//! In-memory `Fetch` implementation for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use parking_lot::Mutex;
use url::Url;

use crate::fetch::{Fetch, FetchError, FetchedBody, FetchedStream};

/// Serves canned bodies (or canned failures) keyed by URL. Unknown URLs
/// answer HTTP 404.
#[derive(Default)]
pub struct MemoryFetch {
    entries: Mutex<HashMap<Url, Result<FetchedBody, FetchError>>>,
}

impl MemoryFetch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `bytes` for `url`.
    pub fn insert(&self, url: Url, bytes: Bytes, content_type: Option<&str>) {
        self.entries.lock().insert(
            url,
            Ok(FetchedBody {
                bytes,
                content_type: content_type.map(str::to_owned),
            }),
        );
    }

    /// Fail every fetch of `url` with the given error.
    pub fn fail(&self, url: Url, error: FetchError) {
        self.entries.lock().insert(url, Err(error));
    }

    fn lookup(&self, url: &Url) -> Result<FetchedBody, FetchError> {
        self.entries
            .lock()
            .get(url)
            .cloned()
            .unwrap_or_else(|| {
                Err(FetchError::HttpStatus {
                    status: 404,
                    url: url.to_string(),
                })
            })
    }
}

#[async_trait]
impl Fetch for MemoryFetch {
    async fn get(&self, url: &Url) -> Result<FetchedBody, FetchError> {
        self.lookup(url)
    }

    async fn stream(&self, url: &Url) -> Result<FetchedStream, FetchError> {
        let body = self.lookup(url)?;
        let total = Some(body.bytes.len() as u64);
        Ok(FetchedStream {
            total,
            content_type: body.content_type,
            body: futures::stream::iter([Ok(body.bytes)]).boxed(),
        })
    }
}
