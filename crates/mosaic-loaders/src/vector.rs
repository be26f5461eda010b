#![forbid(unsafe_code)]

//! Inline SVG loader.

use std::sync::Arc;

use async_trait::async_trait;
use mosaic_core::Media;
use tracing::debug;

use crate::{
    error::{LoadError, LoadResult},
    fetch::Fetch,
    loader::Loader,
    request::LoadRequest,
};

/// Fetches SVG text and yields it as [`Media::Vector`], for embedders that
/// inline the markup instead of referencing it by URL.
///
/// Registered by name (`"inline-svg"`) rather than by type key, so plain
/// `.svg` sources keep using the raster path unless a source opts in.
pub struct InlineVectorLoader {
    fetch: Arc<dyn Fetch>,
}

impl InlineVectorLoader {
    #[must_use]
    pub fn new(fetch: Arc<dyn Fetch>) -> Self {
        Self { fetch }
    }

    async fn load(&self, request: &LoadRequest) -> LoadResult<Media> {
        let body = self
            .fetch
            .get(&request.url)
            .await
            .map_err(|e| LoadError::failed(&request.url, e))?;

        let text = std::str::from_utf8(&body.bytes)
            .map_err(|_| LoadError::failed(&request.url, "body is not valid UTF-8"))?;
        if !text.contains("<svg") {
            return Err(LoadError::failed(
                &request.url,
                "body does not look like SVG markup",
            ));
        }

        debug!(url = %request.url, bytes = text.len(), "inline SVG loaded");
        Ok(Media::Vector {
            markup: Arc::from(text),
            alt: request.alt.clone(),
        })
    }
}

#[async_trait]
impl Loader for InlineVectorLoader {
    async fn attempt(&self, request: &LoadRequest) -> Option<LoadResult<Media>> {
        Some(self.load(request).await)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use url::Url;

    use crate::testing::MemoryFetch;

    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[tokio::test]
    async fn loads_svg_markup() {
        let fetch = MemoryFetch::new();
        fetch.insert(
            url("https://example.com/icon.svg"),
            Bytes::from_static(b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>"),
            Some("image/svg+xml"),
        );

        let loader = InlineVectorLoader::new(Arc::new(fetch));
        let request = LoadRequest::new(url("https://example.com/icon.svg")).with_alt("icon");
        let media = loader.attempt(&request).await.unwrap().unwrap();

        match media {
            Media::Vector { markup, alt } => {
                assert!(markup.starts_with("<svg"));
                assert_eq!(alt.as_deref(), Some("icon"));
            }
            Media::Raster { .. } => panic!("expected vector media"),
        }
    }

    #[tokio::test]
    async fn non_svg_body_is_rejected() {
        let fetch = MemoryFetch::new();
        fetch.insert(
            url("https://example.com/icon.svg"),
            Bytes::from_static(b"<html>not svg</html>"),
            Some("text/html"),
        );

        let loader = InlineVectorLoader::new(Arc::new(fetch));
        let request = LoadRequest::new(url("https://example.com/icon.svg"));
        let result = loader.attempt(&request).await.unwrap();
        assert!(matches!(result, Err(LoadError::LoadFailed { .. })));
    }
}
