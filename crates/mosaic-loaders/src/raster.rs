#![forbid(unsafe_code)]

//! The default raster image loader.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::BytesMut;
use futures::StreamExt;
use mosaic_core::Media;
use mosaic_events::{EventBus, LoaderEvent};
use tracing::debug;

use crate::{
    error::{LoadError, LoadResult},
    fetch::Fetch,
    loader::Loader,
    request::LoadRequest,
};

/// Streams encoded raster image bytes and yields them as [`Media::Raster`].
///
/// Fetch progress is published on the event bus, when one is attached, as
/// [`LoaderEvent::Progress`].
pub struct RasterLoader {
    fetch: Arc<dyn Fetch>,
    bus: Option<EventBus>,
}

impl RasterLoader {
    #[must_use]
    pub fn new(fetch: Arc<dyn Fetch>) -> Self {
        Self { fetch, bus: None }
    }

    /// Attach an event bus for progress reporting.
    #[must_use]
    pub fn with_bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    async fn load(&self, request: &LoadRequest) -> LoadResult<Media> {
        let fetched = self
            .fetch
            .stream(&request.url)
            .await
            .map_err(|e| LoadError::failed(&request.url, e))?;
        let total = fetched.total;
        let content_type = fetched.content_type;
        let mut body = fetched.body;

        let mut buf = BytesMut::new();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| LoadError::failed(&request.url, e))?;
            buf.extend_from_slice(&chunk);
            if let Some(bus) = &self.bus {
                bus.publish(LoaderEvent::Progress {
                    url: request.url.clone(),
                    received: buf.len() as u64,
                    total,
                });
            }
        }

        // The transport-level analogue of an image that decoded to zero
        // dimensions.
        if buf.is_empty() {
            return Err(LoadError::failed(&request.url, "empty body"));
        }

        debug!(url = %request.url, bytes = buf.len(), "raster image loaded");
        Ok(Media::Raster {
            bytes: buf.freeze(),
            content_type,
            alt: request.alt.clone(),
        })
    }
}

#[async_trait]
impl Loader for RasterLoader {
    async fn attempt(&self, request: &LoadRequest) -> Option<LoadResult<Media>> {
        Some(self.load(request).await)
    }
}
