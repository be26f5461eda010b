#![forbid(unsafe_code)]

use async_trait::async_trait;
use mosaic_core::Media;

use crate::{error::LoadResult, request::LoadRequest};

/// Pluggable fetch strategy bound to a type key.
///
/// `attempt` either accepts the request — returning its outcome — or
/// refuses with `None`, letting the next candidate in registration order
/// try.
#[async_trait]
pub trait Loader: Send + Sync {
    async fn attempt(&self, request: &LoadRequest) -> Option<LoadResult<Media>>;
}
