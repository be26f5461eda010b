#![forbid(unsafe_code)]

//! Timeout decorator for loaders.

use std::time::Duration;

use async_trait::async_trait;
use mosaic_core::Media;

use crate::{
    error::{LoadError, LoadResult},
    loader::Loader,
    request::LoadRequest,
};

/// Wraps any loader with a wall-clock bound on its attempt.
pub struct TimeoutLoader<L> {
    inner: L,
    timeout: Duration,
}

impl<L> TimeoutLoader<L> {
    #[must_use]
    pub fn new(inner: L, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl<L: Loader> Loader for TimeoutLoader<L> {
    async fn attempt(&self, request: &LoadRequest) -> Option<LoadResult<Media>> {
        match tokio::time::timeout(self.timeout, self.inner.attempt(request)).await {
            Ok(outcome) => outcome,
            Err(_) => Some(Err(LoadError::Timeout {
                url: request.url.clone(),
            })),
        }
    }
}
