#![forbid(unsafe_code)]

use thiserror::Error;
use url::Url;

/// Loader and registry errors.
///
/// `NoLoaderFound` and `UnknownLoaderName` are configuration mistakes and
/// surface synchronously at dispatch pre-flight. `LoadFailed` and `Timeout`
/// are per-request: the request is marked rejected and stays eligible for
/// retry, and no other request is affected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("no loader registered with name \"{0}\"")]
    UnknownLoaderName(String),

    #[error("no loader found for \"{url}\"")]
    NoLoaderFound { url: Url },

    #[error("load failed for \"{url}\": {reason}")]
    LoadFailed { url: Url, reason: String },

    #[error("load timed out for \"{url}\"")]
    Timeout { url: Url },
}

impl LoadError {
    /// Build a `LoadFailed` from any displayable reason.
    pub fn failed(url: &Url, reason: impl std::fmt::Display) -> Self {
        Self::LoadFailed {
            url: url.clone(),
            reason: reason.to_string(),
        }
    }

    /// Whether this is a configuration error rather than a transient one.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::UnknownLoaderName(_) | Self::NoLoaderFound { .. })
    }
}

pub type LoadResult<T> = Result<T, LoadError>;
