#![forbid(unsafe_code)]

//! The declarative source data a load is built from.

use std::sync::Arc;

use url::Url;

use crate::loader::Loader;

/// How the loader for a request is chosen.
#[derive(Clone, Default)]
pub enum LoaderHint {
    /// Infer from the type hint or the locator's extension.
    #[default]
    Auto,
    /// Use the loader registered under this name; loud error if absent.
    Named(String),
    /// Use this loader directly, bypassing the registry tables.
    Explicit(Arc<dyn Loader>),
}

impl std::fmt::Debug for LoaderHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => f.write_str("Auto"),
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Explicit(_) => f.write_str("Explicit(..)"),
        }
    }
}

/// One logical fetch: target locator plus the declarative hints handed over
/// by the embedder.
#[derive(Clone, Debug)]
pub struct LoadRequest {
    pub url: Url,
    /// MIME-like type hint; preferred over extension sniffing when present.
    pub media_type: Option<String>,
    pub loader: LoaderHint,
    /// Alternate text to attach to the produced media.
    pub alt: Option<String>,
}

impl LoadRequest {
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            url,
            media_type: None,
            loader: LoaderHint::Auto,
            alt: None,
        }
    }

    #[must_use]
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    #[must_use]
    pub fn with_loader(mut self, loader: LoaderHint) -> Self {
        self.loader = loader;
        self
    }

    #[must_use]
    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }

    /// Lower-cased extension of the locator's final path segment. The URL
    /// type has already stripped query string and fragment from the path.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        let path = self.url.path();
        let segment = path.rsplit('/').next().unwrap_or(path);
        let (stem, ext) = segment.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}
