#![forbid(unsafe_code)]

//! Process-wide options and per-placeholder declarative configuration.

use std::sync::Arc;

use mosaic_loaders::{Loader, LoaderHint};
use mosaic_queue::DEFAULT_CONCURRENCY;
use url::Url;

use crate::plugin::Plugin;

/// When a placeholder's first load is triggered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Autoload {
    /// Dispatch during construction.
    #[default]
    Immediate,
    /// Defer until something — typically a visibility plugin — calls
    /// `load()`.
    Lazy,
    /// Only ever load on explicit calls.
    None,
}

/// One declared candidate source, handed over as plain data.
#[derive(Clone, Debug)]
pub struct SourceSpec {
    pub url: Url,
    /// Viewport condition expression, e.g. `(min-width: 800px)`. An absent
    /// or blank condition always matches.
    pub media: Option<String>,
    /// MIME-like type hint; preferred over extension sniffing.
    pub media_type: Option<String>,
    pub loader: LoaderHint,
    /// Alternate text; falls back to the placeholder-level text.
    pub alt: Option<String>,
}

impl SourceSpec {
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            url,
            media: None,
            media_type: None,
            loader: LoaderHint::Auto,
            alt: None,
        }
    }

    #[must_use]
    pub fn with_media(mut self, media: impl Into<String>) -> Self {
        self.media = Some(media.into());
        self
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
}

/// Declarative configuration for one placeholder.
///
/// Sources are declared in ascending priority: the last-declared source
/// wins ties, so the unconditioned fallback goes first.
#[derive(Clone, Debug)]
pub struct PlaceholderConfig {
    pub sources: Vec<SourceSpec>,
    /// Fallback alternate text for sources that declare none.
    pub alt: Option<String>,
    /// Override of the process-wide autoload mode.
    pub autoload: Option<Autoload>,
}

impl PlaceholderConfig {
    #[must_use]
    pub fn new(sources: Vec<SourceSpec>) -> Self {
        Self {
            sources,
            alt: None,
            autoload: None,
        }
    }

    /// Shorthand for the single-source case.
    #[must_use]
    pub fn single(url: Url) -> Self {
        Self::new(vec![SourceSpec::new(url)])
    }

    #[must_use]
    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }

    #[must_use]
    pub fn with_autoload(mut self, autoload: Autoload) -> Self {
        self.autoload = Some(autoload);
        self
    }
}

/// Process-wide options: built once at startup, passed into the runtime,
/// never read from global state.
#[derive(Clone)]
pub struct Options {
    /// Re-run selection on viewport changes (placeholders with more than
    /// one source only).
    pub responsive: bool,
    /// Default autoload mode; placeholders can override it.
    pub autoload: Autoload,
    /// Concurrency limit K of the shared load queue.
    pub concurrency: usize,
    /// Type-key registrations layered over the built-in loader table.
    pub loaders: Vec<(String, Arc<dyn Loader>)>,
    /// Plugins initialized once per controller at construction.
    pub plugins: Vec<Arc<dyn Plugin>>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            responsive: false,
            autoload: Autoload::default(),
            concurrency: DEFAULT_CONCURRENCY,
            loaders: Vec::new(),
            plugins: Vec::new(),
        }
    }
}

impl Options {
    #[must_use]
    pub fn with_responsive(mut self, responsive: bool) -> Self {
        self.responsive = responsive;
        self
    }

    #[must_use]
    pub fn with_autoload(mut self, autoload: Autoload) -> Self {
        self.autoload = autoload;
        self
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Register a loader for a type key, overriding the defaults.
    #[must_use]
    pub fn with_loader(mut self, key: impl Into<String>, loader: Arc<dyn Loader>) -> Self {
        self.loaders.push((key.into(), loader));
        self
    }

    #[must_use]
    pub fn with_plugin(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.plugins.push(plugin);
        self
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("responsive", &self.responsive)
            .field("autoload", &self.autoload)
            .field("concurrency", &self.concurrency)
            .field(
                "loaders",
                &self.loaders.iter().map(|(k, _)| k).collect::<Vec<_>>(),
            )
            .field("plugins", &self.plugins.len())
            .finish()
    }
}
