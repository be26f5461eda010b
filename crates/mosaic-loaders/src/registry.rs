#![forbid(unsafe_code)]

//! Resolution of a source descriptor to the loader responsible for it.

use std::sync::Arc;

use mosaic_core::Media;
use mosaic_events::EventBus;
use tracing::{debug, trace};

use crate::{
    error::{LoadError, LoadResult},
    fetch::Fetch,
    loader::Loader,
    raster::RasterLoader,
    request::{LoadRequest, LoaderHint},
    vector::InlineVectorLoader,
};

/// Tagged result of the type-table lookup.
enum Match {
    Found(Arc<dyn Loader>),
    NotFound,
}

/// Ordered, name- and type-keyed loader tables.
///
/// Registration is additive; re-registering a key replaces the previous
/// entry, so later configuration calls override earlier ones and the
/// defaults.
#[derive(Clone, Default)]
pub struct LoaderRegistry {
    named: Vec<(String, Arc<dyn Loader>)>,
    types: Vec<(String, Arc<dyn Loader>)>,
}

impl LoaderRegistry {
    /// A registry with no loaders at all.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register a loader under a name for explicit per-source selection.
    pub fn register_named(&mut self, name: impl Into<String>, loader: Arc<dyn Loader>) {
        let name = name.into();
        self.named.retain(|(existing, _)| *existing != name);
        self.named.push((name, loader));
    }

    /// Register a loader for a type key (a file extension, also matched as
    /// the subtype of a MIME-like type hint).
    pub fn register_type(&mut self, key: impl Into<String>, loader: Arc<dyn Loader>) {
        let key = key.into();
        self.types.retain(|(existing, _)| *existing != key);
        self.types.push((key, loader));
    }

    fn named(&self, name: &str) -> Option<Arc<dyn Loader>> {
        self.named
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, loader)| Arc::clone(loader))
    }

    /// All type-table loaders matching the request, in registration order.
    fn matching(&self, request: &LoadRequest) -> Vec<Arc<dyn Loader>> {
        // An explicit MIME-like type hint takes precedence: with one
        // present, the extension is not sniffed at all.
        if let Some(media_type) = request.media_type.as_deref() {
            return self
                .types
                .iter()
                .filter(|(key, _)| mime_matches(media_type, key))
                .map(|(_, loader)| Arc::clone(loader))
                .collect();
        }

        let Some(ext) = request.extension() else {
            return Vec::new();
        };
        self.types
            .iter()
            .filter(|(key, _)| *key == ext)
            .map(|(_, loader)| Arc::clone(loader))
            .collect()
    }

    fn match_type(&self, request: &LoadRequest) -> Match {
        match self.matching(request).into_iter().next() {
            Some(loader) => Match::Found(loader),
            None => Match::NotFound,
        }
    }

    /// Resolve the loader for a request.
    ///
    /// This is the synchronous pre-flight run by dispatch: a configuration
    /// mistake (unknown name, nothing matching) surfaces loudly here,
    /// before anything is queued.
    ///
    /// # Errors
    ///
    /// [`LoadError::UnknownLoaderName`] or [`LoadError::NoLoaderFound`].
    pub fn resolve(&self, request: &LoadRequest) -> LoadResult<Arc<dyn Loader>> {
        match &request.loader {
            LoaderHint::Explicit(loader) => Ok(Arc::clone(loader)),
            LoaderHint::Named(name) => self
                .named(name)
                .ok_or_else(|| LoadError::UnknownLoaderName(name.clone())),
            LoaderHint::Auto => match self.match_type(request) {
                Match::Found(loader) => Ok(loader),
                Match::NotFound => {
                    debug!(url = %request.url, "no loader matches request");
                    Err(LoadError::NoLoaderFound {
                        url: request.url.clone(),
                    })
                }
            },
        }
    }

    /// Ordered candidate list tried at dispatch time.
    fn candidates(&self, request: &LoadRequest) -> LoadResult<Vec<Arc<dyn Loader>>> {
        match &request.loader {
            LoaderHint::Explicit(loader) => Ok(vec![Arc::clone(loader)]),
            LoaderHint::Named(name) => self
                .named(name)
                .map(|loader| vec![loader])
                .ok_or_else(|| LoadError::UnknownLoaderName(name.clone())),
            LoaderHint::Auto => Ok(self.matching(request)),
        }
    }

    /// Run the request through its candidates, in registration order, until
    /// one accepts. Candidates are resolved here — at dispatch time — not
    /// at submission time, so configuration applied in between is honored.
    ///
    /// # Errors
    ///
    /// [`LoadError::NoLoaderFound`] when no candidate exists or every
    /// candidate refuses; otherwise whatever the accepting loader returns.
    pub async fn dispatch(&self, request: &LoadRequest) -> LoadResult<Media> {
        for loader in self.candidates(request)? {
            if let Some(outcome) = loader.attempt(request).await {
                return outcome;
            }
            trace!(url = %request.url, "loader refused request, trying next");
        }
        Err(LoadError::NoLoaderFound {
            url: request.url.clone(),
        })
    }
}

impl LoaderRegistry {
    /// The default table: raster images by extension, plus the `"image"`
    /// and `"inline-svg"` names for explicit per-source selection.
    ///
    /// `.svg` sources go through the raster path by default; a source opts
    /// into inlining with the `"inline-svg"` loader name.
    #[must_use]
    pub fn with_defaults(fetch: Arc<dyn Fetch>, bus: Option<EventBus>) -> Self {
        let mut raster = RasterLoader::new(Arc::clone(&fetch));
        if let Some(bus) = bus {
            raster = raster.with_bus(bus);
        }
        let raster: Arc<dyn Loader> = Arc::new(raster);
        let vector: Arc<dyn Loader> = Arc::new(InlineVectorLoader::new(fetch));

        let mut registry = Self::empty();
        registry.register_named("image", Arc::clone(&raster));
        registry.register_named("inline-svg", vector);
        for key in ["jpeg", "jpg", "png", "gif", "webp", "avif", "svg"] {
            registry.register_type(key, Arc::clone(&raster));
        }
        registry
    }
}

impl std::fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderRegistry")
            .field(
                "named",
                &self.named.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            )
            .field(
                "types",
                &self.types.iter().map(|(k, _)| k).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// MIME-prefix-with-suffix rule: `image/svg+xml` matches key `svg` —
/// anything before the slash, then the key, then an optional `+suffix`.
fn mime_matches(media_type: &str, key: &str) -> bool {
    let media_type = media_type.to_ascii_lowercase();
    let Some((prefix, subtype)) = media_type.split_once('/') else {
        return false;
    };
    if prefix.is_empty() {
        return false;
    }
    match subtype.strip_prefix(key) {
        Some("") => true,
        Some(tail) => tail.starts_with('+'),
        None => false,
    }
}
