#![forbid(unsafe_code)]

//! Candidate sources and the ordered group a placeholder owns.

use mosaic_core::{Media, SourceId};
use mosaic_loaders::{LoadRequest, LoaderHint};
use mosaic_media::{ConditionMatcher, MediaCondition};
use url::Url;

use crate::{
    LoadTicket,
    config::{PlaceholderConfig, SourceSpec},
    error::{MosaicError, MosaicResult},
};

/// Lifecycle of one candidate source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceState {
    Unloaded,
    Loading,
    Loaded,
}

/// One candidate source: locator, optional condition and hints, plus the
/// load bookkeeping that accumulates over its life.
pub struct Source {
    id: SourceId,
    url: Url,
    condition: Option<MediaCondition>,
    media_type: Option<String>,
    loader: LoaderHint,
    alt: Option<String>,
    request: Option<LoadTicket>,
    cached: Option<Media>,
}

impl Source {
    fn from_spec(spec: SourceSpec, fallback_alt: Option<&str>) -> MosaicResult<Self> {
        let condition = match spec.media.as_deref().map(str::trim) {
            Some(media) if !media.is_empty() => Some(MediaCondition::parse(media)?),
            _ => None,
        };
        Ok(Self {
            id: SourceId::next(),
            url: spec.url,
            condition,
            media_type: spec.media_type,
            loader: spec.loader,
            alt: spec.alt.or_else(|| fallback_alt.map(str::to_owned)),
            request: None,
            cached: None,
        })
    }

    #[must_use]
    pub fn id(&self) -> SourceId {
        self.id
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn condition(&self) -> Option<&MediaCondition> {
        self.condition.as_ref()
    }

    /// Derived lifecycle state.
    #[must_use]
    pub fn state(&self) -> SourceState {
        if self.cached.is_some() {
            return SourceState::Loaded;
        }
        match &self.request {
            Some(ticket) if !ticket.is_rejected() => SourceState::Loading,
            _ => SourceState::Unloaded,
        }
    }

    #[must_use]
    pub fn cached(&self) -> Option<&Media> {
        self.cached.as_ref()
    }

    /// The outstanding ticket, unless it was rejected (a rejected request
    /// is retried by the next dispatch).
    pub(crate) fn reusable_ticket(&self) -> Option<&LoadTicket> {
        self.request.as_ref().filter(|ticket| !ticket.is_rejected())
    }

    pub(crate) fn set_request(&mut self, ticket: LoadTicket) {
        self.request = Some(ticket);
    }

    pub(crate) fn cache(&mut self, media: Media) {
        self.cached = Some(media);
    }

    /// The load request this source describes.
    pub(crate) fn to_request(&self) -> LoadRequest {
        LoadRequest {
            url: self.url.clone(),
            media_type: self.media_type.clone(),
            loader: self.loader.clone(),
            alt: self.alt.clone(),
        }
    }
}

/// The ordered candidate set for one placeholder.
///
/// Declaration order is ascending priority — the last-declared source wins
/// ties — so selection walks the list back to front.
pub struct SourceGroup {
    sources: Vec<Source>,
    current: Option<SourceId>,
}

impl SourceGroup {
    pub(crate) fn from_config(config: PlaceholderConfig) -> MosaicResult<Self> {
        if config.sources.is_empty() {
            return Err(MosaicError::NoSources);
        }
        let fallback_alt = config.alt;
        let sources = config
            .sources
            .into_iter()
            .map(|spec| Source::from_spec(spec, fallback_alt.as_deref()))
            .collect::<MosaicResult<Vec<_>>>()?;
        Ok(Self {
            sources,
            current: None,
        })
    }

    /// Pick the highest-priority source whose condition currently holds.
    ///
    /// An unconditioned source always matches, so one declared first acts
    /// as the fallback.
    pub(crate) fn select(&self, matcher: &ConditionMatcher) -> Option<SourceId> {
        self.sources
            .iter()
            .rev()
            .find(|source| matcher.matches(source.condition()))
            .map(Source::id)
    }

    /// Look up a source by id.
    #[must_use]
    pub fn get(&self, id: SourceId) -> Option<&Source> {
        self.sources.iter().find(|source| source.id() == id)
    }

    pub(crate) fn get_mut(&mut self, id: SourceId) -> Option<&mut Source> {
        self.sources.iter_mut().find(|source| source.id() == id)
    }

    /// The source last selected and dispatched, if any.
    #[must_use]
    pub fn current(&self) -> Option<SourceId> {
        self.current
    }

    pub(crate) fn set_current(&mut self, id: SourceId) {
        self.current = Some(id);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
