#![forbid(unsafe_code)]

use mosaic_core::{Media, PlaceholderId};
use url::Url;

/// Events emitted by a placeholder's source controller.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaceholderEvent {
    /// Selection picked a source (before any loading happens).
    SourceSelected { placeholder: PlaceholderId, url: Url },
    /// The selected source finished loading and is about to be shown.
    LoadSuccess {
        placeholder: PlaceholderId,
        media: Media,
    },
    /// A load attempt for this placeholder failed.
    LoadError {
        placeholder: PlaceholderId,
        error: String,
    },
    /// The media has been handed over for display.
    AfterShow {
        placeholder: PlaceholderId,
        media: Media,
    },
}

impl PlaceholderEvent {
    /// The placeholder this event belongs to.
    #[must_use]
    pub fn placeholder(&self) -> PlaceholderId {
        match self {
            Self::SourceSelected { placeholder, .. }
            | Self::LoadSuccess { placeholder, .. }
            | Self::LoadError { placeholder, .. }
            | Self::AfterShow { placeholder, .. } => *placeholder,
        }
    }
}
