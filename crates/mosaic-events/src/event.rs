#![forbid(unsafe_code)]

use crate::{LoaderEvent, PlaceholderEvent};

/// Unified event for the full loading pipeline.
///
/// Hierarchical: each subsystem has its own variant with a sub-enum.
#[derive(Clone, Debug)]
pub enum Event {
    /// Placeholder lifecycle event (selection, load outcome, show).
    Placeholder(PlaceholderEvent),
    /// Loader transport event (fetch progress).
    Loader(LoaderEvent),
}

impl From<PlaceholderEvent> for Event {
    fn from(e: PlaceholderEvent) -> Self {
        Self::Placeholder(e)
    }
}

impl From<LoaderEvent> for Event {
    fn from(e: LoaderEvent) -> Self {
        Self::Loader(e)
    }
}
