#![forbid(unsafe_code)]

//! # Mosaic
//!
//! Responsive media source selection with a bounded, promotable load
//! queue.
//!
//! Each placeholder declares a group of candidate sources; the controller
//! picks the one applicable to current viewport conditions (last-declared
//! wins ties, an unconditioned source is the fallback), fetches it through
//! a type-keyed loader, and announces the result on the page-wide event
//! bus. All fetches funnel through one shared queue that bounds
//! concurrency and services the most recently requested load first.
//!
//! ## Quick start
//!
//! ```ignore
//! use mosaic::prelude::*;
//!
//! let runtime = Runtime::new(Options::default().with_responsive(true));
//! runtime.viewport().set(Viewport::new(1280, 720));
//!
//! let controller = runtime.placeholder(PlaceholderConfig::new(vec![
//!     SourceSpec::new("https://example.com/small.jpg".parse()?),
//!     SourceSpec::new("https://example.com/wide.jpg".parse()?)
//!         .with_media("(min-width: 800px)"),
//! ]))?;
//!
//! let mut events = controller.subscribe();
//! // ... react to LoadSuccess / AfterShow events
//! ```

// ── Re-export sub-crates ────────────────────────────────────────────────

pub mod events {
    pub use mosaic_events::*;
}

pub mod loaders {
    pub use mosaic_loaders::*;
}

pub mod media {
    pub use mosaic_media::*;
}

pub mod queue {
    pub use mosaic_queue::*;
}

// ── Facade ──────────────────────────────────────────────────────────────

mod config;
mod controller;
mod error;
mod plugin;
mod runtime;
mod source;

pub use config::{Autoload, Options, PlaceholderConfig, SourceSpec};
pub use controller::{Phase, SourceController};
pub use error::{MosaicError, MosaicResult};
pub use mosaic_core::{Media, PlaceholderId, SourceId};
pub use plugin::Plugin;
pub use runtime::Runtime;
pub use source::{Source, SourceGroup, SourceState};

use mosaic_loaders::LoadError;

/// The shared queue, specialized to media loads.
pub type MediaQueue = mosaic_queue::LoadQueue<Media, LoadError>;
/// Handle to one in-flight or completed media load.
pub type LoadTicket = mosaic_queue::Ticket<Media, LoadError>;
/// A deferred media load thunk.
pub type LoadJob = mosaic_queue::Job<Media, LoadError>;
/// Injectable scheduling capability for media loads.
pub type SchedulerHandle = std::sync::Arc<dyn mosaic_queue::Scheduler<Media, LoadError>>;

// ── Prelude ─────────────────────────────────────────────────────────────

pub mod prelude {
    pub use mosaic_core::{Media, PlaceholderId, SourceId};
    pub use mosaic_events::{Event, EventBus, LoaderEvent, PlaceholderEvent};
    pub use mosaic_loaders::{Loader, LoaderHint, LoaderRegistry};
    pub use mosaic_media::{MediaCondition, Viewport, ViewportFeed};
    pub use mosaic_queue::{RequestState, Scheduler};

    pub use crate::{
        Autoload, MosaicError, Options, Phase, PlaceholderConfig, Plugin, Runtime,
        SourceController, SourceSpec,
    };
}
