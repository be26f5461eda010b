#![forbid(unsafe_code)]

//! Page-wide wiring: one queue, one registry, one viewport feed, one bus.

use std::sync::Arc;

use mosaic_events::{Event, EventBus};
use mosaic_loaders::{Fetch, HttpFetch, LoaderRegistry};
use mosaic_media::{ConditionMatcher, ViewportFeed, ViewportSource};
use tokio::sync::broadcast;
use tracing::debug;

use crate::{
    MediaQueue, SchedulerHandle,
    config::{Autoload, Options, PlaceholderConfig},
    controller::SourceController,
    error::MosaicResult,
    source::SourceGroup,
};

/// Builds and wires controllers.
///
/// One runtime per page: every controller it builds shares the same load
/// queue, loader registry, viewport feed and event bus, all injected at
/// construction. There is no module-global state to configure.
pub struct Runtime {
    options: Options,
    queue: MediaQueue,
    scheduler: SchedulerHandle,
    registry: Arc<LoaderRegistry>,
    viewport: Arc<ViewportFeed>,
    viewport_source: Arc<dyn ViewportSource>,
    bus: EventBus,
}

impl Runtime {
    /// Create a runtime with the default HTTP transport.
    #[must_use]
    pub fn new(options: Options) -> Self {
        Self::with_fetch(options, Arc::new(HttpFetch::new()))
    }

    /// Create a runtime over a custom transport (tests, bespoke protocols).
    #[must_use]
    pub fn with_fetch(options: Options, fetch: Arc<dyn Fetch>) -> Self {
        let bus = EventBus::default();

        let mut registry = LoaderRegistry::with_defaults(fetch, Some(bus.clone()));
        for (key, loader) in &options.loaders {
            registry.register_type(key.clone(), Arc::clone(loader));
        }

        let queue = MediaQueue::new(options.concurrency);
        let viewport = Arc::new(ViewportFeed::default());

        Self {
            scheduler: Arc::new(queue.clone()),
            queue,
            registry: Arc::new(registry),
            viewport_source: Arc::clone(&viewport) as Arc<dyn ViewportSource>,
            viewport,
            bus,
            options,
        }
    }

    /// Replace the scheduler used by subsequently built controllers.
    #[must_use]
    pub fn with_scheduler(mut self, scheduler: SchedulerHandle) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Replace the viewport source consulted by condition matching.
    /// The feed keeps driving re-selection; this only affects reads.
    #[must_use]
    pub fn with_viewport_source(mut self, source: Arc<dyn ViewportSource>) -> Self {
        self.viewport_source = source;
        self
    }

    /// The feed the embedder pushes viewport changes into.
    #[must_use]
    pub fn viewport(&self) -> &ViewportFeed {
        &self.viewport
    }

    /// The shared load queue.
    #[must_use]
    pub fn queue(&self) -> &MediaQueue {
        &self.queue
    }

    /// Subscribe to the page-wide event stream.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Build a controller for one placeholder.
    ///
    /// Must be called within a Tokio runtime: immediate autoload and
    /// responsive re-selection spawn tasks.
    ///
    /// # Errors
    ///
    /// Condition parse failures and empty source lists fail here; with
    /// immediate autoload, loader resolution failures do too.
    pub fn placeholder(&self, config: PlaceholderConfig) -> MosaicResult<SourceController> {
        let autoload = config.autoload.unwrap_or(self.options.autoload);
        let group = SourceGroup::from_config(config)?;

        let controller = SourceController::new(
            group,
            autoload,
            ConditionMatcher::new(Arc::clone(&self.viewport_source)),
            Arc::clone(&self.registry),
            Arc::clone(&self.scheduler),
            self.bus.clone(),
        );

        for plugin in &self.options.plugins {
            plugin.initialize(&controller);
        }

        if self.options.responsive && controller.source_count() > 1 {
            self.watch_viewport(&controller);
        }

        if autoload == Autoload::Immediate {
            controller.load()?;
        }
        Ok(controller)
    }

    /// Re-run selection on every viewport change until the controller is
    /// destroyed or the feed goes away.
    fn watch_viewport(&self, controller: &SourceController) {
        let mut sub = self.viewport.subscribe();
        let cancel = controller.cancel_token();
        let weak = Arc::downgrade(&controller.inner);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;

                    () = cancel.cancelled() => break,
                    changed = sub.changed() => {
                        if !changed {
                            break;
                        }
                        let Some(inner) = weak.upgrade() else { break };
                        let controller = SourceController { inner };
                        if let Err(error) = controller.load() {
                            debug!(placeholder = %controller.id(), %error, "reselection failed");
                        }
                    }
                }
            }
        });
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("options", &self.options)
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}
