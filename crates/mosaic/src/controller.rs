#![forbid(unsafe_code)]

//! Per-placeholder source controller.

use std::sync::Arc;

use futures::FutureExt;
use mosaic_core::{Media, PlaceholderId, SourceId};
use mosaic_events::{Event, EventBus, PlaceholderEvent};
use mosaic_loaders::{LoadError, LoaderRegistry};
use mosaic_media::ConditionMatcher;
use mosaic_queue::QueueError;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::{
    LoadJob, SchedulerHandle,
    config::Autoload,
    error::{MosaicError, MosaicResult},
    source::{SourceGroup, SourceState},
};

/// Controller phase. Terminal per source; the controller itself cycles
/// back through `Selecting` on every re-evaluation trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Selecting,
    Dispatching,
    Loaded,
}

struct ControllerState {
    group: SourceGroup,
    phase: Phase,
    /// The one source whose outcome this controller is waiting on. A newer
    /// selection replaces it; the superseded request keeps running but its
    /// result is no longer shown.
    awaited: Option<SourceId>,
}

pub(crate) struct ControllerInner {
    id: PlaceholderId,
    autoload: Autoload,
    state: Mutex<ControllerState>,
    matcher: ConditionMatcher,
    registry: Arc<LoaderRegistry>,
    scheduler: SchedulerHandle,
    bus: EventBus,
    cancel: CancellationToken,
}

impl Drop for ControllerInner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Per-placeholder state machine: owns the candidate sources, re-runs
/// selection when conditions may have changed, dispatches the winner
/// through the shared scheduler, and discards stale in-flight results.
///
/// Cloning is cheap and shares the controller.
#[derive(Clone)]
pub struct SourceController {
    pub(crate) inner: Arc<ControllerInner>,
}

impl SourceController {
    pub(crate) fn new(
        group: SourceGroup,
        autoload: Autoload,
        matcher: ConditionMatcher,
        registry: Arc<LoaderRegistry>,
        scheduler: SchedulerHandle,
        bus: EventBus,
    ) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                id: PlaceholderId::next(),
                autoload,
                state: Mutex::new(ControllerState {
                    group,
                    phase: Phase::Idle,
                    awaited: None,
                }),
                matcher,
                registry,
                scheduler,
                bus,
                cancel: CancellationToken::new(),
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> PlaceholderId {
        self.inner.id
    }

    #[must_use]
    pub fn autoload(&self) -> Autoload {
        self.inner.autoload
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.inner.state.lock().phase
    }

    /// The source last selected and dispatched, if any.
    #[must_use]
    pub fn current_url(&self) -> Option<url::Url> {
        let st = self.inner.state.lock();
        let id = st.group.current()?;
        st.group.get(id).map(|source| source.url().clone())
    }

    /// Whether the currently selected source has a cached result.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        let st = self.inner.state.lock();
        st.group
            .current()
            .and_then(|id| st.group.get(id))
            .is_some_and(|source| source.state() == SourceState::Loaded)
    }

    #[must_use]
    pub fn source_count(&self) -> usize {
        self.inner.state.lock().group.len()
    }

    /// Run `f` with a snapshot view of the source group (for plugins and
    /// diagnostics). The group lock is held for the duration of `f`.
    pub fn with_group<R>(&self, f: impl FnOnce(&SourceGroup) -> R) -> R {
        f(&self.inner.state.lock().group)
    }

    /// Subscribe to this page's event stream.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.bus.subscribe()
    }

    /// Re-run selection and dispatch the winner.
    ///
    /// This is the re-evaluation trigger: it is called at construction (for
    /// immediate autoload), on every viewport change (when responsive), and
    /// by plugins (visibility, manual refresh). Selection and dispatch run
    /// under one lock, atomically with respect to other synchronous code.
    ///
    /// # Errors
    ///
    /// Configuration errors (no matching loader, unknown loader name)
    /// surface here synchronously. A selection that matches nothing is not
    /// an error; the placeholder simply stays as it is.
    pub fn load(&self) -> MosaicResult<()> {
        let mut st = self.inner.state.lock();
        st.phase = Phase::Selecting;

        let Some(id) = st.group.select(&self.inner.matcher) else {
            trace!(placeholder = %self.inner.id, "no source eligible under current conditions");
            st.phase = Phase::Idle;
            return Ok(());
        };

        if let Some(source) = st.group.get(id) {
            self.inner.bus.publish(PlaceholderEvent::SourceSelected {
                placeholder: self.inner.id,
                url: source.url().clone(),
            });
        }
        self.dispatch_selected_locked(&mut st, id)
    }

    /// Dispatch a specific source, normally the selection winner.
    ///
    /// # Errors
    ///
    /// [`MosaicError::UnknownSource`] for a foreign id; otherwise as
    /// [`Self::load`].
    pub fn dispatch_selected(&self, id: SourceId) -> MosaicResult<()> {
        let mut st = self.inner.state.lock();
        self.dispatch_selected_locked(&mut st, id)
    }

    fn dispatch_selected_locked(
        &self,
        st: &mut ControllerState,
        id: SourceId,
    ) -> MosaicResult<()> {
        let Some(source) = st.group.get(id) else {
            return Err(MosaicError::UnknownSource(id));
        };
        let cached = source.cached().cloned();
        let outstanding = source.reusable_ticket().map(|ticket| ticket.id());
        let request = source.to_request();
        st.group.set_current(id);

        // Already loaded: show the cached result, no loader work at all.
        if let Some(media) = cached {
            st.awaited = None;
            st.phase = Phase::Loaded;
            trace!(placeholder = %self.inner.id, source = %id, "showing cached result");
            self.show(media);
            return Ok(());
        }

        // An outstanding, non-rejected request: never spawn a duplicate.
        // Reattach interest and move the pending entry up the queue.
        if let Some(ticket_id) = outstanding {
            st.awaited = Some(id);
            st.phase = Phase::Dispatching;
            self.inner.scheduler.promote(ticket_id);
            return Ok(());
        }

        // Fresh dispatch. The resolution pre-flight runs synchronously so a
        // configuration mistake reaches the caller, not a detached future.
        self.inner.registry.resolve(&request)?;

        let registry = Arc::clone(&self.inner.registry);
        let job: LoadJob = Box::new(move || {
            // Candidates are re-resolved when the queue grants a slot, so
            // registry changes made while pending are honored.
            async move { registry.dispatch(&request).await }.boxed()
        });

        st.awaited = Some(id);
        st.phase = Phase::Dispatching;
        let ticket = self.inner.scheduler.submit(job);
        if let Some(source) = st.group.get_mut(id) {
            source.set_request(ticket.clone());
        }
        debug!(placeholder = %self.inner.id, source = %id, ticket = %ticket.id(), "load submitted");

        let controller = self.clone();
        tokio::spawn(async move {
            match ticket.outcome().await {
                Ok(result) => controller.on_request_settled(id, result),
                Err(QueueError::Abandoned) => {
                    trace!(source = %id, "queue torn down before dispatch");
                }
            }
        });
        Ok(())
    }

    /// Completion handling: show the result only if its source is still the
    /// one this controller is waiting on. A superseded result is dropped
    /// silently but stays cached on its source for future reselection.
    fn on_request_settled(&self, id: SourceId, result: Result<Media, LoadError>) {
        let mut st = self.inner.state.lock();
        match result {
            Ok(media) => {
                if let Some(source) = st.group.get_mut(id) {
                    source.cache(media.clone());
                }
                let still_wanted = st.awaited == Some(id) && st.group.current() == Some(id);
                if still_wanted {
                    st.awaited = None;
                    st.phase = Phase::Loaded;
                    drop(st);
                    self.show(media);
                } else {
                    trace!(placeholder = %self.inner.id, source = %id, "discarding stale result");
                }
            }
            Err(error) => {
                debug!(placeholder = %self.inner.id, source = %id, %error, "load failed");
                if st.awaited == Some(id) {
                    st.awaited = None;
                    st.phase = Phase::Idle;
                }
                drop(st);
                self.inner.bus.publish(PlaceholderEvent::LoadError {
                    placeholder: self.inner.id,
                    error: error.to_string(),
                });
            }
        }
    }

    fn show(&self, media: Media) {
        self.inner.bus.publish(PlaceholderEvent::LoadSuccess {
            placeholder: self.inner.id,
            media: media.clone(),
        });
        self.inner.bus.publish(PlaceholderEvent::AfterShow {
            placeholder: self.inner.id,
            media,
        });
    }

    /// Tear down the viewport subscription, if any. Idempotent; dropping
    /// the last controller handle has the same effect.
    pub fn destroy(&self) {
        self.inner.cancel.cancel();
    }

    pub(crate) fn cancel_token(&self) -> CancellationToken {
        self.inner.cancel.clone()
    }
}

impl std::fmt::Debug for SourceController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let st = self.inner.state.lock();
        f.debug_struct("SourceController")
            .field("id", &self.inner.id)
            .field("phase", &st.phase)
            .field("sources", &st.group.len())
            .field("current", &st.group.current())
            .finish()
    }
}
